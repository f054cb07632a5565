//! Configuration record types with serde deserialization.
//!
//! The decision core is agnostic to where configuration comes from; this
//! module defines the typed records it consumes. Field names follow the
//! user-facing kebab-case contract (`match-tag`, `value-equals`,
//! `checksum-field`, ...). Unknown fields are a deserialization error.

mod rule;
mod throttle;

pub use rule::RuleDef;
pub use throttle::{IntervalUnit, ThrottleConfig};


use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A full configuration document: named schedules, rules, and throttles.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RulesDocument {
    /// Named cron lines, referenced from rules by name.
    #[serde(default)]
    pub schedules: IndexMap<String, String>,

    #[serde(default)]
    pub rules: Vec<RuleDef>,

    #[serde(default)]
    pub throttles: Vec<ThrottleConfig>,
}

impl RulesDocument {
    /// Deserialize a document from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize the document back to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
