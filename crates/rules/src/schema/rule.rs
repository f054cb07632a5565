//! Rule definition record.

use serde::{Deserialize, Serialize};
use vigil_core::Value;

/// A rule as written in configuration.
///
/// At most one `value-*`/`date-*` operator may be set; construction of a
/// [`Rule`](crate::rule::Rule) enforces that and the other cross-field
/// constraints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub name: String,

    /// Tags to match; the wildcard `*` matches any tagged event.
    #[serde(default, rename = "match-tag")]
    pub match_tag: Option<Vec<String>>,

    /// Event field the operator applies to.
    #[serde(default, rename = "match-field")]
    pub match_field: Option<String>,

    #[serde(default, rename = "value-equals")]
    pub value_equals: Option<Value>,

    #[serde(default, rename = "value-in")]
    pub value_in: Option<Vec<Value>>,

    #[serde(default, rename = "value-not-in")]
    pub value_not_in: Option<Vec<Value>>,

    #[serde(default, rename = "value-lt")]
    pub value_lt: Option<Value>,

    #[serde(default, rename = "value-lte")]
    pub value_lte: Option<Value>,

    #[serde(default, rename = "value-gt")]
    pub value_gt: Option<Value>,

    #[serde(default, rename = "value-gte")]
    pub value_gte: Option<Value>,

    #[serde(default, rename = "value-contains")]
    pub value_contains: Option<Value>,

    /// Date comparison threshold, resolved through the variable resolver
    /// (so `%{#now(-10m)}` expresses "10 minutes ago").
    #[serde(default, rename = "date-lt")]
    pub date_lt: Option<String>,

    #[serde(default, rename = "date-gt")]
    pub date_gt: Option<String>,

    /// strftime format for parsing the matched field under `date-lt`/`date-gt`.
    #[serde(default, rename = "date-fmt")]
    pub date_fmt: Option<String>,

    /// Name of the schedule gating this rule.
    #[serde(default)]
    pub schedule: Option<String>,

    /// Name of the throttle limiting this rule's actions.
    #[serde(default)]
    pub throttle: Option<String>,

    /// Whether the matched event continues down the chain.
    #[serde(default = "default_pass_through", rename = "pass-through")]
    pub pass_through: bool,

    /// Action metadata owned by the dispatcher.
    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub destinations: Vec<String>,
}

fn default_pass_through() -> bool {
    true
}
