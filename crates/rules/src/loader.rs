//! Build an immutable [`RuleSet`] from a configuration document.
//!
//! Any validation error rejects the whole document; configuration reload
//! means building a fresh `RuleSet` and swapping it in.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::rule::{Rule, RuleConfigError};
use crate::schedule::{CronEntry, ScheduleParseError};
use crate::schema::{RulesDocument, ThrottleConfig};
use crate::validation::validate_document;

/// Errors from loading a configuration document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// One or more validation errors; the whole document is rejected.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleParseError),

    #[error(transparent)]
    Rule(#[from] RuleConfigError),
}

/// Immutable, validated configuration: named schedules and throttles
/// plus the rules that reference them.
#[derive(Debug)]
pub struct RuleSet {
    schedules: HashMap<String, CronEntry>,
    rules: Vec<Rule>,
    throttles: HashMap<String, ThrottleConfig>,
}

impl RuleSet {
    /// Load and build from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let set = Self::from_yaml(&contents)?;
        info!(path = %path.display(), rules = set.rules.len(), "loaded rule set");
        Ok(set)
    }

    /// Parse, validate, and build from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        let doc = RulesDocument::from_yaml(yaml)?;
        Self::from_document(&doc)
    }

    /// Validate and build from an already-parsed document.
    pub fn from_document(doc: &RulesDocument) -> Result<Self, LoadError> {
        let report = validate_document(doc);
        if !report.valid {
            let joined = report
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(LoadError::Validation(joined));
        }
        for warning in &report.warnings {
            warn!(path = %warning.path, "{}", warning.message);
        }

        let mut schedules = HashMap::new();
        for (name, line) in &doc.schedules {
            schedules.insert(name.clone(), CronEntry::parse(line)?);
        }

        let mut rules = Vec::with_capacity(doc.rules.len());
        for def in &doc.rules {
            rules.push(Rule::from_def(def)?);
        }

        let throttles = doc
            .throttles
            .iter()
            .map(|cfg| (cfg.name.clone(), cfg.clone()))
            .collect();

        Ok(Self {
            schedules,
            rules,
            throttles,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn schedule(&self, name: &str) -> Option<&CronEntry> {
        self.schedules.get(name)
    }

    pub fn throttle(&self, name: &str) -> Option<&ThrottleConfig> {
        self.throttles.get(name)
    }

    /// Whether a rule's schedule (if any) is due at `now`.
    ///
    /// A rule without a schedule is always due. A dangling schedule name
    /// cannot happen through [`from_document`](Self::from_document), but
    /// is treated as not due rather than a silent pass.
    pub fn is_due(&self, rule: &Rule, now: DateTime<Utc>) -> bool {
        match rule.schedule() {
            None => true,
            Some(name) => match self.schedules.get(name) {
                Some(entry) => entry.is_due(now),
                None => {
                    warn!(rule = %rule.name(), schedule = %name, "unknown schedule");
                    false
                }
            },
        }
    }
}
