//! Configuration document validation with structured, path-addressed errors.
//!
//! Validation runs over a whole [`RulesDocument`] before anything is
//! built: schedules must parse, rules must construct, and every
//! schedule/throttle reference must point at a defined name. Errors
//! block the document; warnings are advisory.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::rule::Rule;
use crate::schedule::CronEntry;
use crate::schema::RulesDocument;

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path-like location, e.g. `rules[2].schedule`.
    pub path: String,
    pub message: String,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a parsed configuration document.
pub fn validate_document(doc: &RulesDocument) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, line) in &doc.schedules {
        if name.trim().is_empty() {
            result.error("schedules", "schedule name must not be empty");
        }
        if let Err(e) = CronEntry::parse(line) {
            result.error(format!("schedules.{name}"), e.to_string());
        }
    }

    let mut throttle_names: HashSet<&str> = HashSet::new();
    for (i, cfg) in doc.throttles.iter().enumerate() {
        let path = format!("throttles[{i}]");
        if cfg.name.trim().is_empty() {
            result.error(&path, "throttle name must not be empty");
        } else if !throttle_names.insert(cfg.name.as_str()) {
            result.error(&path, format!("duplicate throttle name '{}'", cfg.name));
        }
        if cfg.rate == 0 {
            result.error(format!("{path}.rate"), "rate must be at least 1");
        }
        if cfg.interval == 0 {
            result.error(format!("{path}.interval"), "interval must be at least 1");
        }
    }

    let mut rule_names: HashSet<&str> = HashSet::new();
    for (i, def) in doc.rules.iter().enumerate() {
        let path = format!("rules[{i}]");
        if !def.name.trim().is_empty() && !rule_names.insert(def.name.as_str()) {
            result.error(&path, format!("duplicate rule name '{}'", def.name));
        }
        if let Err(e) = Rule::from_def(def) {
            result.error(&path, e.to_string());
        }
        if let Some(schedule) = &def.schedule {
            if !doc.schedules.contains_key(schedule) {
                result.error(
                    format!("{path}.schedule"),
                    format!("unknown schedule '{schedule}'"),
                );
            }
        }
        if let Some(throttle) = &def.throttle {
            if !doc.throttles.iter().any(|c| &c.name == throttle) {
                result.error(
                    format!("{path}.throttle"),
                    format!("unknown throttle '{throttle}'"),
                );
            }
        }
    }

    for name in doc.schedules.keys() {
        if !doc.rules.iter().any(|r| r.schedule.as_deref() == Some(name)) {
            result.warn(
                format!("schedules.{name}"),
                "schedule is not referenced by any rule",
            );
        }
    }
    for cfg in &doc.throttles {
        if !doc
            .rules
            .iter()
            .any(|r| r.throttle.as_deref() == Some(cfg.name.as_str()))
        {
            result.warn(
                format!("throttles.{}", cfg.name),
                "throttle is not referenced by any rule",
            );
        }
    }

    result
}

/// Parse raw YAML and validate; parse errors become validation errors.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match RulesDocument::from_yaml(yaml) {
        Ok(doc) => validate_document(&doc),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}
