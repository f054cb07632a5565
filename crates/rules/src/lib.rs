//! Decision core for the vigil event-processing agent.
//!
//! This crate provides:
//! - YAML-based rule/schedule/throttle definitions with serde deserialization
//! - Cron-style schedules with IANA timezones ([`CronEntry`])
//! - Typed tag/field predicates bound to schedules by name ([`Rule`])
//! - Stateful, persistable rate limiting ([`Throttle`], [`ThrottleRegistry`])
//! - `%{...}` placeholder interpolation with builtins ([`VariableResolver`])
//!
//! The evaluators are deliberately independent: a rule only names its
//! schedule and throttle, and the caller composes the three per event.

pub mod loader;
pub mod rule;
pub mod schedule;
pub mod schema;
pub mod throttle;
pub mod validation;
pub mod variables;

pub use loader::{LoadError, RuleSet};
pub use rule::{MatchError, Rule, RuleConfigError};
pub use schedule::{CronEntry, ScheduleParseError};
pub use schema::{IntervalUnit, RuleDef, RulesDocument, ThrottleConfig};
pub use throttle::{Throttle, ThrottleRegistry, ThrottleState};
pub use validation::{validate_document, ValidationResult};
pub use variables::VariableResolver;
