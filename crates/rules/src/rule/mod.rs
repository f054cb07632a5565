//! Typed tag/field predicates over events.
//!
//! A [`Rule`] is built once from its [`RuleDef`] configuration record and
//! is immutable afterwards. It only *names* its schedule and throttle;
//! consulting the schedule's due-check and the throttle's allowance is
//! the dispatcher's job, which lets one schedule gate many rules.

#[cfg(test)]
mod tests;

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::debug;
use vigil_core::{CoercionError, Event, Value};

use crate::schema::RuleDef;
use crate::variables::VariableResolver;

/// Tag matching any event that carries a non-empty tag sequence.
pub const TAG_WILDCARD: &str = "*";

/// Invalid rule configuration. Fatal at rule construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleConfigError {
    #[error("rule name must not be empty")]
    EmptyName,

    #[error("rule '{rule}': no match-tag or match-field configured")]
    NoMatchTarget { rule: String },

    #[error("rule '{rule}': operator '{operator}' requires match-field")]
    OperatorWithoutField {
        rule: String,
        operator: &'static str,
    },

    #[error("rule '{rule}': match-field '{field}' has no operator")]
    FieldWithoutOperator { rule: String, field: String },

    #[error("rule '{rule}': more than one match operator configured")]
    ConflictingOperators { rule: String },

    #[error("rule '{rule}': operator '{operator}' requires date-fmt")]
    MissingDateFormat {
        rule: String,
        operator: &'static str,
    },
}

/// Per-event evaluation failure.
///
/// Surfaced to the caller rather than swallowed; the recommended caller
/// policy is to log and treat the event as not matching.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("field '{field}': {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    #[error("field '{field}': cannot parse '{value}' with format '{format}'")]
    DateParse {
        field: String,
        value: String,
        format: String,
    },

    #[error("date threshold '{0}' did not resolve to a timestamp")]
    Threshold(String),
}

/// One configured comparison operator.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOp {
    Equals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    Contains(Value),
    DateLt { format: String, threshold: String },
    DateGt { format: String, threshold: String },
}

/// Field predicate: operator applied to one named event field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub field: String,
    pub op: MatchOp,
}

/// Action metadata carried for the dispatcher; opaque to matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub pass_through: bool,
    pub template: Option<String>,
    pub destinations: Vec<String>,
}

/// A named predicate over an event's tags and fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    match_tags: Option<Vec<String>>,
    predicate: Option<FieldPredicate>,
    schedule: Option<String>,
    throttle: Option<String>,
    action: Action,
}

impl Rule {
    /// Build a rule from its configuration record.
    pub fn from_def(def: &RuleDef) -> Result<Self, RuleConfigError> {
        if def.name.trim().is_empty() {
            return Err(RuleConfigError::EmptyName);
        }
        let rule = def.name.clone();

        let mut ops: Vec<(&'static str, MatchOp)> = Vec::new();
        if let Some(v) = &def.value_equals {
            ops.push(("value-equals", MatchOp::Equals(v.clone())));
        }
        if let Some(v) = &def.value_in {
            ops.push(("value-in", MatchOp::In(v.clone())));
        }
        if let Some(v) = &def.value_not_in {
            ops.push(("value-not-in", MatchOp::NotIn(v.clone())));
        }
        if let Some(v) = &def.value_lt {
            ops.push(("value-lt", MatchOp::Lt(v.clone())));
        }
        if let Some(v) = &def.value_lte {
            ops.push(("value-lte", MatchOp::Lte(v.clone())));
        }
        if let Some(v) = &def.value_gt {
            ops.push(("value-gt", MatchOp::Gt(v.clone())));
        }
        if let Some(v) = &def.value_gte {
            ops.push(("value-gte", MatchOp::Gte(v.clone())));
        }
        if let Some(v) = &def.value_contains {
            ops.push(("value-contains", MatchOp::Contains(v.clone())));
        }
        if let Some(threshold) = &def.date_lt {
            let format = def.date_fmt.clone().ok_or(RuleConfigError::MissingDateFormat {
                rule: rule.clone(),
                operator: "date-lt",
            })?;
            ops.push((
                "date-lt",
                MatchOp::DateLt {
                    format,
                    threshold: threshold.clone(),
                },
            ));
        }
        if let Some(threshold) = &def.date_gt {
            let format = def.date_fmt.clone().ok_or(RuleConfigError::MissingDateFormat {
                rule: rule.clone(),
                operator: "date-gt",
            })?;
            ops.push((
                "date-gt",
                MatchOp::DateGt {
                    format,
                    threshold: threshold.clone(),
                },
            ));
        }

        if ops.len() > 1 {
            return Err(RuleConfigError::ConflictingOperators { rule });
        }

        let predicate = match (&def.match_field, ops.pop()) {
            (Some(field), Some((_, op))) => Some(FieldPredicate {
                field: field.clone(),
                op,
            }),
            (None, Some((operator, _))) => {
                return Err(RuleConfigError::OperatorWithoutField { rule, operator })
            }
            (Some(field), None) => {
                return Err(RuleConfigError::FieldWithoutOperator {
                    rule,
                    field: field.clone(),
                })
            }
            (None, None) => None,
        };

        if predicate.is_none() && def.match_tag.is_none() {
            return Err(RuleConfigError::NoMatchTarget { rule });
        }

        Ok(Self {
            name: rule,
            match_tags: def.match_tag.clone(),
            predicate,
            schedule: def.schedule.clone(),
            throttle: def.throttle.clone(),
            action: Action {
                pass_through: def.pass_through,
                template: def.template.clone(),
                destinations: def.destinations.clone(),
            },
        })
    }

    /// Evaluate the rule against one event.
    ///
    /// Tag predicate first, then the field predicate. An event field
    /// holding a sequence matches only when **every** element satisfies
    /// the operator. A missing or null field never matches; an operand
    /// that cannot be coerced is a [`MatchError`].
    pub fn matches(
        &self,
        event: &Event,
        resolver: &VariableResolver,
    ) -> Result<bool, MatchError> {
        if let Some(wanted) = &self.match_tags {
            let Some(tags) = event.tags() else {
                return Ok(false);
            };
            if tags.is_empty() {
                return Ok(false);
            }
            let wildcard = wanted.iter().any(|t| t == TAG_WILDCARD);
            if !wildcard && !tags.iter().any(|tag| wanted.iter().any(|w| w == tag)) {
                return Ok(false);
            }
        }

        let Some(predicate) = &self.predicate else {
            return Ok(true);
        };
        let Some(value) = event.field(&predicate.field) else {
            debug!(rule = %self.name, field = %predicate.field, "field absent, no match");
            return Ok(false);
        };
        if value.is_null() {
            return Ok(false);
        }

        match value {
            Value::Array(items) => {
                for item in items {
                    if !self.op_matches(item, predicate, event, resolver)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            single => self.op_matches(single, predicate, event, resolver),
        }
    }

    fn op_matches(
        &self,
        value: &Value,
        predicate: &FieldPredicate,
        event: &Event,
        resolver: &VariableResolver,
    ) -> Result<bool, MatchError> {
        let field = &predicate.field;
        match &predicate.op {
            MatchOp::Equals(want) => Ok(value.loose_eq(want)),
            MatchOp::In(list) => Ok(list.iter().any(|want| value.loose_eq(want))),
            MatchOp::NotIn(list) => Ok(!list.iter().any(|want| value.loose_eq(want))),
            MatchOp::Lt(want) => Ok(self.order(value, want, field)? == Ordering::Less),
            MatchOp::Lte(want) => Ok(self.order(value, want, field)? != Ordering::Greater),
            MatchOp::Gt(want) => Ok(self.order(value, want, field)? == Ordering::Greater),
            MatchOp::Gte(want) => Ok(self.order(value, want, field)? != Ordering::Less),
            MatchOp::Contains(want) => Ok(value.contains(want)),
            MatchOp::DateLt { format, threshold } => {
                let stamp = parse_date(field, value, format)?;
                Ok(stamp < resolve_threshold(resolver, event, threshold)?)
            }
            MatchOp::DateGt { format, threshold } => {
                let stamp = parse_date(field, value, format)?;
                Ok(stamp > resolve_threshold(resolver, event, threshold)?)
            }
        }
    }

    fn order(
        &self,
        value: &Value,
        want: &Value,
        field: &str,
    ) -> Result<Ordering, MatchError> {
        value.compare(want).map_err(|source| MatchError::Coercion {
            field: field.to_string(),
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the schedule gating this rule, if any.
    pub fn schedule(&self) -> Option<&str> {
        self.schedule.as_deref()
    }

    /// Name of the throttle limiting this rule's actions, if any.
    pub fn throttle(&self) -> Option<&str> {
        self.throttle.as_deref()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn predicate(&self) -> Option<&FieldPredicate> {
        self.predicate.as_ref()
    }
}

/// Parse an event field as a date, in epoch milliseconds (UTC assumed).
///
/// Date-only formats imply midnight.
fn parse_date(field: &str, value: &Value, format: &str) -> Result<i64, MatchError> {
    let text = value.to_string();
    if let Ok(stamp) = NaiveDateTime::parse_from_str(&text, format) {
        return Ok(stamp.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
        if let Some(stamp) = date.and_hms_opt(0, 0, 0) {
            return Ok(stamp.and_utc().timestamp_millis());
        }
    }
    Err(MatchError::DateParse {
        field: field.to_string(),
        value: text,
        format: format.to_string(),
    })
}

/// Resolve a date threshold expression to epoch milliseconds.
fn resolve_threshold(
    resolver: &VariableResolver,
    event: &Event,
    threshold: &str,
) -> Result<i64, MatchError> {
    resolver
        .resolve(threshold, Some(event))
        .coerce_number()
        .map(|n| n as i64)
        .map_err(|_| MatchError::Threshold(threshold.to_string()))
}
