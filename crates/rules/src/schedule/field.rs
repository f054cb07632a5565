//! Per-field atom parsing for [`CronEntry`](super::CronEntry).

use std::collections::BTreeSet;

use super::ScheduleParseError;

/// One parsed cron field: the wildcard marker or a sorted set of unique
/// values within the field's valid range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSet {
    Any,
    Set(Vec<u32>),
}

impl FieldSet {
    pub fn contains(&self, value: u32) -> bool {
        match self {
            FieldSet::Any => true,
            FieldSet::Set(values) => values.binary_search(&value).is_ok(),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, FieldSet::Any)
    }
}

/// Static description of one cron field position.
pub(super) struct Spec {
    pub name: &'static str,
    pub min: u32,
    pub max: u32,
    /// English names accepted as atoms, paired with their values.
    pub names: &'static [(&'static str, u32)],
    /// Day-of-week quirk: `0` is accepted on input as an alias for `max`.
    pub zero_aliases_max: bool,
}

pub(super) const MINUTES: Spec = Spec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
    zero_aliases_max: false,
};

pub(super) const HOURS: Spec = Spec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
    zero_aliases_max: false,
};

pub(super) const DAYS_OF_MONTH: Spec = Spec {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
    zero_aliases_max: false,
};

pub(super) const MONTHS: Spec = Spec {
    name: "month",
    min: 1,
    max: 12,
    names: &[
        ("JANUARY", 1),
        ("FEBRUARY", 2),
        ("MARCH", 3),
        ("APRIL", 4),
        ("MAY", 5),
        ("JUNE", 6),
        ("JULY", 7),
        ("AUGUST", 8),
        ("SEPTEMBER", 9),
        ("OCTOBER", 10),
        ("NOVEMBER", 11),
        ("DECEMBER", 12),
    ],
    zero_aliases_max: false,
};

/// Canonical day numbering is Monday=1 .. Sunday=7; `0` also means Sunday.
pub(super) const DAYS_OF_WEEK: Spec = Spec {
    name: "day-of-week",
    min: 1,
    max: 7,
    names: &[
        ("MONDAY", 1),
        ("TUESDAY", 2),
        ("WEDNESDAY", 3),
        ("THURSDAY", 4),
        ("FRIDAY", 5),
        ("SATURDAY", 6),
        ("SUNDAY", 7),
    ],
    zero_aliases_max: true,
};

impl Spec {
    /// Map a raw parsed value to its stored form (`0` → Sunday).
    fn canonical(&self, raw: u32) -> u32 {
        if self.zero_aliases_max && raw == 0 {
            self.max
        } else {
            raw
        }
    }

    /// Lowest raw value accepted on input.
    fn input_min(&self) -> u32 {
        if self.zero_aliases_max {
            0
        } else {
            self.min
        }
    }
}

/// Parse one component: an integer within range, or a known name.
///
/// Names match case-insensitively on the full word or any prefix of at
/// least three letters. Returns the raw (pre-canonicalization) value.
fn parse_component(spec: &Spec, token: &str) -> Result<u32, ScheduleParseError> {
    if token.chars().all(|c| c.is_ascii_digit()) && !token.is_empty() {
        let value: u32 = token
            .parse()
            .map_err(|_| ScheduleParseError::InvalidAtom {
                field: spec.name,
                atom: token.to_string(),
            })?;
        if value < spec.input_min() || value > spec.max {
            return Err(ScheduleParseError::OutOfRange {
                field: spec.name,
                value,
                min: spec.min,
                max: spec.max,
            });
        }
        return Ok(value);
    }

    let upper = token.to_ascii_uppercase();
    if upper.len() >= 3 {
        for (name, value) in spec.names {
            if *name == upper || name.starts_with(&upper) {
                return Ok(*value);
            }
        }
    }

    Err(ScheduleParseError::InvalidAtom {
        field: spec.name,
        atom: token.to_string(),
    })
}

/// Parse a full field: comma-separated atoms unioned into a sorted set.
///
/// A bare `*` atom, or an explicit set covering the whole range, yields
/// [`FieldSet::Any`].
pub(super) fn parse(spec: &Spec, text: &str) -> Result<FieldSet, ScheduleParseError> {
    let mut values: BTreeSet<u32> = BTreeSet::new();

    for atom in text.split(',') {
        if atom.is_empty() {
            return Err(ScheduleParseError::InvalidAtom {
                field: spec.name,
                atom: text.to_string(),
            });
        }

        let (expr, step) = match atom.split_once('/') {
            Some((expr, step_text)) => {
                let step: u32 = step_text.parse().unwrap_or(0);
                if step == 0 || step > spec.max {
                    return Err(ScheduleParseError::InvalidStep {
                        field: spec.name,
                        step: step_text.to_string(),
                    });
                }
                (expr, Some(step))
            }
            None => (atom, None),
        };

        if expr == "*" {
            match step {
                // A bare wildcard swallows every other atom.
                None => return Ok(FieldSet::Any),
                Some(n) => {
                    let mut v = spec.min;
                    while v <= spec.max {
                        values.insert(spec.canonical(v));
                        v += n;
                    }
                }
            }
        } else if let Some((lo, hi)) = expr.split_once('-') {
            let a = parse_component(spec, lo)?;
            let b = parse_component(spec, hi)?;
            if a > b {
                return Err(ScheduleParseError::InvalidAtom {
                    field: spec.name,
                    atom: atom.to_string(),
                });
            }
            let n = step.unwrap_or(1);
            let mut v = a;
            while v <= b {
                values.insert(spec.canonical(v));
                v += n;
            }
        } else {
            // Steps apply to `*` or a range, never a single value.
            if step.is_some() {
                return Err(ScheduleParseError::InvalidAtom {
                    field: spec.name,
                    atom: atom.to_string(),
                });
            }
            let v = parse_component(spec, expr)?;
            values.insert(spec.canonical(v));
        }
    }

    let span = spec.max - spec.min + 1;
    if values.len() as u32 == span {
        return Ok(FieldSet::Any);
    }
    Ok(FieldSet::Set(values.into_iter().collect()))
}
