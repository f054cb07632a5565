//! Cron-style temporal predicates with IANA timezone support.
//!
//! A [`CronEntry`] is parsed once from a textual line at configuration
//! load time and is immutable afterwards; reloading configuration builds
//! fresh entries. Matching is at minute resolution: [`CronEntry::is_due`]
//! converts the instant to the entry's timezone and checks every field.
//!
//! The field grammar is parsed in-repo rather than through a cron crate:
//! the trailing timezone token, name atoms with 3-letter prefixes, and
//! the exact error taxonomy below are part of the configuration contract.

mod field;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

pub use field::FieldSet;

use field::{DAYS_OF_MONTH, DAYS_OF_WEEK, HOURS, MINUTES, MONTHS};

/// Malformed cron text. Fatal at configuration load; rejects the whole
/// schedule set.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleParseError {
    /// The expression was empty or whitespace-only.
    #[error("empty schedule expression")]
    Empty,

    /// Wrong number of whitespace-separated fields.
    #[error("expected 5 or 6 whitespace-separated fields, got {0}")]
    FieldCount(usize),

    /// An atom that is neither `*`, an integer, a known name, a range,
    /// nor a step expression.
    #[error("invalid {field} atom '{atom}'")]
    InvalidAtom { field: &'static str, atom: String },

    /// A numeric atom outside the field's valid range.
    #[error("{field} value {value} out of range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// A zero, oversized, or non-numeric step divisor.
    #[error("invalid step '{step}' in {field} field")]
    InvalidStep { field: &'static str, step: String },

    /// The trailing timezone token is not a known IANA zone id.
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
}

/// An immutable cron-like schedule: five field sets plus a timezone.
///
/// Line format: `minute hour day-of-month month day-of-week [timezone]`,
/// fields space/tab separated. Each of the first five fields is a
/// comma-separated list of atoms: `*`, a single integer, a range `a-b`,
/// or a step `*/n` / `a-b/n`. Month and day-of-week atoms also accept
/// case-insensitive English names (3-letter prefixes included);
/// day-of-week `0` and `7` both mean Sunday and are stored as `7`.
/// The timezone defaults to `UTC` when the sixth token is omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct CronEntry {
    minutes: FieldSet,
    hours: FieldSet,
    days_of_month: FieldSet,
    months: FieldSet,
    days_of_week: FieldSet,
    timezone: Tz,
}

impl CronEntry {
    /// Parse a cron line.
    pub fn parse(line: &str) -> Result<Self, ScheduleParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(ScheduleParseError::Empty);
        }
        if tokens.len() != 5 && tokens.len() != 6 {
            return Err(ScheduleParseError::FieldCount(tokens.len()));
        }

        let timezone = match tokens.get(5) {
            Some(tz) => tz
                .parse::<Tz>()
                .map_err(|_| ScheduleParseError::UnknownTimezone(tz.to_string()))?,
            None => Tz::UTC,
        };

        Ok(Self {
            minutes: field::parse(&MINUTES, tokens[0])?,
            hours: field::parse(&HOURS, tokens[1])?,
            days_of_month: field::parse(&DAYS_OF_MONTH, tokens[2])?,
            months: field::parse(&MONTHS, tokens[3])?,
            days_of_week: field::parse(&DAYS_OF_WEEK, tokens[4])?,
            timezone,
        })
    }

    /// Whether the schedule matches `instant`, at minute resolution.
    ///
    /// The instant is converted to the entry's timezone first; the entry
    /// matches when every field is `Any` or contains the corresponding
    /// calendar component.
    pub fn is_due(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.timezone);
        self.minutes.contains(local.minute())
            && self.hours.contains(local.hour())
            && self.days_of_month.contains(local.day())
            && self.months.contains(local.month())
            && self.days_of_week.contains(local.weekday().number_from_monday())
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn minutes(&self) -> &FieldSet {
        &self.minutes
    }

    pub fn hours(&self) -> &FieldSet {
        &self.hours
    }

    pub fn days_of_month(&self) -> &FieldSet {
        &self.days_of_month
    }

    pub fn months(&self) -> &FieldSet {
        &self.months
    }

    /// Day-of-week set with Monday=1 .. Sunday=7.
    pub fn days_of_week(&self) -> &FieldSet {
        &self.days_of_week
    }
}

impl std::str::FromStr for CronEntry {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
