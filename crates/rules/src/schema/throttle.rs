//! Throttle definition record.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A throttle as written in configuration.
///
/// Allows at most `rate` emissions per `interval × unit` window. With
/// `checksum-field` set, each distinct value of that event field gets an
/// independent window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    pub name: String,

    /// Maximum emissions per window.
    pub rate: u32,

    /// Window length, in units of [`unit`](Self::unit).
    pub interval: u32,

    #[serde(default)]
    pub unit: IntervalUnit,

    /// Event field whose value partitions the throttle.
    #[serde(default, rename = "checksum-field")]
    pub checksum_field: Option<String>,
}

impl ThrottleConfig {
    /// The configured window as a [`Duration`].
    pub fn window(&self) -> Duration {
        self.unit.duration(self.interval)
    }
}

/// Time unit for throttle intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Seconds,
    #[default]
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    pub fn duration(self, count: u32) -> Duration {
        let secs = match self {
            IntervalUnit::Seconds => 1,
            IntervalUnit::Minutes => 60,
            IntervalUnit::Hours => 3_600,
            IntervalUnit::Days => 86_400,
        };
        Duration::from_secs(u64::from(count) * secs)
    }
}
