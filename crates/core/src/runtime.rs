//! Read-only capability for live runtime values (metrics and sensors).
//!
//! The variable resolver consults this at resolution time, so `#metric.*`
//! and `#sensor.*` placeholders reflect current values rather than a
//! snapshot. The core performs no locking beyond the handle itself; the
//! embedding process owns synchronization of its collectors.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::value::Value;

/// Live lookup of named runtime values.
pub trait RuntimeValues: Send + Sync {
    /// Current value of a named metric, if published.
    fn metric(&self, name: &str) -> Option<Value>;

    /// Current reading of a named sensor, if published.
    fn sensor(&self, name: &str) -> Option<Value>;
}

/// RwLock-backed [`RuntimeValues`] the embedding process updates from its
/// collectors.
#[derive(Debug, Default)]
pub struct SharedValues {
    metrics: RwLock<HashMap<String, Value>>,
    sensors: RwLock<HashMap<String, Value>>,
}

impl SharedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish or replace a metric value.
    pub fn set_metric(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.metrics
            .write()
            .expect("metrics lock poisoned")
            .insert(name.into(), value.into());
    }

    /// Publish or replace a sensor reading.
    pub fn set_sensor(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.sensors
            .write()
            .expect("sensors lock poisoned")
            .insert(name.into(), value.into());
    }
}

impl RuntimeValues for SharedValues {
    fn metric(&self, name: &str) -> Option<Value> {
        self.metrics
            .read()
            .expect("metrics lock poisoned")
            .get(name)
            .cloned()
    }

    fn sensor(&self, name: &str) -> Option<Value> {
        self.sensors
            .read()
            .expect("sensors lock poisoned")
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_reflects_latest_value() {
        let shared = SharedValues::new();
        assert_eq!(shared.metric("load-avg"), None);

        shared.set_metric("load-avg", 0.42);
        assert_eq!(shared.metric("load-avg"), Some(Value::from(0.42)));

        shared.set_metric("load-avg", 1.9);
        assert_eq!(shared.metric("load-avg"), Some(Value::from(1.9)));
    }

    #[test]
    fn metrics_and_sensors_are_separate_namespaces() {
        let shared = SharedValues::new();
        shared.set_metric("temp", 50.0);
        assert_eq!(shared.sensor("temp"), None);
        shared.set_sensor("temp", 21.5);
        assert_eq!(shared.sensor("temp"), Some(Value::from(21.5)));
        assert_eq!(shared.metric("temp"), Some(Value::from(50.0)));
    }
}
