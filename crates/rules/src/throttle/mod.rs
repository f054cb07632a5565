//! Stateful, persistable rate limiting.
//!
//! A [`Throttle`] is an explicit state machine with a single mutation
//! entry point, [`try_acquire`](Throttle::try_acquire), and a
//! [`snapshot`](Throttle::snapshot)/[`restore`](Throttle::restore) pair
//! for persistence. The [`ThrottleRegistry`] owns per-identity locking
//! and the durable-map round trip; when the store is unreachable the
//! registry keeps limiting in memory and logs the degradation.


use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use vigil_core::{Event, StateStore, StoreError};

use crate::schema::ThrottleConfig;

/// A throttle idles out after this many configured intervals without a
/// granted emission.
const EXPIRY_INTERVALS: i64 = 3;

/// Rolling-window rate limiter for one resolved identity.
///
/// Wall-clock time is divided into interval-sized slots; each slot
/// admits at most `rate` grants and crossing into a new slot resets the
/// counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttle {
    id: String,
    rate: u32,
    interval_ms: i64,
    window: i64,
    granted: u32,
    last_granted: i64,
}

/// Persistable snapshot of a throttle's window accounting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThrottleState {
    pub window: i64,
    pub granted: u32,
    pub last_granted: i64,
}

impl Throttle {
    /// Fresh throttle for `id` with no grants on record.
    pub fn new(id: impl Into<String>, config: &ThrottleConfig, now: DateTime<Utc>) -> Self {
        let interval_ms = (config.window().as_millis() as i64).max(1);
        let now_ms = now.timestamp_millis();
        Self {
            id: id.into(),
            rate: config.rate,
            interval_ms,
            window: now_ms.div_euclid(interval_ms),
            granted: 0,
            last_granted: now_ms,
        }
    }

    /// Rebuild a throttle from persisted state.
    ///
    /// The result makes the same accept/reject decisions the serialized
    /// instance would have made.
    pub fn restore(
        id: impl Into<String>,
        config: &ThrottleConfig,
        state: ThrottleState,
    ) -> Self {
        let interval_ms = (config.window().as_millis() as i64).max(1);
        Self {
            id: id.into(),
            rate: config.rate,
            interval_ms,
            window: state.window,
            granted: state.granted,
            last_granted: state.last_granted,
        }
    }

    /// Reserve one emission if the current window has allowance left.
    pub fn try_acquire(&mut self, now: DateTime<Utc>) -> bool {
        let now_ms = now.timestamp_millis();
        let slot = now_ms.div_euclid(self.interval_ms);
        if slot != self.window {
            self.window = slot;
            self.granted = 0;
        }
        if self.granted < self.rate {
            self.granted += 1;
            self.last_granted = now_ms;
            true
        } else {
            debug!(throttle = %self.id, rate = self.rate, "emission suppressed");
            false
        }
    }

    /// Whether the throttle has been idle for more than three intervals.
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.last_granted > EXPIRY_INTERVALS * self.interval_ms
    }

    /// Normalized state for persistence.
    ///
    /// A window the clock has already left is pruned to an empty counter
    /// so stale bookkeeping never hits the store.
    pub fn snapshot(&self, now: DateTime<Utc>) -> ThrottleState {
        let slot = now.timestamp_millis().div_euclid(self.interval_ms);
        if slot != self.window {
            ThrottleState {
                window: slot,
                granted: 0,
                last_granted: self.last_granted,
            }
        } else {
            ThrottleState {
                window: self.window,
                granted: self.granted,
                last_granted: self.last_granted,
            }
        }
    }

    /// The identity a throttle config resolves to for an event.
    ///
    /// With `checksum-field` configured and present on the event, the
    /// base name is extended with a hash of the field's stringified
    /// value, giving every distinct value its own allowance.
    pub fn resolve_id(config: &ThrottleConfig, event: Option<&Event>) -> String {
        if let Some(field) = &config.checksum_field {
            if let Some(value) = event.and_then(|e| e.field(field)) {
                let digest = Sha256::digest(value.to_string().as_bytes());
                let hex = format!("{digest:x}");
                return format!("{}.{}", config.name, &hex[..16]);
            }
        }
        config.name.clone()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }
}

/// Per-identity throttle instances with optional durable persistence.
///
/// Multiple pipeline stages may hit the same identity concurrently; each
/// identity's state is an independently locked unit, so grants can never
/// exceed `rate` within a window no matter how many callers race.
pub struct ThrottleRegistry {
    store: Option<Arc<dyn StateStore>>,
    active: Mutex<HashMap<String, Arc<Mutex<Throttle>>>>,
}

impl ThrottleRegistry {
    /// Registry without persistence: purely in-memory limiting.
    pub fn new() -> Self {
        Self {
            store: None,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Registry backed by a durable map.
    pub fn with_store(store: Arc<dyn StateStore>) -> Self {
        Self {
            store: Some(store),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the event's identity and try to reserve one emission.
    ///
    /// Grants are persisted through the store when one is configured; a
    /// store failure downgrades durability, never the decision.
    pub fn allow_emit(
        &self,
        config: &ThrottleConfig,
        event: Option<&Event>,
        now: DateTime<Utc>,
    ) -> bool {
        let id = Throttle::resolve_id(config, event);
        let entry = self.entry(id, config, now);
        let mut throttle = entry.lock().expect("throttle lock poisoned");
        let granted = throttle.try_acquire(now);
        if granted {
            if let Err(e) = self.persist(throttle.id(), &throttle.snapshot(now)) {
                warn!(
                    throttle = %throttle.id(),
                    error = %e,
                    "throttle state not persisted, continuing in memory"
                );
            }
        }
        granted
    }

    /// Drop identities that have been idle for more than three intervals.
    ///
    /// Returns how many were removed. Store removals are best-effort.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut active = self.active.lock().expect("registry lock poisoned");
        let expired: Vec<String> = active
            .iter()
            .filter(|(_, entry)| {
                entry
                    .lock()
                    .expect("throttle lock poisoned")
                    .has_expired(now)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            active.remove(id);
            if let Some(store) = &self.store {
                if let Err(e) = store.remove(id).and_then(|_| store.commit()) {
                    warn!(throttle = %id, error = %e, "failed to remove expired state");
                }
            }
            debug!(throttle = %id, "expired throttle removed");
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.active.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch or create the locked state for one identity.
    ///
    /// First touch loads persisted state when a store is configured; an
    /// unreachable store degrades to a fresh in-memory throttle.
    fn entry(
        &self,
        id: String,
        config: &ThrottleConfig,
        now: DateTime<Utc>,
    ) -> Arc<Mutex<Throttle>> {
        let mut active = self.active.lock().expect("registry lock poisoned");
        if let Some(existing) = active.get(&id) {
            return Arc::clone(existing);
        }

        let throttle = match self.load(&id) {
            Ok(Some(state)) => Throttle::restore(id.clone(), config, state),
            Ok(None) => Throttle::new(id.clone(), config, now),
            Err(e) => {
                warn!(throttle = %id, error = %e, "store unreachable, starting fresh in memory");
                Throttle::new(id.clone(), config, now)
            }
        };

        let entry = Arc::new(Mutex::new(throttle));
        active.insert(id, Arc::clone(&entry));
        entry
    }

    fn load(&self, id: &str) -> Result<Option<ThrottleState>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        match store.get(id)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StoreError::Serialize(e.to_string())),
            None => Ok(None),
        }
    }

    fn persist(&self, id: &str, state: &ThrottleState) -> Result<(), StoreError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let json =
            serde_json::to_string(state).map_err(|e| StoreError::Serialize(e.to_string()))?;
        store.put(id, &json)?;
        store.commit()
    }
}

impl Default for ThrottleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
