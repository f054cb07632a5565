//! Shared building blocks for the vigil decision core.
//!
//! This crate holds the pieces every evaluator agrees on:
//! - [`Value`]: the dynamic value model with String↔Number coercion
//! - [`Event`]: an ordered field record flowing through the pipeline
//! - [`RuntimeValues`]: read-only capability for live metric/sensor lookup
//! - [`StateStore`]: durable string-keyed map contract for persistable state

pub mod error;
pub mod event;
pub mod runtime;
pub mod store;
pub mod value;

pub use error::{CoercionError, StoreError};
pub use event::Event;
pub use runtime::{RuntimeValues, SharedValues};
pub use store::{FileStore, MemoryStore, StateStore};
pub use value::Value;
