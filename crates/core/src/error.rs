use thiserror::Error;

/// Failure to coerce a [`Value`](crate::Value) for a typed comparison.
///
/// Ordering operators require both sides to be numeric after coercion;
/// a value that cannot be coerced is a hard error, never a silent `false`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoercionError {
    /// The value's kind has no numeric interpretation (bool, array, object, null).
    #[error("{kind} value has no numeric interpretation")]
    NotNumeric { kind: &'static str },

    /// A string value that does not parse as a number.
    #[error("cannot parse '{0}' as a number")]
    Unparsable(String),

    /// Both sides coerced but the result is unordered (NaN).
    #[error("comparison result is unordered")]
    Unordered,
}

/// Errors from the durable [`StateStore`](crate::StateStore) contract.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// The backing store is not reachable.
    ///
    /// Callers keep their in-memory state and retry persistence later;
    /// rate-limiting correctness within the process is unaffected.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
