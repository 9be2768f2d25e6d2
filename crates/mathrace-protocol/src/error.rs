//! Error types for the protocol layer.
//!
//! Each crate in Mathrace defines its own error enum. A `ProtocolError`
//! means the problem is in serialization/deserialization; a
//! `SettingsError` means a [`MatchSettings`](crate::MatchSettings) value
//! is malformed and must not reach a room.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, unknown `op` tag, missing fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Reasons a [`MatchSettings`](crate::MatchSettings) value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The allowed operation set is empty, so no problem can be drawn.
    #[error("operation set is empty")]
    NoOperations,

    /// A range has `min > max`.
    #[error("{family} bounds are inverted: ({min}, {max})")]
    InvertedBounds {
        family: &'static str,
        min: i64,
        max: i64,
    },

    /// Division is enabled but the divisor range is exactly `[0, 0]`.
    #[error("division enabled but the divisor range contains only zero")]
    NoDivisor,

    /// Some operand pair inside the bounds has a result outside `i64`.
    #[error("bounds for {operation} can produce a result that overflows 64 bits")]
    Overflow { operation: crate::Operation },

    /// Matches must last at least one second.
    #[error("duration must be a positive number of seconds")]
    ZeroDuration,
}
