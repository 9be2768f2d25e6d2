//! Unified error type for Mathrace.

use mathrace_protocol::{ErrorKind, ProtocolError};
use mathrace_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MathraceError {
    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, conflict, invalid state, ...).
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl MathraceError {
    /// The caller-facing category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(_) => ErrorKind::Malformed,
            Self::Room(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathrace_protocol::RoomId;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let mathrace_err: MathraceError = err.into();
        assert!(matches!(mathrace_err, MathraceError::Protocol(_)));
        assert_eq!(mathrace_err.kind(), ErrorKind::Malformed);
        assert!(mathrace_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomId(1));
        let mathrace_err: MathraceError = err.into();
        assert!(matches!(mathrace_err, MathraceError::Room(_)));
        assert_eq!(mathrace_err.kind(), ErrorKind::NotFound);
        assert_eq!(mathrace_err.to_string(), "room R-1 not found");
    }
}
