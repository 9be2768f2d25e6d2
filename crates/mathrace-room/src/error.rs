//! Error types for the room layer.

use mathrace_protocol::{ErrorKind, RoomId, SettingsError};

use crate::ProblemError;

/// Errors that can occur during room and match operations.
///
/// Every variant is recoverable: the rejected operation left the room
/// unchanged and the caller may retry once the condition is fixed.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// No player with this name in the roster (or the match).
    #[error("player {0:?} not found")]
    PlayerNotFound(String),

    /// A player with this name is already in the roster.
    #[error("player {0:?} is already in the room")]
    NameConflict(String),

    /// Roster and settings are frozen while a match runs.
    #[error("a match is active; the roster and settings are frozen")]
    MatchActive,

    /// `start_match` while a match is still running.
    #[error("a match is already active")]
    MatchAlreadyActive,

    /// Answering or ending when there is nothing to answer or end.
    #[error("no match is active")]
    MatchNotActive,

    /// The room has never started a match.
    #[error("room {0} has no match")]
    NoMatch(RoomId),

    /// A match needs at least one player.
    #[error("cannot start a match with an empty roster")]
    EmptyRoster,

    /// The participant has no open problem.
    #[error("player {0:?} has no open problem")]
    AnswerAlreadyResolved(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error("problem generation failed: {0}")]
    Problem(#[from] ProblemError),

    /// The room's command channel is closed (room deleted or its task died).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// Maps the error onto the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::PlayerNotFound(_) | Self::NoMatch(_) => ErrorKind::NotFound,
            Self::NameConflict(_) | Self::MatchAlreadyActive => ErrorKind::Conflict,
            Self::MatchActive
            | Self::MatchNotActive
            | Self::EmptyRoster
            | Self::AnswerAlreadyResolved(_) => ErrorKind::InvalidState,
            Self::InvalidSettings(_) | Self::Problem(_) => ErrorKind::Validation,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_taxonomy() {
        assert_eq!(RoomError::NotFound(RoomId(1)).kind(), ErrorKind::NotFound);
        assert_eq!(RoomError::NameConflict("a".into()).kind(), ErrorKind::Conflict);
        assert_eq!(RoomError::MatchAlreadyActive.kind(), ErrorKind::Conflict);
        assert_eq!(RoomError::MatchActive.kind(), ErrorKind::InvalidState);
        assert_eq!(RoomError::MatchNotActive.kind(), ErrorKind::InvalidState);
        assert_eq!(
            RoomError::from(SettingsError::NoOperations).kind(),
            ErrorKind::Validation
        );
        assert_eq!(RoomError::Unavailable(RoomId(1)).kind(), ErrorKind::Unavailable);
    }
}
