//! Request/response envelope for the room service.
//!
//! One [`Request`] variant per logical operation, one [`Response`] variant
//! per kind of answer. The transport that carries them (HTTP, WebSocket,
//! in-process) is the caller's concern.

use serde::{Deserialize, Serialize};

use crate::{MatchResult, MatchSettings, MatchView, RoomId, RoomView};

/// An operation a caller asks the service to perform.
///
/// Internally tagged on `"op"`:
/// `{ "op": "handleAnswer", "roomId": 1, "player": "alice", "answer": 12 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    CreateRoom {
        #[serde(default)]
        host: Option<String>,
    },
    GetRoom {
        room_id: RoomId,
    },
    GetRooms,
    DeleteRoom {
        room_id: RoomId,
    },
    AddPlayer {
        room_id: RoomId,
        player: String,
    },
    RemovePlayer {
        room_id: RoomId,
        player: String,
    },
    UpdateSettings {
        room_id: RoomId,
        settings: MatchSettings,
    },
    /// Starts a match, optionally replacing the pending settings first.
    StartMatch {
        room_id: RoomId,
        #[serde(default)]
        settings: Option<MatchSettings>,
    },
    EndMatch {
        room_id: RoomId,
    },
    GetMatch {
        room_id: RoomId,
    },
    HandleAnswer {
        room_id: RoomId,
        player: String,
        answer: i64,
    },
}

/// Error categories reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Unknown room or player.
    NotFound,
    /// Duplicate player name, or a match is already running.
    Conflict,
    /// The room is in the wrong state for this operation.
    InvalidState,
    /// Malformed settings.
    Validation,
    /// The room's task is gone.
    Unavailable,
    /// The request bytes could not be decoded.
    Malformed,
}

/// The service's answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    RoomCreated {
        room_id: RoomId,
    },
    Room {
        room: RoomView,
    },
    Rooms {
        rooms: Vec<RoomView>,
    },
    Match {
        #[serde(rename = "match")]
        view: MatchView,
    },
    MatchEnded {
        result: MatchResult,
    },
    PlayerAdded {
        added: bool,
    },
    Answer {
        correct: bool,
    },
    /// Success with nothing further to report.
    Ok,
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tags_and_field_names() {
        let req = Request::StartMatch {
            room_id: RoomId(2),
            settings: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["op"], "startMatch");
        assert_eq!(value["roomId"], 2);
    }

    #[test]
    fn test_create_room_host_is_optional() {
        let req: Request = serde_json::from_str(r#"{"op":"createRoom"}"#).unwrap();
        assert_eq!(req, Request::CreateRoom { host: None });
    }

    #[test]
    fn test_error_response_shape() {
        let resp = Response::error(ErrorKind::NotFound, "room R-9 not found");
        assert!(resp.is_error());
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["kind"], "notFound");
        assert_eq!(value["message"], "room R-9 not found");
    }

    #[test]
    fn test_answer_response_shape() {
        let value = serde_json::to_value(Response::Answer { correct: true }).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "answer", "correct": true }));
    }
}
