//! Wire protocol and data model for Mathrace.
//!
//! This crate defines the "language" that clients and the match engine
//! speak:
//!
//! - **Model** ([`Problem`], [`Player`], [`MatchSettings`], [`RoomView`],
//!   etc.): the serializable shape of rooms, matches, and players.
//! - **Envelope** ([`Request`], [`Response`]): one variant per logical
//!   operation a caller can perform.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`], [`SettingsError`], [`ErrorKind`]).
//!
//! # Architecture
//!
//! The protocol layer knows nothing about timers, locks, or room actors.
//! It only describes data and how to serialize it.
//!
//! ```text
//! Caller (bytes) → Protocol (Request) → Room engine → Protocol (Response)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod message;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ProtocolError, SettingsError};
pub use message::{ErrorKind, Request, Response};
pub use types::{
    MatchResult, MatchSettings, MatchView, OpBounds, Operation, Player,
    Problem, RoomId, RoomState, RoomSummary, RoomView,
};
