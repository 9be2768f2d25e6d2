//! # Mathrace
//!
//! Room and match service for a multiplayer arithmetic race.
//!
//! Players gather in rooms; a room starts a timed match in which every
//! participant races to answer randomly generated arithmetic problems.
//! Many rooms run in parallel, each one strictly ordering its own
//! mutations, and a match ends when its timer fires or someone ends it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mathrace::prelude::*;
//!
//! # async fn demo() -> Result<(), MathraceError> {
//! let service = MathraceService::builder().rng_seed(7).build();
//!
//! let response = service
//!     .execute(Request::CreateRoom { host: Some("alice".into()) })
//!     .await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod error;
mod service;
pub mod telemetry;

pub use error::MathraceError;
pub use service::{MathraceService, MathraceServiceBuilder};

pub use mathrace_protocol as protocol;
pub use mathrace_room as room;

/// Everything a caller usually needs in one import.
pub mod prelude {
    pub use crate::{MathraceError, MathraceService, MathraceServiceBuilder};
    pub use mathrace_protocol::{
        Codec, ErrorKind, JsonCodec, MatchResult, MatchSettings, MatchView, OpBounds, Operation,
        Player, Problem, Request, Response, RoomId, RoomState, RoomSummary, RoomView,
    };
    pub use mathrace_room::{RegistryConfig, RoomError, RoomRegistry};
}
