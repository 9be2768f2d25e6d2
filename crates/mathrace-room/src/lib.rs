//! Room lifecycle and timed match engine for Mathrace.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! roster, pending settings, and current or last match. Every mutation on
//! a room, including the timer that ends its match, goes through that
//! task's command channel, so rooms run in parallel while each room's
//! transitions are strictly ordered.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates/destroys rooms, routes operations by id
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Room`]: the room state machine the actor drives
//! - [`Match`]: one timed round with a frozen roster and settings
//! - [`generator`] / [`scoring`]: pure problem generation and results
//! - [`RegistryConfig`]: registry settings (channel size, seeding, etc.)

mod config;
mod error;
mod game;
pub mod generator;
mod lobby;
mod manager;
mod room;
pub mod scoring;

pub use config::RegistryConfig;
pub use error::RoomError;
pub use game::Match;
pub use generator::ProblemError;
pub use lobby::Room;
pub use manager::RoomRegistry;
pub use room::{RemoveOutcome, RoomHandle};

pub use mathrace_protocol::RoomState;
