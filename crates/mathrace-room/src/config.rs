//! Registry configuration.

use mathrace_protocol::MatchSettings;
use serde::{Deserialize, Serialize};

/// Default command channel size for room actors.
pub(crate) const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Configuration shared by every room a [`RoomRegistry`](crate::RoomRegistry)
/// creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Bound on each room's command channel. Callers wait when it is full.
    pub channel_size: usize,

    /// Delete a room as soon as its last player is removed.
    pub reap_empty_rooms: bool,

    /// Pending settings a freshly created room starts with.
    pub default_settings: MatchSettings,

    /// Seed for problem generation. Each room derives its own stream
    /// from `seed ^ room id`. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            channel_size: DEFAULT_CHANNEL_SIZE,
            reap_empty_rooms: false,
            default_settings: MatchSettings::default(),
            rng_seed: None,
        }
    }
}

impl RegistryConfig {
    /// Clamps values that would make the registry unusable.
    ///
    /// A zero channel size would make `tokio::sync::mpsc::channel` panic,
    /// so it is raised to 1.
    pub fn validated(mut self) -> Self {
        if self.channel_size == 0 {
            tracing::warn!("channel_size 0 is invalid, using 1");
            self.channel_size = 1;
        }
        self
    }
}
