//! Room registry: allocates ids, tracks live rooms, routes operations.
//!
//! The registry's lock guards only the id → handle table. Routing an
//! operation clones the handle out under a short read lock and then talks
//! to the room actor with no registry lock held, so a slow room never
//! blocks work on any other room.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use mathrace_protocol::{MatchResult, MatchSettings, MatchView, RoomId, RoomSummary, RoomView};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::RwLock;

use crate::room::spawn_room;
use crate::{RegistryConfig, RemoveOutcome, Room, RoomError, RoomHandle};

/// Owns every live room.
///
/// Shared across tasks behind an `Arc`; every method takes `&self`.
pub struct RoomRegistry {
    /// Active rooms, keyed by room ID.
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,

    /// Next id to hand out. Ids are never reused while the registry lives.
    next_id: AtomicU64,

    config: RegistryConfig,
}

impl RoomRegistry {
    /// Creates an empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn room_rng(&self, room_id: RoomId) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ room_id.0),
            None => StdRng::from_os_rng(),
        }
    }

    /// Creates a new room and returns its ID.
    ///
    /// With a host name, the room starts with that player as its host.
    pub async fn create(&self, host: Option<String>) -> RoomId {
        let room_id = RoomId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let settings = self.config.default_settings.clone();
        let rng = self.room_rng(room_id);
        let room = match host {
            Some(name) => Room::with_host(room_id, name, settings, rng),
            None => Room::new(room_id, settings, rng),
        };
        let host = room.host().map(str::to_owned);

        let handle = spawn_room(room, self.config.reap_empty_rooms, self.config.channel_size);
        self.rooms.write().await.insert(room_id, handle);
        tracing::info!(%room_id, host = ?host, "room created");
        room_id
    }

    /// Returns a handle to a room.
    pub async fn handle(&self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .cloned()
            .ok_or(RoomError::NotFound(room_id))
    }

    /// Drops a table entry whose actor has died, so later calls report
    /// `NotFound` instead of `Unavailable`.
    async fn forget_if_dead(&self, room_id: RoomId, err: &RoomError) {
        if !matches!(err, RoomError::Unavailable(_)) {
            return;
        }
        let mut rooms = self.rooms.write().await;
        if rooms.get(&room_id).is_some_and(RoomHandle::is_closed) {
            rooms.remove(&room_id);
            tracing::warn!(%room_id, "room task gone, removed from registry");
        }
    }

    /// Routes a result through [`Self::forget_if_dead`].
    async fn checked<T>(
        &self,
        room_id: RoomId,
        result: Result<T, RoomError>,
    ) -> Result<T, RoomError> {
        if let Err(e) = &result {
            self.forget_if_dead(room_id, e).await;
        }
        result
    }

    pub async fn get(&self, room_id: RoomId) -> Result<RoomView, RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.view().await;
        self.checked(room_id, result).await
    }

    /// Shuts down a room and removes it. Its match timer goes with it.
    pub async fn delete(&self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        // The actor may already be gone (panicked); the entry is removed
        // either way.
        let _ = handle.shutdown().await;

        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    fn snapshot_handles(rooms: &HashMap<RoomId, RoomHandle>) -> Vec<RoomHandle> {
        let mut handles: Vec<RoomHandle> = rooms.values().cloned().collect();
        handles.sort_by_key(RoomHandle::room_id);
        handles
    }

    /// Summaries of every live room, ordered by id.
    ///
    /// Rooms that fail to respond (e.g., shutting down) are skipped.
    pub async fn list(&self) -> Vec<RoomSummary> {
        let handles = Self::snapshot_handles(&*self.rooms.read().await);
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(summary) = handle.summary().await {
                summaries.push(summary);
            }
        }
        summaries
    }

    /// Full views of every live room, ordered by id.
    pub async fn views(&self) -> Vec<RoomView> {
        let handles = Self::snapshot_handles(&*self.rooms.read().await);
        let mut views = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(view) = handle.view().await {
                views.push(view);
            }
        }
        views
    }

    pub async fn add_player(&self, room_id: RoomId, name: &str) -> Result<(), RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.add_player(name).await;
        self.checked(room_id, result).await
    }

    /// Removes a player. With `reap_empty_rooms`, removing the last player
    /// also deletes the room.
    pub async fn remove_player(
        &self,
        room_id: RoomId,
        name: &str,
    ) -> Result<RemoveOutcome, RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.remove_player(name).await;
        let outcome = self.checked(room_id, result).await?;
        if outcome == RemoveOutcome::Closed {
            self.rooms.write().await.remove(&room_id);
            tracing::info!(%room_id, "empty room reaped");
        }
        Ok(outcome)
    }

    pub async fn update_settings(
        &self,
        room_id: RoomId,
        settings: MatchSettings,
    ) -> Result<(), RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.update_settings(settings).await;
        self.checked(room_id, result).await
    }

    pub async fn start_match(
        &self,
        room_id: RoomId,
        settings: Option<MatchSettings>,
    ) -> Result<MatchView, RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.start_match(settings).await;
        self.checked(room_id, result).await
    }

    pub async fn end_match(&self, room_id: RoomId) -> Result<MatchResult, RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.end_match().await;
        self.checked(room_id, result).await
    }

    pub async fn get_match(&self, room_id: RoomId) -> Result<MatchView, RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.get_match().await;
        self.checked(room_id, result).await
    }

    pub async fn submit_answer(
        &self,
        room_id: RoomId,
        player: &str,
        value: i64,
    ) -> Result<bool, RoomError> {
        let handle = self.handle(room_id).await?;
        let result = handle.submit_answer(player, value).await;
        self.checked(room_id, result).await
    }

    /// Returns the number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Lists all live room IDs, ascending.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
