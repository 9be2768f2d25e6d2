//! The room state machine: host, roster, pending settings, match slot.
//!
//! `Room` is plain synchronous state. It is driven by exactly one room
//! actor (see `room.rs`), which is what serializes access to it.

use std::collections::BTreeMap;

use mathrace_protocol::{
    MatchResult, MatchSettings, MatchView, Player, RoomId, RoomState, RoomSummary, RoomView,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::{Match, RoomError};

/// A lobby with at most one current (or last) match.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    host: Option<String>,
    players: BTreeMap<String, Player>,
    settings: MatchSettings,
    current_match: Option<Match>,
    rng: StdRng,
}

impl Room {
    /// Creates an empty room with the given pending settings.
    pub fn new(id: RoomId, settings: MatchSettings, rng: StdRng) -> Self {
        Self {
            id,
            host: None,
            players: BTreeMap::new(),
            settings,
            current_match: None,
            rng,
        }
    }

    /// Creates a room whose only player is its host.
    pub fn with_host(id: RoomId, host: String, settings: MatchSettings, rng: StdRng) -> Self {
        let mut room = Self::new(id, settings, rng);
        room.players.insert(host.clone(), Player::new(host.clone()));
        room.host = Some(host);
        room
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn players(&self) -> &BTreeMap<String, Player> {
        &self.players
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current_match.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_match_active(&self) -> bool {
        self.current_match.as_ref().is_some_and(Match::is_active)
    }

    pub fn state(&self) -> RoomState {
        match &self.current_match {
            None => RoomState::Lobby,
            Some(m) if m.is_active() => RoomState::InMatch,
            Some(_) => RoomState::PostMatch,
        }
    }

    /// Deadline of the active match, if one is running.
    pub fn deadline(&self) -> Option<Instant> {
        self.current_match
            .as_ref()
            .filter(|m| m.is_active())
            .map(Match::deadline)
    }

    fn ensure_editable(&self) -> Result<(), RoomError> {
        if self.is_match_active() {
            return Err(RoomError::MatchActive);
        }
        Ok(())
    }

    pub fn add_player(&mut self, name: &str) -> Result<(), RoomError> {
        self.ensure_editable()?;
        if self.players.contains_key(name) {
            return Err(RoomError::NameConflict(name.to_string()));
        }
        self.players.insert(name.to_string(), Player::new(name));
        Ok(())
    }

    /// Removes a player. A removed host leaves the room without a host.
    pub fn remove_player(&mut self, name: &str) -> Result<(), RoomError> {
        self.ensure_editable()?;
        if self.players.remove(name).is_none() {
            return Err(RoomError::PlayerNotFound(name.to_string()));
        }
        if self.host.as_deref() == Some(name) {
            self.host = None;
        }
        Ok(())
    }

    pub fn update_settings(&mut self, settings: MatchSettings) -> Result<(), RoomError> {
        self.ensure_editable()?;
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Starts a new match, replacing the finished one if any.
    ///
    /// `settings`, when given, become the pending settings, but only if
    /// the match actually starts.
    pub fn start_match(
        &mut self,
        settings: Option<MatchSettings>,
        now: Instant,
    ) -> Result<MatchView, RoomError> {
        if self.is_match_active() {
            return Err(RoomError::MatchAlreadyActive);
        }
        let settings = settings.unwrap_or_else(|| self.settings.clone());
        settings.validate()?;
        if self.players.is_empty() {
            return Err(RoomError::EmptyRoster);
        }

        let rng = StdRng::seed_from_u64(self.rng.random());
        let game = Match::start(self.players.keys().cloned(), settings.clone(), rng, now)?;
        let view = game.view(now);
        self.settings = settings;
        self.current_match = Some(game);
        Ok(view)
    }

    /// Ends the current match. Repeated calls return the same result.
    pub fn end_match(&mut self) -> Result<MatchResult, RoomError> {
        self.current_match
            .as_mut()
            .ok_or(RoomError::MatchNotActive)?
            .terminate()
            .ok_or(RoomError::EmptyRoster)
    }

    /// Ends the active match if its window has closed.
    pub fn expire_if_due(&mut self, now: Instant) -> Option<MatchResult> {
        let game = self.current_match.as_mut()?;
        if game.is_active() && game.is_expired(now) {
            game.terminate()
        } else {
            None
        }
    }

    pub fn submit_answer(&mut self, player: &str, value: i64) -> Result<bool, RoomError> {
        self.current_match
            .as_mut()
            .ok_or(RoomError::MatchNotActive)?
            .answer(player, value)
    }

    pub fn match_view(&self, now: Instant) -> Result<MatchView, RoomError> {
        self.current_match
            .as_ref()
            .map(|m| m.view(now))
            .ok_or(RoomError::NoMatch(self.id))
    }

    pub fn view(&self, now: Instant) -> RoomView {
        RoomView {
            id: self.id,
            host: self
                .host
                .as_ref()
                .and_then(|name| self.players.get(name))
                .cloned(),
            players: self.players.clone(),
            settings: self.settings.clone(),
            current_match: self.current_match.as_ref().map(|m| m.view(now)),
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            host: self.host.clone(),
            player_count: self.players.len(),
            state: self.state(),
        }
    }
}
