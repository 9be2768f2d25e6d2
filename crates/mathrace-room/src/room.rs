//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task and is reached only through an mpsc
//! channel. That channel is the room's serialization boundary: roster
//! edits, settings updates, match start/end, answers, and the match timer
//! are all handled one at a time by the same loop, so two answers that
//! arrive "simultaneously" are applied one after the other and never lose
//! an update.

use mathrace_protocol::{MatchResult, MatchSettings, MatchView, RoomId, RoomSummary, RoomView};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::{Room, RoomError};

/// What happened to the room after a successful `remove_player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The room is still open with this many players.
    Remaining(usize),
    /// The roster became empty and the room shut itself down.
    Closed,
}

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RoomCommand {
    AddPlayer { name: String, reply: Reply<()> },
    RemovePlayer { name: String, reply: Reply<RemoveOutcome> },
    UpdateSettings { settings: MatchSettings, reply: Reply<()> },
    StartMatch { settings: Option<MatchSettings>, reply: Reply<MatchView> },
    EndMatch { reply: Reply<MatchResult> },
    SubmitAnswer { player: String, value: i64, reply: Reply<bool> },
    GetMatch { reply: Reply<MatchView> },
    GetView { reply: oneshot::Sender<RoomView> },
    GetSummary { reply: oneshot::Sender<RoomSummary> },
    /// Shut down the room. Dropping the actor cancels its match timer.
    Shutdown,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. The registry
/// holds one per room and hands out clones so no registry lock is held
/// while a room is working.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's unique ID.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    pub async fn add_player(&self, name: impl Into<String>) -> Result<(), RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::AddPlayer { name, reply })
            .await?
    }

    pub async fn remove_player(
        &self,
        name: impl Into<String>,
    ) -> Result<RemoveOutcome, RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::RemovePlayer { name, reply })
            .await?
    }

    pub async fn update_settings(&self, settings: MatchSettings) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::UpdateSettings { settings, reply })
            .await?
    }

    pub async fn start_match(
        &self,
        settings: Option<MatchSettings>,
    ) -> Result<MatchView, RoomError> {
        self.request(|reply| RoomCommand::StartMatch { settings, reply })
            .await?
    }

    pub async fn end_match(&self) -> Result<MatchResult, RoomError> {
        self.request(|reply| RoomCommand::EndMatch { reply }).await?
    }

    pub async fn submit_answer(
        &self,
        player: impl Into<String>,
        value: i64,
    ) -> Result<bool, RoomError> {
        let player = player.into();
        self.request(|reply| RoomCommand::SubmitAnswer { player, value, reply })
            .await?
    }

    pub async fn get_match(&self) -> Result<MatchView, RoomError> {
        self.request(|reply| RoomCommand::GetMatch { reply }).await?
    }

    pub async fn view(&self) -> Result<RoomView, RoomError> {
        self.request(|reply| RoomCommand::GetView { reply }).await
    }

    pub async fn summary(&self) -> Result<RoomSummary, RoomError> {
        self.request(|reply| RoomCommand::GetSummary { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// Why a match ended, for logging.
#[derive(Debug, Clone, Copy)]
enum EndReason {
    /// The armed timer fired.
    Timer,
    /// A command arrived after the deadline but before the timer was polled.
    Lazy,
}

impl EndReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Lazy => "lazy",
        }
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    reap_when_empty: bool,
    receiver: mpsc::Receiver<RoomCommand>,
}

/// Waits for the match deadline, or forever if no match is running.
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        let room_id = self.room.id();
        tracing::info!(%room_id, "room actor started");

        loop {
            let deadline = self.room.deadline();
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.expire_if_due(EndReason::Lazy);
                    if !self.handle(cmd) {
                        break;
                    }
                }
                () = sleep_until_deadline(deadline) => {
                    self.expire_if_due(EndReason::Timer);
                }
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn expire_if_due(&mut self, reason: EndReason) {
        if let Some(result) = self.room.expire_if_due(Instant::now()) {
            tracing::info!(
                room_id = %self.room.id(),
                reason = reason.as_str(),
                winner = %result.winner.name,
                score = result.winner.score,
                "match ended"
            );
        }
    }

    /// Applies one command. Returns `false` when the actor should stop.
    fn handle(&mut self, cmd: RoomCommand) -> bool {
        let room_id = self.room.id();
        match cmd {
            RoomCommand::AddPlayer { name, reply } => {
                let result = self.room.add_player(&name);
                match &result {
                    Ok(()) => tracing::info!(
                        %room_id,
                        player = %name,
                        players = self.room.players().len(),
                        "player added"
                    ),
                    Err(e) => tracing::debug!(%room_id, player = %name, error = %e, "add rejected"),
                }
                respond(reply, result);
            }
            RoomCommand::RemovePlayer { name, reply } => {
                let result = self.room.remove_player(&name);
                let close = result.is_ok() && self.reap_when_empty && self.room.is_empty();
                let outcome = result.map(|()| {
                    tracing::info!(
                        %room_id,
                        player = %name,
                        players = self.room.players().len(),
                        "player removed"
                    );
                    if close {
                        RemoveOutcome::Closed
                    } else {
                        RemoveOutcome::Remaining(self.room.players().len())
                    }
                });
                if let Err(e) = &outcome {
                    tracing::debug!(%room_id, player = %name, error = %e, "remove rejected");
                }
                respond(reply, outcome);
                if close {
                    tracing::info!(%room_id, "last player left, closing room");
                    return false;
                }
            }
            RoomCommand::UpdateSettings { settings, reply } => {
                let result = self.room.update_settings(settings);
                match &result {
                    Ok(()) => tracing::debug!(%room_id, "settings updated"),
                    Err(e) => tracing::debug!(%room_id, error = %e, "settings update rejected"),
                }
                respond(reply, result);
            }
            RoomCommand::StartMatch { settings, reply } => {
                let result = self.room.start_match(settings, Instant::now());
                match &result {
                    Ok(view) => tracing::info!(
                        %room_id,
                        players = view.players.len(),
                        duration = view.settings.duration,
                        "match started"
                    ),
                    Err(e) => tracing::debug!(%room_id, error = %e, "start rejected"),
                }
                respond(reply, result);
            }
            RoomCommand::EndMatch { reply } => {
                let was_active = self.room.is_match_active();
                let result = self.room.end_match();
                match &result {
                    Ok(r) if was_active => tracing::info!(
                        %room_id,
                        reason = "explicit",
                        winner = %r.winner.name,
                        score = r.winner.score,
                        "match ended"
                    ),
                    Ok(_) => tracing::debug!(%room_id, "match already ended"),
                    Err(e) => tracing::debug!(%room_id, error = %e, "end rejected"),
                }
                respond(reply, result);
            }
            RoomCommand::SubmitAnswer { player, value, reply } => {
                let result = self.room.submit_answer(&player, value);
                match &result {
                    Ok(correct) => tracing::debug!(%room_id, %player, value, correct, "answer"),
                    Err(e) => tracing::debug!(%room_id, %player, error = %e, "answer rejected"),
                }
                respond(reply, result);
            }
            RoomCommand::GetMatch { reply } => {
                let result = self.room.match_view(Instant::now());
                if let Err(e) = &result {
                    tracing::debug!(%room_id, error = %e, "match lookup rejected");
                }
                respond(reply, result);
            }
            RoomCommand::GetView { reply } => {
                let _ = reply.send(self.room.view(Instant::now()));
            }
            RoomCommand::GetSummary { reply } => {
                let _ = reply.send(self.room.summary());
            }
            RoomCommand::Shutdown => {
                tracing::info!(%room_id, "room shutting down");
                return false;
            }
        }
        true
    }
}

/// Sends a reply, warning if the caller stopped waiting.
fn respond<T>(reply: Reply<T>, result: Result<T, RoomError>) {
    if reply.send(result).is_err() {
        tracing::warn!("room reply dropped, caller went away");
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_size` controls backpressure: if the channel fills up, senders
/// wait (bounded channel).
pub(crate) fn spawn_room(room: Room, reap_when_empty: bool, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let room_id = room.id();

    let actor = RoomActor {
        room,
        reap_when_empty,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
