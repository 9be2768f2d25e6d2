//! `MathraceService` builder and request dispatch.
//!
//! This is the entry point for callers. It ties the layers together:
//! bytes → protocol (`Request`) → room registry → protocol (`Response`).
//! Whatever carries the bytes (an HTTP route, a WebSocket, a test) stays
//! outside this crate.

use std::sync::Arc;

use mathrace_protocol::{Codec, ErrorKind, JsonCodec, MatchSettings, Request, Response};
use mathrace_room::{RegistryConfig, RoomRegistry};

use crate::MathraceError;

/// Builder for configuring a [`MathraceService`].
///
/// # Example
///
/// ```rust
/// use mathrace::prelude::*;
///
/// let service = MathraceService::builder()
///     .channel_size(128)
///     .reap_empty_rooms(true)
///     .build();
/// assert!(service.registry().config().reap_empty_rooms);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MathraceServiceBuilder {
    config: RegistryConfig,
}

impl MathraceServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole registry configuration.
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bound on each room's command channel.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.config.channel_size = size;
        self
    }

    /// Deletes rooms whose last player leaves.
    pub fn reap_empty_rooms(mut self, reap: bool) -> Self {
        self.config.reap_empty_rooms = reap;
        self
    }

    /// Sets the pending settings new rooms start with.
    pub fn default_settings(mut self, settings: MatchSettings) -> Self {
        self.config.default_settings = settings;
        self
    }

    /// Makes problem generation reproducible.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    /// Builds a service that speaks JSON.
    pub fn build(self) -> MathraceService<JsonCodec> {
        self.build_with_codec(JsonCodec)
    }

    /// Builds a service with a custom codec for [`MathraceService::handle_bytes`].
    pub fn build_with_codec<C: Codec>(self, codec: C) -> MathraceService<C> {
        MathraceService {
            registry: Arc::new(RoomRegistry::with_config(self.config)),
            codec,
        }
    }
}

/// Executes room and match operations against one registry.
///
/// Cheap to clone; clones share the same rooms.
pub struct MathraceService<C: Codec = JsonCodec> {
    registry: Arc<RoomRegistry>,
    codec: C,
}

impl<C: Codec + Clone> Clone for MathraceService<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            codec: self.codec.clone(),
        }
    }
}

impl MathraceService<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> MathraceServiceBuilder {
        MathraceServiceBuilder::new()
    }
}

impl<C: Codec> MathraceService<C> {
    /// The registry behind this service, for direct typed access.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Executes one request.
    ///
    /// # Errors
    /// Any [`RoomError`](mathrace_room::RoomError) the target room
    /// reports. The room is left unchanged in that case.
    pub async fn execute(&self, request: Request) -> Result<Response, MathraceError> {
        let registry = &self.registry;
        let response = match request {
            Request::CreateRoom { host } => Response::RoomCreated {
                room_id: registry.create(host).await,
            },
            Request::GetRoom { room_id } => Response::Room {
                room: registry.get(room_id).await?,
            },
            Request::GetRooms => Response::Rooms {
                rooms: registry.views().await,
            },
            Request::DeleteRoom { room_id } => {
                registry.delete(room_id).await?;
                Response::Ok
            }
            Request::AddPlayer { room_id, player } => {
                registry.add_player(room_id, &player).await?;
                Response::PlayerAdded { added: true }
            }
            Request::RemovePlayer { room_id, player } => {
                registry.remove_player(room_id, &player).await?;
                Response::Ok
            }
            Request::UpdateSettings { room_id, settings } => {
                registry.update_settings(room_id, settings).await?;
                Response::Ok
            }
            Request::StartMatch { room_id, settings } => Response::Match {
                view: registry.start_match(room_id, settings).await?,
            },
            Request::EndMatch { room_id } => Response::MatchEnded {
                result: registry.end_match(room_id).await?,
            },
            Request::GetMatch { room_id } => Response::Match {
                view: registry.get_match(room_id).await?,
            },
            Request::HandleAnswer {
                room_id,
                player,
                answer,
            } => Response::Answer {
                correct: registry.submit_answer(room_id, &player, answer).await?,
            },
        };
        Ok(response)
    }

    /// Executes one request, folding failures into [`Response::Error`].
    pub async fn handle(&self, request: Request) -> Response {
        match self.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, kind = ?e.kind(), "request rejected");
                Response::error(e.kind(), e.to_string())
            }
        }
    }

    /// Decodes a request, executes it, and encodes the response.
    ///
    /// Undecodable input produces an encoded `Malformed` error response
    /// rather than an `Err`.
    ///
    /// # Errors
    /// Only if the response itself cannot be encoded.
    pub async fn handle_bytes(&self, data: &[u8]) -> Result<Vec<u8>, MathraceError> {
        let response = match self.codec.decode::<Request>(data) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode request");
                Response::error(ErrorKind::Malformed, e.to_string())
            }
        };
        Ok(self.codec.encode(&response)?)
    }
}
