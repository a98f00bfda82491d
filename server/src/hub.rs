//! Game hub: turns client actions into registry calls and notifications
//!
//! The hub is the only place that talks to both the registry and the
//! gateway. Registry calls finish (and release the registry lock) before any
//! notification is handed to the gateway.

use crate::client_manager::ConnectionId;
use crate::error::RoomError;
use crate::session_registry::{Departure, SessionRegistry};
use log::debug;
use shared::{Packet, RoomCode};
use std::sync::Arc;

/// Outbound side of the connection layer, as seen by the game logic.
///
/// Implementations must not block: they are called from request handlers.
pub trait Gateway: Send + Sync {
    /// Delivers a packet to a single connection
    fn send(&self, connection: ConnectionId, packet: Packet);

    /// Delivers a packet to every member of a room's group
    fn broadcast(&self, room: &RoomCode, packet: Packet);

    fn join_group(&self, connection: ConnectionId, room: &RoomCode);

    fn leave_group(&self, connection: ConnectionId, room: &RoomCode);

    /// Drops a group and all of its memberships
    fn remove_group(&self, room: &RoomCode);
}

/// Connects client actions to the registry and the gateway
///
/// Every action follows the same pattern: one registry call, then
/// notifications built from the value it returned. Refused actions are
/// logged at debug level; only a refused join is answered.
pub struct GameHub<G: Gateway> {
    registry: Arc<SessionRegistry>,
    gateway: G,
}

impl<G: Gateway> GameHub<G> {
    pub fn new(registry: Arc<SessionRegistry>, gateway: G) -> Self {
        Self { registry, gateway }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Opens a room for `connection` and replies with its code
    ///
    /// If the connection was already playing elsewhere, that room is closed
    /// first and the opponent left behind is told.
    pub fn create_room(&self, connection: ConnectionId) {
        let created = self.registry.create_room(connection);

        if let Some(departure) = created.abandoned {
            self.close_room(connection, departure);
        }

        self.gateway.join_group(connection, &created.room_code);
        self.gateway.send(
            connection,
            Packet::RoomCreated {
                room_code: created.room_code,
                symbol: created.symbol,
                status: created.status,
            },
        );
    }

    /// Joins an existing room; a refusal is answered with `JoinRejected`
    pub fn join_room(&self, connection: ConnectionId, room_code: &str) {
        let joined = match self.registry.join_room(connection, room_code) {
            Ok(joined) => joined,
            Err(e) => {
                debug!("Connection {} could not join room: {}", connection, e);
                self.gateway.send(
                    connection,
                    Packet::JoinRejected {
                        reason: e.to_string(),
                    },
                );
                return;
            }
        };

        if let Some(departure) = joined.abandoned {
            self.close_room(connection, departure);
        }

        self.gateway.join_group(connection, &joined.room_code);
        self.gateway.send(
            connection,
            Packet::RoomJoined {
                room_code: joined.room_code.clone(),
                symbol: joined.symbol,
                status: joined.status,
            },
        );
        self.gateway.broadcast(
            &joined.room_code,
            Packet::GameStarted {
                current_turn: joined.current_turn,
            },
        );
    }

    /// Applies a move; invalid moves are dropped without a reply
    pub fn make_move(&self, connection: ConnectionId, cell: u8) {
        let applied = match self.registry.apply_move(connection, cell as usize) {
            Ok(applied) => applied,
            Err(e) => {
                ignore(connection, "move", e);
                return;
            }
        };

        let outcome = applied.outcome;
        self.gateway.broadcast(
            &applied.room_code,
            Packet::MoveMade {
                cell,
                symbol: outcome.symbol,
                next_turn: outcome.next_turn,
            },
        );

        if outcome.status.is_over() {
            self.gateway.broadcast(
                &applied.room_code,
                Packet::GameOver {
                    message: outcome.status.message(),
                    board: outcome.board,
                },
            );
        }
    }

    /// Restarts the caller's game and tells both players
    ///
    /// Ignored outside a room and in a room still waiting for its second
    /// player.
    pub fn reset_game(&self, connection: ConnectionId) {
        match self.registry.reset_room(connection) {
            Ok(room_code) => self.gateway.broadcast(&room_code, Packet::GameReset),
            Err(e) => ignore(connection, "reset", e),
        }
    }

    /// Connection-loss callback; must be invoked once per lost connection
    pub fn on_disconnect(&self, connection: ConnectionId) {
        if let Some(departure) = self.registry.disconnect(connection) {
            self.close_room(connection, departure);
        }
    }

    fn close_room(&self, leaver: ConnectionId, departure: Departure) {
        self.gateway.leave_group(leaver, &departure.room_code);
        if !departure.remaining.is_empty() {
            self.gateway
                .broadcast(&departure.room_code, Packet::PlayerDisconnected);
        }
        self.gateway.remove_group(&departure.room_code);
    }
}

fn ignore(connection: ConnectionId, action: &str, error: RoomError) {
    debug!(
        "Ignoring {} from connection {}: {}",
        action, connection, error
    );
}
