//! Room bookkeeping shared by every connection handler
//!
//! The registry owns two linked maps: room code → session and
//! connection → room code. Both live behind a single mutex so that a move
//! and a concurrent disconnect on the same room can never observe one map
//! updated without the other. Methods never perform I/O while the lock is
//! held; they return outcome values and leave notification to the caller.

use crate::client_manager::ConnectionId;
use crate::error::RoomError;
use crate::game_session::{GameSession, MoveOutcome};
use log::{debug, info};
use parking_lot::Mutex;
use rand::Rng;
use shared::{Board, GameStatus, RoomCode, Symbol, ROOM_CODE_LEN};
use std::collections::HashMap;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate room codes.
///
/// Candidates that are malformed or already in use are skipped.
pub type CodeGenerator = Box<dyn FnMut() -> String + Send>;

/// A room torn down because one of its players left
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_code: RoomCode,
    /// Participants still connected, who should be told the game ended
    pub remaining: Vec<ConnectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCreated {
    pub room_code: RoomCode,
    pub symbol: Symbol,
    pub status: GameStatus,
    /// Room the creator was sitting in before, now destroyed
    pub abandoned: Option<Departure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomJoined {
    pub room_code: RoomCode,
    pub symbol: Symbol,
    pub status: GameStatus,
    pub current_turn: Symbol,
    pub abandoned: Option<Departure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveApplied {
    pub room_code: RoomCode,
    pub outcome: MoveOutcome,
}

/// Point-in-time copy of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub room_code: RoomCode,
    pub players: Vec<ConnectionId>,
    pub board: Board,
    pub current_turn: Symbol,
    pub status: GameStatus,
}

impl From<&GameSession> for SessionSnapshot {
    fn from(session: &GameSession) -> Self {
        Self {
            room_code: session.room_code().clone(),
            players: session.players().to_vec(),
            board: session.board().clone(),
            current_turn: session.current_turn(),
            status: session.status(),
        }
    }
}

struct RegistryState {
    sessions: HashMap<RoomCode, GameSession>,
    rooms_by_connection: HashMap<ConnectionId, RoomCode>,
    generate_code: CodeGenerator,
}

impl RegistryState {
    fn unused_room_code(&mut self) -> RoomCode {
        loop {
            let candidate = (self.generate_code)();
            match RoomCode::parse(&candidate) {
                Some(code) if !self.sessions.contains_key(&code) => return code,
                _ => debug!("Room code candidate {} rejected, regenerating", candidate),
            }
        }
    }

    /// Destroys the connection's room, if any, and unlinks both players
    fn leave(&mut self, connection: ConnectionId) -> Option<Departure> {
        let room_code = self.rooms_by_connection.remove(&connection)?;
        let session = self.sessions.remove(&room_code)?;

        let remaining: Vec<ConnectionId> = session
            .players()
            .iter()
            .copied()
            .filter(|&player| player != connection)
            .collect();

        for player in &remaining {
            self.rooms_by_connection.remove(player);
        }

        info!(
            "Room {} closed after connection {} left",
            room_code, connection
        );

        Some(Departure {
            room_code,
            remaining,
        })
    }

    fn session_of_mut(&mut self, connection: ConnectionId) -> Result<&mut GameSession, RoomError> {
        let room_code = self
            .rooms_by_connection
            .get(&connection)
            .ok_or(RoomError::NotInRoom)?;

        self.sessions
            .get_mut(room_code)
            .ok_or(RoomError::NotInRoom)
    }
}

/// Concurrency-safe owner of all live game sessions
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Creates an empty registry issuing random room codes
    pub fn new() -> Self {
        Self::with_code_generator(Box::new(random_room_code))
    }

    /// Creates an empty registry drawing candidate codes from `generate_code`
    ///
    /// Tests use this to script collisions. Malformed candidates and codes
    /// already in use are skipped, so the generator only has to eventually
    /// produce a fresh valid code.
    pub fn with_code_generator(generate_code: CodeGenerator) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                sessions: HashMap::new(),
                rooms_by_connection: HashMap::new(),
                generate_code,
            }),
        }
    }

    /// Opens a new room with `connection` seated as X.
    ///
    /// A connection already sitting in a room leaves it first.
    pub fn create_room(&self, connection: ConnectionId) -> RoomCreated {
        let mut state = self.state.lock();

        let abandoned = state.leave(connection);
        let room_code = state.unused_room_code();
        let session = GameSession::new(room_code.clone(), connection);
        let status = session.status();

        state.sessions.insert(room_code.clone(), session);
        state
            .rooms_by_connection
            .insert(connection, room_code.clone());

        info!("Connection {} created room {}", connection, room_code);

        RoomCreated {
            room_code,
            symbol: Symbol::X,
            status,
            abandoned,
        }
    }

    /// Seats `connection` as O in an existing room.
    ///
    /// The target room is validated before the connection leaves its
    /// current room, so a failed join never costs the caller a game.
    pub fn join_room(
        &self,
        connection: ConnectionId,
        room_code: &str,
    ) -> Result<RoomJoined, RoomError> {
        let code =
            RoomCode::parse(room_code).ok_or_else(|| RoomError::RoomNotFound(room_code.to_string()))?;

        let mut state = self.state.lock();

        {
            let session = state
                .sessions
                .get(&code)
                .ok_or_else(|| RoomError::RoomNotFound(code.to_string()))?;

            if session.symbol_of(connection).is_some() {
                return Err(RoomError::AlreadyInRoom(code));
            }
            if session.is_full() {
                return Err(RoomError::RoomFull(code));
            }
        }

        let abandoned = state.leave(connection);
        let session = state
            .sessions
            .get_mut(&code)
            .ok_or_else(|| RoomError::RoomNotFound(code.to_string()))?;

        let symbol = session.add_player(connection)?;
        let status = session.status();
        let current_turn = session.current_turn();

        state.rooms_by_connection.insert(connection, code.clone());

        info!("Connection {} joined room {} as {}", connection, code, symbol);

        Ok(RoomJoined {
            room_code: code,
            symbol,
            status,
            current_turn,
            abandoned,
        })
    }

    /// Plays `cell` for `connection` in its room
    ///
    /// Every rule violation comes back as an error and leaves the session
    /// untouched. The returned outcome already carries the evaluated status,
    /// so the caller can broadcast without taking the lock again.
    pub fn apply_move(
        &self,
        connection: ConnectionId,
        cell: usize,
    ) -> Result<MoveApplied, RoomError> {
        let mut state = self.state.lock();
        let session = state.session_of_mut(connection)?;
        let outcome = session.apply_move(connection, cell)?;

        Ok(MoveApplied {
            room_code: session.room_code().clone(),
            outcome,
        })
    }

    /// Clears the board of the connection's room; returns the room code.
    ///
    /// A room without its second player cannot be reset.
    pub fn reset_room(&self, connection: ConnectionId) -> Result<RoomCode, RoomError> {
        let mut state = self.state.lock();
        let session = state.session_of_mut(connection)?;
        session.reset()?;

        info!(
            "Connection {} reset room {}",
            connection,
            session.room_code()
        );
        Ok(session.room_code().clone())
    }

    /// Removes the connection's room entirely; both players lose the game
    pub fn disconnect(&self, connection: ConnectionId) -> Option<Departure> {
        self.state.lock().leave(connection)
    }

    /// Room the connection currently sits in
    pub fn room_of(&self, connection: ConnectionId) -> Option<RoomCode> {
        self.state
            .lock()
            .rooms_by_connection
            .get(&connection)
            .cloned()
    }

    /// Copies the current state of a room
    ///
    /// The copy is taken under the lock and is detached from the live
    /// session afterwards.
    pub fn snapshot(&self, room_code: &RoomCode) -> Option<SessionSnapshot> {
        self.state
            .lock()
            .sessions
            .get(room_code)
            .map(SessionSnapshot::from)
    }

    /// Number of open rooms, waiting or playing
    pub fn room_count(&self) -> usize {
        self.state.lock().sessions.len()
    }
}

/// Draws a six character code from `A-Z0-9`
pub fn random_room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}
