//! Client-side mirror of the room the player sits in
//!
//! The client never decides anything about the game: it applies the
//! server's notifications in order and derives what to display from them.

use log::{info, warn};
use shared::{winner, Board, GameStatus, Packet, RoomCode, Symbol};

#[derive(Debug, Clone)]
pub struct ClientGameState {
    pub connection_id: Option<u32>,
    pub room_code: Option<RoomCode>,
    pub my_symbol: Option<Symbol>,
    pub board: Board,
    pub current_turn: Symbol,
    pub status: GameStatus,
    /// Last message worth showing to the player
    pub message: String,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            connection_id: None,
            room_code: None,
            my_symbol: None,
            board: Board::new(),
            current_turn: Symbol::X,
            status: GameStatus::WaitingForOpponent,
            message: "Connecting...".to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_id.is_some()
    }

    pub fn in_room(&self) -> bool {
        self.room_code.is_some()
    }

    pub fn is_my_turn(&self) -> bool {
        self.status == GameStatus::InProgress && self.my_symbol == Some(self.current_turn)
    }

    /// Whether clicking `cell` is worth sending to the server
    pub fn can_play(&self, cell: usize) -> bool {
        self.is_my_turn() && self.board.is_empty_cell(cell)
    }

    fn leave_room(&mut self) {
        self.room_code = None;
        self.my_symbol = None;
        self.board.clear();
        self.current_turn = Symbol::X;
        self.status = GameStatus::WaitingForOpponent;
    }

    fn enter_room(&mut self, room_code: RoomCode, symbol: Symbol, status: GameStatus) {
        self.leave_room();
        self.room_code = Some(room_code);
        self.my_symbol = Some(symbol);
        self.status = status;
    }

    fn turn_message(&self) -> String {
        if self.is_my_turn() {
            "Your turn".to_string()
        } else {
            format!("Waiting for {}", self.current_turn)
        }
    }

    /// Applies a server notification to the local state
    pub fn apply_packet(&mut self, packet: Packet) {
        match packet {
            Packet::Connected { connection_id } => {
                info!("Connected! Connection ID: {}", connection_id);
                self.connection_id = Some(connection_id);
                self.message = "Press C to create a room or J to join one".to_string();
            }

            Packet::RoomCreated {
                room_code,
                symbol,
                status,
            } => {
                self.message = format!("Room {} created, share the code", room_code);
                self.enter_room(room_code, symbol, status);
            }

            Packet::RoomJoined {
                room_code,
                symbol,
                status,
            } => {
                self.message = format!("Joined room {}", room_code);
                self.enter_room(room_code, symbol, status);
            }

            Packet::JoinRejected { reason } => {
                self.message = format!("Could not join: {}", reason);
            }

            Packet::GameStarted { current_turn } => {
                self.current_turn = current_turn;
                self.status = GameStatus::InProgress;
                self.message = self.turn_message();
            }

            Packet::MoveMade {
                cell,
                symbol,
                next_turn,
            } => {
                if !self.board.place(cell as usize, symbol) {
                    warn!("Server placed {} on unavailable cell {}", symbol, cell);
                }
                self.current_turn = next_turn;
                self.message = self.turn_message();
            }

            Packet::GameOver { message, board } => {
                self.status = match winner(&board) {
                    Some(symbol) => GameStatus::Won(symbol),
                    None => GameStatus::Draw,
                };
                self.board = board;
                self.message = format!("{} Press R to play again", message);
            }

            Packet::GameReset => {
                self.board.clear();
                self.current_turn = Symbol::X;
                self.status = GameStatus::InProgress;
                self.message = self.turn_message();
            }

            Packet::PlayerDisconnected => {
                self.leave_room();
                self.message = "Opponent left. Press C to create a room or J to join one".to_string();
            }

            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.leave_room();
                self.connection_id = None;
                self.message = format!("Disconnected: {}", reason);
            }

            _ => {
                warn!("Unexpected packet type");
            }
        }
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}
