use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROTOCOL_VERSION: u32 = 1;
pub const BOARD_SIZE: usize = 3;
pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;
pub const ROOM_CODE_LEN: usize = 6;

/// The eight cell triples that decide a game: rows, columns, then diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    CreateRoom,
    JoinRoom {
        room_code: String,
    },
    MakeMove {
        cell: u8,
    },
    ResetGame,
    Heartbeat,
    Disconnect,

    Connected {
        connection_id: u32,
    },
    RoomCreated {
        room_code: RoomCode,
        symbol: Symbol,
        status: GameStatus,
    },
    RoomJoined {
        room_code: RoomCode,
        symbol: Symbol,
        status: GameStatus,
    },
    JoinRejected {
        reason: String,
    },
    GameStarted {
        current_turn: Symbol,
    },
    MoveMade {
        cell: u8,
        symbol: Symbol,
        next_turn: Symbol,
    },
    GameOver {
        message: String,
        board: Board,
    },
    GameReset,
    PlayerDisconnected,
    Disconnected {
        reason: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn other(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::X => write!(f, "X"),
            Symbol::O => write!(f, "O"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    WaitingForOpponent,
    InProgress,
    Won(Symbol),
    Draw,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        matches!(self, GameStatus::Won(_) | GameStatus::Draw)
    }

    /// Human readable summary, used as the `GameOver` message
    pub fn message(&self) -> String {
        match self {
            GameStatus::WaitingForOpponent => "Waiting for opponent...".to_string(),
            GameStatus::InProgress => "Game in progress".to_string(),
            GameStatus::Won(symbol) => format!("{} wins!", symbol),
            GameStatus::Draw => "It's a draw!".to_string(),
        }
    }
}

/// Short shareable identifier of a game room.
///
/// Always `ROOM_CODE_LEN` characters of uppercase ASCII letters and digits.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes user input (trim, uppercase) and validates its shape
    pub fn parse(input: &str) -> Option<RoomCode> {
        let code = input.trim().to_ascii_uppercase();
        let valid = code.len() == ROOM_CODE_LEN
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());

        if valid {
            Some(RoomCode(code))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Symbol>; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Symbol>; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Symbol>; BOARD_CELLS] {
        &self.cells
    }

    /// Returns the content of a cell, `None` for empty or out of range
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_empty_cell(&self, index: usize) -> bool {
        index < BOARD_CELLS && self.cells[index].is_none()
    }

    /// Marks an empty cell. Occupied or out of range cells are left untouched.
    pub fn place(&mut self, index: usize, symbol: Symbol) -> bool {
        if !self.is_empty_cell(index) {
            return false;
        }
        self.cells[index] = Some(symbol);
        true
    }

    pub fn clear(&mut self) {
        self.cells = [None; BOARD_CELLS];
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

pub fn is_winner(board: &Board, symbol: Symbol) -> bool {
    WIN_LINES
        .iter()
        .any(|line| line.iter().all(|&index| board.get(index) == Some(symbol)))
}

pub fn is_full(board: &Board) -> bool {
    board.cells.iter().all(|cell| cell.is_some())
}

/// Evaluates the board after `mover` played.
///
/// A win for the mover takes precedence over a full board.
pub fn evaluate(board: &Board, mover: Symbol) -> GameStatus {
    if is_winner(board, mover) {
        GameStatus::Won(mover)
    } else if is_full(board) {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}

pub fn winner(board: &Board) -> Option<Symbol> {
    [Symbol::X, Symbol::O]
        .into_iter()
        .find(|&symbol| is_winner(board, symbol))
}
