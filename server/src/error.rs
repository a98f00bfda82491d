use shared::RoomCode;
use thiserror::Error;

/// Reasons a room action is refused.
///
/// None of these are fatal: the hub answers a failed join with a
/// `JoinRejected` reply and drops every other failure silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("room {0} is full")]
    RoomFull(RoomCode),
    #[error("invalid move: {0}")]
    InvalidMove(MoveRejection),
    #[error("connection is not in a room")]
    NotInRoom,
    #[error("connection is already in room {0}")]
    AlreadyInRoom(RoomCode),
    #[error("room {0} is still waiting for an opponent")]
    GameNotStarted(RoomCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("game is not in progress")]
    NotInProgress,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("cell {0} is already occupied")]
    CellOccupied(usize),
    #[error("cell {0} is outside the board")]
    CellOutOfRange(usize),
}

impl From<MoveRejection> for RoomError {
    fn from(rejection: MoveRejection) -> Self {
        RoomError::InvalidMove(rejection)
    }
}
