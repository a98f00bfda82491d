//! State machine of a single tic-tac-toe room
//!
//! A session moves through `WaitingForOpponent` → `InProgress` → `Won`/`Draw`.
//! A reset brings a finished (or running) game back to `InProgress` with an
//! empty board. It is refused while the second seat is empty, so a game
//! only ever starts on a join. The session itself is only destroyed by the
//! registry.

use crate::client_manager::ConnectionId;
use crate::error::{MoveRejection, RoomError};
use shared::{evaluate, Board, GameStatus, RoomCode, Symbol, BOARD_CELLS};

/// Players are assigned symbols in join order
const SEATS: [Symbol; 2] = [Symbol::X, Symbol::O];

/// Result of an accepted move, ready for broadcasting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub cell: usize,
    pub symbol: Symbol,
    pub next_turn: Symbol,
    pub status: GameStatus,
    pub board: Board,
}

/// One room's game: who sits where, the board and whose turn it is
///
/// Seats are filled in join order, the host as X and the joiner as O. All
/// rule checks live here; the registry only decides which session a
/// connection talks to.
#[derive(Debug, Clone)]
pub struct GameSession {
    room_code: RoomCode,
    players: Vec<ConnectionId>,
    board: Board,
    current_turn: Symbol,
    status: GameStatus,
}

impl GameSession {
    /// Opens a room with `host` seated as X
    pub fn new(room_code: RoomCode, host: ConnectionId) -> Self {
        Self {
            room_code,
            players: vec![host],
            board: Board::new(),
            current_turn: Symbol::X,
            status: GameStatus::WaitingForOpponent,
        }
    }

    /// Code under which the registry files this session
    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    /// Seated connections in seat order: X first, then O if joined
    pub fn players(&self) -> &[ConnectionId] {
        &self.players
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Symbol {
        self.current_turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns true once both seats are taken
    pub fn is_full(&self) -> bool {
        self.players.len() >= SEATS.len()
    }

    /// Symbol of a seated connection, None for anyone else
    pub fn symbol_of(&self, connection: ConnectionId) -> Option<Symbol> {
        self.players
            .iter()
            .position(|&player| player == connection)
            .map(|seat| SEATS[seat])
    }

    /// Seats the second player as O and starts the game
    pub fn add_player(&mut self, connection: ConnectionId) -> Result<Symbol, RoomError> {
        if self.symbol_of(connection).is_some() {
            return Err(RoomError::AlreadyInRoom(self.room_code.clone()));
        }
        if self.is_full() {
            return Err(RoomError::RoomFull(self.room_code.clone()));
        }

        self.players.push(connection);
        self.status = GameStatus::InProgress;
        Ok(SEATS[self.players.len() - 1])
    }

    /// Validates and applies a move for `connection`.
    ///
    /// On success the turn always passes to the other symbol, including on
    /// the move that ends the game.
    pub fn apply_move(
        &mut self,
        connection: ConnectionId,
        cell: usize,
    ) -> Result<MoveOutcome, RoomError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveRejection::NotInProgress.into());
        }

        let symbol = self.symbol_of(connection).ok_or(RoomError::NotInRoom)?;
        if symbol != self.current_turn {
            return Err(MoveRejection::NotYourTurn.into());
        }
        if cell >= BOARD_CELLS {
            return Err(MoveRejection::CellOutOfRange(cell).into());
        }
        if !self.board.place(cell, symbol) {
            return Err(MoveRejection::CellOccupied(cell).into());
        }

        self.status = evaluate(&self.board, symbol);
        self.current_turn = symbol.other();

        Ok(MoveOutcome {
            cell,
            symbol,
            next_turn: self.current_turn,
            status: self.status,
            board: self.board.clone(),
        })
    }

    /// Clears the board and restarts the game with X to move.
    ///
    /// Fails with `GameNotStarted` while the room is still waiting for its
    /// second player; the session is left untouched in that case.
    pub fn reset(&mut self) -> Result<(), RoomError> {
        if !self.is_full() {
            return Err(RoomError::GameNotStarted(self.room_code.clone()));
        }

        self.board.clear();
        self.current_turn = Symbol::X;
        self.status = GameStatus::InProgress;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> RoomCode {
        RoomCode::parse("ABC123").unwrap()
    }

    fn started_session() -> GameSession {
        let mut session = GameSession::new(code(), 1);
        session.add_player(2).unwrap();
        session
    }

    #[test]
    fn test_new_session_waits_for_opponent() {
        let session = GameSession::new(code(), 1);
        assert_eq!(session.status(), GameStatus::WaitingForOpponent);
        assert_eq!(session.current_turn(), Symbol::X);
        assert_eq!(session.symbol_of(1), Some(Symbol::X));
        assert_eq!(session.players(), &[1]);
        assert_eq!(session.board().occupied(), 0);
    }

    #[test]
    fn test_second_player_starts_game() {
        let mut session = GameSession::new(code(), 1);
        let symbol = session.add_player(2).unwrap();

        assert_eq!(symbol, Symbol::O);
        assert_eq!(session.status(), GameStatus::InProgress);
        assert!(session.is_full());
    }

    #[test]
    fn test_third_player_rejected() {
        let mut session = started_session();
        assert_eq!(session.add_player(3), Err(RoomError::RoomFull(code())));
        assert_eq!(session.players(), &[1, 2]);
    }

    #[test]
    fn test_host_cannot_join_twice() {
        let mut session = GameSession::new(code(), 1);
        assert_eq!(session.add_player(1), Err(RoomError::AlreadyInRoom(code())));
        assert_eq!(session.status(), GameStatus::WaitingForOpponent);
    }

    #[test]
    fn test_move_before_opponent_joins() {
        let mut session = GameSession::new(code(), 1);
        assert_eq!(
            session.apply_move(1, 0),
            Err(RoomError::InvalidMove(MoveRejection::NotInProgress))
        );
    }

    #[test]
    fn test_accepted_move_passes_turn() {
        let mut session = started_session();
        let outcome = session.apply_move(1, 4).unwrap();

        assert_eq!(outcome.cell, 4);
        assert_eq!(outcome.symbol, Symbol::X);
        assert_eq!(outcome.next_turn, Symbol::O);
        assert_eq!(outcome.status, GameStatus::InProgress);
        assert_eq!(session.current_turn(), Symbol::O);
        assert_eq!(session.board().get(4), Some(Symbol::X));
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let mut session = started_session();
        assert_eq!(
            session.apply_move(2, 0),
            Err(RoomError::InvalidMove(MoveRejection::NotYourTurn))
        );
        assert_eq!(session.board().occupied(), 0);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut session = started_session();
        session.apply_move(1, 0).unwrap();
        let before = session.board().clone();

        assert_eq!(
            session.apply_move(2, 0),
            Err(RoomError::InvalidMove(MoveRejection::CellOccupied(0)))
        );
        assert_eq!(session.board(), &before);
        assert_eq!(session.current_turn(), Symbol::O);
    }

    #[test]
    fn test_out_of_range_cell_rejected() {
        let mut session = started_session();
        assert_eq!(
            session.apply_move(1, 9),
            Err(RoomError::InvalidMove(MoveRejection::CellOutOfRange(9)))
        );
    }

    #[test]
    fn test_stranger_cannot_move() {
        let mut session = started_session();
        assert_eq!(session.apply_move(99, 0), Err(RoomError::NotInRoom));
    }

    #[test]
    fn test_top_row_wins_for_x() {
        let mut session = started_session();
        for (player, cell) in [(1, 0), (2, 3), (1, 1), (2, 4)] {
            session.apply_move(player, cell).unwrap();
        }

        let outcome = session.apply_move(1, 2).unwrap();
        assert_eq!(outcome.status, GameStatus::Won(Symbol::X));
        assert_eq!(outcome.next_turn, Symbol::O);
        assert_eq!(
            session.apply_move(2, 5),
            Err(RoomError::InvalidMove(MoveRejection::NotInProgress))
        );
    }

    #[test]
    fn test_full_board_is_draw() {
        let mut session = started_session();
        // X O X / X O O / O X X
        let moves = [(1, 0), (2, 1), (1, 2), (2, 4), (1, 3), (2, 5), (1, 7), (2, 6)];
        for (player, cell) in moves {
            let outcome = session.apply_move(player, cell).unwrap();
            assert_eq!(outcome.status, GameStatus::InProgress);
        }

        let outcome = session.apply_move(1, 8).unwrap();
        assert_eq!(outcome.status, GameStatus::Draw);
    }

    #[test]
    fn test_reset_clears_board() {
        let mut session = started_session();
        session.apply_move(1, 0).unwrap();
        session.apply_move(2, 8).unwrap();
        session.apply_move(1, 4).unwrap();

        session.reset().unwrap();

        assert_eq!(session.board().occupied(), 0);
        assert_eq!(session.current_turn(), Symbol::X);
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.players(), &[1, 2]);
    }

    #[test]
    fn test_reset_refused_without_opponent() {
        let mut session = GameSession::new(code(), 1);

        assert_eq!(
            session.reset(),
            Err(RoomError::GameNotStarted(code()))
        );

        assert_eq!(session.status(), GameStatus::WaitingForOpponent);
        assert!(session.apply_move(1, 0).is_err());
        assert_eq!(session.board().occupied(), 0);

        session.add_player(2).unwrap();
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.current_turn(), Symbol::X);
    }
}
