use crate::engine::Move;
use crate::logic::board::{Color, Piece, PieceType, Square};
use crate::logic::generator::MoveGenerator;
use crate::logic::position::Position;
use crate::logic::rules::{is_valid_move, MoveError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    /// The given side is to move and has no legal move.
    NoLegalMoves(Color),
    /// A captured piece is waiting but every square is taken.
    BoardFull,
}

/// A piece taken off the board, waiting to come back under the other color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPiece {
    pub piece_type: PieceType,
    pub original_owner: Color,
}

impl CapturedPiece {
    pub const fn new(piece: Piece) -> Self {
        Self {
            piece_type: piece.piece_type,
            original_owner: piece.color,
        }
    }

    /// The side the piece comes back for.
    pub const fn new_owner(self) -> Color {
        self.original_owner.opposite()
    }

    /// The piece as it is placed back: always owned by the opponent of the
    /// original owner, however many times this is called.
    pub const fn as_dropped(self) -> Piece {
        Piece::new(self.piece_type, self.new_owner())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub mv: Move,
    pub color: Color,
    pub captured: Option<Piece>,
    pub drop_square: Option<Square>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub position: Position,
    pub status: GameStatus,
    pub history: Vec<MoveRecord>,
    pub pending_drop: Option<CapturedPiece>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    #[must_use]
    pub fn from_position(position: Position) -> Self {
        let mut game = Self {
            position,
            status: GameStatus::Playing,
            history: Vec::new(),
            pending_drop: None,
        };
        game.update_status();
        game
    }

    /// The side that has to act next: the capturer while a drop is pending,
    /// the side to move otherwise.
    pub fn side_to_act(&self) -> Color {
        self.pending_drop
            .map_or(self.position.turn, CapturedPiece::new_owner)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.pending_drop.is_some() || self.status != GameStatus::Playing {
            return Vec::new();
        }
        MoveGenerator::new().generate_moves(&self.position)
    }

    /// Plays a move. When it captures, the captured piece is returned and
    /// held until [`GameState::drop_pending`] puts it back.
    pub fn make_move(&mut self, mv: Move) -> Result<Option<CapturedPiece>, MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }
        if self.pending_drop.is_some() {
            return Err(MoveError::DropPending);
        }

        is_valid_move(&self.position, &mv)?;

        let color = self.position.turn;
        let captured = self.position.apply_move(&mv);
        self.history.push(MoveRecord {
            mv,
            color,
            captured,
            drop_square: None,
        });

        match captured {
            Some(piece) => {
                let token = CapturedPiece::new(piece);
                log::debug!("{color} captured {:?} with {mv}", piece.piece_type);
                self.pending_drop = Some(token);
                if self.position.board.empty_squares().next().is_none() {
                    self.status = GameStatus::BoardFull;
                }
                Ok(Some(token))
            }
            None => {
                self.update_status();
                Ok(None)
            }
        }
    }

    /// Puts the pending captured piece back on `sq` under inverted ownership.
    pub fn drop_pending(&mut self, sq: Square) -> Result<Piece, MoveError> {
        let token = self.pending_drop.ok_or(MoveError::NoDropPending)?;
        let piece = token.as_dropped();
        self.position.apply_drop(sq, piece)?;

        if let Some(record) = self.history.last_mut() {
            record.drop_square = Some(sq);
        }
        self.pending_drop = None;
        log::debug!("{} dropped {:?} on {sq}", piece.color, piece.piece_type);

        self.update_status();
        Ok(piece)
    }

    fn update_status(&mut self) {
        if !MoveGenerator::new().has_legal_moves(&self.position) {
            self.status = GameStatus::NoLegalMoves(self.position.turn);
        }
    }
}
