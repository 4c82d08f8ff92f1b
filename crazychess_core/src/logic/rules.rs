use crate::engine::Move;
use crate::logic::board::{Board, Color, PieceType, Square};
use crate::logic::generator::MoveGenerator;
use crate::logic::position::Position;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no piece on {0}")]
    NoPieceAtSource(Square),
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("{0} is not a legal move")]
    IllegalMove(Move),
    #[error("a captured piece must be dropped first")]
    DropPending,
    #[error("there is no captured piece to drop")]
    NoDropPending,
    #[error("square {0} is occupied")]
    SquareOccupied(Square),
    #[error("the game is over")]
    GameOver,
}

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Checks a collaborator-supplied move against the legal move list.
pub fn is_valid_move(position: &Position, mv: &Move) -> Result<(), MoveError> {
    let piece = position
        .board
        .get_piece(mv.from)
        .ok_or(MoveError::NoPieceAtSource(mv.from))?;

    if piece.color != position.turn {
        return Err(MoveError::NotYourTurn);
    }

    if MoveGenerator::new().generate_moves(position).contains(mv) {
        Ok(())
    } else {
        Err(MoveError::IllegalMove(*mv))
    }
}

/// Checks if the `color` king is attacked. A side without a king is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_square(color)
        .is_some_and(|king| is_square_attacked(board, king, color.opposite()))
}

/// Checks if any piece of `by` attacks `sq`.
pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    let holds = |target: Option<Square>, piece_type: PieceType| {
        target.is_some_and(|t| board.pieces(piece_type, by) & t.bit() != 0)
    };

    // 1. Pawns attack diagonally forward, so look one rank backward from `sq`.
    let back = -by.forward();
    if holds(sq.offset(-1, back), PieceType::Pawn) || holds(sq.offset(1, back), PieceType::Pawn) {
        return true;
    }

    // 2. Knights and kings
    if KNIGHT_OFFSETS
        .iter()
        .any(|&(df, dr)| holds(sq.offset(df, dr), PieceType::Knight))
    {
        return true;
    }
    if KING_OFFSETS
        .iter()
        .any(|&(df, dr)| holds(sq.offset(df, dr), PieceType::King))
    {
        return true;
    }

    // 3. Sliders: the first piece on each ray decides.
    let straight = board.pieces(PieceType::Rook, by) | board.pieces(PieceType::Queen, by);
    let diagonal = board.pieces(PieceType::Bishop, by) | board.pieces(PieceType::Queen, by);

    ray_hits(board, sq, &ROOK_DIRECTIONS, straight)
        || ray_hits(board, sq, &BISHOP_DIRECTIONS, diagonal)
}

fn ray_hits(board: &Board, sq: Square, directions: &[(i8, i8)], attackers: u64) -> bool {
    if attackers == 0 {
        return false;
    }
    for &(df, dr) in directions {
        let mut current = sq.offset(df, dr);
        while let Some(target) = current {
            if !board.is_empty(target) {
                if attackers & target.bit() != 0 {
                    return true;
                }
                break;
            }
            current = target.offset(df, dr);
        }
    }
    false
}
