use crate::engine::Move;
use crate::logic::board::{Board, Color, Piece, PieceType, Square};
use crate::logic::rules::MoveError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN is missing the piece placement field")]
    MissingPlacement,
    #[error("FEN placement must have 8 ranks, found {0}")]
    RankCount(usize),
    #[error("FEN rank {rank} does not describe exactly 8 files")]
    RankWidth { rank: u8 },
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("invalid side to move '{0}'")]
    InvalidTurn(String),
    #[error("invalid castling field '{0}'")]
    InvalidCastling(String),
    #[error("invalid en passant square '{0}'")]
    InvalidEnPassant(String),
    #[error("invalid move counter '{0}'")]
    InvalidCounter(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const ALL: Self = Self {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const fn kingside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub const fn queenside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn clear_color(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Drops the right tied to a rook corner once anything leaves or lands there.
    fn touch(&mut self, sq: Square) {
        match sq.index() {
            0 => self.white_queenside = false,
            7 => self.white_kingside = false,
            56 => self.black_queenside = false,
            63 => self.black_kingside = false,
            _ => {}
        }
    }

    #[must_use]
    const fn swapped(self) -> Self {
        Self {
            white_kingside: self.black_kingside,
            white_queenside: self.black_queenside,
            black_kingside: self.white_kingside,
            black_queenside: self.white_queenside,
        }
    }

    fn to_fen(self) -> String {
        let mut field = String::new();
        for (flag, c) in [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ] {
            if flag {
                field.push(c);
            }
        }
        if field.is_empty() {
            field.push('-');
        }
        field
    }
}

/// Snapshot of a game handed to the engine. Cloning is cheap and every
/// search branch owns its copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub board: Board,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parses a FEN string. Only the placement field is mandatory; missing
    /// trailing fields default to `w - - 0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::MissingPlacement)?;
        let board = parse_placement(placement)?;

        let turn = match fields.next().unwrap_or("w") {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidTurn(other.to_string())),
        };

        let castling_field = fields.next().unwrap_or("-");
        let mut castling = CastlingRights::default();
        if castling_field != "-" {
            for c in castling_field.chars() {
                match c {
                    'K' => castling.white_kingside = true,
                    'Q' => castling.white_queenside = true,
                    'k' => castling.black_kingside = true,
                    'q' => castling.black_queenside = true,
                    _ => return Err(FenError::InvalidCastling(castling_field.to_string())),
                }
            }
        }

        let en_passant = match fields.next().unwrap_or("-") {
            "-" => None,
            text => Some(
                Square::parse(text).ok_or_else(|| FenError::InvalidEnPassant(text.to_string()))?,
            ),
        };

        let halfmove_clock = parse_counter(fields.next().unwrap_or("0"))?;
        let fullmove_number = parse_counter(fields.next().unwrap_or("1"))?;

        Ok(Self {
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    pub fn to_fen(&self) -> String {
        let turn = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {} {} {}",
            self.board.to_fen_placement(),
            turn,
            self.castling.to_fen(),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Plays `mv` for the side to move and passes the turn. Returns the
    /// captured piece, if any. The move must come from the legal move list;
    /// a move without a piece on its source square leaves the position as is.
    pub fn apply_move(&mut self, mv: &Move) -> Option<Piece> {
        let Some(piece) = self.board.remove_piece(mv.from) else {
            debug_assert!(false, "apply_move: no piece on {}", mv.from);
            return None;
        };

        let mut captured = self.board.remove_piece(mv.to);
        let is_pawn = piece.piece_type == PieceType::Pawn;

        // En passant: the captured pawn sits beside the origin square.
        if is_pawn && captured.is_none() && mv.from.file() != mv.to.file() {
            if let Some(victim) = Square::new(mv.to.file(), mv.from.rank()) {
                captured = self.board.remove_piece(victim);
            }
        }

        // Castling: bring the rook over the king.
        if piece.piece_type == PieceType::King && mv.from.file().abs_diff(mv.to.file()) == 2 {
            let rank = mv.from.rank();
            let (rook_from, rook_to) = if mv.to.file() > mv.from.file() {
                (Square::new(7, rank), Square::new(5, rank))
            } else {
                (Square::new(0, rank), Square::new(3, rank))
            };
            if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
                if let Some(rook) = self.board.remove_piece(rook_from) {
                    self.board.add_piece(rook_to, rook);
                }
            }
        }

        let placed = match mv.promotion {
            Some(promotion) if is_pawn => Piece::new(promotion, piece.color),
            _ => piece,
        };
        self.board.add_piece(mv.to, placed);

        if piece.piece_type == PieceType::King {
            self.castling.clear_color(piece.color);
        }
        self.castling.touch(mv.from);
        self.castling.touch(mv.to);

        self.en_passant = if is_pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            Square::new(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2)
        } else {
            None
        };

        if is_pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.turn == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = self.turn.opposite();

        captured
    }

    /// Places `piece` on an empty square. The turn does not change: a drop
    /// completes the capturing side's turn.
    pub fn apply_drop(&mut self, sq: Square, piece: Piece) -> Result<(), MoveError> {
        if !self.board.is_empty(sq) {
            return Err(MoveError::SquareOccupied(sq));
        }
        self.board.add_piece(sq, piece);
        Ok(())
    }

    /// Ranks flipped, colors swapped, other side to move.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            board: self.board.mirrored(),
            turn: self.turn.opposite(),
            castling: self.castling.swapped(),
            en_passant: self.en_passant.map(Square::mirror),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }
}

fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    let mut board = Board::empty();
    for (row, rank_text) in (0u8..).zip(ranks.iter()) {
        let rank = 7 - row;
        let mut file: u8 = 0;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10) {
                #[allow(clippy::cast_possible_truncation)]
                let skip = skip as u8;
                if skip == 0 || skip > 8 {
                    return Err(FenError::RankWidth { rank: rank + 1 });
                }
                file += skip;
            } else {
                let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                let sq = Square::new(file, rank).ok_or(FenError::RankWidth { rank: rank + 1 })?;
                board.add_piece(sq, piece);
                file += 1;
            }
            if file > 8 {
                return Err(FenError::RankWidth { rank: rank + 1 });
            }
        }
        if file != 8 {
            return Err(FenError::RankWidth { rank: rank + 1 });
        }
    }
    Ok(board)
}

fn parse_counter(text: &str) -> Result<u32, FenError> {
    text.parse()
        .map_err(|_| FenError::InvalidCounter(text.to_string()))
}
