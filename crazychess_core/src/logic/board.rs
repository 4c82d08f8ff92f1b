use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;

pub type Bitboard = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    /// +1 for White, -1 for Black. Scores are White-positive.
    pub const fn sign(self) -> i32 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Rank direction pawns of this color advance in.
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    pub const ALL: [Self; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    /// Promotion choices, strongest first.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn to_char(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        Self { piece_type, color }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub const fn to_fen_char(self) -> char {
        let c = self.piece_type.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceType::from_char(c) {
            Some(piece_type) => Some(Self { piece_type, color }),
            None => None,
        }
    }
}

/// One of the 64 board locations. `a1 = 0`, `b1 = 1`, ..., `h8 = 63`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square(u8);

impl Square {
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self(rank * 8 + file))
        } else {
            None
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 64 {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..64u8).map(Self)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    pub const fn bit(self) -> Bitboard {
        1u64 << self.0
    }

    /// Same file, opposite rank (a1 <-> a8).
    #[must_use]
    pub const fn mirror(self) -> Self {
        Self(self.0 ^ 56)
    }

    /// Step by (file, rank) deltas, `None` when leaving the board.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub const fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            return None;
        }
        Self::new(file as u8, rank as u8)
    }

    /// Parses algebraic notation such as `e4`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Self::new(file as u8 - b'a', rank as u8 - b'1')
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.file());
        let rank = char::from(b'1' + self.rank());
        write!(f, "{file}{rank}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    // Index: color.index() * 6 + piece_type.index()
    pub bitboards: [Bitboard; 12],
    pub occupied: Bitboard,
    // Mailbox for O(1) lookup
    #[serde(with = "BigArray")]
    pub grid: [Option<Piece>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            bitboards: [0; 12],
            occupied: 0,
            grid: [None; 64],
        }
    }

    fn setup_initial_position(&mut self) {
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (file, &pt) in (0u8..).zip(back_rank.iter()) {
            for (color, rank, pawn_rank) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
                if let Some(sq) = Square::new(file, rank) {
                    self.add_piece(sq, Piece::new(pt, color));
                }
                if let Some(sq) = Square::new(file, pawn_rank) {
                    self.add_piece(sq, Piece::new(PieceType::Pawn, color));
                }
            }
        }
    }

    const fn bitboard_index(piece: Piece) -> usize {
        piece.color.index() * 6 + piece.piece_type.index()
    }

    /// Places `piece` on an empty square.
    pub fn add_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.is_empty(sq), "add_piece on occupied square {sq}");
        let bit = sq.bit();
        self.bitboards[Self::bitboard_index(piece)] |= bit;
        self.occupied |= bit;
        self.grid[sq.index()] = Some(piece);
    }

    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.grid[sq.index()].take()?;
        let bit = sq.bit();
        self.bitboards[Self::bitboard_index(piece)] &= !bit;
        self.occupied &= !bit;
        Some(piece)
    }

    #[must_use]
    pub const fn get_piece(&self, sq: Square) -> Option<Piece> {
        self.grid[sq.index()]
    }

    #[must_use]
    pub const fn is_empty(&self, sq: Square) -> bool {
        self.occupied & sq.bit() == 0
    }

    pub const fn pieces(&self, piece_type: PieceType, color: Color) -> Bitboard {
        self.bitboards[color.index() * 6 + piece_type.index()]
    }

    pub fn get_color_bb(&self, color: Color) -> Bitboard {
        let start = color.index() * 6;
        self.bitboards[start..start + 6]
            .iter()
            .fold(0, |acc, bb| acc | bb)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        BitboardIterator::new(self.pieces(PieceType::King, color)).next()
    }

    /// Empty squares in a1..h8 order.
    pub fn empty_squares(&self) -> BitboardIterator {
        BitboardIterator::new(!self.occupied)
    }

    pub const fn piece_count(&self) -> u32 {
        self.occupied.count_ones()
    }

    /// Ranks flipped and colors swapped.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let mut board = Self::empty();
        for sq in BitboardIterator::new(self.occupied) {
            if let Some(piece) = self.get_piece(sq) {
                board.add_piece(
                    sq.mirror(),
                    Piece::new(piece.piece_type, piece.color.opposite()),
                );
            }
        }
        board
    }

    /// Piece placement field of a FEN string, rank 8 first.
    pub fn to_fen_placement(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                match Square::new(file, rank).and_then(|sq| self.get_piece(sq)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen
    }
}

pub struct BitboardIterator {
    bb: Bitboard,
}

impl BitboardIterator {
    pub const fn new(bb: Bitboard) -> Self {
        Self { bb }
    }
}

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bb == 0 {
            None
        } else {
            let lsb = self.bb.trailing_zeros() as usize;
            self.bb &= self.bb - 1;
            Square::from_index(lsb)
        }
    }
}
