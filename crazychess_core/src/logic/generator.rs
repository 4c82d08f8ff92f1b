use crate::engine::config::DropRegion;
use crate::engine::Move;
use crate::logic::board::{BitboardIterator, Board, Color, PieceType, Square};
use crate::logic::position::Position;
use crate::logic::rules::{
    is_in_check, is_square_attacked, BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS,
    ROOK_DIRECTIONS,
};

/// Files c..f, ranks 3..6.
const CENTER_REGION: u64 = 0x0000_3C3C_3C3C_0000;

pub struct MoveGenerator;

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// All legal moves for the side to move, in board order of the moving piece.
    pub fn generate_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves = self.generate_pseudo_legal(position);
        moves.retain(|mv| Self::keeps_king_safe(position, mv));
        moves
    }

    /// Checks if the side to move has at least one legal move.
    pub fn has_legal_moves(&self, position: &Position) -> bool {
        self.generate_pseudo_legal(position)
            .iter()
            .any(|mv| Self::keeps_king_safe(position, mv))
    }

    fn keeps_king_safe(position: &Position, mv: &Move) -> bool {
        let turn = position.turn;
        let mut next = position.clone();
        next.apply_move(mv);
        !is_in_check(&next.board, turn)
    }

    fn generate_pseudo_legal(&self, position: &Position) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let turn = position.turn;
        let board = &position.board;

        for from in BitboardIterator::new(board.get_color_bb(turn)) {
            let Some(piece) = board.get_piece(from) else {
                continue;
            };
            match piece.piece_type {
                PieceType::Pawn => self.gen_pawn_moves(position, from, &mut moves),
                PieceType::Knight => {
                    self.gen_step_moves(board, from, turn, &KNIGHT_OFFSETS, &mut moves);
                }
                PieceType::Bishop => {
                    self.gen_slider_moves(board, from, turn, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceType::Rook => {
                    self.gen_slider_moves(board, from, turn, &ROOK_DIRECTIONS, &mut moves);
                }
                PieceType::Queen => {
                    self.gen_slider_moves(board, from, turn, &ROOK_DIRECTIONS, &mut moves);
                    self.gen_slider_moves(board, from, turn, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceType::King => {
                    self.gen_step_moves(board, from, turn, &KING_OFFSETS, &mut moves);
                    self.gen_castling_moves(position, from, &mut moves);
                }
            }
        }

        moves
    }

    fn gen_pawn_moves(&self, position: &Position, from: Square, moves: &mut Vec<Move>) {
        let board = &position.board;
        let turn = position.turn;
        let forward = turn.forward();
        let (start_rank, last_rank) = match turn {
            Color::White => (1, 7),
            Color::Black => (6, 0),
        };

        let push = |to: Square, moves: &mut Vec<Move>| {
            if to.rank() == last_rank {
                for promotion in PieceType::PROMOTIONS {
                    moves.push(Move::with_promotion(from, to, promotion));
                }
            } else {
                moves.push(Move::new(from, to));
            }
        };

        // 1. Pushes
        if let Some(one) = from.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
            push(one, moves);
            if from.rank() == start_rank {
                if let Some(two) = one.offset(0, forward).filter(|&sq| board.is_empty(sq)) {
                    moves.push(Move::new(from, two));
                }
            }
        }

        // 2. Captures, en passant included
        for df in [-1, 1] {
            let Some(to) = from.offset(df, forward) else {
                continue;
            };
            let enemy = board.get_piece(to).is_some_and(|p| p.color != turn);
            if enemy || position.en_passant == Some(to) {
                push(to, moves);
            }
        }
    }

    fn gen_step_moves(
        &self,
        board: &Board,
        from: Square,
        turn: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in offsets {
            if let Some(to) = from.offset(df, dr) {
                if !board.get_piece(to).is_some_and(|p| p.color == turn) {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }

    fn gen_slider_moves(
        &self,
        board: &Board,
        from: Square,
        turn: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in directions {
            let mut current = from.offset(df, dr);
            while let Some(to) = current {
                match board.get_piece(to) {
                    None => moves.push(Move::new(from, to)),
                    Some(p) => {
                        if p.color != turn {
                            moves.push(Move::new(from, to));
                        }
                        break;
                    }
                }
                current = to.offset(df, dr);
            }
        }
    }

    fn gen_castling_moves(&self, position: &Position, from: Square, moves: &mut Vec<Move>) {
        let board = &position.board;
        let turn = position.turn;
        let rank = match turn {
            Color::White => 0,
            Color::Black => 7,
        };
        if from.rank() != rank || from.file() != 4 {
            return;
        }
        let enemy = turn.opposite();
        if is_square_attacked(board, from, enemy) {
            return;
        }

        let own_rook_on = |file: u8| {
            Square::new(file, rank)
                .and_then(|sq| board.get_piece(sq))
                .is_some_and(|p| p.piece_type == PieceType::Rook && p.color == turn)
        };
        let all_empty = |files: &[u8]| {
            files
                .iter()
                .filter_map(|&f| Square::new(f, rank))
                .all(|sq| board.is_empty(sq))
        };
        let none_attacked = |files: &[u8]| {
            files
                .iter()
                .filter_map(|&f| Square::new(f, rank))
                .all(|sq| !is_square_attacked(board, sq, enemy))
        };

        if position.castling.kingside(turn)
            && own_rook_on(7)
            && all_empty(&[5, 6])
            && none_attacked(&[5, 6])
        {
            if let Some(to) = Square::new(6, rank) {
                moves.push(Move::new(from, to));
            }
        }
        if position.castling.queenside(turn)
            && own_rook_on(0)
            && all_empty(&[1, 2, 3])
            && none_attacked(&[2, 3])
        {
            if let Some(to) = Square::new(2, rank) {
                moves.push(Move::new(from, to));
            }
        }
    }
}

/// Empty squares a piece may be dropped on, in a1..h8 order.
pub fn empty_squares(board: &Board, region: DropRegion) -> Vec<Square> {
    let mask = match region {
        DropRegion::Anywhere => u64::MAX,
        DropRegion::Center => CENTER_REGION,
    };
    BitboardIterator::new(!board.occupied & mask).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perft(position: &Position, depth: u8) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = MoveGenerator::new().generate_moves(position);
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|mv| {
                let mut next = position.clone();
                next.apply_move(mv);
                perft(&next, depth - 1)
            })
            .sum()
    }

    #[test]
    fn test_perft_start_position() {
        let position = Position::new();
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8902);
    }

    #[test]
    fn test_perft_kiwipete() {
        // Castling, en passant, promotions and pins all in one position.
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&position, 1), 48);
        assert_eq!(perft(&position, 2), 2039);
    }

    #[test]
    fn test_perft_rook_endgame() {
        let position = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&position, 1), 14);
        assert_eq!(perft(&position, 2), 191);
        assert_eq!(perft(&position, 3), 2812);
    }

    #[test]
    fn test_promotions_generate_four_moves() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let promotions = MoveGenerator::new()
            .generate_moves(&position)
            .into_iter()
            .filter(|mv| mv.promotion.is_some())
            .count();
        assert_eq!(promotions, 4);
    }

    #[test]
    fn test_no_legal_moves_when_stalemated() {
        let position = Position::from_fen("k7/8/8/8/8/8/5q2/7K w - - 0 1").unwrap();
        let generator = MoveGenerator::new();
        assert!(generator.generate_moves(&position).is_empty());
        assert!(!generator.has_legal_moves(&position));
    }

    #[test]
    fn test_dropped_pawn_on_last_rank_is_handled() {
        // A white pawn dropped on the 8th rank has nowhere to go.
        let position = Position::from_fen("P7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
        let moves = MoveGenerator::new().generate_moves(&position);
        assert!(moves.iter().all(|mv| mv.from == Square::parse("h1").unwrap()));
    }

    #[test]
    fn test_empty_squares() {
        let board = Board::new();
        let squares = empty_squares(&board, DropRegion::Anywhere);
        assert_eq!(squares.len(), 32);
        assert_eq!(squares.first(), Square::parse("a3").as_ref());
        assert_eq!(squares.last(), Square::parse("h6").as_ref());
        assert!(squares.iter().all(|&sq| board.is_empty(sq)));

        let center = empty_squares(&board, DropRegion::Center);
        assert_eq!(center.len(), 16);
        assert!(center
            .iter()
            .all(|sq| (2..=5).contains(&sq.file()) && (2..=5).contains(&sq.rank())));
    }

    #[test]
    fn test_empty_squares_full_board() {
        let mut board = Board::new();
        for sq in Square::all() {
            if board.is_empty(sq) {
                board.add_piece(sq, crate::logic::board::Piece::new(PieceType::Pawn, Color::White));
            }
        }
        assert!(empty_squares(&board, DropRegion::Anywhere).is_empty());
    }
}
