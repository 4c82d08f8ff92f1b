use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::BitboardIterator;
use crate::logic::eval_constants::get_pst_value;
use crate::logic::position::Position;
use std::sync::Arc;

/// Material plus piece-square score, White positive.
pub struct SimpleEvaluator {
    config: Arc<EngineConfig>,
}

impl SimpleEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }
}

impl Evaluator for SimpleEvaluator {
    fn evaluate(&self, position: &Position) -> i32 {
        let board = &position.board;
        let mut score = 0;

        // Only occupied squares are visited.
        for sq in BitboardIterator::new(board.occupied) {
            let Some(piece) = board.get_piece(sq) else {
                continue;
            };
            let value = self.config.piece_value(piece.piece_type)
                + get_pst_value(piece.piece_type, piece.color, sq);
            score += piece.color.sign() * value;
        }

        score
    }
}
