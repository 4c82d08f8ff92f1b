use crate::logic::board::{PieceType, Square};
use crate::logic::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod eval;
pub mod search;

#[cfg(test)]
mod search_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub const fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Parses coordinate notation: `e2e4`, `e7e8q`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let from = Square::parse(text.get(0..2)?)?;
        let to = Square::parse(text.get(2..4)?)?;
        match text.get(4..) {
            None | Some("") => Some(Self::new(from, to)),
            Some(suffix) => {
                let mut chars = suffix.chars();
                let piece_type = PieceType::from_char(chars.next()?)?;
                if chars.next().is_some()
                    || matches!(piece_type, PieceType::Pawn | PieceType::King)
                {
                    return None;
                }
                Some(Self::with_promotion(from, to, piece_type))
            }
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(pt) = self.promotion {
            write!(f, "{}", pt.to_char())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u32,
    pub time_ms: u64,
}

/// Outcome of a root search. `choice` is `None` when the root had no
/// candidates (no legal move, or no empty square).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub score: i32,
    pub choice: Option<T>,
    pub stats: SearchStats,
}

pub trait Evaluator {
    /// White-positive static score.
    fn evaluate(&self, position: &Position) -> i32;
}

/// The game a search runs over: what can follow a state, how a transition
/// is applied, and how a reached state is scored for the searching side.
pub trait SearchDomain {
    type State: Clone;
    type Transition: Copy + fmt::Display;

    fn successors(&self, state: &Self::State) -> Vec<Self::Transition>;

    fn apply(&self, state: &mut Self::State, transition: Self::Transition);

    fn evaluate(&self, state: &Self::State) -> i32;
}
