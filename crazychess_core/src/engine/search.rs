use crate::engine::config::{ConfigError, DropRegion, EngineConfig};
use crate::engine::eval::SimpleEvaluator;
use crate::engine::{Evaluator, Move, SearchDomain, SearchResult, SearchStats};
use crate::logic::board::{Color, Piece, Square};
use crate::logic::game::CapturedPiece;
use crate::logic::generator::{empty_squares, MoveGenerator};
use crate::logic::position::Position;
use std::sync::Arc;
use std::time::Instant;

/// Larger than any reachable evaluation.
pub const INFINITY: i32 = 1_000_000_000;

/// Fixed-depth alpha-beta over any [`SearchDomain`]. Successors are tried in
/// the order the domain yields them; there is no move ordering.
pub struct AlphaBeta<'a, D: SearchDomain> {
    domain: &'a D,
    nodes: u32,
}

impl<'a, D: SearchDomain> AlphaBeta<'a, D> {
    pub const fn new(domain: &'a D) -> Self {
        Self { domain, nodes: 0 }
    }

    /// Nodes visited since construction.
    pub const fn nodes(&self) -> u32 {
        self.nodes
    }

    /// Applies `pending` to a copy of `state` and scores the result with
    /// `depth` further plies. A node without successors scores statically.
    pub fn search(
        &mut self,
        state: &D::State,
        pending: D::Transition,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;
        let mut next = state.clone();
        self.domain.apply(&mut next, pending);

        if depth == 0 {
            return self.domain.evaluate(&next);
        }
        let successors = self.domain.successors(&next);
        if successors.is_empty() {
            return self.domain.evaluate(&next);
        }

        if maximizing {
            let mut best = -INFINITY;
            for transition in successors {
                let value = self.search(&next, transition, depth - 1, alpha, beta, false);
                best = best.max(value);
                if best >= beta {
                    break;
                }
                alpha = alpha.max(best);
            }
            best
        } else {
            let mut best = INFINITY;
            for transition in successors {
                let value = self.search(&next, transition, depth - 1, alpha, beta, true);
                best = best.min(value);
                if best <= alpha {
                    break;
                }
                beta = beta.min(best);
            }
            best
        }
    }

    /// Same contract as [`AlphaBeta::search`] without pruning.
    pub fn minimax(
        &mut self,
        state: &D::State,
        pending: D::Transition,
        depth: u8,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;
        let mut next = state.clone();
        self.domain.apply(&mut next, pending);

        if depth == 0 {
            return self.domain.evaluate(&next);
        }
        let successors = self.domain.successors(&next);
        if successors.is_empty() {
            return self.domain.evaluate(&next);
        }

        let scores = successors
            .into_iter()
            .map(|transition| self.minimax(&next, transition, depth - 1, !maximizing));
        if maximizing {
            scores.fold(-INFINITY, i32::max)
        } else {
            scores.fold(INFINITY, i32::min)
        }
    }

    /// Scores every root candidate in a fresh window, the reply being the
    /// minimizing side. Only a strictly better score replaces the best
    /// candidate, so the first one seen wins ties. Without candidates the
    /// root's static score is returned with no choice.
    pub fn best_root(&mut self, root: &D::State, depth: u8) -> (i32, Option<D::Transition>) {
        let mut best_score = -INFINITY;
        let mut best = None;

        for candidate in self.domain.successors(root) {
            let score = self.search(root, candidate, depth, -INFINITY, INFINITY, false);
            log::debug!("candidate {candidate}: {score}");
            if best.is_none() || score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        if best.is_none() {
            best_score = self.domain.evaluate(root);
        }
        (best_score, best)
    }
}

/// Legal chess moves, scored for `perspective`.
pub struct MoveDomain<'a, E: Evaluator> {
    evaluator: &'a E,
    generator: MoveGenerator,
    perspective: Color,
}

impl<'a, E: Evaluator> MoveDomain<'a, E> {
    pub const fn new(evaluator: &'a E, perspective: Color) -> Self {
        Self {
            evaluator,
            generator: MoveGenerator::new(),
            perspective,
        }
    }
}

impl<E: Evaluator> SearchDomain for MoveDomain<'_, E> {
    type State = Position;
    type Transition = Move;

    fn successors(&self, state: &Position) -> Vec<Move> {
        self.generator.generate_moves(state)
    }

    fn apply(&self, state: &mut Position, mv: Move) {
        state.apply_move(&mv);
    }

    fn evaluate(&self, state: &Position) -> i32 {
        self.perspective.sign() * self.evaluator.evaluate(state)
    }
}

/// Placements of one dropped piece on empty squares. Every ply places the
/// same piece; ownership is fixed when the domain is built.
pub struct DropDomain<'a, E: Evaluator> {
    evaluator: &'a E,
    piece: Piece,
    region: DropRegion,
}

impl<'a, E: Evaluator> DropDomain<'a, E> {
    pub const fn new(evaluator: &'a E, token: CapturedPiece, region: DropRegion) -> Self {
        Self {
            evaluator,
            piece: token.as_dropped(),
            region,
        }
    }

    pub const fn piece(&self) -> Piece {
        self.piece
    }
}

impl<E: Evaluator> SearchDomain for DropDomain<'_, E> {
    type State = Position;
    type Transition = Square;

    fn successors(&self, state: &Position) -> Vec<Square> {
        empty_squares(&state.board, self.region)
    }

    fn apply(&self, state: &mut Position, sq: Square) {
        state.board.add_piece(sq, self.piece);
    }

    fn evaluate(&self, state: &Position) -> i32 {
        self.piece.color.sign() * self.evaluator.evaluate(state)
    }
}

pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: SimpleEvaluator,
    nodes_searched: u32,
}

impl AlphaBetaEngine {
    /// # Errors
    /// Fails when `config` does not pass [`EngineConfig::validate`].
    pub fn new(config: Arc<EngineConfig>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            evaluator: SimpleEvaluator::new(config.clone()),
            config,
            nodes_searched: 0,
        })
    }

    /// # Errors
    /// Keeps the current config when `config` is rejected.
    pub fn update_config(&mut self, config: Arc<EngineConfig>) -> Result<(), ConfigError> {
        config.validate()?;
        self.evaluator = SimpleEvaluator::new(config.clone());
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Nodes visited by the last search.
    pub const fn nodes_searched(&self) -> u32 {
        self.nodes_searched
    }

    /// Static score of `position`, White positive.
    pub fn evaluate(&self, position: &Position) -> i32 {
        self.evaluator.evaluate(position)
    }

    /// Best legal move for the side to move. `choice` is `None` when there
    /// is no legal move.
    pub fn best_move(&mut self, position: &Position) -> SearchResult<Move> {
        let domain = MoveDomain::new(&self.evaluator, position.turn);
        let result = Self::run(&domain, position, self.config.search_depth);
        self.nodes_searched = result.stats.nodes;
        log::info!(
            "best move for {}: {} score {} (depth {}, {} nodes, {} ms)",
            position.turn,
            result.choice.map_or_else(|| "none".to_string(), |mv| mv.to_string()),
            result.score,
            result.stats.depth,
            result.stats.nodes,
            result.stats.time_ms
        );
        result
    }

    /// Best empty square for `token`, placed under inverted ownership.
    /// `choice` is `None` when no square in the configured region is empty.
    pub fn best_drop_square(
        &mut self,
        position: &Position,
        token: CapturedPiece,
    ) -> SearchResult<Square> {
        let domain = DropDomain::new(&self.evaluator, token, self.config.drop_region);
        let result = Self::run(&domain, position, self.config.search_depth);
        self.nodes_searched = result.stats.nodes;
        log::info!(
            "best drop for {} {:?}: {} score {} (depth {}, {} nodes, {} ms)",
            domain.piece().color,
            domain.piece().piece_type,
            result.choice.map_or_else(|| "none".to_string(), |sq| sq.to_string()),
            result.score,
            result.stats.depth,
            result.stats.nodes,
            result.stats.time_ms
        );
        result
    }

    fn run<D>(domain: &D, root: &D::State, depth: u8) -> SearchResult<D::Transition>
    where
        D: SearchDomain,
    {
        let start = Instant::now();
        let mut search = AlphaBeta::new(domain);
        let (score, choice) = search.best_root(root, depth);

        SearchResult {
            score,
            choice,
            stats: SearchStats {
                depth,
                nodes: search.nodes(),
                #[allow(clippy::cast_possible_truncation)]
                time_ms: start.elapsed().as_millis() as u64,
            },
        }
    }
}
