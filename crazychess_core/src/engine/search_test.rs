use crate::engine::config::{DropRegion, EngineConfig};
use crate::engine::eval::SimpleEvaluator;
use crate::engine::search::{AlphaBeta, DropDomain, MoveDomain, INFINITY};
use crate::engine::SearchDomain;
use crate::logic::board::{Color, PieceType};
use crate::logic::game::CapturedPiece;
use crate::logic::position::Position;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Hand-built game tree. Inner nodes carry the static score used when the
/// depth runs out above the leaves.
#[derive(Debug, Clone)]
enum Tree {
    Leaf(i32),
    Node(i32, Vec<Tree>),
}

impl Tree {
    fn node(children: Vec<Self>) -> Self {
        Self::Node(0, children)
    }

    fn leaves(values: &[i32]) -> Self {
        Self::node(values.iter().map(|&v| Self::Leaf(v)).collect())
    }

    fn at(&self, path: &[usize]) -> &Self {
        path.iter().fold(self, |tree, &i| match tree {
            Self::Node(_, children) => children.get(i).unwrap_or(tree),
            Self::Leaf(_) => tree,
        })
    }

    fn random(rng: &mut StdRng, depth: u8) -> Self {
        let width = if depth == 0 { 0 } else { rng.gen_range(0..=4) };
        if width == 0 {
            return Self::Leaf(rng.gen_range(-100..=100));
        }
        let children = (0..width).map(|_| Self::random(rng, depth - 1)).collect();
        Self::Node(rng.gen_range(-100..=100), children)
    }
}

/// State is the path of child indices from the root.
struct TreeDomain {
    root: Tree,
}

impl SearchDomain for TreeDomain {
    type State = Vec<usize>;
    type Transition = usize;

    fn successors(&self, state: &Vec<usize>) -> Vec<usize> {
        match self.root.at(state) {
            Tree::Leaf(_) => Vec::new(),
            Tree::Node(_, children) => (0..children.len()).collect(),
        }
    }

    fn apply(&self, state: &mut Vec<usize>, transition: usize) {
        state.push(transition);
    }

    fn evaluate(&self, state: &Vec<usize>) -> i32 {
        match self.root.at(state) {
            Tree::Leaf(value) | Tree::Node(value, _) => *value,
        }
    }
}

#[test]
fn test_textbook_tree() {
    let domain = TreeDomain {
        root: Tree::node(vec![
            Tree::leaves(&[3, 12, 8]),
            Tree::leaves(&[2, 4, 6]),
            Tree::leaves(&[14, 5, 2]),
        ]),
    };
    let mut search = AlphaBeta::new(&domain);
    assert_eq!(search.best_root(&Vec::new(), 1), (3, Some(0)));
}

#[test]
fn test_ties_keep_first_candidate() {
    let domain = TreeDomain {
        root: Tree::node(vec![
            Tree::leaves(&[4, 9]),
            Tree::leaves(&[7, 4]),
            Tree::leaves(&[4]),
        ]),
    };
    let mut search = AlphaBeta::new(&domain);
    assert_eq!(search.best_root(&Vec::new(), 1), (4, Some(0)));
}

#[test]
fn test_cutoff_skips_remaining_siblings() {
    // X -> M1 [5, 6], M2 [1, 7]: once M2 shows 1, its 7 cannot matter.
    let domain = TreeDomain {
        root: Tree::node(vec![Tree::node(vec![
            Tree::leaves(&[5, 6]),
            Tree::leaves(&[1, 7]),
        ])]),
    };

    let mut pruned = AlphaBeta::new(&domain);
    let value = pruned.search(&Vec::new(), 0, 2, -INFINITY, INFINITY, true);
    let mut full = AlphaBeta::new(&domain);
    let reference = full.minimax(&Vec::new(), 0, 2, true);

    assert_eq!(value, 5);
    assert_eq!(reference, 5);
    assert_eq!(pruned.nodes(), 6);
    assert_eq!(full.nodes(), 7);
}

#[test]
fn test_depth_zero_is_static() {
    let domain = TreeDomain {
        root: Tree::node(vec![Tree::Node(42, vec![Tree::Leaf(-5)])]),
    };
    let mut search = AlphaBeta::new(&domain);
    assert_eq!(search.search(&Vec::new(), 0, 0, -INFINITY, INFINITY, false), 42);
    assert_eq!(search.nodes(), 1);
}

#[test]
fn test_early_leaf_scores_statically() {
    // Depth left over at a leaf must not recurse.
    let domain = TreeDomain {
        root: Tree::node(vec![Tree::Leaf(17)]),
    };
    let mut search = AlphaBeta::new(&domain);
    assert_eq!(search.search(&Vec::new(), 0, 5, -INFINITY, INFINITY, true), 17);
    assert_eq!(search.best_root(&Vec::new(), 5), (17, Some(0)));
}

#[test]
fn test_root_without_candidates() {
    let domain = TreeDomain {
        root: Tree::Leaf(-3),
    };
    let mut search = AlphaBeta::new(&domain);
    assert_eq!(search.best_root(&Vec::new(), 3), (-3, None));
}

#[test]
fn test_pruning_matches_minimax_on_random_trees() {
    let mut rng = StdRng::seed_from_u64(0x0c0f_fee0);
    for _ in 0..200 {
        let depth = rng.gen_range(1..=5);
        let domain = TreeDomain {
            root: Tree::node(vec![Tree::random(&mut rng, depth)]),
        };
        for maximizing in [true, false] {
            let mut pruned = AlphaBeta::new(&domain);
            let mut full = AlphaBeta::new(&domain);
            let value = pruned.search(&Vec::new(), 0, depth, -INFINITY, INFINITY, maximizing);
            let reference = full.minimax(&Vec::new(), 0, depth, maximizing);
            assert_eq!(value, reference, "{:?}", domain.root);
            assert!(pruned.nodes() <= full.nodes());
        }
    }
}

#[test]
fn test_root_choice_matches_minimax_on_random_trees() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let depth = rng.gen_range(1..=4);
        let width = rng.gen_range(1..=5);
        let root = Tree::node((0..width).map(|_| Tree::random(&mut rng, depth)).collect());
        let domain = TreeDomain { root };

        let mut expected: Option<(i32, usize)> = None;
        for candidate in domain.successors(&Vec::new()) {
            let score = AlphaBeta::new(&domain).minimax(&Vec::new(), candidate, depth - 1, false);
            match expected {
                Some((best, _)) if score <= best => {}
                _ => expected = Some((score, candidate)),
            }
        }

        let (score, choice) = AlphaBeta::new(&domain).best_root(&Vec::new(), depth - 1);
        assert_eq!(Some((score, choice.unwrap())), expected);
    }
}

#[test]
fn test_move_domain_matches_minimax() {
    let evaluator = SimpleEvaluator::new(Arc::new(EngineConfig::default()));
    let position = Position::from_fen("4k3/8/3p4/4n3/3P1B2/8/8/4K2R w K - 0 1").unwrap();
    let domain = MoveDomain::new(&evaluator, Color::White);

    for candidate in domain.successors(&position) {
        let value =
            AlphaBeta::new(&domain).search(&position, candidate, 2, -INFINITY, INFINITY, false);
        let reference = AlphaBeta::new(&domain).minimax(&position, candidate, 2, false);
        assert_eq!(value, reference, "{candidate}");
    }
}

#[test]
fn test_drop_domain_matches_minimax() {
    let evaluator = SimpleEvaluator::new(Arc::new(EngineConfig::default()));
    let position =
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    let token = CapturedPiece {
        piece_type: PieceType::Bishop,
        original_owner: Color::Black,
    };
    let domain = DropDomain::new(&evaluator, token, DropRegion::Center);
    assert_eq!(domain.piece().color, Color::White);

    for candidate in domain.successors(&position) {
        let value =
            AlphaBeta::new(&domain).search(&position, candidate, 2, -INFINITY, INFINITY, false);
        let reference = AlphaBeta::new(&domain).minimax(&position, candidate, 2, false);
        assert_eq!(value, reference, "{candidate}");
    }
}

#[test]
fn test_drop_domain_keeps_ownership_across_plies() {
    let evaluator = SimpleEvaluator::new(Arc::new(EngineConfig::default()));
    let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let token = CapturedPiece {
        piece_type: PieceType::Knight,
        original_owner: Color::White,
    };
    let domain = DropDomain::new(&evaluator, token, DropRegion::Anywhere);

    let mut state = position;
    for sq in domain.successors(&state).into_iter().take(3) {
        domain.apply(&mut state, sq);
    }
    let knights = state.board.pieces(PieceType::Knight, Color::Black);
    assert_eq!(knights.count_ones(), 3);
    assert_eq!(state.board.pieces(PieceType::Knight, Color::White), 0);
}
