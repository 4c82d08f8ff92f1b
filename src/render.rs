use crazychess_core::logic::board::Square;
use crazychess_core::logic::game::{GameState, GameStatus};
use crazychess_core::logic::position::Position;

/// Text diagram, rank 8 on top. White pieces upper case, empty squares `.`.
pub fn board(position: &Position) -> String {
    let mut out = String::with_capacity(200);
    for rank in (0..8).rev() {
        out.push(char::from(b'1' + rank));
        for file in 0..8 {
            let c = Square::new(file, rank)
                .and_then(|sq| position.board.get_piece(sq))
                .map_or('.', |piece| piece.to_fen_char());
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h\n");
    out.push_str(&format!("{} to move", position.turn));
    out
}

pub fn outcome(game: &GameState, turns: u32) -> String {
    match game.status {
        GameStatus::Playing => format!("stopped after {turns} moves"),
        GameStatus::NoLegalMoves(color) => {
            format!("{color} has no legal move after {turns} moves")
        }
        GameStatus::BoardFull => format!("board full after {turns} moves, nowhere to drop"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_diagram() {
        let text = board(&Position::new());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first().copied(), Some("8 r n b q k b n r"));
        assert_eq!(lines.get(4).copied(), Some("4 . . . . . . . ."));
        assert_eq!(lines.get(7).copied(), Some("1 R N B Q K B N R"));
        assert_eq!(lines.last().copied(), Some("White to move"));
    }

    #[test]
    fn test_outcome_text() {
        let position = Position::from_fen("k7/8/8/8/8/8/5q2/7K w - - 0 1").unwrap();
        let game = GameState::from_position(position);
        assert_eq!(outcome(&game, 0), "White has no legal move after 0 moves");
    }
}
