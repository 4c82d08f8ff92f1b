use crate::render;
use anyhow::{Context, Result};
use clap::ValueEnum;
use crazychess_core::engine::config::EngineConfig;
use crazychess_core::engine::search::AlphaBetaEngine;
use crazychess_core::engine::Move;
use crazychess_core::logic::board::{Color, Square};
use crazychess_core::logic::game::{CapturedPiece, GameState, GameStatus};
use crazychess_core::logic::generator::empty_squares;
use crazychess_core::logic::position::Position;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Self::White,
            Side::Black => Self::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Player {
    Human,
    Random,
    Engine,
}

pub struct Settings {
    pub config: EngineConfig,
    pub human: Color,
    pub auto: bool,
    pub fen: Option<String>,
    pub max_turns: u32,
    pub history: Option<PathBuf>,
}

impl Settings {
    fn player(&self, color: Color) -> Player {
        match (color == self.human, self.auto) {
            (true, false) => Player::Human,
            (true, true) => Player::Random,
            (false, _) => Player::Engine,
        }
    }
}

struct Session<'a> {
    settings: &'a Settings,
    game: GameState,
    engine: AlphaBetaEngine,
    rng: ThreadRng,
    input: io::StdinLock<'static>,
}

pub fn run(settings: Settings) -> Result<()> {
    let position = match &settings.fen {
        Some(fen) => Position::from_fen(fen).context("parsing --fen")?,
        None => Position::new(),
    };

    let engine = AlphaBetaEngine::new(Arc::new(settings.config.clone()))?;
    let mut session = Session {
        game: GameState::from_position(position),
        engine,
        rng: rand::thread_rng(),
        input: io::stdin().lock(),
        settings: &settings,
    };

    let mut turns = 0;
    while session.game.status == GameStatus::Playing && turns < settings.max_turns {
        println!("{}", render::board(&session.game.position));
        if !session.play_turn()? {
            log::info!("game stopped");
            break;
        }
        turns += 1;
    }

    println!("{}", render::board(&session.game.position));
    println!("{}", render::outcome(&session.game, turns));

    if let Some(path) = &settings.history {
        let json = serde_json::to_string_pretty(&session.game.history)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("history written to {}", path.display());
    }
    Ok(())
}

impl Session<'_> {
    /// One full turn: a move, then the drop if it captured. Returns `false`
    /// when the game cannot go on: the human quit or nothing could be played.
    fn play_turn(&mut self) -> Result<bool> {
        let color = self.game.position.turn;
        let player = self.settings.player(color);

        let Some(mv) = self.choose_move(player)? else {
            return Ok(false);
        };
        let Some(token) = self.game.make_move(mv)? else {
            println!("{color} plays {mv}");
            return Ok(true);
        };
        println!("{color} plays {mv}, taking {:?}", token.piece_type);

        if self.game.status == GameStatus::BoardFull {
            return Ok(true);
        }
        let Some(sq) = self.choose_drop(player, token)? else {
            return Ok(false);
        };
        let piece = self.game.drop_pending(sq)?;
        println!("{} drops {:?} on {sq}", piece.color, piece.piece_type);
        Ok(true)
    }

    fn choose_move(&mut self, player: Player) -> Result<Option<Move>> {
        match player {
            Player::Engine => {
                let result = self.engine.best_move(&self.game.position);
                Ok(result.choice)
            }
            Player::Random => Ok(self.game.legal_moves().choose(&mut self.rng).copied()),
            Player::Human => loop {
                let Some(line) = self.prompt(&format!("{} to move: ", self.game.position.turn))?
                else {
                    return Ok(None);
                };
                let Some(mv) = Move::parse(&line) else {
                    println!("enter a move like e2e4 or e7e8q, or quit");
                    continue;
                };
                if self.game.legal_moves().contains(&mv) {
                    return Ok(Some(mv));
                }
                println!("{mv} is not a legal move");
            },
        }
    }

    fn choose_drop(&mut self, player: Player, token: CapturedPiece) -> Result<Option<Square>> {
        let region = self.settings.config.drop_region;
        let empty = empty_squares(&self.game.position.board, region);
        match player {
            Player::Engine => Ok(self.engine_drop(token)),
            Player::Random => Ok(pick_or_warn(empty.choose(&mut self.rng).copied(), token)),
            Player::Human => loop {
                let question = format!(
                    "drop {:?} for {} (square, empty line lets the engine pick): ",
                    token.piece_type,
                    token.new_owner()
                );
                let Some(line) = self.prompt(&question)? else {
                    return Ok(None);
                };
                if line.is_empty() {
                    return Ok(self.engine_drop(token));
                }
                match Square::parse(&line) {
                    Some(sq) if empty.contains(&sq) => return Ok(Some(sq)),
                    Some(sq) => println!("{sq} is not available for a drop"),
                    None => println!("enter a square like e4"),
                }
            },
        }
    }

    fn engine_drop(&mut self, token: CapturedPiece) -> Option<Square> {
        let choice = self
            .engine
            .best_drop_square(&self.game.position, token)
            .choice;
        pick_or_warn(choice, token)
    }

    /// Reads one trimmed line. `None` on end of input or `quit`.
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        print!("{question}");
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }
}

/// Passes `choice` through, warning when no square was available.
fn pick_or_warn(choice: Option<Square>, token: CapturedPiece) -> Option<Square> {
    if choice.is_none() {
        log::warn!("no square left for the {:?}", token.piece_type);
    }
    choice
}
