mod app;
mod render;

use anyhow::{Context, Result};
use app::{Settings, Side};
use clap::Parser;
use crazychess_core::engine::config::EngineConfig;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Chess where captured pieces come back for the capturer",
    long_about = None
)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Search depth, overrides the config file
    #[arg(long)]
    depth: Option<u8>,

    /// Engine tuning file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color played from the keyboard
    #[arg(long, value_enum, default_value_t = Side::White)]
    human_color: Side,

    /// Let a random mover take the human's seat
    #[arg(long)]
    auto: bool,

    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,

    /// Stop after this many moves
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Write the move history as JSON when the game ends
    #[arg(long)]
    history: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| {
        writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
    })
    .target(env_logger::Target::Stderr)
    .init();

    if let Err(e) = run(args) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::load_from_json(&json)
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(depth) = args.depth {
        config.search_depth = depth;
    }
    config.validate()?;
    log::debug!("engine config: {config:?}");

    app::run(Settings {
        config,
        human: args.human_color.into(),
        auto: args.auto,
        fen: args.fen,
        max_turns: args.max_turns,
        history: args.history,
    })
}
