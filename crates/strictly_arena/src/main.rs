//! Strictly Arena - Unified CLI
//!
//! Start, advance and analyse games from the shell, or play against the advisor.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command, GameArgs};
use std::io::{BufRead, Read, Write};
use std::path::Path;
use std::time::Duration;
use strictly_arena::{ArenaConfig, SeatKind, SessionManager};
use strictly_infinite::{GameState, Player, Position, deserialize, serialize};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

const HUMAN_ID: &str = "human";
const ADVISOR_ID: &str = "advisor";
const GAME_ID: &str = "terminal";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries game state.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::New { game } => run_new(game),
        Command::Apply { state, position } => run_apply(&state, position),
        Command::Recommend { state, depth } => run_recommend(&state, depth),
        Command::Play {
            game,
            human,
            depth,
            think_secs,
        } => run_play(game, human, depth, Duration::from_secs(think_secs)).await,
    }
}

/// Merges the config file with command-line overrides.
#[instrument]
fn load_config(args: GameArgs) -> Result<ArenaConfig> {
    let mut config = match &args.config {
        Some(path) => ArenaConfig::from_file(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(mode) = args.mode {
        config = config.with_mode(mode);
    }
    if let Some(max) = args.max_pieces {
        config = config.with_max_pieces_per_player(max);
    }
    if let Some(policy) = args.starting_player {
        config = config.with_starting_player(policy);
    }
    config.rules()?;
    Ok(config)
}

fn read_state(path: &Path) -> Result<GameState> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read state from stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state from {}", path.display()))?
    };
    Ok(deserialize(&text)?)
}

fn run_new(args: GameArgs) -> Result<()> {
    let config = load_config(args)?;
    let state = GameState::new(config.rules()?, config.starting_player().resolve());
    println!("{}", serialize(&state)?);
    Ok(())
}

fn run_apply(path: &Path, index: usize) -> Result<()> {
    let state = read_state(path)?;
    let Some(position) = Position::from_index(index) else {
        bail!("Position {} is off the board, expected 0-8", index);
    };
    let next = state.apply_move(position, state.side_to_act())?;
    println!("{}", serialize(&next)?);
    Ok(())
}

fn run_recommend(path: &Path, depth: Option<u32>) -> Result<()> {
    let state = read_state(path)?;
    match SessionManager::new().recommend(&serialize(&state)?, depth)? {
        Some(index) => println!("{}", index),
        None => println!("none"),
    }
    Ok(())
}

/// Human against the advisor, through a session like any other client.
async fn run_play(args: GameArgs, human: Player, depth: Option<u32>, think: Duration) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(depth) = depth {
        config = config.with_advisor_depth(depth);
    }

    let manager = SessionManager::new().with_advisor_depth(config.advisor().depth());
    manager.create_session(GAME_ID.to_string(), config.rules()?, *config.starting_player())?;

    // Seats fill X first.
    let seats = match human {
        Player::X => [(HUMAN_ID, SeatKind::Human), (ADVISOR_ID, SeatKind::Advisor)],
        Player::O => [(ADVISOR_ID, SeatKind::Advisor), (HUMAN_ID, SeatKind::Human)],
    };
    for (id, kind) in seats {
        manager.register_player(GAME_ID, id.to_string(), id.to_string(), kind)?;
    }

    info!(%human, mode = %config.mode(), "Starting terminal game");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(session) = manager.get_session(GAME_ID)? else {
            bail!("Game {} disappeared", GAME_ID);
        };
        let state = session.state;
        println!("\n{}\n", state.board().display());

        if let Some(outcome) = state.outcome() {
            println!("{}", outcome);
            return Ok(());
        }

        if state.side_to_act() == human {
            print!("Your move ({}), 0-8: ", human);
            std::io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            let Some(position) = Position::from_label_or_number(line.trim()) else {
                println!("Enter a square number or name, e.g. 4 or center");
                continue;
            };
            if let Err(e) = manager.submit_move(GAME_ID, HUMAN_ID, position.to_index()) {
                println!("{}", e);
            }
        } else {
            let index = manager
                .recommend_async(serialize(&state)?, None, think)
                .await?
                .context("Advisor found no move in a live game")?;
            println!("Advisor plays {}", index);
            manager.submit_move(GAME_ID, ADVISOR_ID, index)?;
        }
    }
}
