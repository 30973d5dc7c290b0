//! Command-line interface for strictly_arena.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strictly_arena::StartingPolicy;
use strictly_infinite::{GameMode, Player};

/// Strictly Arena - classic and infinite tic-tac-toe
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Play, check and analyse infinite-mode tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Game setup shared by commands that start a game.
#[derive(Args, Debug)]
pub struct GameArgs {
    /// Path to arena config (TOML)
    #[arg(short, long, env = "STRICTLY_ARENA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Game mode, overriding the config
    #[arg(long)]
    pub mode: Option<GameMode>,

    /// Live pieces per side, overriding the config
    #[arg(long)]
    pub max_pieces: Option<usize>,

    /// Starting side: x, o or random
    #[arg(long)]
    pub starting_player: Option<StartingPolicy>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a fresh game state as JSON
    New {
        #[command(flatten)]
        game: GameArgs,
    },

    /// Apply a move for the side to act and print the new state
    Apply {
        /// State file, or - for stdin
        #[arg(short, long, default_value = "-")]
        state: PathBuf,

        /// Flat board index, 0-8
        position: usize,
    },

    /// Print the advisor's move for the side to act
    Recommend {
        /// State file, or - for stdin
        #[arg(short, long, default_value = "-")]
        state: PathBuf,

        /// Search depth (defaults per mode)
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Play against the advisor in the terminal
    Play {
        #[command(flatten)]
        game: GameArgs,

        /// Side you play
        #[arg(long, default_value = "x")]
        human: Player,

        /// Search depth, overriding the config
        #[arg(short, long)]
        depth: Option<u32>,

        /// Seconds the advisor may think per move
        #[arg(long, default_value = "10")]
        think_secs: u64,
    },
}
