//! Command-line interface definitions.

pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "learnora",
    version,
    about = "Semantic search and roadmap building over a learning-resource corpus"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (overrides discovery)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logging entirely
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
