//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;
use serde::Serialize;

pub mod fishbone;
pub mod roadmap;
pub mod search;
pub mod share;

use crate::app::AppContext;
use crate::error::{LearnoraError, Result};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the corpus for the most similar resources
    Search(search::SearchArgs),

    /// Build a learning roadmap for a query
    Roadmap(roadmap::RoadmapArgs),

    /// Build a fishbone diagram for a query
    Fishbone(fishbone::FishboneArgs),

    /// Save and fetch shared roadmaps
    Share(share::ShareArgs),
}

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args),
        Commands::Roadmap(args) => roadmap::run(ctx, args),
        Commands::Fishbone(args) => fishbone::run(ctx, args),
        Commands::Share(args) => share::run(ctx, args),
    }
}

/// Reject empty query text before it reaches the engine.
pub(crate) fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(LearnoraError::InvalidQuery(
            "query text must be non-empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Print a value as pretty JSON on stdout (robot mode).
pub(crate) fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| LearnoraError::Serialization(format!("encode output: {err}")))?;
    println!("{payload}");
    Ok(())
}
