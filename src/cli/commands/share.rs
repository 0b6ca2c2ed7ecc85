//! learnora share - save and fetch shared roadmaps
//!
//! Share commands only touch the flat-file store, so they run without the
//! search service (no model or corpus load).

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde_json::Value;

use crate::app::AppContext;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{LearnoraError, Result};
use crate::storage::ShareStore;

use super::emit_json;

#[derive(Args, Debug)]
pub struct ShareArgs {
    #[command(subcommand)]
    pub command: ShareCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShareCommand {
    /// Save a roadmap JSON payload and print its share id
    Save(SaveArgs),

    /// Fetch a shared roadmap by id
    Get(GetArgs),

    /// List saved roadmaps, newest first
    List,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// JSON payload file ("-" reads stdin)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Share id
    pub id: String,
}

pub fn run(ctx: &AppContext, args: &ShareArgs) -> Result<()> {
    execute(&ctx.config, &ctx.root, ctx.robot_mode, &args.command)
}

/// Entry point used by main: resolves root and config itself.
pub fn run_without_search(cli: &Cli, args: &ShareArgs) -> Result<()> {
    let root = crate::app::find_root()?;
    let config = Config::load(cli.config.as_deref(), &root)?;
    execute(&config, &root, cli.robot, &args.command)
}

fn execute(config: &Config, root: &Path, robot: bool, command: &ShareCommand) -> Result<()> {
    let store = ShareStore::open(config.share.file(root))?;

    match command {
        ShareCommand::Save(args) => {
            let payload = read_payload(&args.file)?;
            let entry = store.save(payload)?;
            if robot {
                emit_json(&serde_json::json!({
                    "share_id": entry.id,
                    "share_url": format!("/share/{}", entry.id),
                    "created_at": entry.created_at,
                    "query": entry.query,
                }))
            } else {
                println!("saved as {}", entry.id);
                Ok(())
            }
        }
        ShareCommand::Get(args) => match store.get(&args.id)? {
            Some(data) => emit_json(&data),
            None => Err(LearnoraError::ShareNotFound(args.id.clone())),
        },
        ShareCommand::List => {
            let entries = store.list()?;
            if robot {
                return emit_json(&entries);
            }
            if entries.is_empty() {
                println!("no shared roadmaps");
                return Ok(());
            }
            for entry in entries {
                println!("{}  {}  {}", entry.id, entry.created_at, entry.query);
            }
            Ok(())
        }
    }
}

fn read_payload(file: &Path) -> Result<Value> {
    let raw = if file == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(file)?
    };

    let payload: Value = serde_json::from_str(&raw)
        .map_err(|err| LearnoraError::Serialization(format!("parse share payload: {err}")))?;
    if !payload.is_object() {
        return Err(LearnoraError::InvalidQuery(
            "share payload must be a JSON object".to_string(),
        ));
    }
    Ok(payload)
}
