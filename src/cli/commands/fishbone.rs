//! learnora fishbone - build a fishbone diagram for a query

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;
use crate::roadmap::fishbone::build_fishbone;

use super::{emit_json, validate_query};

#[derive(Args, Debug)]
pub struct FishboneArgs {
    /// Query text
    pub query: String,

    /// Number of search results to build from
    #[arg(long, short = 'k', default_value_t = 25)]
    pub top_k: usize,
}

pub fn run(ctx: &AppContext, args: &FishboneArgs) -> Result<()> {
    let query = validate_query(&args.query)?;
    let results = ctx.service.search(query, args.top_k)?;
    let diagram = build_fishbone(query, &results);

    if ctx.robot_mode {
        return emit_json(&diagram);
    }

    println!("{}", diagram.query);
    for branch in &diagram.branches {
        println!("  {} ({})", branch.category, branch.resources.len());
        for resource in &branch.resources {
            println!("    - {}", resource.record.title);
        }
    }
    Ok(())
}
