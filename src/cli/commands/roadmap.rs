//! learnora roadmap - build an ordered learning roadmap for a query

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;
use crate::roadmap::build_roadmap;

use super::{emit_json, validate_query};

#[derive(Args, Debug)]
pub struct RoadmapArgs {
    /// Query text
    pub query: String,

    /// Number of search results to build from
    #[arg(long, short = 'k', default_value_t = 25)]
    pub top_k: usize,

    /// Maximum number of roadmap steps
    #[arg(long, default_value_t = 5)]
    pub steps: usize,
}

pub fn run(ctx: &AppContext, args: &RoadmapArgs) -> Result<()> {
    let query = validate_query(&args.query)?;
    let results = ctx.service.search(query, args.top_k)?;
    let steps = build_roadmap(&results, args.steps);

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "query": query,
            "steps": steps,
        }));
    }

    if steps.is_empty() {
        println!("no roadmap could be built");
        return Ok(());
    }
    for step in &steps {
        println!("step {}: {}", step.step, step.label);
        for resource in &step.resources {
            println!("  - {}", resource.record.title);
        }
    }
    Ok(())
}
