//! learnora search - rank corpus resources against a query

use clap::Args;

use crate::app::AppContext;
use crate::error::Result;

use super::{emit_json, validate_query};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// Maximum number of results
    #[arg(long, short = 'k', default_value_t = 10)]
    pub top_k: usize,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let query = validate_query(&args.query)?;
    let results = ctx.service.search(query, args.top_k)?;

    if ctx.robot_mode {
        return emit_json(&serde_json::json!({
            "query": query,
            "results": results,
        }));
    }

    if results.is_empty() {
        println!("no matching resources");
        return Ok(());
    }
    for (rank, result) in results.iter().enumerate() {
        println!(
            "{:>2}. {:>6.3}  {}",
            rank + 1,
            result.similarity_score,
            result.record.title
        );
        if let Some(summary) = &result.record.summary {
            println!("            {summary}");
        }
    }
    Ok(())
}
