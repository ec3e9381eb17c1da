//! Search command

use super::optional_embeddings;
use crate::app::{OutputFormat, SearchArgs};
use crate::output::format_search_response;
use anyhow::Result;
use feedscope_core::{Config, Database, HybridSearcher};

pub async fn run(
    args: SearchArgs,
    db: &Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let query = args.query.join(" ");

    let mut searcher = HybridSearcher::from_config(optional_embeddings(config), &config.search);
    if let Some(limit) = args.limit {
        searcher = searcher.with_result_limit(limit);
    }

    let response = searcher.search(db, &query, &args.code).await?;

    if format == OutputFormat::Cli && response.semantic_count == 0 {
        eprintln!("Note: no semantic matches, showing keyword results only.");
    }

    print!("{}", format_search_response(&response, format));
    Ok(())
}
