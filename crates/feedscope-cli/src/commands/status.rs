//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use feedscope_core::{Config, Database, ProviderFailoverChain};

pub async fn run(db: &Database, config: &Config, format: OutputFormat) -> Result<()> {
    let stats = db.get_stats()?;
    let chain = ProviderFailoverChain::from_config(&config.llm)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "database": stats,
                "schema_version": db.schema_version()?,
                "embedding_model": config.embedding.model,
                "providers": chain.provider_names(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!("Partitions:      {}", stats.partition_count);
            println!("Feedback:        {}", stats.feedback_count);
            println!();
            println!("Embeddings:");
            println!("  Model:         {}", config.embedding.model);
            println!("  Embedded:      {}", stats.embedded_count);
            println!("  Pending:       {}", stats.pending_embedding);
            println!();
            if chain.is_empty() {
                println!("LLM providers:   none (statistical reports only)");
            } else {
                println!("LLM providers:   {}", chain.provider_names().join(" -> "));
            }
        }
    }
    Ok(())
}
