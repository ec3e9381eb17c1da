//! Embed command

use crate::app::{EmbedArgs, OutputFormat};
use anyhow::Result;
use feedscope_core::{embed_missing, Config, Database, EmbeddingClient};

pub async fn run(
    args: EmbedArgs,
    db: &Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let client = EmbeddingClient::from_config(&config.embedding)?;

    if format == OutputFormat::Cli {
        println!(
            "Embedding with {} ({} dimensions)...",
            client.model_name(),
            client.dimensions()
        );
    }

    let stats = embed_missing(db, &client, &args.code, args.limit).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Cli => {
            println!("Embedding complete:");
            println!("  Scanned:  {}", stats.scanned);
            println!("  Embedded: {}", stats.embedded);
            println!("  Failed:   {}", stats.failed);
        }
    }
    Ok(())
}
