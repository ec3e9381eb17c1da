//! Insights command

use super::optional_embeddings;
use crate::app::{InsightsArgs, OutputFormat};
use crate::output::format_report;
use anyhow::Result;
use feedscope_core::{Config, Database, FeedbackRepository, InsightPipeline};

pub async fn run(
    args: InsightsArgs,
    db: &Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    // Similarity search only runs for focused reports
    let embeddings = match args.query {
        Some(_) => optional_embeddings(config),
        None => None,
    };

    let mut pipeline = InsightPipeline::from_config(config, embeddings)?;
    if args.no_enhance {
        pipeline = pipeline.with_enhancement(false);
    }

    let records = db.list_by_partition(&args.code)?;
    let report = pipeline
        .generate(&records, args.days, args.query.as_deref())
        .await?;

    print!("{}", format_report(&report, format));
    Ok(())
}
