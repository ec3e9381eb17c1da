//! List command

use crate::app::{ListArgs, OutputFormat};
use crate::output::format_records;
use anyhow::Result;
use feedscope_core::{Database, FeedbackRepository};

pub async fn run(args: ListArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let mut records = db.list_by_partition(&args.code)?;
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if records.is_empty() && format == OutputFormat::Cli {
        eprintln!("No feedback for '{}'", args.code);
        return Ok(());
    }

    print!("{}", format_records(&records, format));
    Ok(())
}
