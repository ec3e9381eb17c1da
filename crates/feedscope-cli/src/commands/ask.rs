//! Ask command

use super::optional_embeddings;
use crate::app::{AskArgs, OutputFormat};
use crate::output::format_answer;
use anyhow::Result;
use feedscope_core::{Config, Database, FeedbackChat, FeedbackRepository};

pub async fn run(
    args: AskArgs,
    db: &Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let question = args.question.join(" ");
    let chat = FeedbackChat::from_config(config, optional_embeddings(config))?;

    let records = db.list_by_partition(&args.code)?;
    let answer = chat.ask(&records, &question).await?;

    print!("{}", format_answer(&answer, format));
    Ok(())
}
