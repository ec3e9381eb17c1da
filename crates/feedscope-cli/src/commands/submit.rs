//! Submit command

use super::optional_embeddings;
use crate::app::{OutputFormat, SubmitArgs};
use crate::output::format_stored;
use anyhow::Result;
use feedscope_core::{submit_feedback, Config, Database, NewFeedback};

pub async fn run(
    args: SubmitArgs,
    db: &Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let feedback = NewFeedback {
        partition: args.code,
        author: args.author,
        text: args.text.join(" "),
        rating: args.rating,
    };
    // Reject bad input before touching the embedding service
    feedback.validate()?;

    let embeddings = optional_embeddings(config);
    let record = submit_feedback(db, embeddings.as_ref(), feedback).await?;

    print!("{}", format_stored(&record, format));
    Ok(())
}
