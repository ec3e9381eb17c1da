//! Feedback ingestion and embedding backfill

use crate::db::{FeedbackRecord, FeedbackRepository, NewFeedback};
use crate::error::Result;
use crate::llm::EmbeddingClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pause between backfill requests to stay under provider rate limits
pub const DEFAULT_BACKFILL_PAUSE: Duration = Duration::from_secs(1);

/// Default number of records embedded per backfill run
pub const DEFAULT_BACKFILL_LIMIT: usize = 100;

/// Outcome of an embedding backfill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillStats {
    /// Records without an embedding that were picked up
    pub scanned: usize,
    pub embedded: usize,
    pub failed: usize,
}

/// Validate and store feedback, embedding it when possible
///
/// An embedding failure never blocks the insert; the record can be
/// backfilled later with [`embed_missing`].
pub async fn submit_feedback<R>(
    repo: &R,
    embeddings: Option<&EmbeddingClient>,
    feedback: NewFeedback,
) -> Result<FeedbackRecord>
where
    R: FeedbackRepository + ?Sized,
{
    feedback.validate()?;

    let embedding = match embeddings {
        Some(client) => match client.embed(&feedback.text).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::warn!("Storing feedback without embedding: {}", e);
                None
            }
        },
        None => None,
    };

    let record = repo.insert(&feedback, embedding.as_deref())?;
    tracing::info!(
        "Stored feedback {} for '{}' (embedded: {})",
        record.id,
        feedback.partition,
        record.embedding.is_some()
    );
    Ok(record)
}

/// Attach embeddings to up to `limit` records that lack one
pub async fn embed_missing<R>(
    repo: &R,
    embeddings: &EmbeddingClient,
    partition: &str,
    limit: usize,
) -> Result<BackfillStats>
where
    R: FeedbackRepository + ?Sized,
{
    embed_missing_with_pause(repo, embeddings, partition, limit, DEFAULT_BACKFILL_PAUSE).await
}

/// [`embed_missing`] with a custom pause between requests
pub async fn embed_missing_with_pause<R>(
    repo: &R,
    embeddings: &EmbeddingClient,
    partition: &str,
    limit: usize,
    pause: Duration,
) -> Result<BackfillStats>
where
    R: FeedbackRepository + ?Sized,
{
    let pending = repo.list_missing_embeddings(partition, limit)?;
    let mut stats = BackfillStats {
        scanned: pending.len(),
        ..BackfillStats::default()
    };

    for (i, record) in pending.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        match embeddings.embed(&record.text).await {
            Ok(vector) => {
                repo.attach_embedding(record.id, &vector)?;
                stats.embedded += 1;
                tracing::debug!("Embedded feedback {}", record.id);
            }
            Err(e) => {
                stats.failed += 1;
                tracing::warn!("Failed to embed feedback {}: {}", record.id, e);
            }
        }
    }

    tracing::info!(
        "Backfill for '{}': {} embedded, {} failed of {}",
        partition,
        stats.embedded,
        stats.failed,
        stats.scanned
    );
    Ok(stats)
}
