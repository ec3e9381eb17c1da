//! Repository boundary consumed by search, insights and ingestion

use super::{FeedbackId, FeedbackRecord, NewFeedback};
use crate::error::Result;

/// Storage of feedback records, partitioned by owner code
///
/// Listing methods return records newest first.
pub trait FeedbackRepository {
    /// Insert a validated record, optionally with its embedding
    fn insert(&self, feedback: &NewFeedback, embedding: Option<&[f32]>) -> Result<FeedbackRecord>;

    /// All records in a partition
    fn list_by_partition(&self, partition: &str) -> Result<Vec<FeedbackRecord>>;

    fn find_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>>;

    /// Lazily attach an embedding to an existing record
    fn attach_embedding(&self, id: FeedbackId, embedding: &[f32]) -> Result<()>;

    /// Records in a partition that have no embedding yet
    fn list_missing_embeddings(&self, partition: &str, limit: usize)
        -> Result<Vec<FeedbackRecord>>;
}
