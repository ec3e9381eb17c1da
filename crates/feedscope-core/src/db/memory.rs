//! In-memory repository

use super::{FeedbackId, FeedbackRecord, FeedbackRepository, NewFeedback};
use crate::error::{FeedscopeError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    partitions: HashMap<String, Vec<FeedbackRecord>>,
}

/// Repository kept entirely in memory
#[derive(Default)]
pub struct MemoryRepository {
    inner: RwLock<Inner>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a partition with existing records (ids are kept as given)
    pub fn with_records(partition: &str, records: Vec<FeedbackRecord>) -> Self {
        let repo = Self::new();
        repo.extend(partition, records);
        repo
    }

    pub fn extend(&self, partition: &str, records: Vec<FeedbackRecord>) {
        let mut inner = self.write();
        let max_id = records.iter().map(|r| r.id.0).max().unwrap_or(0);
        inner.next_id = inner.next_id.max(max_id);
        inner
            .partitions
            .entry(partition.to_string())
            .or_default()
            .extend(records);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn newest_first(mut records: Vec<FeedbackRecord>) -> Vec<FeedbackRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    records
}

impl FeedbackRepository for MemoryRepository {
    fn insert(&self, feedback: &NewFeedback, embedding: Option<&[f32]>) -> Result<FeedbackRecord> {
        feedback.validate()?;

        let mut inner = self.write();
        inner.next_id += 1;
        let record = FeedbackRecord {
            id: FeedbackId(inner.next_id),
            author: feedback.author.clone(),
            text: feedback.text.clone(),
            rating: feedback.rating,
            created_at: Utc::now(),
            embedding: embedding.map(<[f32]>::to_vec),
        };
        inner
            .partitions
            .entry(feedback.partition.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn list_by_partition(&self, partition: &str) -> Result<Vec<FeedbackRecord>> {
        let records = self.read().partitions.get(partition).cloned().unwrap_or_default();
        Ok(newest_first(records))
    }

    fn find_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>> {
        Ok(self
            .read()
            .partitions
            .values()
            .flatten()
            .find(|r| r.id == id)
            .cloned())
    }

    fn attach_embedding(&self, id: FeedbackId, embedding: &[f32]) -> Result<()> {
        let mut inner = self.write();
        let record = inner
            .partitions
            .values_mut()
            .flatten()
            .find(|r| r.id == id)
            .ok_or_else(|| FeedscopeError::NotFound(format!("feedback {}", id)))?;
        record.embedding = Some(embedding.to_vec());
        Ok(())
    }

    fn list_missing_embeddings(
        &self,
        partition: &str,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>> {
        let missing = self
            .list_by_partition(partition)?
            .into_iter()
            .filter(|r| r.embedding.as_ref().map_or(true, |e| e.is_empty()))
            .take(limit)
            .collect();
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_ids_are_not_reused() {
        let now = Utc::now();
        let repo = MemoryRepository::with_records(
            "acme",
            vec![FeedbackRecord::new(7, "Ana", "great support", 5, now)],
        );

        let inserted = repo
            .insert(
                &NewFeedback {
                    partition: "acme".to_string(),
                    author: "Bo".to_string(),
                    text: "good value".to_string(),
                    rating: 4,
                },
                None,
            )
            .unwrap();
        assert_eq!(inserted.id, FeedbackId(8));
        assert_eq!(repo.list_by_partition("acme").unwrap().len(), 2);
        assert!(repo.list_by_partition("other").unwrap().is_empty());
    }

    #[test]
    fn test_attach_embedding() {
        let repo = MemoryRepository::with_records(
            "acme",
            vec![FeedbackRecord::new(1, "Ana", "great support", 5, Utc::now())],
        );
        assert_eq!(repo.list_missing_embeddings("acme", 10).unwrap().len(), 1);

        repo.attach_embedding(FeedbackId(1), &[0.5, 0.5]).unwrap();
        assert!(repo.list_missing_embeddings("acme", 10).unwrap().is_empty());
        assert_eq!(
            repo.find_by_id(FeedbackId(1)).unwrap().unwrap().embedding,
            Some(vec![0.5, 0.5])
        );
        assert!(repo.attach_embedding(FeedbackId(2), &[1.0]).is_err());
    }
}
