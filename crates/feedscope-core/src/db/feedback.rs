//! Feedback records and their SQLite operations

use super::vectors::{bytes_to_embedding, embedding_to_bytes};
use super::{Database, FeedbackRepository};
use crate::error::{FeedscopeError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque feedback identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(pub i64);

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single piece of customer feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub author: String,
    pub text: String,
    /// Star rating, 1..=5
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl FeedbackRecord {
    /// Create a record without an embedding
    pub fn new(
        id: i64,
        author: impl Into<String>,
        text: impl Into<String>,
        rating: u8,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: FeedbackId(id),
            author: author.into(),
            text: text.into(),
            rating,
            created_at,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Ingestion input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    /// Owner code the record is filed under
    pub partition: String,
    pub author: String,
    pub text: String,
    pub rating: u8,
}

impl NewFeedback {
    /// Reject empty fields and out-of-range ratings
    pub fn validate(&self) -> Result<()> {
        if self.partition.trim().is_empty() {
            return Err(FeedscopeError::InvalidInput(
                "partition code is required".to_string(),
            ));
        }
        if self.author.trim().is_empty() {
            return Err(FeedscopeError::InvalidInput("author is required".to_string()));
        }
        if self.text.trim().is_empty() {
            return Err(FeedscopeError::InvalidInput(
                "feedback text is required".to_string(),
            ));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(FeedscopeError::InvalidInput(format!(
                "rating must be between 1 and 5, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}

const RECORD_COLUMNS: &str = "id, name, feedback, rating, created_at, embedding";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    let created_at: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);
    let embedding: Option<Vec<u8>> = row.get(5)?;

    Ok(FeedbackRecord {
        id: FeedbackId(row.get(0)?),
        author: row.get(1)?,
        text: row.get(2)?,
        rating: row.get(3)?,
        created_at,
        embedding: embedding
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| bytes_to_embedding(&bytes)),
    })
}

impl Database {
    /// Insert a record with an explicit creation time
    pub fn insert_feedback_at(
        &self,
        feedback: &NewFeedback,
        embedding: Option<&[f32]>,
        created_at: DateTime<Utc>,
    ) -> Result<FeedbackRecord> {
        feedback.validate()?;

        let timestamp = created_at.to_rfc3339();
        self.conn.execute(
            "INSERT INTO feedback (code, name, feedback, rating, created_at, updated_at, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)",
            params![
                feedback.partition,
                feedback.author,
                feedback.text,
                feedback.rating,
                timestamp,
                embedding.map(embedding_to_bytes),
            ],
        )?;

        Ok(FeedbackRecord {
            id: FeedbackId(self.conn.last_insert_rowid()),
            author: feedback.author.clone(),
            text: feedback.text.clone(),
            rating: feedback.rating,
            created_at,
            embedding: embedding.map(<[f32]>::to_vec),
        })
    }

    /// Records in a partition created at or after `since`
    pub fn list_since(&self, partition: &str, since: DateTime<Utc>) -> Result<Vec<FeedbackRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM feedback
             WHERE code = ?1 AND created_at >= ?2
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![partition, since.to_rfc3339()], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl FeedbackRepository for Database {
    fn insert(&self, feedback: &NewFeedback, embedding: Option<&[f32]>) -> Result<FeedbackRecord> {
        self.insert_feedback_at(feedback, embedding, Utc::now())
    }

    fn list_by_partition(&self, partition: &str) -> Result<Vec<FeedbackRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM feedback
             WHERE code = ?1
             ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![partition], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn find_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM feedback WHERE id = ?1");
        let record = self
            .conn
            .query_row(&sql, params![id.0], row_to_record)
            .optional()?;
        Ok(record)
    }

    fn attach_embedding(&self, id: FeedbackId, embedding: &[f32]) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE feedback SET embedding = ?1, updated_at = ?2 WHERE id = ?3",
            params![embedding_to_bytes(embedding), Utc::now().to_rfc3339(), id.0],
        )?;
        if updated == 0 {
            return Err(FeedscopeError::NotFound(format!("feedback {}", id)));
        }
        Ok(())
    }

    fn list_missing_embeddings(
        &self,
        partition: &str,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM feedback
             WHERE code = ?1 AND (embedding IS NULL OR LENGTH(embedding) = 0)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![partition, limit as i64], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_feedback(text: &str, rating: u8) -> NewFeedback {
        NewFeedback {
            partition: "acme".to_string(),
            author: "Dana".to_string(),
            text: text.to_string(),
            rating,
        }
    }

    #[test]
    fn test_validate() {
        assert!(new_feedback("fine", 3).validate().is_ok());
        assert!(new_feedback("fine", 0).validate().is_err());
        assert!(new_feedback("fine", 6).validate().is_err());
        assert!(new_feedback("   ", 4).validate().is_err());
    }

    #[test]
    fn test_insert_and_find() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let inserted = db
            .insert(&new_feedback("great support", 5), Some(&[0.1, 0.2][..]))
            .unwrap();
        let found = db.find_by_id(inserted.id).unwrap().unwrap();
        assert_eq!(found.text, "great support");
        assert_eq!(found.rating, 5);
        assert_eq!(found.embedding, Some(vec![0.1, 0.2]));

        assert!(db.find_by_id(FeedbackId(999)).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first_and_partitioned() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let now = Utc::now();
        db.insert_feedback_at(&new_feedback("older", 4), None, now - Duration::days(3))
            .unwrap();
        db.insert_feedback_at(&new_feedback("newer", 2), None, now).unwrap();

        let mut other = new_feedback("elsewhere", 5);
        other.partition = "globex".to_string();
        db.insert(&other, None).unwrap();

        let records = db.list_by_partition("acme").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "newer");
        assert_eq!(records[1].text, "older");

        let recent = db.list_since("acme", now - Duration::days(1)).unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_attach_embedding() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let record = db.insert(&new_feedback("slow and buggy", 1), None).unwrap();
        assert_eq!(db.list_missing_embeddings("acme", 10).unwrap().len(), 1);

        db.attach_embedding(record.id, &[1.0, 0.0]).unwrap();
        assert!(db.list_missing_embeddings("acme", 10).unwrap().is_empty());

        let err = db.attach_embedding(FeedbackId(42), &[1.0]).unwrap_err();
        assert!(matches!(err, FeedscopeError::NotFound(_)));
    }
}
