//! Database statistics

use super::Database;
use crate::error::Result;

/// Database stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub partition_count: usize,
    pub feedback_count: usize,
    pub embedded_count: usize,
    pub pending_embedding: usize,
}

impl Database {
    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let partition_count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT code) FROM feedback", [], |row| {
                    row.get(0)
                })?;

        let feedback_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;

        let embedded_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM feedback WHERE embedding IS NOT NULL AND LENGTH(embedding) > 0",
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            partition_count: partition_count as usize,
            feedback_count: feedback_count as usize,
            embedded_count: embedded_count as usize,
            pending_embedding: (feedback_count - embedded_count).max(0) as usize,
        })
    }
}
