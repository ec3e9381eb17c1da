//! Database layer for feedscope
//!
//! Provides the typed repository boundary the search and insight code reads
//! from, with two implementations:
//! - SQLite storage keyed by partition code
//! - An in-memory store for tests and embedding in other hosts

mod feedback;
mod memory;
mod repository;
mod schema;
mod stats;
pub mod vectors;

pub use feedback::{FeedbackId, FeedbackRecord, NewFeedback};
pub use memory::MemoryRepository;
pub use repository::FeedbackRepository;
pub use schema::Database;
pub use stats::DatabaseStats;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("feedback.sqlite")
    }
}
