//! Search engine module
//!
//! Provides:
//! - Semantic search over stored feedback embeddings
//! - Case-insensitive keyword search with tiered scores
//! - Hybrid search merging both by record id

mod hybrid;
mod keyword;
mod merge;
mod semantic;
pub mod similarity;

pub use hybrid::{HybridSearcher, SearchResponse};
pub use keyword::KeywordSearchEngine;
pub use merge::ResultMerger;
pub use semantic::SemanticSearchEngine;
pub use similarity::{cosine, similarity_from_distance};

use crate::db::FeedbackRecord;
use serde::{Deserialize, Serialize};

/// Results must score strictly above this to be returned (both engines)
pub const RELEVANCE_THRESHOLD: f64 = 50.0;

/// Default per-engine result limit
pub const DEFAULT_ENGINE_LIMIT: usize = 20;

/// Engine that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Semantic,
    Keyword,
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Keyword => write!(f, "keyword"),
        }
    }
}

/// A scored feedback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub record: FeedbackRecord,
    /// Relevance in [0, 100]
    pub score: f64,
    pub source: SearchSource,
}

/// Sort by score descending, newest first on ties, then by id
pub(crate) fn rank(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.record.created_at.cmp(&a.record.created_at))
            .then_with(|| a.record.id.cmp(&b.record.id))
    });
}
