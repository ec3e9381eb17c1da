//! Keyword search with tiered field scores
//!
//! A body match scores 80, an author-only match 60 and any other field
//! (the record id) 40. Only scores above [`RELEVANCE_THRESHOLD`] survive,
//! so id-only matches are scored but never returned.

use super::{rank, SearchResult, SearchSource, DEFAULT_ENGINE_LIMIT, RELEVANCE_THRESHOLD};
use crate::db::FeedbackRecord;

const BODY_SCORE: f64 = 80.0;
const AUTHOR_SCORE: f64 = 60.0;
const OTHER_FIELD_SCORE: f64 = 40.0;

/// Case-insensitive substring matcher
#[derive(Debug, Clone, Copy)]
pub struct KeywordSearchEngine {
    limit: usize,
}

impl Default for KeywordSearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE_LIMIT)
    }
}

impl KeywordSearchEngine {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Tier score for one record, `None` when nothing matches
    pub fn score(record: &FeedbackRecord, needle: &str) -> Option<f64> {
        if record.text.to_lowercase().contains(needle) {
            Some(BODY_SCORE)
        } else if record.author.to_lowercase().contains(needle) {
            Some(AUTHOR_SCORE)
        } else if record.id.to_string().contains(needle) {
            Some(OTHER_FIELD_SCORE)
        } else {
            None
        }
    }

    pub fn search(&self, query: &str, candidates: &[FeedbackRecord]) -> Vec<SearchResult> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<SearchResult> = candidates
            .iter()
            .filter_map(|record| {
                let score = Self::score(record, &needle)?;
                (score > RELEVANCE_THRESHOLD).then(|| SearchResult {
                    record: record.clone(),
                    score,
                    source: SearchSource::Keyword,
                })
            })
            .collect();

        rank(&mut results);
        results.truncate(self.limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn records() -> Vec<FeedbackRecord> {
        let now = Utc::now();
        vec![
            FeedbackRecord::new(1, "Ana", "Great support", 5, now),
            FeedbackRecord::new(2, "Bo", "Slow and BUGGY app", 1, now - Duration::hours(1)),
            FeedbackRecord::new(3, "Buggy McBugface", "Fine", 3, now - Duration::hours(2)),
            FeedbackRecord::new(4, "Cy", "Also buggy", 2, now - Duration::hours(3)),
        ]
    }

    #[test]
    fn test_body_outranks_author() {
        let results = KeywordSearchEngine::default().search("buggy", &records());
        let ids: Vec<i64> = results.iter().map(|r| r.record.id.0).collect();
        assert_eq!(ids, vec![2, 4, 3]);
        assert_eq!(results[0].score, 80.0);
        assert_eq!(results[2].score, 60.0);
        assert!(results.iter().all(|r| r.source == SearchSource::Keyword));
    }

    #[test]
    fn test_id_match_is_below_threshold() {
        let record = FeedbackRecord::new(42, "Ana", "Great", 5, Utc::now());
        assert_eq!(KeywordSearchEngine::score(&record, "42"), Some(40.0));
        assert!(KeywordSearchEngine::default().search("42", &[record]).is_empty());
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        assert!(KeywordSearchEngine::default().search("  ", &records()).is_empty());
    }

    #[test]
    fn test_limit() {
        let results = KeywordSearchEngine::new(1).search("buggy", &records());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.id.0, 2);
    }
}
