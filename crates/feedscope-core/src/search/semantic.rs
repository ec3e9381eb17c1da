//! Vector similarity search over feedback embeddings

use super::{cosine, rank, SearchResult, SearchSource, DEFAULT_ENGINE_LIMIT, RELEVANCE_THRESHOLD};
use crate::db::FeedbackRecord;

/// Scores candidates against a query vector on a 0..100 scale
#[derive(Debug, Clone, Copy)]
pub struct SemanticSearchEngine {
    limit: usize,
}

impl Default for SemanticSearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE_LIMIT)
    }
}

impl SemanticSearchEngine {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Pair records with their embeddings, skipping missing or wrong-sized ones
    pub fn candidates_from<'a>(
        records: &'a [FeedbackRecord],
        dimensions: usize,
    ) -> Vec<(&'a FeedbackRecord, &'a [f32])> {
        records
            .iter()
            .filter_map(|record| {
                let embedding = record.embedding.as_deref()?;
                (embedding.len() == dimensions).then_some((record, embedding))
            })
            .collect()
    }

    /// Score every candidate and keep those above the relevance threshold
    pub fn search(
        &self,
        query_vector: Option<&[f32]>,
        candidates: &[(&FeedbackRecord, &[f32])],
    ) -> Vec<SearchResult> {
        let Some(query) = query_vector else {
            return Vec::new();
        };

        let mut results: Vec<SearchResult> = candidates
            .iter()
            .filter_map(|(record, embedding)| {
                let score = (f64::from(cosine(query, embedding)) * 100.0).clamp(0.0, 100.0);
                (score > RELEVANCE_THRESHOLD).then(|| SearchResult {
                    record: (*record).clone(),
                    score,
                    source: SearchSource::Semantic,
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
            FeedbackRecord::new(1, "Ana", "Great support", 5, now).with_embedding(vec![1.0, 0.0]),
            FeedbackRecord::new(2, "Bo", "Slow and buggy app", 1, now - Duration::hours(1))
                .with_embedding(vec![0.0, 1.0]),
            FeedbackRecord::new(3, "Cy", "Nice", 4, now - Duration::hours(2))
                .with_embedding(vec![0.9, 0.1]),
            FeedbackRecord::new(4, "Di", "No vector", 3, now),
            FeedbackRecord::new(5, "Ed", "Old model", 3, now).with_embedding(vec![1.0, 0.0, 0.0]),
        ]
    }

    #[test]
    fn test_candidates_skip_missing_and_mismatched() {
        let records = records();
        let candidates = SemanticSearchEngine::candidates_from(&records, 2);
        let ids: Vec<i64> = candidates.iter().map(|(r, _)| r.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_identical_vector_scores_100_and_ranks_first() {
        let records = records();
        let candidates = SemanticSearchEngine::candidates_from(&records, 2);
        let results = SemanticSearchEngine::default().search(Some(&[1.0, 0.0][..]), &candidates);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.id.0, 1);
        assert!((results[0].score - 100.0).abs() < 1e-4);
        assert_eq!(results[0].source, SearchSource::Semantic);
        assert!(results.iter().all(|r| r.score > RELEVANCE_THRESHOLD));
    }

    #[test]
    fn test_no_query_vector() {
        let records = records();
        let candidates = SemanticSearchEngine::candidates_from(&records, 2);
        assert!(SemanticSearchEngine::default().search(None, &candidates).is_empty());
    }

    #[test]
    fn test_opposite_vectors_clamp_to_zero_and_drop() {
        let records = records();
        let candidates = SemanticSearchEngine::candidates_from(&records, 2);
        let results = SemanticSearchEngine::default().search(Some(&[-1.0, -1.0][..]), &candidates);
        assert!(results.is_empty());
    }

    #[test]
    fn test_limit() {
        let records = records();
        let candidates = SemanticSearchEngine::candidates_from(&records, 2);
        let results = SemanticSearchEngine::new(1).search(Some(&[1.0, 0.0][..]), &candidates);
        assert_eq!(results.len(), 1);
    }
}
