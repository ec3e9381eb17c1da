//! Merge semantic and keyword results

use super::{rank, SearchResult, SearchSource};
use crate::db::FeedbackId;
use std::collections::HashMap;

/// Deduplicates by record id, keeping the best score
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMerger;

impl ResultMerger {
    /// Union of both lists; on equal scores the semantic entry wins
    pub fn merge(semantic: Vec<SearchResult>, keyword: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut best: HashMap<FeedbackId, SearchResult> =
            HashMap::with_capacity(semantic.len() + keyword.len());

        for result in semantic.into_iter().chain(keyword) {
            match best.get(&result.record.id) {
                Some(existing) if !replaces(&result, existing) => {}
                _ => {
                    best.insert(result.record.id, result);
                }
            }
        }

        let mut merged: Vec<SearchResult> = best.into_values().collect();
        rank(&mut merged);
        merged
    }
}

fn replaces(candidate: &SearchResult, existing: &SearchResult) -> bool {
    candidate.score > existing.score
        || (candidate.score == existing.score
            && candidate.source == SearchSource::Semantic
            && existing.source != SearchSource::Semantic)
}
