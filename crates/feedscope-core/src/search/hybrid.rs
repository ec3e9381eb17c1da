//! Hybrid search: semantic and keyword engines run side by side

use super::{
    KeywordSearchEngine, ResultMerger, SearchResult, SemanticSearchEngine, DEFAULT_ENGINE_LIMIT,
};
use crate::config::SearchConfig;
use crate::db::{FeedbackRecord, FeedbackRepository};
use crate::error::{FeedscopeError, Result};
use crate::llm::EmbeddingClient;
use serde::{Deserialize, Serialize};

/// Default number of merged results returned
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// Default cap on records scored per query
pub const DEFAULT_MAX_CANDIDATES: usize = 1000;

/// Merged results plus per-engine hit counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Hits from the semantic engine before merging
    pub semantic_count: usize,
    /// Hits from the keyword engine before merging
    pub keyword_count: usize,
}

/// Runs both engines concurrently and merges their output
#[derive(Clone)]
pub struct HybridSearcher {
    embeddings: Option<EmbeddingClient>,
    semantic: SemanticSearchEngine,
    keyword: KeywordSearchEngine,
    result_limit: usize,
    max_candidates: usize,
}

impl HybridSearcher {
    /// Without an embedding client only the keyword engine contributes
    pub fn new(embeddings: Option<EmbeddingClient>) -> Self {
        Self {
            embeddings,
            semantic: SemanticSearchEngine::new(DEFAULT_ENGINE_LIMIT),
            keyword: KeywordSearchEngine::new(DEFAULT_ENGINE_LIMIT),
            result_limit: DEFAULT_RESULT_LIMIT,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    pub fn from_config(embeddings: Option<EmbeddingClient>, config: &SearchConfig) -> Self {
        Self {
            embeddings,
            semantic: SemanticSearchEngine::new(config.semantic_limit),
            keyword: KeywordSearchEngine::new(config.keyword_limit),
            result_limit: config.result_limit,
            max_candidates: config.max_candidates,
        }
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Search one partition of the repository
    ///
    /// A blank query is an input error. Repository failures propagate;
    /// embedding failures only drop the semantic branch.
    pub async fn search<R>(&self, repo: &R, query: &str, partition: &str) -> Result<SearchResponse>
    where
        R: FeedbackRepository + ?Sized,
    {
        if query.trim().is_empty() {
            return Err(FeedscopeError::InvalidInput(
                "search query cannot be empty".to_string(),
            ));
        }

        let mut records = repo.list_by_partition(partition)?;
        records.truncate(self.max_candidates);
        tracing::debug!(
            "Searching {} records in partition '{}'",
            records.len(),
            partition
        );

        Ok(self.search_records(query, &records).await)
    }

    /// Search an in-memory candidate set
    pub async fn search_records(&self, query: &str, records: &[FeedbackRecord]) -> SearchResponse {
        let semantic_branch = async {
            let Some(ref client) = self.embeddings else {
                return Vec::new();
            };
            match client.embed(query).await {
                Ok(query_vector) => {
                    let candidates =
                        SemanticSearchEngine::candidates_from(records, query_vector.len());
                    self.semantic.search(Some(query_vector.as_slice()), &candidates)
                }
                Err(e) => {
                    tracing::warn!("Semantic search skipped, using keyword results only: {}", e);
                    Vec::new()
                }
            }
        };
        let keyword_branch = async { self.keyword.search(query, records) };

        let (semantic, keyword) = tokio::join!(semantic_branch, keyword_branch);
        let semantic_count = semantic.len();
        let keyword_count = keyword.len();

        let mut results = ResultMerger::merge(semantic, keyword);
        results.truncate(self.result_limit);

        SearchResponse {
            results,
            semantic_count,
            keyword_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use crate::llm::{Embedder, RetryPolicy};
    use crate::search::SearchSource;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(FeedscopeError::Llm("offline".into()))
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    fn repo() -> MemoryRepository {
        let now = Utc::now();
        MemoryRepository::with_records(
            "acme",
            vec![
                FeedbackRecord::new(1, "Ana", "Great support", 5, now)
                    .with_embedding(vec![1.0, 0.0]),
                FeedbackRecord::new(2, "Bo", "Slow and buggy app", 1, now - Duration::hours(1))
                    .with_embedding(vec![0.0, 1.0]),
                FeedbackRecord::new(3, "Cy", "Support was great", 4, now - Duration::hours(2)),
            ],
        )
    }

    #[tokio::test]
    async fn test_merges_both_engines() {
        let client = EmbeddingClient::new(Arc::new(FixedEmbedder(vec![1.0, 0.0])));
        let searcher = HybridSearcher::new(Some(client));

        let response = searcher.search(&repo(), "great", "acme").await.unwrap();
        assert_eq!(response.semantic_count, 1);
        assert_eq!(response.keyword_count, 2);

        let ids: Vec<i64> = response.results.iter().map(|r| r.record.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(response.results[0].source, SearchSource::Semantic);
        assert_eq!(response.results[1].source, SearchSource::Keyword);
    }

    #[tokio::test(start_paused = true)]
    async fn test_embedding_failure_degrades_to_keyword() {
        let client = EmbeddingClient::new(Arc::new(DownEmbedder))
            .with_retry_policy(RetryPolicy::new(2, std::time::Duration::from_millis(10)));
        let searcher = HybridSearcher::new(Some(client));

        let response = searcher.search(&repo(), "buggy", "acme").await.unwrap();
        assert_eq!(response.semantic_count, 0);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].record.id.0, 2);
        assert_eq!(response.results[0].score, 80.0);
        assert_eq!(response.results[0].source, SearchSource::Keyword);
    }

    #[tokio::test]
    async fn test_blank_query_is_input_error() {
        let searcher = HybridSearcher::new(None);
        let err = searcher.search(&repo(), "   ", "acme").await.unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_unknown_partition_is_empty() {
        let searcher = HybridSearcher::new(None);
        let response = searcher.search(&repo(), "great", "globex").await.unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_limits() {
        let searcher = HybridSearcher::new(None).with_result_limit(1);
        let response = searcher.search(&repo(), "great", "acme").await.unwrap();
        assert_eq!(response.keyword_count, 2);
        assert_eq!(response.results.len(), 1);

        let searcher = HybridSearcher::new(None).with_max_candidates(1);
        let response = searcher.search(&repo(), "great", "acme").await.unwrap();
        assert_eq!(response.keyword_count, 1);
    }
}
