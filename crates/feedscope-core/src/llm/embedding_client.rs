//! Embedding client with input shaping, dimension checks and retries
//!
//! Wraps any [`Embedder`] backend. A failure that survives the retry budget
//! is reported as [`FeedscopeError::EmbeddingUnavailable`] so callers can
//! carry on with keyword-only search.

use super::{Embedder, HttpEmbedder, RetryPolicy};
use crate::config::EmbeddingConfig;
use crate::error::{FeedscopeError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Default character budget sent to the embedding service
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2000;

/// Default per-attempt deadline
pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Text-to-vector client shared by search, insights and ingestion
#[derive(Clone)]
pub struct EmbeddingClient {
    embedder: Arc<dyn Embedder>,
    retry: RetryPolicy,
    timeout: Duration,
    max_input_chars: usize,
}

impl EmbeddingClient {
    /// Wrap a backend with the default policy (3 retries, 1s apart)
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            retry: RetryPolicy::default(),
            timeout: DEFAULT_EMBED_TIMEOUT,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    /// Create an HTTP-backed client from configuration
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let embedder = HttpEmbedder::from_config(config)?;
        Ok(Self::new(Arc::new(embedder))
            .with_retry_policy(config.retry_policy())
            .with_timeout(config.timeout())
            .with_max_input_chars(config.max_input_chars))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars.max(1);
        self
    }

    /// Pipeline-wide embedding dimension
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Embed text, retrying transient failures and wrong-sized vectors
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = prepare_input(text, self.max_input_chars)?;
        let expected = self.embedder.dimensions();
        let embedder = &self.embedder;
        let timeout = self.timeout;

        self.retry
            .run("embedding", move |_| async move {
                let vector = tokio::time::timeout(timeout, embedder.embed(input))
                    .await
                    .map_err(|_| FeedscopeError::Timeout {
                        operation: "embedding".to_string(),
                        after: timeout,
                    })??;

                if vector.len() != expected {
                    return Err(FeedscopeError::DimensionMismatch {
                        expected,
                        actual: vector.len(),
                    });
                }
                Ok(vector)
            })
            .await
            .map_err(|exhausted| {
                if exhausted.last_error.is_input_error() {
                    return exhausted.last_error;
                }
                tracing::warn!(
                    "Embedding unavailable after {} attempts: {}",
                    exhausted.attempts,
                    exhausted.last_error
                );
                FeedscopeError::EmbeddingUnavailable {
                    attempts: exhausted.attempts,
                    reason: exhausted.last_error.to_string(),
                }
            })
    }
}

/// Trim and cut text to the character budget
fn prepare_input(text: &str, max_chars: usize) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FeedscopeError::InvalidInput(
            "text to embed cannot be empty".to_string(),
        ));
    }
    Ok(truncate_chars(trimmed, max_chars))
}

/// Longest prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
