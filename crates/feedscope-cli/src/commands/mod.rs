//! CLI command handlers

pub mod ask;
pub mod embed;
pub mod insights;
pub mod list;
pub mod search;
pub mod status;
pub mod submit;

use feedscope_core::{Config, EmbeddingClient};

/// Embedding client for commands that degrade without one
pub(crate) fn optional_embeddings(config: &Config) -> Option<EmbeddingClient> {
    match EmbeddingClient::from_config(&config.embedding) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!("Embedding service unavailable, continuing without it: {}", e);
            None
        }
    }
}
