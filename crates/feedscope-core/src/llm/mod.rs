//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (Cohere, OpenAI-compatible)
//! - Text generation via Gemini, Hugging Face, OpenAI-compatible and Ollama
//! - Ordered provider failover with per-call deadlines

mod embedding_client;
mod failover;
mod gemini;
mod http;
mod http_embedder;
mod huggingface;
mod ollama;
mod openai;
mod retry;
mod traits;

pub use embedding_client::{
    truncate_chars, EmbeddingClient, DEFAULT_EMBED_TIMEOUT, DEFAULT_MAX_INPUT_CHARS,
};
pub use failover::{
    ProviderCallResult, ProviderFailoverChain, DEFAULT_MIN_RESPONSE_CHARS,
    DEFAULT_PROVIDER_TIMEOUT,
};
pub use gemini::GeminiProvider;
pub use http_embedder::HttpEmbedder;
pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;
pub use openai::{ChatMessage, OpenAiProvider};
pub use retry::{RetryExhausted, RetryPolicy};
pub use traits::*;
