//! Feedscope Core Library
//!
//! Core functionality for the feedscope customer feedback explorer.
//!
//! # Features
//! - Hybrid search: cosine similarity over embeddings merged with tiered keyword matches
//! - Embedding client with retries and dimension checks (Cohere, OpenAI-compatible)
//! - LLM failover chain across Gemini, Hugging Face, OpenAI-compatible and Ollama
//! - Insight pipeline with a deterministic statistics fallback
//! - Conversational questions answered from the same provider chain
//! - SQLite and in-memory feedback repositories

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod insights;
pub mod llm;
pub mod search;

pub use config::{Config, EmbeddingConfig, InsightsConfig, LlmConfig, ProviderConfig, SearchConfig};
pub use db::{
    Database, DatabaseStats, FeedbackId, FeedbackRecord, FeedbackRepository, MemoryRepository,
    NewFeedback,
};
pub use error::{Error, FeedscopeError, ProviderErrorKind, Result};
pub use ingest::{embed_missing, submit_feedback, BackfillStats};
pub use insights::{
    AnalyticsSummary, ChatAnswer, FeedbackChat, GeneratedBy, InsightPipeline, InsightReport,
    PipelineStage, ENHANCEMENT_SEPARATOR,
};
pub use llm::{
    EmbeddingClient, Embedder, GenerationRequest, HttpEmbedder, LlmProvider, ProviderCallResult,
    ProviderFailoverChain, RetryPolicy,
};
pub use search::{
    HybridSearcher, KeywordSearchEngine, ResultMerger, SearchResponse, SearchResult, SearchSource,
    SemanticSearchEngine, RELEVANCE_THRESHOLD,
};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "feedscope";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "feedscope";
