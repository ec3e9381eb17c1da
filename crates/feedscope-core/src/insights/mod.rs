//! Feedback analytics and AI insight generation

mod analytics;
pub mod chat;
pub mod fallback;
mod pipeline;
pub mod prompt;

pub use analytics::{
    top_words, AnalyticsSummary, Highlight, Highlights, KeywordSentiment, RatingTrend,
    TrendDirection,
};
pub use chat::{search_phrase, ChatAnswer, FeedbackChat, CHAT_FALLBACK_REPLY};
pub use pipeline::{
    GeneratedBy, InsightPipeline, InsightReport, PipelineStage, ENHANCEMENT_SEPARATOR,
    MAX_TIMEFRAME_DAYS,
};
