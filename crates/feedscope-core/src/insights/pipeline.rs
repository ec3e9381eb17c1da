//! Staged insight generation with deterministic fallback
//!
//! Stages run in order: analytics, optional similarity search, primary
//! analysis, optional enhancement. A failed primary analysis switches to the
//! statistics-only fallback; a failed enhancement only drops that section.

use super::prompt::{enhancement_prompt, primary_prompt, SampleLimits};
use super::{fallback, AnalyticsSummary};
use crate::config::{Config, InsightsConfig};
use crate::db::FeedbackRecord;
use crate::error::{FeedscopeError, Result};
use crate::llm::{EmbeddingClient, GenerationRequest, ProviderFailoverChain};
use crate::search::{SearchResult, SemanticSearchEngine};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Placed between the primary analysis and the enhancement section
pub const ENHANCEMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Longest accepted analysis window
pub const MAX_TIMEFRAME_DAYS: u32 = 3650;

/// Who produced the narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedBy {
    /// First provider in the chain
    PrimaryAi,
    /// A later provider after earlier ones failed
    SecondaryAi,
    /// Statistics-only template
    Fallback,
}

impl std::fmt::Display for GeneratedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrimaryAi => write!(f, "primary AI"),
            Self::SecondaryAi => write!(f, "secondary AI"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// States visited while building a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Init,
    Analytics,
    SimilaritySearch,
    PrimaryAnalysis,
    Enhancement,
    Assembled,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub narrative: String,
    pub summary: AnalyticsSummary,
    pub similar_feedback: Vec<SearchResult>,
    pub generated_by: GeneratedBy,
    pub query: Option<String>,
    pub timeframe_days: u32,
    /// Provider that answered the primary analysis
    pub provider: Option<String>,
    /// Whether the enhancement section is present
    pub enhanced: bool,
    pub stages: Vec<PipelineStage>,
}

/// Turns a record set into an insight report
#[derive(Clone)]
pub struct InsightPipeline {
    chain: ProviderFailoverChain,
    embeddings: Option<EmbeddingClient>,
    settings: InsightsConfig,
}

impl InsightPipeline {
    pub fn new(chain: ProviderFailoverChain, embeddings: Option<EmbeddingClient>) -> Self {
        Self {
            chain,
            embeddings,
            settings: InsightsConfig::default(),
        }
    }

    /// Build the provider chain from configuration
    pub fn from_config(config: &Config, embeddings: Option<EmbeddingClient>) -> Result<Self> {
        let chain = ProviderFailoverChain::from_config(&config.llm)?;
        Ok(Self::new(chain, embeddings).with_settings(config.insights.clone()))
    }

    pub fn with_settings(mut self, settings: InsightsConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_enhancement(mut self, enhance: bool) -> Self {
        self.settings.enhance = enhance;
        self
    }

    pub fn chain(&self) -> &ProviderFailoverChain {
        &self.chain
    }

    /// Analyze records from the last `timeframe_days` days
    pub async fn generate(
        &self,
        records: &[FeedbackRecord],
        timeframe_days: u32,
        query: Option<&str>,
    ) -> Result<InsightReport> {
        self.generate_at(records, timeframe_days, query, Utc::now()).await
    }

    /// Same as [`generate`](Self::generate) with an explicit clock
    pub async fn generate_at(
        &self,
        records: &[FeedbackRecord],
        timeframe_days: u32,
        query: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<InsightReport> {
        validate(records, timeframe_days, query)?;
        let query = query.map(str::trim);
        let mut stages = vec![PipelineStage::Init];

        let since = now - Duration::days(i64::from(timeframe_days));
        let mut window: Vec<FeedbackRecord> = records
            .iter()
            .filter(|r| r.created_at >= since)
            .cloned()
            .collect();
        window.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        if window.is_empty() {
            tracing::info!("No feedback in the last {} days", timeframe_days);
            stages.push(PipelineStage::Fallback);
            return Ok(InsightReport {
                narrative: fallback::NO_DATA_NARRATIVE.to_string(),
                summary: AnalyticsSummary::default(),
                similar_feedback: Vec::new(),
                generated_by: GeneratedBy::Fallback,
                query: query.map(str::to_string),
                timeframe_days,
                provider: None,
                enhanced: false,
                stages,
            });
        }

        stages.push(PipelineStage::Analytics);
        let summary = AnalyticsSummary::from_records(&window);

        let similar_feedback = match query {
            Some(q) => {
                stages.push(PipelineStage::SimilaritySearch);
                self.similar_feedback(q, &window).await
            }
            None => Vec::new(),
        };

        stages.push(PipelineStage::PrimaryAnalysis);
        let limits = SampleLimits {
            max_records: self.settings.max_prompt_records,
            max_record_chars: self.settings.max_record_chars,
            max_total_chars: self.settings.max_sample_chars,
        };
        let request = GenerationRequest::new(primary_prompt(
            &window,
            &summary,
            &similar_feedback,
            query,
            limits,
        ))
        .with_max_output_tokens(self.settings.max_output_tokens)
        .with_temperature(self.settings.temperature);

        let primary = self.chain.call(&request).await;
        if !primary.succeeded {
            tracing::warn!(
                "All {} LLM providers failed ({:?}), using statistical fallback",
                self.chain.len(),
                primary.error_kind
            );
            stages.push(PipelineStage::Fallback);
            return Ok(InsightReport {
                narrative: fallback::narrative(&summary),
                summary,
                similar_feedback,
                generated_by: GeneratedBy::Fallback,
                query: query.map(str::to_string),
                timeframe_days,
                provider: None,
                enhanced: false,
                stages,
            });
        }

        let mut narrative = primary.text;
        let mut enhanced = false;

        if self.settings.enhance {
            stages.push(PipelineStage::Enhancement);
            let request = GenerationRequest::new(enhancement_prompt(&narrative, &summary))
                .with_max_output_tokens(self.settings.enhancement_max_output_tokens)
                .with_temperature(self.settings.temperature);

            let enhancement = self.chain.call(&request).await;
            if enhancement.succeeded {
                narrative.push_str(ENHANCEMENT_SEPARATOR);
                narrative.push_str(&enhancement.text);
                enhanced = true;
            } else {
                tracing::debug!("Enhancement unavailable, keeping primary analysis only");
            }
        }

        stages.push(PipelineStage::Assembled);
        let generated_by = match primary.provider_index {
            Some(0) => GeneratedBy::PrimaryAi,
            _ => GeneratedBy::SecondaryAi,
        };

        Ok(InsightReport {
            narrative,
            summary,
            similar_feedback,
            generated_by,
            query: query.map(str::to_string),
            timeframe_days,
            provider: primary.provider,
            enhanced,
            stages,
        })
    }

    async fn similar_feedback(&self, query: &str, records: &[FeedbackRecord]) -> Vec<SearchResult> {
        let Some(ref client) = self.embeddings else {
            return Vec::new();
        };

        match client.embed(query).await {
            Ok(query_vector) => {
                let candidates = SemanticSearchEngine::candidates_from(records, query_vector.len());
                SemanticSearchEngine::new(self.settings.similar_limit)
                    .search(Some(query_vector.as_slice()), &candidates)
            }
            Err(e) => {
                tracing::warn!("Similar feedback lookup failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn validate(records: &[FeedbackRecord], timeframe_days: u32, query: Option<&str>) -> Result<()> {
    if !(1..=MAX_TIMEFRAME_DAYS).contains(&timeframe_days) {
        return Err(FeedscopeError::InvalidInput(format!(
            "timeframe must be between 1 and {} days, got {}",
            MAX_TIMEFRAME_DAYS, timeframe_days
        )));
    }
    if let Some(bad) = records.iter().find(|r| !(1..=5).contains(&r.rating)) {
        return Err(FeedscopeError::InvalidInput(format!(
            "feedback {} has rating {}, expected 1 to 5",
            bad.id, bad.rating
        )));
    }
    if query.is_some_and(|q| q.trim().is_empty()) {
        return Err(FeedscopeError::InvalidInput(
            "query cannot be blank".to_string(),
        ));
    }
    Ok(())
}
