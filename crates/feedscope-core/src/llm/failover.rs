//! Ordered failover across text-generation providers

use super::{
    GeminiProvider, GenerationRequest, HuggingFaceProvider, LlmProvider, OllamaProvider,
    OpenAiProvider, RetryPolicy,
};
use crate::config::{LlmConfig, ProviderConfig};
use crate::error::{FeedscopeError, ProviderErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default per-attempt deadline
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Responses must be strictly longer than this (trimmed characters)
pub const DEFAULT_MIN_RESPONSE_CHARS: usize = 50;

/// Outcome of one pass through the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCallResult {
    /// Accepted text, empty when every provider failed
    pub text: String,
    pub succeeded: bool,
    /// Kind of the last failure seen
    pub error_kind: Option<ProviderErrorKind>,
    /// Name of the provider that answered
    pub provider: Option<String>,
    /// Position of that provider in the chain
    pub provider_index: Option<usize>,
    /// Total provider attempts made
    pub attempts: usize,
}

/// Tries each provider in order until one returns usable text
#[derive(Clone)]
pub struct ProviderFailoverChain {
    providers: Vec<Arc<dyn LlmProvider>>,
    timeout: Duration,
    min_response_chars: usize,
    retry: RetryPolicy,
}

impl ProviderFailoverChain {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self {
            providers,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            min_response_chars: DEFAULT_MIN_RESPONSE_CHARS,
            retry: RetryPolicy::once(),
        }
    }

    /// Build the chain in configured order, skipping providers without credentials
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let timeout = config.timeout();
        let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();

        for entry in &config.providers {
            if !entry.is_available() {
                tracing::debug!("Skipping {} provider: not configured", entry.name());
                continue;
            }
            providers.push(build_provider(entry, timeout)?);
        }

        if providers.is_empty() {
            tracing::warn!("No LLM providers configured, insights will use the fallback report");
        } else {
            tracing::debug!(
                "LLM failover chain: {}",
                providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
        }

        Ok(Self::new(providers)
            .with_timeout(timeout)
            .with_min_response_chars(config.min_response_chars)
            .with_attempts_per_provider(config.attempts_per_provider))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_response_chars(mut self, min_response_chars: usize) -> Self {
        self.min_response_chars = min_response_chars;
        self
    }

    pub fn with_attempts_per_provider(mut self, attempts: usize) -> Self {
        self.retry = RetryPolicy::new(attempts, Duration::ZERO);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in call order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Stop at the first acceptable response; never fabricates text
    pub async fn call(&self, request: &GenerationRequest) -> ProviderCallResult {
        let mut attempts = 0;
        let mut last_kind = None;

        for (index, provider) in self.providers.iter().enumerate() {
            let outcome = self
                .retry
                .run(provider.name(), |_| {
                    attempts += 1;
                    self.attempt(provider.as_ref(), request)
                })
                .await;

            match outcome {
                Ok(text) => {
                    tracing::debug!("{} answered (chain position {})", provider.name(), index);
                    return ProviderCallResult {
                        text,
                        succeeded: true,
                        error_kind: None,
                        provider: Some(provider.name().to_string()),
                        provider_index: Some(index),
                        attempts,
                    };
                }
                Err(exhausted) => {
                    tracing::warn!(
                        "{} failed, moving to next provider: {}",
                        provider.name(),
                        exhausted.last_error
                    );
                    last_kind = Some(exhausted.last_error.provider_error_kind());
                }
            }
        }

        ProviderCallResult {
            text: String::new(),
            succeeded: false,
            error_kind: last_kind,
            provider: None,
            provider_index: None,
            attempts,
        }
    }

    async fn attempt(
        &self,
        provider: &dyn LlmProvider,
        request: &GenerationRequest,
    ) -> Result<String> {
        let text = tokio::time::timeout(self.timeout, provider.generate(request))
            .await
            .map_err(|_| FeedscopeError::Timeout {
                operation: provider.name().to_string(),
                after: self.timeout,
            })??;

        let length = text.trim().chars().count();
        if length <= self.min_response_chars {
            return Err(FeedscopeError::EmptyResponse {
                provider: provider.name().to_string(),
                length,
                min: self.min_response_chars,
            });
        }
        Ok(text.trim().to_string())
    }
}

fn build_provider(entry: &ProviderConfig, timeout: Duration) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match entry {
        ProviderConfig::Gemini { api_key, model } => Arc::new(GeminiProvider::new(
            api_key.clone().unwrap_or_default(),
            model.clone(),
            timeout,
        )?),
        ProviderConfig::HuggingFace { api_key, model } => Arc::new(HuggingFaceProvider::new(
            api_key.clone().unwrap_or_default(),
            model.clone(),
            timeout,
        )?),
        ProviderConfig::OpenAi {
            url,
            api_key,
            model,
        } => Arc::new(OpenAiProvider::new(
            url.clone(),
            api_key.clone(),
            model.clone(),
            timeout,
        )?),
        ProviderConfig::Ollama { url, model } => {
            Arc::new(OllamaProvider::new(url.clone(), model.clone(), timeout)?)
        }
    };
    Ok(provider)
}
