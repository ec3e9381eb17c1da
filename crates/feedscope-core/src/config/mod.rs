//! Configuration management

use crate::error::Result;
use crate::llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// LLM providers and failover behaviour
    #[serde(default)]
    pub llm: LlmConfig,

    /// Hybrid search tuning
    #[serde(default)]
    pub search: SearchConfig,

    /// Insight pipeline tuning
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// Wire format spoken by the embedding service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Cohere `/v1/embed`
    Cohere,
    /// OpenAI-compatible `/v1/embeddings` (vLLM, TEI, OpenAI)
    OpenAi,
}

impl EmbeddingBackend {
    pub fn default_url(self) -> &'static str {
        match self {
            Self::Cohere => "https://api.cohere.ai",
            Self::OpenAi => "http://localhost:8000",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::Cohere => "embed-english-v3.0",
            Self::OpenAi => "sentence-transformers/all-MiniLM-L6-v2",
        }
    }

    pub fn default_dimensions(self) -> usize {
        match self {
            Self::Cohere => 1024,
            Self::OpenAi => 384,
        }
    }
}

/// Embedding service configuration
///
/// Fields left out of a config file take the defaults of the configured
/// backend, not of whichever backend the environment would pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PartialEmbeddingConfig")]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,

    /// Base URL of the embedding service
    pub url: String,

    /// Embedding model name
    pub model: String,

    /// API key (optional, for authenticated services)
    pub api_key: Option<String>,

    /// Vector length every response must have
    pub dimensions: usize,

    /// Input is truncated to this many characters before sending
    pub max_input_chars: usize,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    pub max_retries: usize,

    /// Fixed delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl EmbeddingConfig {
    /// Defaults for `backend`, with the matching environment overrides
    pub fn for_backend(backend: EmbeddingBackend) -> Self {
        let (url, api_key) = match backend {
            EmbeddingBackend::Cohere => (
                backend.default_url().to_string(),
                std::env::var("COHERE_API_KEY").ok().filter(|k| !k.is_empty()),
            ),
            EmbeddingBackend::OpenAi => (
                std::env::var("FEEDSCOPE_EMBEDDING_URL")
                    .unwrap_or_else(|_| backend.default_url().to_string()),
                std::env::var("FEEDSCOPE_EMBEDDING_API_KEY").ok(),
            ),
        };

        Self {
            backend,
            url,
            model: std::env::var("FEEDSCOPE_EMBEDDING_MODEL")
                .unwrap_or_else(|_| backend.default_model().to_string()),
            api_key,
            dimensions: std::env::var("FEEDSCOPE_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| backend.default_dimensions()),
            max_input_chars: default_max_input_chars(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// Retry policy derived from `max_retries` and `retry_delay_ms`
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries + 1,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Cohere when only `COHERE_API_KEY` is set, otherwise the OpenAI-compatible service
impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cohere_key = std::env::var("COHERE_API_KEY").is_ok_and(|k| !k.is_empty());
        let explicit_url = std::env::var("FEEDSCOPE_EMBEDDING_URL").is_ok();

        if cohere_key && !explicit_url {
            Self::for_backend(EmbeddingBackend::Cohere)
        } else {
            Self::for_backend(EmbeddingBackend::OpenAi)
        }
    }
}

/// Embedding section as written in a config file
#[derive(Deserialize)]
struct PartialEmbeddingConfig {
    backend: Option<EmbeddingBackend>,
    url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    dimensions: Option<usize>,
    max_input_chars: Option<usize>,
    timeout_secs: Option<u64>,
    max_retries: Option<usize>,
    retry_delay_ms: Option<u64>,
}

impl From<PartialEmbeddingConfig> for EmbeddingConfig {
    fn from(partial: PartialEmbeddingConfig) -> Self {
        let base = match partial.backend {
            Some(backend) => Self::for_backend(backend),
            None => Self::default(),
        };

        Self {
            backend: base.backend,
            url: partial.url.unwrap_or(base.url),
            model: partial.model.unwrap_or(base.model),
            api_key: partial.api_key.or(base.api_key),
            dimensions: partial.dimensions.unwrap_or(base.dimensions),
            max_input_chars: partial.max_input_chars.unwrap_or(base.max_input_chars),
            timeout_secs: partial.timeout_secs.unwrap_or(base.timeout_secs),
            max_retries: partial.max_retries.unwrap_or(base.max_retries),
            retry_delay_ms: partial.retry_delay_ms.unwrap_or(base.retry_delay_ms),
        }
    }
}

/// LLM failover configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Per-adapter timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Responses must be strictly longer than this (trimmed)
    #[serde(default = "default_min_response_chars")]
    pub min_response_chars: usize,

    /// Attempts against the same adapter before moving on
    #[serde(default = "default_attempts_per_provider")]
    pub attempts_per_provider: usize,

    /// Adapters in the order they are tried
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            min_response_chars: default_min_response_chars(),
            attempts_per_provider: default_attempts_per_provider(),
            providers: default_providers(),
        }
    }
}

/// One entry in the failover chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_gemini_model")]
        model: String,
    },
    HuggingFace {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_huggingface_model")]
        model: String,
    },
    OpenAi {
        url: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_openai_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
}

impl ProviderConfig {
    /// Short adapter name used in logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "gemini",
            Self::HuggingFace { .. } => "huggingface",
            Self::OpenAi { .. } => "openai",
            Self::Ollama { .. } => "ollama",
        }
    }

    /// Whether the credentials this adapter needs are present
    pub fn is_available(&self) -> bool {
        fn present(key: &Option<String>) -> bool {
            key.as_deref().is_some_and(|k| !k.trim().is_empty())
        }

        match self {
            Self::Gemini { api_key, .. } | Self::HuggingFace { api_key, .. } => present(api_key),
            Self::OpenAi { url, .. } | Self::Ollama { url, .. } => !url.trim().is_empty(),
        }
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    let mut providers = vec![
        ProviderConfig::Gemini {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: default_gemini_model(),
        },
        ProviderConfig::HuggingFace {
            api_key: std::env::var("HUGGINGFACE_API_KEY").ok(),
            model: default_huggingface_model(),
        },
    ];

    if let Ok(url) = std::env::var("FEEDSCOPE_LLM_URL") {
        providers.push(ProviderConfig::OpenAi {
            url,
            api_key: std::env::var("FEEDSCOPE_LLM_API_KEY").ok(),
            model: default_openai_model(),
        });
    }

    providers.push(ProviderConfig::Ollama {
        url: default_ollama_url(),
        model: default_ollama_model(),
    });

    providers
}

/// Hybrid search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Raw pool size taken from the semantic engine
    #[serde(default = "default_pool_limit")]
    pub semantic_limit: usize,

    /// Raw pool size taken from the keyword engine
    #[serde(default = "default_pool_limit")]
    pub keyword_limit: usize,

    /// Results returned after merging
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Upper bound on records scored per request
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            semantic_limit: default_pool_limit(),
            keyword_limit: default_pool_limit(),
            result_limit: default_result_limit(),
            max_candidates: default_max_candidates(),
        }
    }
}

/// Insight pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Run the second, strategic prompt after a successful primary analysis
    #[serde(default = "default_true")]
    pub enhance: bool,

    /// Similar feedback attached when a query is given
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,

    /// Records included in the prompt sample
    #[serde(default = "default_max_prompt_records")]
    pub max_prompt_records: usize,

    /// Characters kept per record in the prompt sample
    #[serde(default = "default_max_record_chars")]
    pub max_record_chars: usize,

    /// Total characters of the prompt sample
    #[serde(default = "default_max_sample_chars")]
    pub max_sample_chars: usize,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_enhancement_max_output_tokens")]
    pub enhancement_max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            enhance: true,
            similar_limit: default_similar_limit(),
            max_prompt_records: default_max_prompt_records(),
            max_record_chars: default_max_record_chars(),
            max_sample_chars: default_max_sample_chars(),
            max_output_tokens: default_max_output_tokens(),
            enhancement_max_output_tokens: default_enhancement_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_input_chars() -> usize {
    2000
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_min_response_chars() -> usize {
    50
}

fn default_attempts_per_provider() -> usize {
    1
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_huggingface_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.3".to_string()
}

fn default_openai_model() -> String {
    std::env::var("FEEDSCOPE_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_ollama_url() -> String {
    std::env::var("FEEDSCOPE_OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_pool_limit() -> usize {
    20
}

fn default_result_limit() -> usize {
    10
}

fn default_max_candidates() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

fn default_similar_limit() -> usize {
    5
}

fn default_max_prompt_records() -> usize {
    50
}

fn default_max_record_chars() -> usize {
    200
}

fn default_max_sample_chars() -> usize {
    8000
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_enhancement_max_output_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from `path`, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_availability() {
        let gemini = ProviderConfig::Gemini {
            api_key: None,
            model: default_gemini_model(),
        };
        assert!(!gemini.is_available());

        let gemini = ProviderConfig::Gemini {
            api_key: Some("  ".to_string()),
            model: default_gemini_model(),
        };
        assert!(!gemini.is_available());

        let ollama = ProviderConfig::Ollama {
            url: "http://localhost:11434".to_string(),
            model: default_ollama_model(),
        };
        assert!(ollama.is_available());
        assert_eq!(ollama.name(), "ollama");
    }

    #[test]
    fn test_yaml_provider_list() {
        let yaml = r#"
llm:
  timeout_secs: 10
  providers:
    - kind: gemini
      api_key: abc
    - kind: ollama
search:
  result_limit: 5
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.timeout_secs, 10);
        assert_eq!(config.llm.min_response_chars, 50);
        assert_eq!(config.llm.providers.len(), 2);
        assert_eq!(config.llm.providers[0].name(), "gemini");
        assert!(config.llm.providers[0].is_available());
        assert_eq!(config.search.result_limit, 5);
        assert_eq!(config.search.semantic_limit, 20);
        assert!(config.insights.enhance);
    }

    #[test]
    fn test_embedding_retry_policy() {
        let config = EmbeddingConfig {
            max_retries: 3,
            retry_delay_ms: 1000,
            ..EmbeddingConfig::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yml");

        let missing = Config::load_from(&path).unwrap();
        assert_eq!(missing.search.result_limit, 10);

        std::fs::write(&path, "llm:\n  providers: []\ninsights:\n  enhance: false\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.llm.providers.is_empty());
        assert!(!config.insights.enhance);
    }

    #[test]
    fn test_embedding_defaults_follow_configured_backend() {
        let config: Config = serde_yaml::from_str("embedding:\n  backend: cohere\n").unwrap();
        assert_eq!(config.embedding.backend, EmbeddingBackend::Cohere);
        assert_eq!(config.embedding.url, "https://api.cohere.ai");
        assert_eq!(config.embedding.dimensions, 1024);
        assert_eq!(config.embedding.max_retries, 3);

        let yaml = "embedding:\n  backend: open_ai\n  url: http://10.0.0.5:8080\n  \
                    dimensions: 768\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.embedding.backend, EmbeddingBackend::OpenAi);
        assert_eq!(config.embedding.url, "http://10.0.0.5:8080");
        assert_eq!(config.embedding.dimensions, 768);
        assert_eq!(config.embedding.timeout_secs, 30);
    }

    #[test]
    fn test_saved_embedding_config_reloads_unchanged() {
        let mut config = Config::default();
        config.embedding = EmbeddingConfig {
            api_key: Some("key".to_string()),
            max_retries: 0,
            ..EmbeddingConfig::for_backend(EmbeddingBackend::Cohere)
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        let reloaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reloaded.embedding.backend, EmbeddingBackend::Cohere);
        assert_eq!(reloaded.embedding.url, config.embedding.url);
        assert_eq!(reloaded.embedding.model, config.embedding.model);
        assert_eq!(reloaded.embedding.api_key.as_deref(), Some("key"));
        assert_eq!(reloaded.embedding.max_retries, 0);
    }
}
