//! HTTP-based embedder for Cohere and OpenAI-compatible services

use super::http::{build_client, malformed, send_json};
use super::Embedder;
use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Embedder that calls an external HTTP service
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    backend: EmbeddingBackend,
    url: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout())?,
            backend: config.backend,
            url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(&EmbeddingConfig::default())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref api_key) => request.header("Authorization", format!("Bearer {}", api_key)),
            None => request,
        }
    }

    async fn embed_cohere(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            texts: [&'a str; 1],
            model: &'a str,
            input_type: &'a str,
            embedding_types: [&'a str; 1],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            embeddings: Embeddings,
        }

        #[derive(Deserialize)]
        struct Embeddings {
            float: Vec<Vec<f32>>,
        }

        let request = EmbedRequest {
            texts: [text],
            model: &self.model,
            input_type: "search_document",
            embedding_types: ["float"],
        };

        let req = self
            .http_client
            .post(format!("{}/v1/embed", self.url))
            .header("Cohere-Version", "2022-12-06")
            .json(&request);

        let response: EmbedResponse = send_json(self.authorized(req), "cohere").await?;
        response
            .embeddings
            .float
            .into_iter()
            .next()
            .ok_or_else(|| malformed("cohere", "no embedding returned"))
    }

    async fn embed_openai(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: [&'a str; 1],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: &self.model,
            input: [text],
        };

        let req = self
            .http_client
            .post(format!("{}/v1/embeddings", self.url))
            .json(&request);

        let response: EmbedResponse = send_json(self.authorized(req), "embeddings").await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| malformed("embeddings", "no embedding returned"))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.backend {
            EmbeddingBackend::Cohere => self.embed_cohere(text).await,
            EmbeddingBackend::OpenAi => self.embed_openai(text).await,
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedscopeError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, backend: EmbeddingBackend) -> EmbeddingConfig {
        EmbeddingConfig {
            backend,
            url: format!("{}/", server.uri()),
            model: "test-model".to_string(),
            api_key: Some("secret".to_string()),
            dimensions: 3,
            ..EmbeddingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_cohere_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed"))
            .and(header("Authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "texts": ["great support"],
                "embedding_types": ["float"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": {"float": [[0.1, 0.2, 0.3]]}
            })))
            .mount(&server)
            .await;

        let embedder =
            HttpEmbedder::from_config(&config(&server, EmbeddingBackend::Cohere)).unwrap();
        let vector = embedder.embed("great support").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_openai_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(serde_json::json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [1.0, 0.0, 0.0]}]
            })))
            .mount(&server)
            .await;

        let embedder =
            HttpEmbedder::from_config(&config(&server, EmbeddingBackend::OpenAi)).unwrap();
        assert_eq!(embedder.dimensions(), 3);
        assert_eq!(embedder.embed("slow app").await.unwrap(), vec![1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let embedder =
            HttpEmbedder::from_config(&config(&server, EmbeddingBackend::OpenAi)).unwrap();
        let err = embedder.embed("slow app").await.unwrap_err();
        assert!(matches!(
            err,
            FeedscopeError::ProviderStatus { status: 503, .. }
        ));
    }
}
