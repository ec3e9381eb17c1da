//! Ollama `/api/generate` adapter

use super::http::{build_client, send_json};
use super::{GenerationRequest, LlmProvider};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OllamaProvider {
    http_client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            url: url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: Options,
        }

        #[derive(Serialize)]
        struct Options {
            temperature: f32,
            num_predict: u32,
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            response: String,
        }

        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: Options {
                temperature: request.temperature,
                num_predict: request.max_output_tokens,
            },
        };

        let req = self
            .http_client
            .post(format!("{}/api/generate", self.url))
            .json(&body);

        let response: GenerateResponse = send_json(req, self.name()).await?;
        Ok(response.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_non_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.2",
                "stream": false,
                "options": {"num_predict": 2048}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Delivery complaints dominate.",
                "done": true
            })))
            .mount(&server)
            .await;

        let provider =
            OllamaProvider::new(server.uri(), "llama3.2", Duration::from_secs(5)).unwrap();
        let text = provider
            .generate(&GenerationRequest::new("analyze"))
            .await
            .unwrap();
        assert_eq!(text, "Delivery complaints dominate.");
    }
}
