//! Hugging Face Inference API adapter

use super::http::{build_client, malformed, send_json};
use super::{GenerationRequest, LlmProvider};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

pub struct HuggingFaceProvider {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HuggingFaceProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        #[derive(Serialize)]
        struct InferenceRequest<'a> {
            inputs: &'a str,
            parameters: Parameters,
            options: Options,
        }

        #[derive(Serialize)]
        struct Parameters {
            max_new_tokens: u32,
            temperature: f32,
            return_full_text: bool,
        }

        #[derive(Serialize)]
        struct Options {
            wait_for_model: bool,
        }

        #[derive(Deserialize)]
        struct Generated {
            generated_text: Option<String>,
        }

        let body = InferenceRequest {
            inputs: &request.prompt,
            parameters: Parameters {
                max_new_tokens: request.max_output_tokens,
                temperature: request.temperature,
                return_full_text: false,
            },
            options: Options {
                wait_for_model: true,
            },
        };

        let req = self
            .http_client
            .post(format!("{}/models/{}", self.base_url, self.model))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);

        let response: Vec<Generated> = send_json(req, self.name()).await?;
        response
            .into_iter()
            .next()
            .and_then(|g| g.generated_text)
            .ok_or_else(|| malformed(self.name(), "no generated_text"))
    }

    fn name(&self) -> &str {
        "huggingface"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
