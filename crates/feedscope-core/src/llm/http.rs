//! HTTP plumbing shared by the provider adapters

use crate::error::{FeedscopeError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest error body kept in `ProviderStatus`
const MAX_ERROR_BODY_CHARS: usize = 500;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Send a request and decode a JSON body, mapping failures onto provider errors
pub(crate) async fn send_json<R: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<R> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(FeedscopeError::ProviderStatus {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| FeedscopeError::MalformedResponse {
        provider: provider.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn malformed(provider: &str, reason: impl Into<String>) -> FeedscopeError {
    FeedscopeError::MalformedResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    }
}
