//! Upstream forwarding and the mock echo fallback.

use chrono::Utc;
use reqwest::Client;

use crate::error::{PromptGuardError, Result};
use crate::policy::config::ProxyConfig;

/// Forward a sanitized body to the configured upstream endpoint.
///
/// The request is bounded by the client's timeout; a network error, timeout,
/// or non-success status all surface as [`PromptGuardError::Upstream`] so the
/// caller can degrade to [`mock_echo`].
pub async fn forward(client: &Client, config: &ProxyConfig, body: &str) -> Result<String> {
    let response = client
        .post(&config.upstream)
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .map_err(|e| PromptGuardError::Upstream(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PromptGuardError::Upstream(format!(
            "upstream returned {}",
            status
        )));
    }

    response
        .text()
        .await
        .map_err(|e| PromptGuardError::Upstream(e.to_string()))
}

/// Build a synthetic chat-completion response echoing the sanitized body.
///
/// Returned when the upstream is unreachable so the caller still receives a
/// well-formed response; the `x-promptguard-mock` header marks it.
pub fn mock_echo(sanitized_body: &str) -> String {
    serde_json::json!({
        "id": format!("mock-{}", Utc::now().timestamp_millis()),
        "object": "chat.completion",
        "created": Utc::now().timestamp(),
        "model": "promptguard-mock",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": format!("[mock] upstream unavailable; sanitized request was: {}", sanitized_body),
            },
            "finish_reason": "stop",
        }],
    })
    .to_string()
}
