//! Sanitizing HTTP proxy for chat-completion traffic.
//!
//! The server exposes:
//!
//! - `POST /v1/chat/completions` — sanitize the raw body, forward it to the
//!   configured upstream, return the upstream response. On upstream failure a
//!   mock echo response is returned instead (tagged `x-promptguard-mock`);
//!   the caller always gets something usable.
//! - `POST /api/sanitize` — sanitize a `{"text": ...}` payload directly.
//! - `GET  /api/policy`   — current policy configuration as JSON.
//!
//! Every proxied response carries `x-promptguard-findings`: the findings
//! list as a base64-encoded JSON array, so audit metadata stays out of the
//! payload itself.

pub mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header::HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use base64::Engine;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::policy::config::{PolicyConfig, ProxyConfig};
use crate::policy::Policy;
use crate::sanitize::{sanitize, Finding};

/// Response header carrying the base64-encoded findings JSON.
pub const FINDINGS_HEADER: &str = "x-promptguard-findings";
/// Response header marking a mock fallback response.
pub const MOCK_HEADER: &str = "x-promptguard-mock";

/// Shared state for all proxy handlers.
#[derive(Clone)]
pub struct AppState {
    /// Compiled policy, shared read-only across requests.
    pub policy: Arc<Policy>,
    /// Declarative policy configuration, kept for the `/api/policy` view.
    pub policy_config: PolicyConfig,
    /// Proxy settings (upstream URL, timeout).
    pub config: ProxyConfig,
    /// Reused HTTP client for upstream calls.
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(policy_config: PolicyConfig, config: ProxyConfig) -> crate::error::Result<Self> {
        let policy = Arc::new(Policy::compile(&policy_config)?);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| crate::error::PromptGuardError::Upstream(e.to_string()))?;
        Ok(Self {
            policy,
            policy_config,
            config,
            client,
        })
    }
}

/// Build the axum router with all proxy endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(proxy_chat))
        .route("/api/sanitize", post(api_sanitize))
        .route("/api/policy", get(get_policy))
        .with_state(state)
}

/// The proxy server; binds, then serves in a background task.
pub struct ProxyServer {
    listen_addr: String,
    state: Arc<AppState>,
}

impl ProxyServer {
    pub fn new(listen_addr: String, state: Arc<AppState>) -> Self {
        Self { listen_addr, state }
    }

    /// Start the proxy server and return the actual bound address.
    pub async fn start(&self) -> crate::error::Result<SocketAddr> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("PromptGuard proxy listening on {}", local_addr);

        let app = router(self.state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Proxy server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Encode findings as a base64 JSON array for header transport.
///
/// Header values must be ASCII-safe; matched values can be arbitrary text,
/// so the JSON is base64-wrapped.
pub fn encode_findings(findings: &[Finding]) -> String {
    let json = serde_json::to_string(findings).unwrap_or_else(|_| "[]".to_string());
    base64::engine::general_purpose::STANDARD.encode(json.as_bytes())
}

/// `POST /v1/chat/completions` — sanitize, forward, fall back to mock.
async fn proxy_chat(State(state): State<Arc<AppState>>, body: String) -> Response {
    let sanitized = sanitize(&body, &state.policy);
    if !sanitized.findings.is_empty() {
        info!(
            "Sanitized request body: {} finding(s) redacted",
            sanitized.findings.len()
        );
    }
    let findings_header = encode_findings(&sanitized.findings);

    let (status, payload, is_mock) =
        match upstream::forward(&state.client, &state.config, &sanitized.output).await {
            Ok(body) => (StatusCode::OK, body, false),
            Err(e) => {
                warn!(
                    "Upstream {} unavailable, returning mock echo: {}",
                    state.config.upstream, e
                );
                (StatusCode::OK, upstream::mock_echo(&sanitized.output), true)
            }
        };

    let mut response = (status, payload).into_response();
    set_header(&mut response, FINDINGS_HEADER, &findings_header);
    response.headers_mut().insert(
        HeaderName::from_static("content-type"),
        HeaderValue::from_static("application/json"),
    );
    if is_mock {
        set_header(&mut response, MOCK_HEADER, "true");
    }
    response
}

fn set_header(response: &mut Response, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(name), value);
    }
}

/// Request body for `POST /api/sanitize`.
#[derive(Debug, Deserialize)]
struct SanitizeRequest {
    text: String,
}

/// `POST /api/sanitize` — run the sanitizer and return output plus findings.
async fn api_sanitize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SanitizeRequest>,
) -> impl IntoResponse {
    let result = sanitize(&req.text, &state.policy);
    Json(result)
}

/// `GET /api/policy` — the declarative policy configuration as JSON.
async fn get_policy(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match serde_json::to_value(&state.policy_config) {
        Ok(value) => Json(value).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FindingKind;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt as _;

    fn test_state(upstream: &str) -> Arc<AppState> {
        let config = ProxyConfig {
            listen: "127.0.0.1:0".to_string(),
            upstream: upstream.to_string(),
            timeout_secs: 1,
        };
        Arc::new(AppState::new(PolicyConfig::default(), config).unwrap())
    }

    fn decode_findings(header: &str) -> serde_json::Value {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(header)
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn encode_findings_is_ascii_safe_json() {
        let findings = vec![Finding {
            kind: FindingKind::Email,
            start: 0,
            end: 7,
            value: "a@b.com".to_string(),
        }];
        let encoded = encode_findings(&findings);
        assert!(encoded.is_ascii());
        let decoded = decode_findings(&encoded);
        assert_eq!(decoded[0]["type"], "EMAIL");
        assert_eq!(decoded[0]["value"], "a@b.com");
    }

    #[test]
    fn encode_findings_empty_list() {
        let decoded = decode_findings(&encode_findings(&[]));
        assert_eq!(decoded, serde_json::json!([]));
    }

    #[tokio::test]
    async fn api_sanitize_redacts_and_reports() {
        let app = router(test_state("http://127.0.0.1:1/unreachable"));
        let req = Request::builder()
            .method("POST")
            .uri("/api/sanitize")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"text": "mail a@b.com now"}).to_string(),
            ))
            .unwrap();
        let resp = app.into_service().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["output"], "mail [REDACTED_EMAIL] now");
        assert_eq!(json["findings"][0]["type"], "EMAIL");
    }

    #[tokio::test]
    async fn get_policy_returns_config() {
        let app = router(test_state("http://127.0.0.1:1/unreachable"));
        let req = Request::builder()
            .uri("/api/policy")
            .body(Body::empty())
            .unwrap();
        let resp = app.into_service().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unreachable_upstream_falls_back_to_mock() {
        let app = router(test_state("http://127.0.0.1:1/unreachable"));
        let req = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .body(Body::from("say hi to jane.doe@example.com"))
            .unwrap();
        let resp = app.into_service().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[MOCK_HEADER], "true");

        let findings = decode_findings(resp.headers()[FINDINGS_HEADER].to_str().unwrap());
        assert_eq!(findings[0]["type"], "EMAIL");
        assert_eq!(findings[0]["value"], "jane.doe@example.com");

        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let content = json["choices"][0]["message"]["content"].as_str().unwrap();
        // The mock echoes the sanitized body, never the original.
        assert!(content.contains("[REDACTED_EMAIL]"));
        assert!(!content.contains("jane.doe@example.com"));
    }
}
