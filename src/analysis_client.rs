//! HTTP client for the remote summary / NLP analysis service
//!
//! Endpoints:
//! - POST /generate-summary/ - `{ "text": ... }` -> `{ "summary": ... }` (or legacy `result`)
//! - POST /analyze/ - `{ "text": ... }` -> `{ "entities": [...], "dependencies": [...] }`
//! - GET /health - liveness, status code only

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{ClientError, PaperError, Result};
use crate::settings;
use crate::utils::safe_truncate;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Returned when the service answers without a usable summary
pub const SUMMARY_PLACEHOLDER: &str = "Summary generated successfully.";

const SUMMARY_PATH: &str = "/generate-summary/";
const ANALYZE_PATH: &str = "/analyze/";
const HEALTH_PATH: &str = "/health";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Named entity span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Dependency relation between two tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub text: String,
    pub head: String,
    pub dep: String,
    pub head_pos: String,
    pub dep_pos: String,
}

/// Normalized response of the analyze endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

/// Client for the analysis service
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    base_url: String,
    http: reqwest::Client,
}

impl AnalysisClient {
    /// Client without a request timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("papersplit/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| PaperError::HttpClient(ClientError::Http(e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Client configured from the loaded settings
    pub fn from_settings() -> Result<Self> {
        Self::with_timeout(&settings::get_api_base_url(), settings::get_request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_text(&self, path: &str, text: &str) -> std::result::Result<Value, ClientError> {
        let url = self.endpoint(path);
        debug!("[Analysis] POST {} ({} chars)", url, text.chars().count());

        let response = self.http.post(&url).json(&TextRequest { text }).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status,
                body: safe_truncate(&body, 200).to_string(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Summarize a section's text
    pub async fn generate_summary(&self, text: &str) -> Result<String> {
        let value = self.post_text(SUMMARY_PATH, text).await.map_err(|e| {
            warn!("[Analysis] summary request failed: {}", e);
            PaperError::Summary(e)
        })?;
        Ok(parse_summary_response(&value))
    }

    /// Extract entities and dependencies from a section's text
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResult> {
        let value = self.post_text(ANALYZE_PATH, text).await.map_err(|e| {
            warn!("[Analysis] analyze request failed: {}", e);
            PaperError::Analysis(e)
        })?;
        Ok(parse_analysis_response(&value))
    }

    /// True if the service answers `GET /health` with a success status
    pub async fn health(&self) -> bool {
        let result = self
            .http
            .get(self.endpoint(HEALTH_PATH))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("[Analysis] health check failed: {}", e);
                false
            }
        }
    }
}

/// Pick `summary`, then legacy `result`, then the placeholder
pub fn parse_summary_response(value: &Value) -> String {
    ["summary", "result"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or(SUMMARY_PLACEHOLDER)
        .to_string()
}

/// Missing or null arrays become empty; malformed items are dropped
pub fn parse_analysis_response(value: &Value) -> AnalysisResult {
    AnalysisResult {
        entities: parse_items(value, "entities"),
        dependencies: parse_items(value, "dependencies"),
    }
}

fn parse_items<T: DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    let Some(items) = value.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("[Analysis] dropping malformed {} item: {}", key, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{unreachable_base_url, StubResponse, StubServer};
    use serde_json::json;
    use std::error::Error as _;

    #[test]
    fn test_summary_prefers_summary_field() {
        let value = json!({"summary": "Short.", "result": "Legacy."});
        assert_eq!(parse_summary_response(&value), "Short.");
    }

    #[test]
    fn test_summary_legacy_result() {
        assert_eq!(parse_summary_response(&json!({"result": "Legacy."})), "Legacy.");
        assert_eq!(parse_summary_response(&json!({"summary": "", "result": "Legacy."})), "Legacy.");
    }

    #[test]
    fn test_summary_placeholder() {
        assert_eq!(parse_summary_response(&json!({})), SUMMARY_PLACEHOLDER);
        assert_eq!(parse_summary_response(&json!({"summary": null})), SUMMARY_PLACEHOLDER);
        assert_eq!(parse_summary_response(&json!([1, 2])), SUMMARY_PLACEHOLDER);
    }

    #[test]
    fn test_analysis_nulls_become_empty() {
        let result = parse_analysis_response(&json!({"entities": [], "dependencies": null}));
        assert_eq!(result, AnalysisResult::default());

        let result = parse_analysis_response(&json!({}));
        assert!(result.entities.is_empty());
        assert!(result.dependencies.is_empty());
    }

    #[test]
    fn test_analysis_drops_malformed_items() {
        let value = json!({
            "entities": [
                {"text": "Transformer", "label": "PRODUCT", "start": 4, "end": 15},
                {"text": "missing label", "start": 0, "end": 1}
            ],
            "dependencies": [
                {"text": "model", "head": "uses", "dep": "nsubj", "head_pos": "VERB", "dep_pos": "NOUN"},
                "garbage"
            ]
        });
        let result = parse_analysis_response(&value);

        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].label, "PRODUCT");
        assert_eq!(result.entities[0].end, 15);
        assert_eq!(result.dependencies.len(), 1);
        assert_eq!(result.dependencies[0].dep, "nsubj");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = AnalysisClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint(SUMMARY_PATH), "http://localhost:8000/generate-summary/");
    }

    #[tokio::test]
    async fn test_generate_summary_posts_text() {
        let server = StubServer::start(vec![StubResponse::json(200, r#"{"summary": "A concise summary."}"#)]);
        let client = AnalysisClient::new(&server.base_url).unwrap();

        let summary = client.generate_summary("Section body text.").await.unwrap();
        assert_eq!(summary, "A concise summary.");

        let requests = server.finish();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "/generate-summary/");
        let body: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body, json!({"text": "Section body text."}));
    }

    #[tokio::test]
    async fn test_generate_summary_error_status() {
        let server = StubServer::start(vec![StubResponse::json(500, r#"{"detail": "model crashed"}"#)]);
        let client = AnalysisClient::new(&server.base_url).unwrap();

        let err = client.generate_summary("text").await.unwrap_err();
        assert!(matches!(
            err,
            PaperError::Summary(ClientError::Status { status, .. }) if status.as_u16() == 500
        ));
        assert!(err.to_string().starts_with("Failed to generate summary"));
        assert!(err.source().is_some());
        server.finish();
    }

    #[tokio::test]
    async fn test_generate_summary_network_failure() {
        let client = AnalysisClient::new(&unreachable_base_url()).unwrap();
        let err = client.generate_summary("text").await.unwrap_err();
        assert!(matches!(err, PaperError::Summary(ClientError::Http(_))));
    }

    #[tokio::test]
    async fn test_analyze_text_normalizes_nulls() {
        let server = StubServer::start(vec![StubResponse::json(200, r#"{"entities": [], "dependencies": null}"#)]);
        let client = AnalysisClient::new(&server.base_url).unwrap();

        let result = client.analyze_text("text").await.unwrap();
        assert_eq!(result, AnalysisResult::default());

        let requests = server.finish();
        assert_eq!(requests[0].url, "/analyze/");
    }

    #[tokio::test]
    async fn test_analyze_text_invalid_json() {
        let server = StubServer::start(vec![StubResponse::json(200, "not json")]);
        let client = AnalysisClient::new(&server.base_url).unwrap();

        let err = client.analyze_text("text").await.unwrap_err();
        assert!(matches!(err, PaperError::Analysis(ClientError::Decode(_))));
        assert!(err.to_string().starts_with("Failed to analyze text"));
        server.finish();
    }

    #[tokio::test]
    async fn test_health() {
        let server = StubServer::start(vec![
            StubResponse::json(200, "{}"),
            StubResponse::json(503, "{}"),
        ]);
        let client = AnalysisClient::new(&server.base_url).unwrap();

        assert!(client.health().await);
        assert!(!client.health().await);

        let requests = server.finish();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "/health");

        let offline = AnalysisClient::new(&unreachable_base_url()).unwrap();
        assert!(!offline.health().await);
    }
}
