//! Semantic search boundary.
//!
//! The semantic index over the subject's biography and documents is an
//! external collaborator: this crate consumes it, it does not build it.
//! [`SemanticSearch`] is the seam:
//!
//! - **[`DisabledSearch`]** — every query fails with a descriptive error;
//!   used when no index service is configured.
//! - **[`HttpSearch`]** — posts the query to a configured index service
//!   endpoint and parses ranked passages, with the same timeout and
//!   retry/backoff behavior as the other remote clients.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, ... (capped at 2^5)

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::{ToolError, ToolResult};
use crate::models::Passage;

/// Trait for semantic search backends.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Returns the provider identifier (e.g. `"http"`).
    fn provider_name(&self) -> &str;

    /// Return the passages most relevant to `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> ToolResult<Vec<Passage>>;
}

/// A no-op provider used when `search.provider = "disabled"`.
pub struct DisabledSearch;

#[async_trait]
impl SemanticSearch for DisabledSearch {
    fn provider_name(&self) -> &str {
        "disabled"
    }

    async fn search(&self, _query: &str, _limit: usize) -> ToolResult<Vec<Passage>> {
        Err(ToolError::Unconfigured {
            feature: "semantic search",
            hint: "set [search] provider and endpoint in the config",
        })
    }
}

/// Provider backed by an external semantic index service over HTTP.
///
/// Sends `POST {endpoint}` with `{"query": ..., "limit": ...}` and
/// expects `{"passages": [{"text": ..., "score": ...}]}` ranked best
/// first.
pub struct HttpSearch {
    endpoint: String,
    timeout_secs: u64,
    max_retries: u32,
}

impl HttpSearch {
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| anyhow::anyhow!("search.endpoint required for http provider"))?;
        Ok(Self {
            endpoint,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    passages: Vec<Passage>,
}

#[async_trait]
impl SemanticSearch for HttpSearch {
    fn provider_name(&self) -> &str {
        "http"
    }

    async fn search(&self, query: &str, limit: usize) -> ToolResult<Vec<Passage>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| ToolError::RemoteCall(e.to_string()))?;

        let body = serde_json::json!({ "query": query, "limit": limit });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client.post(&self.endpoint).json(&body).send().await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: SearchResponse = response.json().await.map_err(|e| {
                            ToolError::RemoteCall(format!("invalid response: {}", e))
                        })?;
                        return Ok(parsed.passages);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err =
                            Some(ToolError::RemoteCall(format!("index service error {}", status)));
                        continue;
                    }

                    return Err(ToolError::RemoteCall(format!(
                        "index service error {}",
                        status
                    )));
                }
                Err(e) => {
                    last_err = Some(ToolError::RemoteCall(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| ToolError::RemoteCall("search failed after retries".into())))
    }
}

/// Create the appropriate [`SemanticSearch`] based on configuration.
pub fn create_search(config: &SearchConfig) -> anyhow::Result<Box<dyn SemanticSearch>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledSearch)),
        "http" => Ok(Box::new(HttpSearch::new(config)?)),
        other => anyhow::bail!("Unknown search provider: {}", other),
    }
}

/// Render passages as the textual tool result consumed by the router.
pub fn format_passages(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return "No relevant passages found.".to_string();
    }
    let mut out = String::from("Relevant notes:\n");
    for p in passages {
        out.push_str(&format!("- {}\n", p.text.trim()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_search_reports_unconfigured() {
        let err = DisabledSearch.search("skills", 4).await.unwrap_err();
        assert!(matches!(err, ToolError::Unconfigured { .. }));
        assert!(err.to_string().contains("semantic search"));
    }

    #[test]
    fn create_search_dispatches_on_provider() {
        let provider = create_search(&SearchConfig::default()).unwrap();
        assert_eq!(provider.provider_name(), "disabled");

        let cfg = SearchConfig {
            provider: "http".to_string(),
            endpoint: Some("http://127.0.0.1:9/search".to_string()),
            ..Default::default()
        };
        assert_eq!(create_search(&cfg).unwrap().provider_name(), "http");
    }

    #[test]
    fn http_search_requires_endpoint() {
        let cfg = SearchConfig {
            provider: "http".to_string(),
            ..Default::default()
        };
        assert!(HttpSearch::new(&cfg).is_err());
    }

    #[test]
    fn search_response_parses_and_defaults() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"passages": [{"text": "Ten years of Rust"}]}"#).unwrap();
        assert_eq!(parsed.passages.len(), 1);
        assert_eq!(parsed.passages[0].score, 0.0);

        let empty: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.passages.is_empty());
    }

    #[test]
    fn format_passages_lists_text() {
        let passages = vec![
            Passage {
                text: "Ten years of backend work.".into(),
                score: 0.92,
            },
            Passage {
                text: "Speaks at Rust meetups.".into(),
                score: 0.81,
            },
        ];
        let out = format_passages(&passages);
        assert!(out.contains("- Ten years of backend work."));
        assert!(out.contains("- Speaks at Rust meetups."));

        assert_eq!(format_passages(&[]), "No relevant passages found.");
    }
}
