//! Remote project lister.
//!
//! Fetches an account's most recently updated repositories from the
//! GitHub REST API and renders a short one-line summary per repository.
//! Results are transient: fetched fresh per request, never cached.
//!
//! # Failure policy
//!
//! - Missing token: fails with [`ToolError::MissingCredential`] before
//!   any network call is attempted.
//! - 429 / 5xx / network errors: retried with exponential backoff.
//! - Other 4xx: fail immediately.
//!
//! All failures surface as [`ToolError`] values; the tool boundary
//! renders them to strings.

use serde::Deserialize;
use std::time::Duration;

use crate::config::GithubConfig;
use crate::error::{ToolError, ToolResult};
use crate::models::RepoSummary;

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Read the API token from the environment. Empty values count as absent.
pub fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV_VAR)
        .ok()
        .filter(|t| !t.trim().is_empty())
}

/// Pick the account to query.
///
/// A requested identifier containing whitespace is a malformed or
/// free-text name (e.g. the subject's full name), not a handle, and
/// falls back to the configured default account.
pub fn resolve_account<'a>(config: &'a GithubConfig, requested: Option<&'a str>) -> &'a str {
    match requested {
        Some(account) if !account.trim().is_empty() && !account.contains(char::is_whitespace) => {
            account
        }
        _ => &config.account,
    }
}

/// Raw repository entry from `GET /users/{account}/repos`.
#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: i64,
    updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    #[allow(dead_code)]
    fork: bool,
}

/// Fetch the account's repositories sorted by most-recently-updated,
/// descending, truncated to `limit`. Forks are included, not filtered.
pub async fn fetch_recent_repos(
    config: &GithubConfig,
    account: Option<&str>,
    limit: usize,
    token: Option<&str>,
) -> ToolResult<Vec<RepoSummary>> {
    let token = token.ok_or(ToolError::MissingCredential {
        service: "GitHub",
        env_var: TOKEN_ENV_VAR,
    })?;

    let account = resolve_account(config, account);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ToolError::RemoteCall(e.to_string()))?;

    let url = format!(
        "{}/users/{}/repos?sort=updated&direction=desc&per_page={}",
        config.api_base.trim_end_matches('/'),
        account,
        limit
    );

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s, ...
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", concat!("dossier/", env!("CARGO_PKG_VERSION")))
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let repos: Vec<ApiRepo> = response
                        .json()
                        .await
                        .map_err(|e| ToolError::RemoteCall(format!("invalid response: {}", e)))?;
                    return Ok(repos
                        .into_iter()
                        .take(limit)
                        .map(|r| RepoSummary {
                            name: r.name,
                            description: r.description,
                            language: r.language,
                            stars: r.stargazers_count,
                            updated_at: r.updated_at,
                        })
                        .collect());
                }

                // Rate limited or server error — retry
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(ToolError::RemoteCall(format!("GitHub API error {}", status)));
                    continue;
                }

                // Client error (not 429) — don't retry
                return Err(ToolError::RemoteCall(format!(
                    "GitHub API error {} for account '{}'",
                    status, account
                )));
            }
            Err(e) => {
                last_err = Some(ToolError::RemoteCall(e.to_string()));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| ToolError::RemoteCall("request failed after retries".into())))
}

/// Render the one-line-per-repository summary consumed by the router.
pub fn format_repos(account: &str, repos: &[RepoSummary]) -> String {
    let mut out = format!("Latest GitHub repositories for {}:\n", account);
    for repo in repos {
        out.push_str(&format!(
            "- {}: {} ({}, ★ {})\n",
            repo.name,
            repo.description.as_deref().unwrap_or("no description"),
            repo.language.as_deref().unwrap_or("n/a"),
            repo.stars
        ));
    }
    out
}
