use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub subject: SubjectConfig,
    pub projects: ProjectsConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    pub server: ServerConfig,
}

/// The person this agent answers questions about.
#[derive(Debug, Deserialize, Clone)]
pub struct SubjectConfig {
    pub name: String,
    /// One-line positioning used in the composer's system instruction
    /// (e.g. "backend engineer focused on distributed systems").
    #[serde(default)]
    pub headline: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectsConfig {
    /// Directory of plain-text project files, one project per file.
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["*.txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// Account queried when the caller supplies no handle, or a malformed
    /// one (free-text names containing whitespace fall back here).
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_repo_limit")]
    pub repo_limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            account: default_account(),
            api_base: default_api_base(),
            repo_limit: default_repo_limit(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_account() -> String {
    "Icaro-Costa".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_repo_limit() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// `disabled` or `http`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Endpoint of the external semantic index service (`http` provider).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_passage_limit")]
    pub limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            limit: default_passage_limit(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_passage_limit() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// `disabled` or `gemini`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_llm_timeout_secs(),
            max_retries: default_llm_max_retries(),
        }
    }
}

fn default_llm_timeout_secs() -> u64 {
    30
}
fn default_llm_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Turns of history handed to the reply composer.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Projects returned by one sample call.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            sample_size: default_sample_size(),
        }
    }
}

fn default_history_limit() -> usize {
    10
}
fn default_sample_size() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl SearchConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate subject
    if config.subject.name.trim().is_empty() {
        anyhow::bail!("subject.name must not be empty");
    }

    // Validate chat
    if config.chat.history_limit < 2 {
        anyhow::bail!("chat.history_limit must be >= 2 (one user and one assistant turn)");
    }
    if config.chat.sample_size < 1 {
        anyhow::bail!("chat.sample_size must be >= 1");
    }

    // Validate github
    if config.github.repo_limit < 1 {
        anyhow::bail!("github.repo_limit must be >= 1");
    }

    // Validate search
    match config.search.provider.as_str() {
        "disabled" => {}
        "http" => {
            if config.search.endpoint.is_none() {
                anyhow::bail!("search.endpoint must be specified when provider is 'http'");
            }
        }
        other => anyhow::bail!(
            "Unknown search provider: '{}'. Must be disabled or http.",
            other
        ),
    }

    // Validate llm
    match config.llm.provider.as_str() {
        "disabled" => {}
        "gemini" => {
            if config.llm.model.is_none() {
                anyhow::bail!("llm.model must be specified when provider is 'gemini'");
            }
        }
        other => anyhow::bail!(
            "Unknown llm provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        Ok(toml::from_str(toml_str)?)
    }

    const MINIMAL: &str = r#"
[subject]
name = "Icaro Costa"

[projects]
dir = "./data/projects"

[server]
bind = "127.0.0.1:7431"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse(MINIMAL).unwrap();
        assert_eq!(cfg.chat.history_limit, 10);
        assert_eq!(cfg.chat.sample_size, 5);
        assert_eq!(cfg.github.account, "Icaro-Costa");
        assert_eq!(cfg.github.api_base, "https://api.github.com");
        assert_eq!(cfg.search.provider, "disabled");
        assert!(!cfg.search.is_enabled());
        assert!(!cfg.llm.is_enabled());
        assert_eq!(cfg.projects.include_globs, vec!["*.txt"]);
    }

    #[test]
    fn http_search_requires_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dossier.toml");
        std::fs::write(
            &path,
            format!("{}\n[search]\nprovider = \"http\"\n", MINIMAL),
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("search.endpoint"));
    }

    #[test]
    fn gemini_requires_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dossier.toml");
        std::fs::write(
            &path,
            format!("{}\n[llm]\nprovider = \"gemini\"\n", MINIMAL),
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("llm.model"));
    }

    #[test]
    fn unknown_provider_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dossier.toml");
        std::fs::write(
            &path,
            format!("{}\n[search]\nprovider = \"sqlite\"\n", MINIMAL),
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Unknown search provider"));
    }
}
