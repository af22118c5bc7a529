//! The tool surface.
//!
//! Each tool is a named, independently invocable function with a
//! one-line natural-language description and a JSON parameter schema,
//! registered in a [`ToolRegistry`] and served over HTTP for agent
//! discovery (`GET /tools/list`) and invocation (`POST /tools/{name}`).
//!
//! The four built-ins delegate to the same core functions the router
//! calls, so both surfaces have identical capabilities:
//!
//! | Tool | Backs router rule |
//! |------|-------------------|
//! | `search_profile` | rule 3 (biography / skills) |
//! | `github_repos` | rule 4 (remote repositories) |
//! | `sample_projects` | rule 5 (local sampler) |
//! | `project_details` | rules 1–2 (named project detail) |

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ToolResult;
use crate::github;
use crate::models::{Passage, ProjectRecord, ProjectSummary, RepoSummary};
use crate::projects::ProjectStore;
use crate::retrieval::{create_search, SemanticSearch};

// ═══════════════════════════════════════════════════════════════════════
// Tool trait
// ═══════════════════════════════════════════════════════════════════════

/// A tool the agent surface can discover and call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Lowercase identifier with underscores; doubles as the route path
    /// (`POST /tools/{name}`).
    fn name(&self) -> &str;

    /// One-line description used for tool selection.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters (`type: "object"`).
    fn parameters_schema(&self) -> Value;

    /// Execute with JSON parameters. Failures surface as errors here and
    /// are rendered to descriptive strings at the serving boundary.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> anyhow::Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Bridge from tool execution to the core collaborators.
pub struct ToolContext {
    config: Arc<Config>,
    store: ProjectStore,
    search: Box<dyn SemanticSearch>,
    github_token: Option<String>,
}

impl ToolContext {
    pub fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let store = ProjectStore::new(&config.projects)?;
        let search = create_search(&config.search)?;
        let github_token = github::token_from_env();
        Ok(Self {
            config,
            store,
            search,
            github_token,
        })
    }

    /// Random local projects minus `exclude`. Equivalent to
    /// `dossier projects sample`.
    pub fn sample(
        &self,
        n: usize,
        exclude: &std::collections::BTreeSet<String>,
    ) -> ToolResult<Vec<ProjectSummary>> {
        self.store.sample(n, exclude)
    }

    /// Fuzzy detail lookup. Equivalent to `dossier projects show`.
    pub fn detail(&self, name: &str) -> ToolResult<ProjectRecord> {
        self.store.detail(name)
    }

    /// Recently updated remote repositories. Equivalent to `dossier repos`.
    pub async fn repos(
        &self,
        account: Option<&str>,
        limit: usize,
    ) -> ToolResult<Vec<RepoSummary>> {
        github::fetch_recent_repos(
            &self.config.github,
            account,
            limit,
            self.github_token.as_deref(),
        )
        .await
    }

    /// Semantic passages about the subject. Equivalent to `dossier search`.
    pub async fn profile(&self, query: &str) -> ToolResult<Vec<Passage>> {
        self.search.search(query, self.config.search.limit).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in tools
// ═══════════════════════════════════════════════════════════════════════

/// Semantic search over the subject's biography. Backs router rule 3.
pub struct SearchProfileTool;

#[async_trait]
impl Tool for SearchProfileTool {
    fn name(&self) -> &str {
        "search_profile"
    }

    fn description(&self) -> &str {
        "Search the subject's biography, skills, and background"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Free-text question about the subject" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let query = params["query"].as_str().unwrap_or("");
        if query.trim().is_empty() {
            anyhow::bail!("query must not be empty");
        }

        let passages = ctx.profile(query).await?;
        Ok(serde_json::json!({ "passages": passages }))
    }
}

/// Recently updated remote repositories. Backs router rule 4.
pub struct GithubReposTool;

#[async_trait]
impl Tool for GithubReposTool {
    fn name(&self) -> &str {
        "github_repos"
    }

    fn description(&self) -> &str {
        "List the subject's most recently updated GitHub repositories"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "account": { "type": "string", "description": "Account handle; defaults to the configured account" },
                "limit": { "type": "integer", "description": "Max repositories", "default": 5 }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let account = params["account"].as_str();
        let limit = params["limit"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(ctx.config().github.repo_limit);

        let repos = ctx.repos(account, limit).await?;
        Ok(serde_json::json!({ "repos": repos }))
    }
}

/// Random sample of local projects. Backs router rule 5.
pub struct SampleProjectsTool;

#[async_trait]
impl Tool for SampleProjectsTool {
    fn name(&self) -> &str {
        "sample_projects"
    }

    fn description(&self) -> &str {
        "Sample random local projects; pass 'exclude' to avoid repeating ones already shown"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "n": { "type": "integer", "description": "Max projects to return", "default": 5 },
                "exclude": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Project names already shown to this user"
                }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let n = params["n"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(ctx.config().chat.sample_size);
        let exclude: std::collections::BTreeSet<String> = params["exclude"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let projects = ctx.sample(n, &exclude)?;
        Ok(serde_json::json!({ "projects": projects }))
    }
}

/// Full text of one named local project. Backs router rules 1 and 2.
pub struct ProjectDetailsTool;

#[async_trait]
impl Tool for ProjectDetailsTool {
    fn name(&self) -> &str {
        "project_details"
    }

    fn description(&self) -> &str {
        "Full text of one local project; use whenever the user names a project"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Project name (fuzzy, case- and separator-insensitive)" }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let name = params["name"].as_str().unwrap_or("");
        if name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }

        let record = ctx.detail(name)?;
        Ok(serde_json::to_value(&record)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Registry of the tools exposed to the agent surface.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry pre-loaded with the four built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SearchProfileTool));
        registry.register(Box::new(GithubReposTool));
        registry.register(Box::new(SampleProjectsTool));
        registry.register(Box::new(ProjectDetailsTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_context(files: &[(&str, &str)]) -> (TempDir, ToolContext) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(tmp.path().join(name), content).unwrap();
        }
        let toml_str = format!(
            r#"
[subject]
name = "Icaro Costa"

[projects]
dir = "{}"

[server]
bind = "127.0.0.1:7431"
"#,
            tmp.path().display()
        );
        let config: Config = toml::from_str(&toml_str).unwrap();
        let mut ctx = ToolContext::from_config(Arc::new(config)).unwrap();
        ctx.github_token = None; // never pick up a real token in tests
        (tmp, ctx)
    }

    #[test]
    fn registry_exposes_four_builtins() {
        let registry = ToolRegistry::with_builtins();
        assert_eq!(registry.len(), 4);

        let names: Vec<&str> = registry.tools().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "search_profile",
                "github_repos",
                "sample_projects",
                "project_details"
            ]
        );
        assert!(registry.find("project_details").is_some());
        assert!(registry.find("nope").is_none());
    }

    #[test]
    fn schemas_are_objects() {
        for tool in ToolRegistry::with_builtins().tools() {
            let schema = tool.parameters_schema();
            assert_eq!(schema["type"], "object", "tool {}", tool.name());
            assert!(!tool.description().is_empty());
        }
    }

    #[tokio::test]
    async fn project_details_returns_full_record() {
        let (_tmp, ctx) = test_context(&[("WoodStock.txt", "Lineup planner.\nMore detail.")]);

        let out = ProjectDetailsTool
            .execute(serde_json::json!({ "name": "woodstock" }), &ctx)
            .await
            .unwrap();
        assert_eq!(out["name"], "WoodStock");
        assert!(out["body"].as_str().unwrap().contains("More detail."));
    }

    #[tokio::test]
    async fn project_details_rejects_empty_name() {
        let (_tmp, ctx) = test_context(&[]);
        let err = ProjectDetailsTool
            .execute(serde_json::json!({}), &ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn sample_projects_honors_exclude_param() {
        let (_tmp, ctx) = test_context(&[
            ("alpha.txt", "Alpha.\n"),
            ("beta.txt", "Beta.\n"),
        ]);

        let out = SampleProjectsTool
            .execute(
                serde_json::json!({ "n": 5, "exclude": ["alpha"] }),
                &ctx,
            )
            .await
            .unwrap();
        let projects = out["projects"].as_array().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0]["name"], "beta");
    }

    #[tokio::test]
    async fn github_repos_without_token_is_a_clean_error() {
        let (_tmp, ctx) = test_context(&[]);
        let err = GithubReposTool
            .execute(serde_json::json!({}), &ctx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }
}
