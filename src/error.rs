//! Tool-level error taxonomy.
//!
//! Every failure a tool can produce is enumerated here. The `Display`
//! implementation doubles as the user-facing tool result: at the tool
//! boundary a `ToolError` is rendered to its message string and returned
//! as the tool's output, so no failure ever crosses the boundary as a
//! panic or an unformatted error chain.

use std::path::PathBuf;
use thiserror::Error;

pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Failures that can occur inside a tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// A required credential is absent from the environment. Raised
    /// before any network call is attempted.
    #[error("{service} token not configured ({env_var} is not set)")]
    MissingCredential {
        service: &'static str,
        env_var: &'static str,
    },

    /// A remote API call failed (network error or non-success status).
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    /// The project corpus directory does not exist.
    #[error("project directory not found: {}", .0.display())]
    CorpusMissing(PathBuf),

    /// The corpus directory exists but holds no project files.
    #[error("no projects found")]
    CorpusEmpty,

    /// No project matched the lookup query.
    #[error("project '{0}' not found")]
    NoMatch(String),

    /// Every project in the corpus is already in the exclusion set.
    /// Distinct from [`ToolError::CorpusEmpty`]: the corpus has entries,
    /// they have just all been shown.
    #[error("all available projects have already been shown; ask to list them again to repeat")]
    Exhausted,

    /// A project file listed by the directory scan could not be read.
    #[error("failed to read project file: {0}")]
    Io(String),

    /// An optional collaborator is not configured for this deployment.
    #[error("{feature} is not configured ({hint})")]
    Unconfigured {
        feature: &'static str,
        hint: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = ToolError::MissingCredential {
            service: "GitHub",
            env_var: "GITHUB_TOKEN",
        };
        let msg = err.to_string();
        assert!(msg.contains("GITHUB_TOKEN"));
        assert!(!msg.contains("Error"));

        assert_eq!(ToolError::CorpusEmpty.to_string(), "no projects found");
        assert!(ToolError::NoMatch("xyz".into()).to_string().contains("'xyz'"));
    }

    #[test]
    fn exhausted_and_empty_are_distinct() {
        assert_ne!(
            ToolError::Exhausted.to_string(),
            ToolError::CorpusEmpty.to_string()
        );
    }
}
