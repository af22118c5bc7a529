//! Core data models used throughout dossier.
//!
//! These types represent the project records, repository summaries, and
//! conversation turns that flow between the tools and the router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project's identity and one-line summary, as surfaced by a sample call.
///
/// The identity is the filename stem; the summary is the first line of
/// the file.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub summary: String,
}

/// A full project record returned by a detail lookup.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRecord {
    pub name: String,
    pub summary: String,
    pub body: String,
}

/// Summary of a remote repository, fetched fresh per request and never
/// cached.
#[derive(Debug, Clone, Serialize)]
pub struct RepoSummary {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: i64,
    pub updated_at: DateTime<Utc>,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn. The history is an append-only sequence of
/// these, truncated to the most recent entries before being handed to
/// the reply composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A ranked text passage returned by the semantic search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    #[serde(default)]
    pub score: f64,
}
