//! Conversation-level tests of the routing policy and session memory,
//! exercised through the library with the offline providers.

use std::sync::Arc;

use tempfile::TempDir;

use dossier::config::Config;
use dossier::llm::DisabledModel;
use dossier::projects::ProjectStore;
use dossier::retrieval::DisabledSearch;
use dossier::router::Router;
use dossier::session::SessionState;

const WOODSTOCK_BODY: &str = "A festival lineup planner.\n\nBuilt in Rust with SQLite.\nHandles overlapping stage schedules and artist conflicts.";

fn setup() -> (TempDir, Router) {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("WoodStock.txt"), WOODSTOCK_BODY).unwrap();
    std::fs::write(
        tmp.path().join("akademika.txt"),
        "A study-group matching platform.\n\nDjango backend.",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("beehive.txt"),
        "Distributed task queue experiment.\n\nRedis streams.",
    )
    .unwrap();

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
    let config = Arc::new(config);

    let store = ProjectStore::new(&config.projects).unwrap();
    let router = Router::new(
        config,
        store,
        Box::new(DisabledSearch),
        Box::new(DisabledModel),
        None, // no GitHub token
    );
    (tmp, router)
}

#[tokio::test]
async fn named_project_then_ambiguous_followup() {
    let (_tmp, router) = setup();
    let mut session = SessionState::new();

    // Turn 1: the utterance names WoodStock, so the detail lookup runs
    // and the reply carries the file's full text.
    let reply = router
        .respond(&mut session, "fale sobre o projeto WoodStock")
        .await
        .unwrap();
    assert!(reply.contains("overlapping stage schedules"));
    assert_eq!(session.last_project(), Some("WoodStock"));

    // Turn 2: "e a estrutura?" names nothing, but the last-mentioned
    // slot resolves it to WoodStock again, not to semantic search.
    let reply = router.respond(&mut session, "e a estrutura?").await.unwrap();
    assert!(reply.contains("overlapping stage schedules"));
    assert!(!reply.contains("semantic search"));
    assert_eq!(session.last_project(), Some("WoodStock"));

    // Both turns landed in the history.
    assert_eq!(session.history_len(), 4);
}

#[tokio::test]
async fn sampling_grows_exclusion_until_exhausted() {
    let (_tmp, router) = setup();
    let mut session = SessionState::new();

    let reply = router
        .respond(&mut session, "list your projects")
        .await
        .unwrap();
    for name in ["WoodStock", "akademika", "beehive"] {
        assert!(reply.contains(name), "first sample should cover {}", name);
    }
    assert_eq!(session.shown().len(), 3);

    // Everything has been shown; the second request reports exhaustion,
    // not an empty success and not corpus emptiness.
    let reply = router
        .respond(&mut session, "list your projects")
        .await
        .unwrap();
    assert!(reply.contains("already been shown"));
    assert!(!reply.contains("no projects found"));
}

#[tokio::test]
async fn repo_question_without_token_degrades_to_message() {
    let (_tmp, router) = setup();
    let mut session = SessionState::new();

    let reply = router
        .respond(&mut session, "show me your github")
        .await
        .unwrap();
    assert!(reply.contains("GITHUB_TOKEN"));
    // The turn completed; the session is intact.
    assert_eq!(session.history_len(), 2);
}

#[tokio::test]
async fn profile_question_without_index_degrades_to_message() {
    let (_tmp, router) = setup();
    let mut session = SessionState::new();

    let reply = router
        .respond(&mut session, "what are his skills?")
        .await
        .unwrap();
    assert!(reply.contains("semantic search is not configured"));
}

#[tokio::test]
async fn smalltalk_needs_no_tool() {
    let (_tmp, router) = setup();
    let mut session = SessionState::new();

    let reply = router.respond(&mut session, "hello!").await.unwrap();
    assert!(reply.contains("No reply model is configured"));
    assert!(session.last_project().is_none());
    assert!(session.shown().is_empty());
}

#[tokio::test]
async fn detail_does_not_inflate_the_shown_set() {
    let (_tmp, router) = setup();
    let mut session = SessionState::new();

    // Discussing a project is not the same as sampling it: the shown set
    // only grows through sample calls.
    router
        .respond(&mut session, "fale sobre o projeto WoodStock")
        .await
        .unwrap();
    assert!(session.shown().is_empty());

    let reply = router
        .respond(&mut session, "list your projects")
        .await
        .unwrap();
    assert!(reply.contains("WoodStock"));
}
