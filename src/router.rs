//! Tool router and agent policy.
//!
//! The original agent delegated tool selection to a hosted model
//! conditioned by a prompt. Here the policy is an explicit, testable
//! decision procedure: [`route`] is a pure function over the utterance,
//! the known project names, and the session state, evaluated fresh per
//! turn in strict priority order:
//!
//! 1. The utterance names a known project → detail lookup. Wins over
//!    everything else.
//! 2. A short ambiguous follow-up while a project was just discussed →
//!    detail lookup on the last-mentioned project.
//! 3. Biography / skills / background → semantic search.
//! 4. Projects in general, or recent code and repositories → remote
//!    lister.
//! 5. A request to list or see local projects → local sampler, excluding
//!    what this session has already shown.
//! 6. Anything else → answer directly from conversation context.
//!
//! [`Router::respond`] executes the decision: it runs the selected tool,
//! converts any tool failure to its descriptive string at the boundary,
//! hands the results to the reply composer, and updates the session
//! state (shown-project set, last-mentioned-project slot, history).
//! Every turn converges to exactly one final reply.
//!
//! Cue keyword lists cover English and Portuguese, since the corpus
//! this agent fronts is PT-BR.

use std::sync::Arc;

use crate::config::{Config, SubjectConfig};
use crate::github;
use crate::llm::{create_model, ChatModel, CompletionRequest};
use crate::models::{ChatTurn, ProjectSummary};
use crate::projects::{normalize, ProjectStore};
use crate::retrieval::{create_search, format_passages, SemanticSearch};
use crate::session::SessionState;

/// Shown to the user when a turn fails past every tool boundary.
pub const SYSTEM_ERROR_REPLY: &str =
    "Something went wrong on my side. The conversation is still live, please try again.";

/// The tool decision for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Rules 1 and 2: full detail lookup of a named project.
    ProjectDetail(String),
    /// Rule 3: semantic search over the subject's biography.
    Profile,
    /// Rule 4: remote repository lister.
    RemoteRepos,
    /// Rule 5: random sample of local projects, minus those shown.
    LocalSample,
    /// Rule 6: no tool; answer from conversation context.
    Direct,
}

/// Decide which tool (if any) serves this utterance.
pub fn route(utterance: &str, known_projects: &[String], session: &SessionState) -> Route {
    let norm = normalize(utterance);
    let toks = tokenize(&norm);

    // Rule 1: the utterance names a known project. Containment runs both
    // ways, but a project name only swallows the utterance when the
    // utterance is a near-bare name fragment, so greetings don't collide
    // with short project names.
    let bare_fragment = toks.len() <= 3 && norm.trim().len() >= 4;
    for name in known_projects {
        let name_norm = normalize(name);
        if name_norm.is_empty() {
            continue;
        }
        if norm.contains(&name_norm) || (bare_fragment && name_norm.contains(norm.trim())) {
            return Route::ProjectDetail(name.clone());
        }
    }

    // Rule 2: ambiguous follow-up to the project just discussed.
    if let Some(last) = session.last_project() {
        if is_followup(&norm, &toks) {
            return Route::ProjectDetail(last.to_string());
        }
    }

    // Rule 3: biography, skills, background.
    if has_cue(&norm, &toks, BIO_CUES) {
        return Route::Profile;
    }

    // Rules 4 and 5: remote vocabulary wins; an explicit list/show
    // request goes to the local sampler; bare "projects" is the general
    // case and goes remote.
    let mentions_projects = has_cue(&norm, &toks, PROJECT_WORDS);
    if has_cue(&norm, &toks, REMOTE_CUES) {
        return Route::RemoteRepos;
    }
    if mentions_projects {
        if has_cue(&norm, &toks, LIST_VERBS) {
            return Route::LocalSample;
        }
        return Route::RemoteRepos;
    }

    Route::Direct
}

const FOLLOWUP_MAX_TOKENS: usize = 8;

const FOLLOWUP_CUES: &[&str] = &[
    "it", "this", "that", "structure", "architecture", "stack", "build", "built", "compile",
    "compiles", "author", "details", "more", "ele", "ela", "isso", "esse", "essa", "estrutura",
    "arquitetura", "compila", "roda", "detalhes", "mais", "who made", "who wrote", "quem fez",
    "quem escreveu",
];

const BIO_CUES: &[&str] = &[
    "who", "skills", "skill", "experience", "background", "education", "resume", "cv", "bio",
    "biography", "career", "contact", "email", "about", "quem", "habilidades", "habilidade",
    "experiencia", "experiência", "formacao", "formação", "curriculo", "currículo", "carreira",
    "contato", "sobre",
];

const REMOTE_CUES: &[&str] = &[
    "github", "repo", "repos", "repository", "repositories", "repositorio", "repositorios",
    "repositório", "repositórios", "code", "codigo", "código", "commit", "commits",
    "recent projects", "latest projects", "projetos recentes", "ultimos projetos",
    "últimos projetos", "recent code", "codigo recente", "código recente",
];

const PROJECT_WORDS: &[&str] = &["projects", "projetos", "portfolio", "portfólio"];

const LIST_VERBS: &[&str] = &[
    "list", "show", "see", "display", "liste", "listar", "mostre", "mostrar", "mostra", "veja",
    "ver", "quais",
];

fn is_followup(norm: &str, toks: &[String]) -> bool {
    toks.len() <= FOLLOWUP_MAX_TOKENS && has_cue(norm, toks, FOLLOWUP_CUES)
}

fn tokenize(norm: &str) -> Vec<String> {
    norm.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Single-word cues match whole tokens; multi-word cues match as
/// substrings of the normalized utterance.
fn has_cue(norm: &str, toks: &[String], cues: &[&str]) -> bool {
    cues.iter().any(|cue| {
        if cue.contains(' ') {
            norm.contains(cue)
        } else {
            toks.iter().any(|t| t == cue)
        }
    })
}

/// Executes routed turns against the tools and the reply composer.
pub struct Router {
    config: Arc<Config>,
    store: ProjectStore,
    search: Box<dyn SemanticSearch>,
    model: Box<dyn ChatModel>,
    github_token: Option<String>,
}

impl Router {
    /// Build a router with every collaborator resolved from config and
    /// environment.
    pub fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let store = ProjectStore::new(&config.projects)?;
        let search = create_search(&config.search)?;
        let model = create_model(&config.llm)?;
        let github_token = github::token_from_env();
        Ok(Self::new(config, store, search, model, github_token))
    }

    /// Build a router from explicit parts (tests inject fakes here).
    pub fn new(
        config: Arc<Config>,
        store: ProjectStore,
        search: Box<dyn SemanticSearch>,
        model: Box<dyn ChatModel>,
        github_token: Option<String>,
    ) -> Self {
        Self {
            config,
            store,
            search,
            model,
            github_token,
        }
    }

    /// Run one turn: route, execute tools, compose the single reply,
    /// update session state.
    ///
    /// Tool failures become their descriptive strings here and flow into
    /// the reply; a composer failure falls back to the raw tool text, so
    /// the turn still produces a best-effort reply.
    pub async fn respond(
        &self,
        session: &mut SessionState,
        utterance: &str,
    ) -> anyhow::Result<String> {
        let known = self.store.list().unwrap_or_default();
        let decision = route(utterance, &known, session);

        let mut tool_results: Vec<String> = Vec::new();

        match &decision {
            Route::ProjectDetail(name) => {
                match self.store.detail(name) {
                    Ok(record) => {
                        session.set_last_project(record.name.clone());
                        tool_results.push(record.body);
                    }
                    Err(err) => tool_results.push(err.to_string()),
                }
                // A clarifying search rides along when the utterance also
                // asks about background; it is opportunistic, so a failure
                // here adds nothing rather than an error string.
                if has_cue(&normalize(utterance), &tokenize(&normalize(utterance)), BIO_CUES) {
                    if let Ok(passages) = self
                        .search
                        .search(utterance, self.config.search.limit)
                        .await
                    {
                        tool_results.push(format_passages(&passages));
                    }
                }
            }
            Route::Profile => {
                let result = self
                    .search
                    .search(utterance, self.config.search.limit)
                    .await;
                tool_results.push(match result {
                    Ok(passages) => format_passages(&passages),
                    Err(err) => err.to_string(),
                });
            }
            Route::RemoteRepos => {
                let result = github::fetch_recent_repos(
                    &self.config.github,
                    None,
                    self.config.github.repo_limit,
                    self.github_token.as_deref(),
                )
                .await;
                tool_results.push(match result {
                    Ok(repos) => github::format_repos(
                        github::resolve_account(&self.config.github, None),
                        &repos,
                    ),
                    Err(err) => err.to_string(),
                });
            }
            Route::LocalSample => {
                match self
                    .store
                    .sample(self.config.chat.sample_size, session.shown())
                {
                    Ok(picks) => {
                        if let [only] = picks.as_slice() {
                            // A single surfaced project is specific enough
                            // for follow-ups to refer to.
                            session.set_last_project(only.name.clone());
                        }
                        session.note_shown(picks.iter().map(|p| p.name.clone()));
                        tool_results.push(format_sample(&picks));
                    }
                    Err(err) => tool_results.push(err.to_string()),
                }
            }
            Route::Direct => {}
        }

        let request = CompletionRequest {
            system: system_prompt(&self.config.subject),
            history: session.recent(self.config.chat.history_limit),
            utterance,
            tool_results: &tool_results,
        };

        let reply = match self.model.complete(request).await {
            Ok(text) => text,
            Err(err) => {
                eprintln!("Warning: reply composition failed: {}", err);
                if tool_results.is_empty() {
                    SYSTEM_ERROR_REPLY.to_string()
                } else {
                    tool_results.join("\n\n")
                }
            }
        };

        session.push(ChatTurn::user(utterance));
        session.push(ChatTurn::assistant(reply.clone()));

        Ok(reply)
    }
}

fn format_sample(picks: &[ProjectSummary]) -> String {
    let mut out = String::from("Local projects:\n");
    for pick in picks {
        out.push_str(&format!("- {}: {}\n", pick.name, pick.summary));
    }
    out
}

fn system_prompt(subject: &SubjectConfig) -> String {
    let headline = subject.headline.as_deref().unwrap_or("software engineer");
    format!(
        "You are the portfolio agent for {name}, {headline}. You answer questions \
         from recruiters and visitors about {name}. Compose your reply from the tool \
         results attached to the question; when there are none, answer from the \
         conversation itself. Be professional with a light informant flair, keep it \
         concise, and answer in the language the question was asked in.",
        name = subject.name,
        headline = headline,
    )
}
