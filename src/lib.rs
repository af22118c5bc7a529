//! # Dossier
//!
//! A tool-routing portfolio chatbot core for recruiter-facing AI
//! assistants.
//!
//! Dossier answers questions about one subject person by routing each
//! utterance to the right collaborator (a local plain-text project
//! corpus, a remote repository lister, or an external semantic index)
//! and composing exactly one reply per turn. The routing policy is an
//! explicit prioritized rule list over the utterance and the session
//! state, not prompt-encoded model behavior.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌────────────┐
//!  utterance ────▶ │   Router   │──▶ rule 1–2: project detail ──▶ corpus
//!                  │ (rules 1–6)│──▶ rule 3:   profile search ──▶ semantic index
//!   session  ◀───▶ │            │──▶ rule 4:   remote repos   ──▶ GitHub API
//!                  └─────┬──────┘──▶ rule 5:   local sample   ──▶ corpus
//!                        │
//!                        ▼
//!                  ┌────────────┐
//!                  │  Composer  │──▶ one reply per turn
//!                  └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dossier status                          # check collaborators
//! dossier projects list                   # corpus contents
//! dossier ask "fale sobre o WoodStock"    # one-shot question
//! dossier chat                            # interactive session
//! dossier serve                           # HTTP tool + chat API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Tool-level error taxonomy |
//! | [`projects`] | Local project store (sample + fuzzy detail) |
//! | [`github`] | Remote repository lister |
//! | [`retrieval`] | Semantic search boundary |
//! | [`llm`] | Reply composition boundary |
//! | [`session`] | Per-session conversation state |
//! | [`router`] | Tool routing policy and turn executor |
//! | [`tools`] | Tool trait, registry, and built-ins |
//! | [`chat`] | Interactive conversation loop |
//! | [`server`] | HTTP tool + chat API |
//! | [`status`] | Collaborator health listing |

pub mod chat;
pub mod config;
pub mod error;
pub mod github;
pub mod llm;
pub mod models;
pub mod projects;
pub mod retrieval;
pub mod router;
pub mod server;
pub mod session;
pub mod status;
pub mod tools;
