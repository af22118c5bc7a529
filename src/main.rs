//! # Dossier CLI
//!
//! The `dossier` binary fronts the portfolio agent: an interactive chat
//! loop, one-shot questions, direct access to each tool, and the HTTP
//! server.
//!
//! ## Usage
//!
//! ```bash
//! dossier --config ./config/dossier.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dossier chat` | Interactive conversation loop |
//! | `dossier ask "<question>"` | One-shot question against a fresh session |
//! | `dossier projects list` | List the local project corpus |
//! | `dossier projects sample` | Random sample of local projects |
//! | `dossier projects show <name>` | Full text of one project (fuzzy lookup) |
//! | `dossier repos` | Recently updated remote repositories |
//! | `dossier search "<query>"` | Query the semantic index directly |
//! | `dossier status` | Collaborator health listing |
//! | `dossier tools list` | List the registered agent tools |
//! | `dossier serve` | Start the HTTP tool + chat API |

use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

use dossier::projects::ProjectStore;
use dossier::tools::ToolRegistry;
use dossier::{chat, config, github, retrieval, server, status};

/// Dossier — a tool-routing portfolio chatbot core.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/dossier.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dossier",
    about = "Dossier — a tool-routing portfolio chatbot core",
    version,
    long_about = "Dossier answers recruiter questions about one subject person by routing \
    each utterance to a local project corpus, a remote repository lister, or an external \
    semantic index, and composing exactly one reply per turn."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dossier.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation loop.
    ///
    /// Runs one session: the shown-project set and the
    /// last-mentioned-project slot live for the duration of the loop.
    Chat,

    /// Ask a single question against a fresh session.
    Ask {
        /// The question, quoted.
        utterance: String,
    },

    /// Inspect the local project corpus.
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// List the account's most recently updated repositories.
    ///
    /// Requires the GITHUB_TOKEN environment variable. An account
    /// containing whitespace is treated as a free-text name and falls
    /// back to the configured default.
    Repos {
        /// Account handle to query instead of the configured default.
        #[arg(long)]
        account: Option<String>,

        /// Maximum repositories to list.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Query the semantic index directly.
    Search {
        /// The search query string.
        query: String,
    },

    /// Show collaborator health (corpus, token, providers).
    Status,

    /// Inspect the registered agent tools.
    Tools {
        #[command(subcommand)]
        action: ToolsAction,
    },

    /// Start the HTTP tool + chat API.
    Serve,
}

/// Project corpus subcommands.
#[derive(Subcommand)]
enum ProjectsAction {
    /// List all project names in corpus order.
    List,

    /// Random sample of projects, one line each.
    Sample {
        /// Maximum projects to return.
        #[arg(long)]
        n: Option<usize>,

        /// Project names to exclude (repeatable).
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Full text of one project (fuzzy, case- and separator-insensitive).
    Show {
        /// Project name or fragment.
        name: String,
    },
}

/// Tool subcommands.
#[derive(Subcommand)]
enum ToolsAction {
    /// List all registered tools with their descriptions.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Chat => {
            chat::run_chat(&cfg).await?;
        }
        Commands::Ask { utterance } => {
            chat::run_ask(&cfg, &utterance).await?;
        }
        Commands::Projects { action } => {
            let store = ProjectStore::new(&cfg.projects)?;
            match action {
                ProjectsAction::List => match store.list() {
                    Ok(names) => {
                        for name in names {
                            println!("{}", name);
                        }
                    }
                    Err(err) => println!("{}", err),
                },
                ProjectsAction::Sample { n, exclude } => {
                    let n = n.unwrap_or(cfg.chat.sample_size);
                    let exclude: BTreeSet<String> = exclude.into_iter().collect();
                    match store.sample(n, &exclude) {
                        Ok(picks) => {
                            for pick in picks {
                                println!("{}: {}", pick.name, pick.summary);
                            }
                        }
                        Err(err) => println!("{}", err),
                    }
                }
                ProjectsAction::Show { name } => match store.detail(&name) {
                    Ok(record) => println!("{}", record.body),
                    Err(err) => println!("{}", err),
                },
            }
        }
        Commands::Repos { account, limit } => {
            let limit = limit.unwrap_or(cfg.github.repo_limit);
            let token = github::token_from_env();
            match github::fetch_recent_repos(
                &cfg.github,
                account.as_deref(),
                limit,
                token.as_deref(),
            )
            .await
            {
                Ok(repos) => {
                    let account = github::resolve_account(&cfg.github, account.as_deref());
                    print!("{}", github::format_repos(account, &repos));
                }
                Err(err) => println!("{}", err),
            }
        }
        Commands::Search { query } => {
            let provider = retrieval::create_search(&cfg.search)?;
            match provider.search(&query, cfg.search.limit).await {
                Ok(passages) => print!("{}", retrieval::format_passages(&passages)),
                Err(err) => println!("{}", err),
            }
        }
        Commands::Status => {
            status::print_status(&cfg)?;
        }
        Commands::Tools { action } => match action {
            ToolsAction::List => {
                let registry = ToolRegistry::with_builtins();
                for tool in registry.tools() {
                    println!("{:<18} {}", tool.name(), tool.description());
                }
            }
        },
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
