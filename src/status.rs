//! Collaborator health listing for the `dossier status` command.

use crate::config::Config;
use crate::github;
use crate::projects::ProjectStore;

pub fn print_status(config: &Config) -> anyhow::Result<()> {
    println!("{:<12} {:<14} DETAIL", "COLLABORATOR", "STATUS");

    // Local project corpus
    match ProjectStore::new(&config.projects)?.list() {
        Ok(names) => println!(
            "{:<12} {:<14} {} projects at {}",
            "projects",
            "OK",
            names.len(),
            config.projects.dir.display()
        ),
        Err(err) => println!("{:<12} {:<14} {}", "projects", "MISSING", err),
    }

    // Remote lister
    if github::token_from_env().is_some() {
        println!(
            "{:<12} {:<14} account {}",
            "github", "OK", config.github.account
        );
    } else {
        println!(
            "{:<12} {:<14} set {} to enable repository listing",
            "github",
            "NO TOKEN",
            github::TOKEN_ENV_VAR
        );
    }

    // Semantic search collaborator
    if config.search.is_enabled() {
        println!(
            "{:<12} {:<14} {}",
            "search",
            "OK",
            config.search.endpoint.as_deref().unwrap_or("")
        );
    } else {
        println!("{:<12} {:<14} semantic search disabled", "search", "DISABLED");
    }

    // Reply composer
    if config.llm.is_enabled() {
        println!(
            "{:<12} {:<14} model {}",
            "llm",
            "OK",
            config.llm.model.as_deref().unwrap_or("")
        );
    } else {
        println!(
            "{:<12} {:<14} replies pass tool output through verbatim",
            "llm", "DISABLED"
        );
    }

    Ok(())
}
