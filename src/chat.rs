//! Interactive conversation loop.
//!
//! Reads utterances from stdin, runs each through the router, and prints
//! the reply. The session lives for the duration of the loop; a turn
//! that fails past every tool boundary prints a generic system-error
//! line and the conversation continues.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::config::Config;
use crate::router::{Router, SYSTEM_ERROR_REPLY};
use crate::session::SessionState;

/// `dossier chat` — interactive REPL.
pub async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let router = Router::from_config(Arc::new(config.clone()))?;
    let mut session = SessionState::new();
    let interactive = atty::is(atty::Stream::Stdin);

    if interactive {
        println!("dossier: portfolio agent for {}", config.subject.name);
        println!("Ask about projects, skills, or repositories. Type 'exit' to leave.");
        println!();
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("> ");
            io::stdout().flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let utterance = line.trim();

        if utterance.is_empty() {
            continue;
        }
        if utterance.eq_ignore_ascii_case("exit") || utterance.eq_ignore_ascii_case("quit") {
            break;
        }

        match router.respond(&mut session, utterance).await {
            Ok(reply) => {
                println!("{}", reply);
                println!();
            }
            Err(err) => {
                // Residual failure: keep the session alive.
                eprintln!("Warning: turn failed: {}", err);
                println!("{}", SYSTEM_ERROR_REPLY);
                println!();
            }
        }
    }

    Ok(())
}

/// `dossier ask` — one-shot question against a fresh session.
pub async fn run_ask(config: &Config, utterance: &str) -> anyhow::Result<()> {
    let router = Router::from_config(Arc::new(config.clone()))?;
    let mut session = SessionState::new();

    match router.respond(&mut session, utterance).await {
        Ok(reply) => println!("{}", reply),
        Err(err) => {
            eprintln!("Warning: turn failed: {}", err);
            println!("{}", SYSTEM_ERROR_REPLY);
        }
    }

    Ok(())
}
