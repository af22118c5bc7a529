//! Per-session conversation state.
//!
//! One [`SessionState`] exists per conversation and is passed explicitly
//! to the router on every turn; there is no ambient global state. It
//! holds the three pieces of memory the routing policy depends on: the
//! turn history, the set of projects already shown, and the one-slot
//! last-mentioned-project memory that resolves ambiguous follow-ups.

use std::collections::BTreeSet;

use crate::models::ChatTurn;

/// Session-scoped memory. Starts empty; never persisted.
#[derive(Debug, Default)]
pub struct SessionState {
    history: Vec<ChatTurn>,
    shown: BTreeSet<String>,
    last_project: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn. The history itself is append-only; truncation
    /// happens in [`recent`](Self::recent) when the tail is handed to
    /// the composer.
    pub fn push(&mut self, turn: ChatTurn) {
        self.history.push(turn);
    }

    /// The most recent `limit` turns, oldest first.
    pub fn recent(&self, limit: usize) -> &[ChatTurn] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Projects already surfaced to this user, used as the sampler's
    /// exclusion set.
    pub fn shown(&self) -> &BTreeSet<String> {
        &self.shown
    }

    pub fn note_shown<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shown.extend(names.into_iter().map(Into::into));
    }

    /// The project an ambiguous follow-up ("e a estrutura?") refers to.
    pub fn last_project(&self) -> Option<&str> {
        self.last_project.as_deref()
    }

    pub fn set_last_project(&mut self, name: impl Into<String>) {
        self.last_project = Some(name.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let session = SessionState::new();
        assert_eq!(session.history_len(), 0);
        assert!(session.shown().is_empty());
        assert!(session.last_project().is_none());
    }

    #[test]
    fn recent_returns_tail() {
        let mut session = SessionState::new();
        for i in 0..15 {
            session.push(ChatTurn::user(format!("turn {}", i)));
        }
        let tail = session.recent(10);
        assert_eq!(tail.len(), 10);
        assert_eq!(tail[0].text, "turn 5");
        assert_eq!(tail[9].text, "turn 14");

        // Shorter histories come back whole
        assert_eq!(SessionState::new().recent(10).len(), 0);
    }

    #[test]
    fn shown_accumulates_without_duplicates() {
        let mut session = SessionState::new();
        session.note_shown(["alpha", "beta"]);
        session.note_shown(["beta", "gamma"]);
        assert_eq!(session.shown().len(), 3);
    }
}
