//! Session state types

use crate::api::{DialogEntry, Puzzle, TransportErrorKind};
use serde::{Deserialize, Serialize};

/// The user-visible action an in-flight request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NewGame,
    Resume,
    Question,
    RevealAnswer,
}

/// The single in-flight action, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pending {
    /// Waiting for the backend to issue a fresh session token
    NewSession,
    /// Loading puzzle and dialog log for `token`
    LoadingHistory { token: String, origin: Action },
    /// Question sent, waiting for the reply
    Question { text: String },
    /// Answer requested, waiting for the reveal
    RevealAnswer,
}

impl Pending {
    pub fn action(&self) -> Action {
        match self {
            Pending::NewSession => Action::NewGame,
            Pending::LoadingHistory { origin, .. } => *origin,
            Pending::Question { .. } => Action::Question,
            Pending::RevealAnswer => Action::RevealAnswer,
        }
    }
}

/// Most recent failed action, shown inline until the next action starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub action: Action,
    pub kind: TransportErrorKind,
    pub message: String,
}

/// Whether a session token is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoSession,
    Active,
}

/// Everything the view needs, owned by one runtime
///
/// The puzzle and dialog log stay visible after a game ends (so a revealed
/// answer can be read); they are replaced when the next game loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub token: Option<String>,
    pub puzzle: Option<Puzzle>,
    pub dialogs: Vec<DialogEntry>,
    pub pending: Option<Pending>,
    pub last_error: Option<ErrorNotice>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        if self.token.is_some() {
            Phase::Active
        } else {
            Phase::NoSession
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Immutable configuration for a session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Question text that asks the backend to reveal the answer
    pub answer_sentinel: String,
}

impl SessionContext {
    pub fn new(answer_domain: &str) -> Self {
        Self {
            answer_sentinel: format!("<<{answer_domain}>>:answer"),
        }
    }
}
