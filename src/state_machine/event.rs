//! Events that can occur in a session

use crate::api::{HistoryResponse, TransportError};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    StartNewGame,
    SubmitQuestion {
        text: String,
    },
    RevealAnswer,
    EndGame,
    /// Startup found a stored token
    Resume {
        token: String,
    },

    // Transport events
    SessionCreated {
        token: String,
    },
    HistoryLoaded {
        history: HistoryResponse,
    },
    ReplyReceived {
        reply: String,
        /// Token carried by the response, if any
        token: Option<String>,
    },
    AnswerRevealed {
        reply: String,
    },
    TransportFailed {
        error: TransportError,
    },
}

impl Event {
    /// User events pass through the pending gate; transport events settle it
    pub fn is_user_action(&self) -> bool {
        matches!(
            self,
            Event::StartNewGame
                | Event::SubmitQuestion { .. }
                | Event::RevealAnswer
                | Event::EndGame
                | Event::Resume { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::StartNewGame => "start_new_game",
            Event::SubmitQuestion { .. } => "submit_question",
            Event::RevealAnswer => "reveal_answer",
            Event::EndGame => "end_game",
            Event::Resume { .. } => "resume",
            Event::SessionCreated { .. } => "session_created",
            Event::HistoryLoaded { .. } => "history_loaded",
            Event::ReplyReceived { .. } => "reply_received",
            Event::AnswerRevealed { .. } => "answer_revealed",
            Event::TransportFailed { .. } => "transport_failed",
        }
    }
}
