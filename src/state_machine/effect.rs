//! Effects produced by state transitions

/// A call to the game backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Empty question, no session: the backend issues a new token
    NewSession,
    History { token: String },
    Question { question: String, token: Option<String> },
    /// Sentinel question that ends the session with the solution
    Answer { question: String, token: String },
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the single in-flight request
    Request(ApiRequest),

    /// Rewrite the durable token; `None` clears it
    PersistToken { token: Option<String> },

    /// Empty the question input
    ClearInput,
}

impl Effect {
    pub fn persist(token: impl Into<String>) -> Self {
        Effect::PersistToken {
            token: Some(token.into()),
        }
    }

    pub fn clear_token() -> Self {
        Effect::PersistToken { token: None }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Effect::Request(_))
    }
}
