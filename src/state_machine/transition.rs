//! Pure state transition function

use super::effect::ApiRequest;
use super::state::{Action, ErrorNotice, Pending};
use super::{Effect, Event, SessionContext, SessionState};
use crate::api::{DialogEntry, TransportError, TransportErrorKind};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
///
/// The first three are expected user-side rejections and leave no trace
/// beyond a debug log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("An action is already in flight")]
    Busy,
    #[error("Question is empty")]
    EmptyQuestion,
    #[error("No active session")]
    NoSession,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Rejections the user can trigger by pressing keys at the wrong time
    pub fn is_silent(&self) -> bool {
        !matches!(self, TransitionError::InvalidTransition(_))
    }
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
#[allow(clippy::too_many_lines)]
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    // Pending gate: one action at a time, later ones are dropped
    if event.is_user_action() && state.is_pending() {
        return Err(TransitionError::Busy);
    }

    match (state.pending.as_ref(), event) {
        // ============================================================
        // User actions
        // ============================================================
        (None, Event::StartNewGame) => {
            let result = TransitionResult::new(SessionState {
                pending: Some(Pending::NewSession),
                ..SessionState::default()
            });
            let result = if state.token.is_some() {
                result.with_effect(Effect::clear_token())
            } else {
                result
            };
            Ok(result.with_effect(Effect::Request(ApiRequest::NewSession)))
        }

        (None, Event::SubmitQuestion { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyQuestion);
            }
            let request = ApiRequest::Question {
                question: text.clone(),
                token: state.token.clone(),
            };
            Ok(TransitionResult::new(SessionState {
                pending: Some(Pending::Question { text }),
                last_error: None,
                ..state.clone()
            })
            .with_effect(Effect::Request(request)))
        }

        (None, Event::RevealAnswer) => {
            let token = state.token.clone().ok_or(TransitionError::NoSession)?;
            Ok(TransitionResult::new(SessionState {
                pending: Some(Pending::RevealAnswer),
                last_error: None,
                ..state.clone()
            })
            .with_effect(Effect::Request(ApiRequest::Answer {
                question: context.answer_sentinel.clone(),
                token,
            })))
        }

        (None, Event::EndGame) => {
            if state.token.is_none() {
                return Err(TransitionError::NoSession);
            }
            Ok(TransitionResult::new(SessionState {
                token: None,
                last_error: None,
                ..state.clone()
            })
            .with_effect(Effect::clear_token()))
        }

        (None, Event::Resume { token }) => {
            if token.is_empty() {
                return Err(TransitionError::NoSession);
            }
            if state.token.is_some() {
                return Err(TransitionError::InvalidTransition(
                    "Resume while a session is active".to_string(),
                ));
            }
            Ok(TransitionResult::new(SessionState {
                pending: Some(Pending::LoadingHistory {
                    token: token.clone(),
                    origin: Action::Resume,
                }),
                last_error: None,
                ..state.clone()
            })
            .with_effect(Effect::Request(ApiRequest::History { token })))
        }

        // ============================================================
        // Transport outcomes
        // ============================================================
        (Some(Pending::NewSession), Event::SessionCreated { token }) => {
            if token.is_empty() {
                return Ok(TransitionResult::new(SessionState {
                    last_error: Some(ErrorNotice {
                        action: Action::NewGame,
                        kind: TransportErrorKind::Decode,
                        message: "Backend did not issue a session token".to_string(),
                    }),
                    ..SessionState::default()
                }));
            }
            Ok(TransitionResult::new(SessionState {
                pending: Some(Pending::LoadingHistory {
                    token: token.clone(),
                    origin: Action::NewGame,
                }),
                ..state.clone()
            })
            .with_effect(Effect::Request(ApiRequest::History { token })))
        }

        (Some(Pending::LoadingHistory { token, .. }), Event::HistoryLoaded { history }) => {
            match history.puzzle {
                Some(puzzle) => Ok(TransitionResult::new(SessionState {
                    token: Some(token.clone()),
                    puzzle: Some(puzzle),
                    dialogs: history.discussion,
                    pending: None,
                    last_error: None,
                })
                .with_effect(Effect::persist(token.clone()))),
                // Unknown or expired token: back to the initial state, and
                // forget the token so the next start does not retry it
                None => Ok(TransitionResult::new(SessionState::default())
                    .with_effect(Effect::clear_token())),
            }
        }

        (Some(Pending::Question { text }), Event::ReplyReceived { reply, token }) => {
            let mut dialogs = state.dialogs.clone();
            dialogs.push(DialogEntry::user(text.clone()));
            dialogs.push(DialogEntry::assistant(reply));

            let issued = token.filter(|t| !t.is_empty());
            let new_state = SessionState {
                token: issued.clone().or_else(|| state.token.clone()),
                dialogs,
                pending: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effects(issued.map(Effect::persist))
                .with_effect(Effect::ClearInput))
        }

        (Some(Pending::RevealAnswer), Event::AnswerRevealed { reply }) => {
            let mut dialogs = state.dialogs.clone();
            dialogs.push(DialogEntry::assistant(reply));
            Ok(TransitionResult::new(SessionState {
                token: None,
                dialogs,
                pending: None,
                ..state.clone()
            })
            .with_effect(Effect::clear_token()))
        }

        (Some(pending), Event::TransportFailed { error }) => {
            Ok(TransitionResult::new(failed_state(state, pending, &error)))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (pending, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {pending:?} with event {}",
            event.name()
        ))),
    }
}

/// State after the in-flight request for `pending` failed
///
/// The gate is released and the error recorded. A failed new game falls back
/// to the initial state; anything else keeps the session as it was, including
/// a stored token whose resume failed for transport reasons.
fn failed_state(state: &SessionState, pending: &Pending, error: &TransportError) -> SessionState {
    let action = pending.action();
    let notice = ErrorNotice {
        action,
        kind: error.kind,
        message: error.message.clone(),
    };
    match action {
        Action::NewGame => SessionState {
            last_error: Some(notice),
            ..SessionState::default()
        },
        Action::Resume | Action::Question | Action::RevealAnswer => SessionState {
            pending: None,
            last_error: Some(notice),
            ..state.clone()
        },
    }
}
