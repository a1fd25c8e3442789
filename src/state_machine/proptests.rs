//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::api::{
    DialogEntry, HistoryResponse, Puzzle, Role, TransportError, TransportErrorKind,
};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("turtle-soup")
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_token() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}"
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ?]{1,60}".prop_filter("non-blank", |s| !s.trim().is_empty())
}

fn arb_puzzle() -> impl Strategy<Value = Puzzle> {
    ("[a-zA-Z ]{1,20}", "[a-zA-Z .]{1,80}").prop_map(|(title, mystery)| Puzzle { title, mystery })
}

fn arb_dialog_entry() -> impl Strategy<Value = DialogEntry> {
    (any::<bool>(), "[a-zA-Z ?.]{0,40}").prop_map(|(is_user, content)| {
        if is_user {
            DialogEntry::user(content)
        } else {
            DialogEntry::assistant(content)
        }
    })
}

fn arb_dialogs() -> impl Strategy<Value = Vec<DialogEntry>> {
    proptest::collection::vec(arb_dialog_entry(), 0..8)
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::NewGame),
        Just(Action::Resume),
        Just(Action::Question),
        Just(Action::RevealAnswer),
    ]
}

fn arb_pending() -> impl Strategy<Value = Pending> {
    prop_oneof![
        Just(Pending::NewSession),
        (arb_token(), prop_oneof![Just(Action::NewGame), Just(Action::Resume)])
            .prop_map(|(token, origin)| Pending::LoadingHistory { token, origin }),
        arb_text().prop_map(|text| Pending::Question { text }),
        Just(Pending::RevealAnswer),
    ]
}

fn arb_error_kind() -> impl Strategy<Value = TransportErrorKind> {
    prop_oneof![
        Just(TransportErrorKind::Network),
        Just(TransportErrorKind::Status),
        Just(TransportErrorKind::Decode),
        Just(TransportErrorKind::InvalidUrl),
    ]
}

fn arb_error_notice() -> impl Strategy<Value = ErrorNotice> {
    (arb_action(), arb_error_kind(), "[a-z ]{1,20}").prop_map(|(action, kind, message)| {
        ErrorNotice {
            action,
            kind,
            message,
        }
    })
}

fn arb_idle_state() -> impl Strategy<Value = SessionState> {
    (
        proptest::option::of(arb_token()),
        proptest::option::of(arb_puzzle()),
        arb_dialogs(),
        proptest::option::of(arb_error_notice()),
    )
        .prop_map(|(token, puzzle, dialogs, last_error)| SessionState {
            token,
            puzzle,
            dialogs,
            pending: None,
            last_error,
        })
}

fn arb_active_state() -> impl Strategy<Value = SessionState> {
    (arb_token(), arb_puzzle(), arb_dialogs()).prop_map(|(token, puzzle, dialogs)| SessionState {
        token: Some(token),
        puzzle: Some(puzzle),
        dialogs,
        pending: None,
        last_error: None,
    })
}

/// Pending states as the machine produces them: loading a new or resumed
/// session never holds a token, revealing always does
fn arb_pending_state() -> impl Strategy<Value = SessionState> {
    (arb_idle_state(), arb_pending(), arb_token()).prop_map(|(state, pending, token)| {
        let token = match &pending {
            Pending::NewSession | Pending::LoadingHistory { .. } => None,
            Pending::Question { .. } => state.token.clone(),
            Pending::RevealAnswer => Some(token),
        };
        SessionState {
            token,
            pending: Some(pending),
            ..state
        }
    })
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![arb_idle_state(), arb_pending_state()]
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::StartNewGame),
        "[a-z ?]{0,20}".prop_map(|text| Event::SubmitQuestion { text }),
        Just(Event::RevealAnswer),
        Just(Event::EndGame),
        "[a-z0-9]{0,8}".prop_map(|token| Event::Resume { token }),
    ]
}

fn arb_transport_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z0-9]{0,8}".prop_map(|token| Event::SessionCreated { token }),
        (arb_dialogs(), proptest::option::of(arb_puzzle())).prop_map(|(discussion, puzzle)| {
            Event::HistoryLoaded {
                history: HistoryResponse { discussion, puzzle },
            }
        }),
        ("[a-z ]{0,20}", proptest::option::of("[a-z0-9]{0,8}"))
            .prop_map(|(reply, token)| Event::ReplyReceived { reply, token }),
        "[a-z ]{0,20}".prop_map(|reply| Event::AnswerRevealed { reply }),
        (arb_error_kind(), "[a-z ]{1,20}").prop_map(|(kind, message)| Event::TransportFailed {
            error: TransportError::new(kind, message),
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![arb_user_event(), arb_transport_event()]
}

// ============================================================================
// Effect Checkers
// ============================================================================

fn request_count(effects: &[Effect]) -> usize {
    effects.iter().filter(|e| e.is_request()).count()
}

fn last_persisted(effects: &[Effect]) -> Option<Option<String>> {
    effects.iter().rev().find_map(|e| match e {
        Effect::PersistToken { token } => Some(token.clone()),
        _ => None,
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: At most one request in flight, and it is always tracked
    #[test]
    fn prop_single_flight(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = SessionState::default();
        let ctx = test_context();

        for event in events {
            let was_pending = state.is_pending();
            if let Ok(result) = transition(&state, &ctx, event) {
                let requests = request_count(&result.effects);
                prop_assert!(requests <= 1, "Multiple requests: {:?}", result.effects);
                prop_assert_eq!(
                    requests == 1,
                    result.new_state.is_pending(),
                    "Pending flag out of sync with effects {:?} -> {:?}",
                    result.effects,
                    result.new_state
                );
                if was_pending && requests == 1 {
                    // Only the new-game chain may hand the slot to a follow-up request
                    prop_assert!(
                        matches!(
                            result.new_state.pending,
                            Some(Pending::LoadingHistory { origin: Action::NewGame, .. })
                        ),
                        "Unexpected follow-up pending state {:?}",
                        result.new_state.pending
                    );
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 2: Every user action is dropped while pending
    #[test]
    fn prop_pending_gate_drops_user_actions(
        state in arb_pending_state(),
        event in arb_user_event()
    ) {
        let result = transition(&state, &test_context(), event);
        prop_assert!(matches!(result, Err(TransitionError::Busy)), "Got {:?}", result);
    }

    // Invariant 3: A successful question appends exactly user then assistant
    #[test]
    fn prop_question_appends_in_order(
        state in arb_active_state(),
        text in arb_text(),
        reply in "[a-zA-Z ]{0,40}",
        issued in proptest::option::of(arb_token())
    ) {
        let ctx = test_context();
        let sent = transition(&state, &ctx, Event::SubmitQuestion { text: text.clone() }).unwrap();
        let replied = transition(
            &sent.new_state,
            &ctx,
            Event::ReplyReceived { reply: reply.clone(), token: issued.clone() },
        ).unwrap();

        let dialogs = &replied.new_state.dialogs;
        prop_assert_eq!(dialogs.len(), state.dialogs.len() + 2);
        prop_assert_eq!(&dialogs[..state.dialogs.len()], &state.dialogs[..]);
        prop_assert_eq!(&dialogs[dialogs.len() - 2], &DialogEntry::user(text));
        prop_assert_eq!(&dialogs[dialogs.len() - 1], &DialogEntry::assistant(reply));
        prop_assert_eq!(replied.new_state.token, issued.or(state.token));
        prop_assert!(replied.effects.contains(&Effect::ClearInput));
    }

    // Invariant 4: Token changes are always persisted
    #[test]
    fn prop_token_changes_are_persisted(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            if result.new_state.token != state.token {
                prop_assert_eq!(
                    last_persisted(&result.effects),
                    Some(result.new_state.token.clone()),
                    "Token changed without persisting: {:?}",
                    result.effects
                );
            }
        }
    }

    // Invariant 5: Reveal without a session does nothing
    #[test]
    fn prop_reveal_without_token_is_noop(state in arb_idle_state()) {
        let state = SessionState { token: None, ..state };
        let result = transition(&state, &test_context(), Event::RevealAnswer);
        prop_assert!(matches!(result, Err(TransitionError::NoSession)), "Got {:?}", result);
    }

    // Invariant 6: Any transport failure releases the gate and keeps the log
    #[test]
    fn prop_failure_releases_gate(
        state in arb_pending_state(),
        kind in arb_error_kind()
    ) {
        let result = transition(
            &state,
            &test_context(),
            Event::TransportFailed { error: TransportError::new(kind, "boom") },
        ).unwrap();

        prop_assert!(!result.new_state.is_pending());
        prop_assert!(result.effects.is_empty());
        let notice = result.new_state.last_error.clone().unwrap();
        prop_assert_eq!(notice.kind, kind);
        if notice.action != Action::NewGame {
            prop_assert_eq!(&result.new_state.dialogs, &state.dialogs);
            prop_assert_eq!(&result.new_state.token, &state.token);
        }
    }

    // Invariant 7: A history without a puzzle always lands on the initial state
    #[test]
    fn prop_missing_puzzle_resets(
        token in arb_token(),
        origin in prop_oneof![Just(Action::NewGame), Just(Action::Resume)],
        discussion in arb_dialogs()
    ) {
        let state = SessionState {
            pending: Some(Pending::LoadingHistory { token, origin }),
            ..SessionState::default()
        };
        let result = transition(
            &state,
            &test_context(),
            Event::HistoryLoaded { history: HistoryResponse { discussion, puzzle: None } },
        ).unwrap();
        prop_assert_eq!(result.new_state, SessionState::default());
    }

    // Invariant 8: Loaded history replaces the log wholesale
    #[test]
    fn prop_history_replaces_log(
        old in arb_dialogs(),
        discussion in arb_dialogs(),
        puzzle in arb_puzzle(),
        token in arb_token()
    ) {
        let state = SessionState {
            dialogs: old,
            pending: Some(Pending::LoadingHistory { token: token.clone(), origin: Action::Resume }),
            ..SessionState::default()
        };
        let result = transition(
            &state,
            &test_context(),
            Event::HistoryLoaded {
                history: HistoryResponse { discussion: discussion.clone(), puzzle: Some(puzzle.clone()) },
            },
        ).unwrap();

        prop_assert_eq!(result.new_state.dialogs, discussion);
        prop_assert_eq!(result.new_state.puzzle, Some(puzzle));
        prop_assert_eq!(result.new_state.token, Some(token));
    }

    // Invariant 9: Answer reveal appends one assistant entry and ends the session
    #[test]
    fn prop_reveal_appends_one_assistant_entry(
        state in arb_active_state(),
        reply in "[a-zA-Z ]{0,40}"
    ) {
        let ctx = test_context();
        let sent = transition(&state, &ctx, Event::RevealAnswer).unwrap();
        let done = transition(&sent.new_state, &ctx, Event::AnswerRevealed { reply }).unwrap();

        prop_assert_eq!(done.new_state.dialogs.len(), state.dialogs.len() + 1);
        prop_assert_eq!(done.new_state.dialogs.last().map(|d| d.role), Some(Role::Assistant));
        prop_assert_eq!(done.new_state.token, None);
    }
}
