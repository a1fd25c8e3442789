//! Runtime for a puzzle session
//!
//! One task owns the [`SessionState`]. The UI sends user events through a
//! [`SessionHandle`] and observes state snapshots as [`UiEvent`]s.

mod executor;


pub use executor::SessionRuntime;

use crate::api::PuzzleApi;
use crate::session::SessionStore;
use crate::state_machine::{Event, SessionContext, SessionState};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Updates sent to the UI
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Full state after a transition
    State(SessionState),
    /// A question went through; empty the input box
    ClearInput,
}

#[derive(Debug, Error)]
#[error("Session runtime has stopped")]
pub struct RuntimeClosed;

/// Sending side of a running session
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
}

impl SessionHandle {
    pub async fn send(&self, event: Event) -> Result<(), RuntimeClosed> {
        self.event_tx.send(event).await.map_err(|_| RuntimeClosed)
    }
}

/// Start a session runtime on the current tokio runtime.
///
/// The returned receiver is subscribed before the runtime starts, so it sees
/// the initial state and any startup resume.
pub fn spawn<A, S>(
    context: SessionContext,
    api: Arc<A>,
    store: S,
) -> (SessionHandle, broadcast::Receiver<UiEvent>, JoinHandle<()>)
where
    A: PuzzleApi + 'static,
    S: SessionStore + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (ui_tx, ui_rx) = broadcast::channel(128);

    let runtime = SessionRuntime::new(context, api, store, event_rx, ui_tx);
    let task = tokio::spawn(runtime.run());

    (SessionHandle { event_tx }, ui_rx, task)
}
