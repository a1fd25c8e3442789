//! Session runtime executor

use super::UiEvent;
use crate::api::PuzzleApi;
use crate::session::{SessionStore, SESSION_TTL};
use crate::state_machine::state::{Action, Pending};
use crate::state_machine::{transition, ApiRequest, Effect, Event, SessionContext, SessionState};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// The one request allowed in flight
struct InFlight {
    request_id: Uuid,
    action: Option<Action>,
    cancel: CancellationToken,
}

/// Owns the session state and performs the effects of each transition
pub struct SessionRuntime<A, S>
where
    A: PuzzleApi + 'static,
    S: SessionStore + 'static,
{
    context: SessionContext,
    state: SessionState,
    api: Arc<A>,
    store: S,
    /// User actions from the UI
    event_rx: mpsc::Receiver<Event>,
    /// Outcomes of in-flight requests
    result_tx: mpsc::Sender<(Uuid, Event)>,
    result_rx: mpsc::Receiver<(Uuid, Event)>,
    ui_tx: broadcast::Sender<UiEvent>,
    in_flight: Option<InFlight>,
}

impl<A, S> SessionRuntime<A, S>
where
    A: PuzzleApi + 'static,
    S: SessionStore + 'static,
{
    pub fn new(
        context: SessionContext,
        api: Arc<A>,
        store: S,
        event_rx: mpsc::Receiver<Event>,
        ui_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(4);
        Self {
            context,
            state: SessionState::default(),
            api,
            store,
            event_rx,
            result_tx,
            result_rx,
            ui_tx,
            in_flight: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting session runtime");

        self.publish_state();
        self.resume_stored_session();

        // Runs until every UI handle is dropped
        loop {
            tokio::select! {
                maybe = self.event_rx.recv() => match maybe {
                    Some(event) => self.process_event(event),
                    None => break,
                },
                Some((request_id, event)) = self.result_rx.recv() => {
                    self.process_result(request_id, event);
                }
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            tracing::info!(
                request_id = %in_flight.request_id,
                action = ?in_flight.action,
                "Abandoning in-flight request"
            );
            in_flight.cancel.cancel();
        }
        tracing::info!("Session runtime stopped");
    }

    fn resume_stored_session(&mut self) {
        match self.store.load() {
            Ok(Some(token)) => {
                tracing::info!("Resuming stored session");
                self.process_event(Event::Resume { token });
            }
            Ok(None) => tracing::debug!("No stored session"),
            Err(e) => tracing::warn!(error = %e, "Failed to read stored session"),
        }
    }

    fn process_result(&mut self, request_id: Uuid, event: Event) {
        match &self.in_flight {
            Some(in_flight) if in_flight.request_id == request_id => {
                self.in_flight = None;
                self.process_event(event);
            }
            _ => {
                tracing::warn!(%request_id, event = event.name(), "Discarding stale response");
            }
        }
    }

    fn process_event(&mut self, event: Event) {
        let name = event.name();

        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) if e.is_silent() => {
                tracing::debug!(event = name, reason = %e, "Ignoring action");
                return;
            }
            Err(e) => {
                tracing::warn!(event = name, error = %e, "Rejected event");
                return;
            }
        };

        tracing::debug!(
            event = name,
            effects = result.effects.len(),
            dispatches = result.effects.iter().filter(|e| e.is_request()).count(),
            "Transition"
        );
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        self.publish_state();
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Request(request) => self.spawn_request(request),

            Effect::PersistToken { token } => {
                let outcome = match token.as_deref() {
                    Some(token) if !token.is_empty() => self.store.save(token, SESSION_TTL),
                    _ => self.store.clear(),
                };
                if let Err(e) = outcome {
                    // The in-memory state stays authoritative for this run
                    tracing::warn!(error = %e, "Failed to persist session token");
                }
            }

            Effect::ClearInput => {
                let _ = self.ui_tx.send(UiEvent::ClearInput);
            }
        }
    }

    fn spawn_request(&mut self, request: ApiRequest) {
        if let Some(previous) = self.in_flight.take() {
            tracing::warn!(
                request_id = %previous.request_id,
                "Replacing in-flight request"
            );
            previous.cancel.cancel();
        }

        let request_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let action = self.state.pending.as_ref().map(Pending::action);
        tracing::info!(%request_id, ?action, "Dispatching request");

        let api = Arc::clone(&self.api);
        let result_tx = self.result_tx.clone();
        let token = cancel.clone();
        tokio::spawn(async move {
            let event = tokio::select! {
                () = token.cancelled() => return,
                event = perform(api.as_ref(), request) => event,
            };
            if result_tx.send((request_id, event)).await.is_err() {
                tracing::debug!(%request_id, "Runtime gone before response was delivered");
            }
        });

        self.in_flight = Some(InFlight {
            request_id,
            action,
            cancel,
        });
    }

    fn publish_state(&self) {
        // No subscribers is fine; the UI may not be attached yet
        let _ = self.ui_tx.send(UiEvent::State(self.state.clone()));
    }
}

/// Run one request and turn its outcome into an event
async fn perform<A: PuzzleApi + ?Sized>(api: &A, request: ApiRequest) -> Event {
    let outcome = match request {
        ApiRequest::NewSession => api.fetch_chat("", None).await.map(|chat| Event::SessionCreated {
            token: chat.cid.unwrap_or_default(),
        }),
        ApiRequest::History { token } => api
            .fetch_chat_history(&token)
            .await
            .map(|history| Event::HistoryLoaded { history }),
        ApiRequest::Question { question, token } => api
            .fetch_chat(&question, token.as_deref())
            .await
            .map(|chat| Event::ReplyReceived {
                reply: chat.reply,
                token: chat.cid,
            }),
        ApiRequest::Answer { question, token } => api
            .fetch_chat(&question, Some(&token))
            .await
            .map(|chat| Event::AnswerRevealed { reply: chat.reply }),
    };
    outcome.unwrap_or_else(|error| Event::TransportFailed { error })
}
