//! Puzzle Chat - terminal client for the turtle soup guessing game
//!
//! The player reads a baffling scenario and asks an AI host questions until
//! they work out the story, or gives up and reveals the answer.

mod api;
mod config;
mod runtime;
mod session;
mod state_machine;
mod ui;

use api::{HttpPuzzleApi, LoggingApi};
use config::ClientConfig;
use session::FileSessionStore;
use state_machine::SessionContext;
use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;

    // Initialize logging; the terminal belongs to the UI, so logs go to a file
    if let Some(parent) = config.log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "puzzle_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    let http = HttpPuzzleApi::new(&config)?;
    let api = Arc::new(LoggingApi::new(Arc::new(http)));
    let store = FileSessionStore::new(&config.session_path);

    tracing::info!(
        base_url = %config.api_base_url,
        session_path = %store.path().display(),
        timeout = ?config.request_timeout,
        "Starting puzzle chat"
    );
    let context = SessionContext::new(&config.answer_domain);

    let (handle, updates, session_task) = runtime::spawn(context, api, store);

    let ui_result = ui::run(handle, updates).await;

    // The UI dropped its handle, so the runtime winds down
    if let Err(e) = session_task.await {
        tracing::error!(error = %e, "Session runtime panicked");
    }
    ui_result?;

    tracing::info!("Exiting");
    Ok(())
}
