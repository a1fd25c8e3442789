//! Terminal front end
//!
//! Draws the latest [`SessionState`] and turns key presses into session
//! events. The view is a pure function of the state plus local input.

mod controls;
mod conversation;
mod keys;

use keys::{Command, ControlState};

use crate::runtime::{SessionHandle, UiEvent};
use crate::state_machine::state::Phase;
use crate::state_machine::SessionState;
use crossterm::event::{Event as TermEvent, EventStream};
use futures::StreamExt;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Frame};
use std::io;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};

const TICK: Duration = Duration::from_millis(100);

/// Everything drawn on screen
#[derive(Debug, Default)]
pub struct View {
    pub state: SessionState,
    pub controls: ControlState,
    /// Spinner frame counter
    pub tick: usize,
}

impl View {
    pub fn apply(&mut self, update: UiEvent) {
        match update {
            UiEvent::State(state) => {
                self.controls.sync(&state);
                self.state = state;
            }
            UiEvent::ClearInput => self.controls.clear_input(),
        }
    }
}

fn help_text(view: &View) -> &'static str {
    match view.state.phase() {
        Phase::NoSession => "Enter/n new game  Esc quit",
        Phase::Active if view.controls.menu_open => "Up/Down choose  Enter confirm  Esc close",
        Phase::Active => "Enter ask  Tab actions  Esc quit",
    }
}

pub fn draw(frame: &mut Frame, view: &View) {
    let area = frame.area();
    let state = &view.state;
    let pending = state.is_pending();

    let card_height = controls::puzzle_card_height(state.puzzle.as_ref(), area.width)
        .min(area.height / 3)
        .max(3);
    let error_height = u16::from(state.last_error.is_some());

    let [card, error, log, bottom, help] = Layout::vertical([
        Constraint::Length(card_height),
        Constraint::Length(error_height),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    controls::render_puzzle_card(frame, card, state.puzzle.as_ref());
    if let Some(notice) = &state.last_error {
        controls::render_error_line(frame, error, notice);
    }
    conversation::render(frame, log, &state.dialogs);

    match state.phase() {
        Phase::Active => {
            controls::render_input(frame, bottom, &view.controls, pending, view.tick);
            if view.controls.menu_open {
                controls::render_menu(frame, bottom, &view.controls);
            }
        }
        Phase::NoSession => controls::render_start_button(frame, bottom, pending, view.tick),
    }

    frame.render_widget(
        Paragraph::new(Line::from(help_text(view))).style(Style::default().fg(Color::DarkGray)),
        help,
    );
}

/// Take over the terminal and run until the user quits or the session stops
pub async fn run(handle: SessionHandle, updates: broadcast::Receiver<UiEvent>) -> io::Result<()> {
    let mut terminal = ratatui::try_init()?;
    let result = event_loop(&mut terminal, &handle, updates).await;
    ratatui::restore();
    // Without a handle the runtime stops
    drop(handle);
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    handle: &SessionHandle,
    mut updates: broadcast::Receiver<UiEvent>,
) -> io::Result<()> {
    let mut keys = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);
    let mut view = View::default();

    loop {
        terminal.draw(|frame| draw(frame, &view))?;

        tokio::select! {
            _ = ticker.tick() => {
                view.tick = view.tick.wrapping_add(1);
            }
            update = updates.recv() => match update {
                Ok(update) => view.apply(update),
                Err(RecvError::Lagged(skipped)) => {
                    // A newer snapshot follows
                    tracing::warn!(skipped, "UI fell behind session updates");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Session runtime closed");
                    break;
                }
            },
            input = keys.next() => match input {
                Some(Ok(TermEvent::Key(key))) => {
                    match view.controls.handle_key(key, &view.state) {
                        Command::Quit => break,
                        Command::Dispatch(event) => {
                            tracing::debug!(event = event.name(), "User action");
                            if handle.send(event).await.is_err() {
                                break;
                            }
                        }
                        Command::None => {}
                    }
                }
                // Resize and focus changes only need a redraw
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
        }
    }
    Ok(())
}
