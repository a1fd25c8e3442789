//! Key handling for the control surface
//!
//! Pure: a key press plus the latest session state yields a [`Command`].
//! The question text lives here, not in the session state.

use crate::state_machine::state::Phase;
use crate::state_machine::{Event, SessionState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Longest question the input accepts, in characters
pub const MAX_QUESTION_CHARS: usize = 60;

/// Entries of the in-game action menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    RevealAnswer,
    EndGame,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::RevealAnswer, MenuItem::EndGame];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::RevealAnswer => "Reveal the answer",
            MenuItem::EndGame => "End game",
        }
    }

    fn event(self) -> Event {
        match self {
            MenuItem::RevealAnswer => Event::RevealAnswer,
            MenuItem::EndGame => Event::EndGame,
        }
    }
}

/// What the UI loop should do after a key press
#[derive(Debug)]
pub enum Command {
    Dispatch(Event),
    Quit,
    None,
}

/// Local input state: question text and menu
#[derive(Debug, Default)]
pub struct ControlState {
    pub input: String,
    pub menu_open: bool,
    pub menu_cursor: usize,
}

impl ControlState {
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Drop UI state that no longer applies to `state`
    pub fn sync(&mut self, state: &SessionState) {
        if state.phase() == Phase::NoSession {
            self.menu_open = false;
        }
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.menu_cursor.min(MenuItem::ALL.len() - 1)]
    }

    pub fn handle_key(&mut self, key: KeyEvent, state: &SessionState) -> Command {
        if key.kind != KeyEventKind::Press {
            return Command::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::Quit;
        }

        match state.phase() {
            Phase::NoSession => Self::handle_idle_key(key, state),
            Phase::Active if self.menu_open => self.handle_menu_key(key, state),
            Phase::Active => self.handle_input_key(key, state),
        }
    }

    fn handle_idle_key(key: KeyEvent, state: &SessionState) -> Command {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Command::Quit,
            KeyCode::Enter | KeyCode::Char('n') if !state.is_pending() => {
                Command::Dispatch(Event::StartNewGame)
            }
            _ => Command::None,
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent, state: &SessionState) -> Command {
        match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::F(2) => {
                self.menu_open = false;
                Command::None
            }
            KeyCode::Up => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
                Command::None
            }
            KeyCode::Down => {
                self.menu_cursor = (self.menu_cursor + 1).min(MenuItem::ALL.len() - 1);
                Command::None
            }
            KeyCode::Enter if !state.is_pending() => {
                self.menu_open = false;
                Command::Dispatch(self.selected().event())
            }
            _ => Command::None,
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, state: &SessionState) -> Command {
        if state.is_pending() {
            return match key.code {
                KeyCode::Esc => Command::Quit,
                _ => Command::None,
            };
        }

        match key.code {
            KeyCode::Esc => Command::Quit,
            KeyCode::Tab | KeyCode::F(2) => {
                self.menu_open = true;
                self.menu_cursor = 0;
                Command::None
            }
            KeyCode::Enter if !self.input.trim().is_empty() => {
                // The input is cleared once the reply arrives
                Command::Dispatch(Event::SubmitQuestion {
                    text: self.input.clone(),
                })
            }
            KeyCode::Backspace => {
                self.input.pop();
                Command::None
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if self.input.chars().count() < MAX_QUESTION_CHARS {
                    self.input.push(c);
                }
                Command::None
            }
            _ => Command::None,
        }
    }
}
