//! Core session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! user actions and transport outcomes are events, the transition function
//! returns the next state plus effects, and the runtime performs the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{ApiRequest, Effect};
pub use event::Event;
pub use state::{SessionContext, SessionState};
pub use transition::transition;
