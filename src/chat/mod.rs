//! The conversation state machine.
//!
//! A turn flows through [`handle_event`]: global escape commands are checked
//! first, then the current state's handler interprets the input. Handlers
//! live in [`states`]; the [`turn::Turn`] context carries the transaction,
//! the user row, and the accumulated outgoing actions.

pub mod event;
pub mod help;
pub mod labels;
pub mod states;
pub mod turn;

pub use event::{Attachment, AttachmentKind, IncomingEvent, Keyboard, Location, OutgoingAction};
pub use turn::Turn;

use crate::errors::TurnError;
use crate::models::{State, StateData};

/// Runs one state-machine step for an incoming event.
///
/// The escape commands work from any state, matched as prefixes the way chat
/// clients append bot names to commands.
pub fn handle_event(turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
    let text = event.text();
    if text.starts_with("/decks") {
        return turn.set_and_show_state(State::DeckList, StateData::None);
    }
    if text.starts_with("/help") {
        return turn.show_current();
    }
    if text.starts_with("/start") {
        return turn.set_and_show_state(State::UserSetup, StateData::None);
    }
    if text.starts_with("/settings") {
        return turn.set_and_show_state(State::Settings, StateData::None);
    }

    states::handler_for(turn.user.state).handle_input(turn, event)
}
