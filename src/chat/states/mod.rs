//! Per-state conversation handlers.
//!
//! Each state implements [`StateHandler`]: `handle_input` maps the incoming
//! event to a transition (or a reprompt), `show` renders the state's prompt
//! from the current user and payload. `show` never writes deck or card rows,
//! so re-showing a state is always safe.

mod card;
mod deck;
mod review;
mod settings;

use crate::chat::event::IncomingEvent;
use crate::chat::turn::Turn;
use crate::errors::TurnError;
use crate::models::{Card, Deck, State};
use crate::repo;

pub trait StateHandler {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError>;
    fn show(&self, turn: &mut Turn) -> Result<(), TurnError>;
}

/// The state-to-handler table.
pub fn handler_for(state: State) -> &'static dyn StateHandler {
    match state {
        State::DeckList => &deck::DeckList,
        State::DeckCreate => &deck::DeckCreate,
        State::DeckDetails => &deck::DeckDetails,
        State::DeckEdit => &deck::DeckEdit,
        State::DeckNameEdit => &deck::DeckNameEdit,
        State::DeckDelete => &deck::DeckDelete,
        State::CardCreate => &card::CardCreate,
        State::CardCreateBack => &card::CardCreateBack,
        State::CardEdit => &card::CardEdit,
        State::CardEditFront => &card::CardEditFront,
        State::CardEditBack => &card::CardEditBack,
        State::Rehearsing => &review::Rehearsing,
        State::RehearsingCardReview => &review::RehearsingCardReview,
        State::CardReview => &review::CardReview,
        State::SetTimeZone => &settings::SetTimeZone,
        State::Settings => &settings::Settings,
        State::UserSetup => &settings::UserSetup,
        State::SetRehearsalTime => &settings::SetRehearsalTime,
    }
}

/// Loads the deck named by the current payload; a missing row is a state/data
/// inconsistency.
fn require_deck(turn: &mut Turn) -> Result<Deck, TurnError> {
    let deck_id = turn.deck_id()?;
    repo::get_deck(turn.conn, deck_id)?.ok_or_else(|| TurnError::missing("deck", deck_id))
}

/// Loads the card named by the current payload.
fn require_card(turn: &mut Turn) -> Result<Card, TurnError> {
    let card_id = turn.card_id()?;
    repo::get_card(turn.conn, card_id)?.ok_or_else(|| TurnError::missing("card", card_id))
}
