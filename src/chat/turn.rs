use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::sqlite::SqliteConnection;

use crate::chat::event::{Keyboard, OutgoingAction};
use crate::chat::states;
use crate::errors::TurnError;
use crate::models::{Message, MessageList, State, StateData, User};
use crate::repo;
use crate::sm::Algorithm;
use crate::tz::TimezoneInfo;

/// Everything one conversation turn works with: the transaction's connection,
/// the user row as loaded at the start of the turn, and the outgoing actions
/// accumulated along the way.
///
/// Handlers mutate persisted state through [`Turn::set_state`] so the in-memory
/// user row never drifts from the database within a turn.
pub struct Turn<'a> {
    pub conn: &'a mut SqliteConnection,
    pub user: User,
    pub now: DateTime<Utc>,
    pub algorithm: &'static Algorithm,
    /// Time zone resolved from the event's location, looked up by the session
    /// before the transaction started. None when the event had no location or
    /// the lookup failed.
    pub resolved_zone: Option<TimezoneInfo>,
    pub actions: Vec<OutgoingAction>,
}

impl Turn<'_> {
    pub fn reply(&mut self, text: impl Into<String>) {
        self.actions.push(OutgoingAction::SendMessage {
            message: Message::text(text),
            keyboard: None,
        });
    }

    pub fn reply_with_keyboard(&mut self, text: impl Into<String>, keyboard: Keyboard) {
        self.actions.push(OutgoingAction::SendMessage {
            message: Message::text(text),
            keyboard: Some(keyboard),
        });
    }

    pub fn request_location(&mut self, text: impl Into<String>) {
        self.actions.push(OutgoingAction::RequestLocation { text: text.into() });
    }

    /// Sends a card side: one action per content block, with the keyboard
    /// attached to the last block.
    pub fn send_side(&mut self, side: &MessageList, keyboard: Option<Keyboard>) {
        let last = side.0.len().saturating_sub(1);
        for (index, message) in side.0.iter().enumerate() {
            self.actions.push(OutgoingAction::SendMessage {
                message: message.clone(),
                keyboard: if index == last { keyboard.clone() } else { None },
            });
        }
    }

    /// Start of the current day in the user's zone; the due cutoff for every
    /// selector query this turn makes.
    pub fn start_of_today(&self) -> Result<NaiveDateTime, TurnError> {
        crate::tz::start_of_today_utc(&self.user.time_zone, self.now)
    }

    /// Persists a state transition and mirrors it on the in-memory user.
    pub fn set_state(&mut self, state: State, data: StateData) -> Result<(), TurnError> {
        repo::set_state(self.conn, self.user.id, state, data.clone())?;
        self.user.state = state;
        self.user.data = data;
        Ok(())
    }

    /// Transitions and immediately renders the new state's prompt.
    pub fn set_and_show_state(&mut self, state: State, data: StateData) -> Result<(), TurnError> {
        self.set_state(state, data)?;
        self.show_current()
    }

    pub fn show_current(&mut self) -> Result<(), TurnError> {
        states::handler_for(self.user.state).show(self)
    }

    /// The deck id the current state operates on.
    pub fn deck_id(&self) -> Result<i32, TurnError> {
        match &self.user.data {
            StateData::Deck { deck_id } | StateData::Compose { deck_id, .. } => Ok(*deck_id),
            _ => Err(TurnError::MissingData {
                state: self.user.state,
                expected: "deck",
            }),
        }
    }

    /// The card id the current state operates on.
    pub fn card_id(&self) -> Result<i32, TurnError> {
        match &self.user.data {
            StateData::Card { card_id } => Ok(*card_id),
            _ => Err(TurnError::MissingData {
                state: self.user.state,
                expected: "card",
            }),
        }
    }

    /// The in-progress card composition.
    pub fn compose(&self) -> Result<(i32, Vec<Message>, Vec<Message>), TurnError> {
        match &self.user.data {
            StateData::Compose {
                deck_id,
                front,
                back,
            } => Ok((*deck_id, front.clone(), back.clone())),
            _ => Err(TurnError::MissingData {
                state: self.user.state,
                expected: "composition",
            }),
        }
    }
}
