use super::{require_card, StateHandler};
use crate::chat::event::{IncomingEvent, Keyboard};
use crate::chat::labels;
use crate::chat::turn::Turn;
use crate::errors::TurnError;
use crate::models::{MessageList, State, StateData};
use crate::repo;

/// First phase of card composition: incoming messages accumulate as the front
/// until the user moves on to the back.
pub struct CardCreate;

impl StateHandler for CardCreate {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let (deck_id, front, back) = turn.compose()?;

        if event.text() == labels::EDIT_CARD_BACK {
            if front.is_empty() {
                return self.show(turn);
            }
            return turn.set_and_show_state(
                State::CardCreateBack,
                StateData::Compose {
                    deck_id,
                    front,
                    back,
                },
            );
        }

        match event.as_message() {
            Some(message) => {
                let mut front = front;
                front.push(message);
                turn.set_state(
                    State::CardCreate,
                    StateData::Compose {
                        deck_id,
                        front,
                        back,
                    },
                )?;
                turn.reply_with_keyboard(
                    format!(
                        "Got it. Send more for the front, or press '{}'.",
                        labels::EDIT_CARD_BACK
                    ),
                    Keyboard::rows([[labels::EDIT_CARD_BACK]]),
                );
                Ok(())
            }
            None => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        turn.reply_with_keyboard(
            "Please send a message to use for the front.",
            Keyboard::rows([[labels::EDIT_CARD_BACK]]),
        );
        Ok(())
    }
}

/// Second phase: the back accumulates until the user saves, which commits the
/// card with fresh scheduling fields (due immediately).
pub struct CardCreateBack;

impl StateHandler for CardCreateBack {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let (deck_id, front, back) = turn.compose()?;

        if event.text() == labels::SAVE {
            if back.is_empty() {
                return self.show(turn);
            }
            let due = turn.start_of_today()?;
            repo::create_card(
                turn.conn,
                deck_id,
                &MessageList(front),
                &MessageList(back),
                due,
            )?;
            turn.reply("Card created");
            return turn.set_and_show_state(State::DeckDetails, StateData::Deck { deck_id });
        }

        match event.as_message() {
            Some(message) => {
                let mut back = back;
                back.push(message);
                turn.set_state(
                    State::CardCreateBack,
                    StateData::Compose {
                        deck_id,
                        front,
                        back,
                    },
                )?;
                turn.reply_with_keyboard(
                    format!("Got it. Send more for the back, or press '{}'.", labels::SAVE),
                    Keyboard::rows([[labels::SAVE]]),
                );
                Ok(())
            }
            None => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        turn.reply_with_keyboard(
            "Please send a message to use for the back.",
            Keyboard::rows([[labels::SAVE]]),
        );
        Ok(())
    }
}

pub struct CardEdit;

impl StateHandler for CardEdit {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let card = require_card(turn)?;
        match event.text() {
            labels::BACK => turn.set_and_show_state(
                State::DeckDetails,
                StateData::Deck {
                    deck_id: card.deck_id,
                },
            ),
            labels::DELETE_CARD => {
                repo::delete_card(turn.conn, card.id)?;
                turn.set_and_show_state(
                    State::DeckDetails,
                    StateData::Deck {
                        deck_id: card.deck_id,
                    },
                )
            }
            labels::EDIT_CARD_FRONT => {
                turn.set_and_show_state(State::CardEditFront, StateData::Card { card_id: card.id })
            }
            labels::EDIT_CARD_BACK => {
                turn.set_and_show_state(State::CardEditBack, StateData::Card { card_id: card.id })
            }
            _ => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let keyboard = Keyboard::rows([
            [labels::BACK, labels::DELETE_CARD],
            [labels::EDIT_CARD_FRONT, labels::EDIT_CARD_BACK],
        ]);
        turn.reply_with_keyboard("What would you like to do?", keyboard);
        Ok(())
    }
}

pub struct CardEditFront;

impl StateHandler for CardEditFront {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let card = require_card(turn)?;
        match event.as_message() {
            Some(message) => {
                repo::set_card_front(turn.conn, card.id, &MessageList(vec![message]))?;
                turn.reply("Card updated");
                turn.set_and_show_state(
                    State::DeckDetails,
                    StateData::Deck {
                        deck_id: card.deck_id,
                    },
                )
            }
            None => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let card = require_card(turn)?;
        turn.reply("I'm now going to send you the front, please send me back what you want to replace it with.");
        turn.send_side(&card.front, None);
        Ok(())
    }
}

pub struct CardEditBack;

impl StateHandler for CardEditBack {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let card = require_card(turn)?;
        match event.as_message() {
            Some(message) => {
                repo::set_card_back(turn.conn, card.id, &MessageList(vec![message]))?;
                turn.reply("Card updated");
                turn.set_and_show_state(
                    State::DeckDetails,
                    StateData::Deck {
                        deck_id: card.deck_id,
                    },
                )
            }
            None => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let card = require_card(turn)?;
        turn.reply("I'm now going to send you the back, please send me back what you want to replace it with.");
        turn.send_side(&card.back, None);
        Ok(())
    }
}
