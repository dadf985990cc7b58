use super::StateHandler;
use crate::chat::event::{IncomingEvent, Keyboard};
use crate::chat::labels;
use crate::chat::turn::Turn;
use crate::errors::TurnError;
use crate::models::{State, StateData};
use crate::repo;

fn review_reply(quality: i32, levels: i32) -> &'static str {
    if quality == 0 {
        "Too bad!"
    } else if quality == levels - 1 {
        "💯"
    } else if quality < levels / 2 {
        "You'll get it right next time!"
    } else {
        "👍 All right!"
    }
}

/// Cross-deck rehearsal: shows the front of the next due card among all of
/// the user's decks.
pub struct Rehearsing;

impl StateHandler for Rehearsing {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let start_of_today = turn.start_of_today()?;
        let Some(card) = repo::due_card_for_user(turn.conn, turn.user.id, start_of_today)? else {
            return turn.set_and_show_state(State::DeckList, StateData::None);
        };

        match event.text() {
            labels::BACK => turn.set_and_show_state(State::DeckList, StateData::None),
            labels::EDIT_CARD => {
                turn.set_and_show_state(State::CardEdit, StateData::Card { card_id: card.id })
            }
            labels::SHOW_BACK => {
                turn.set_and_show_state(State::RehearsingCardReview, StateData::None)
            }
            _ => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let start_of_today = turn.start_of_today()?;
        match repo::due_card_for_user(turn.conn, turn.user.id, start_of_today)? {
            Some(card) => {
                let keyboard = Keyboard::rows([
                    vec![labels::BACK],
                    vec![labels::EDIT_CARD, labels::SHOW_BACK],
                ]);
                turn.send_side(&card.front, Some(keyboard));
                Ok(())
            }
            None => {
                turn.reply("Done with rehearsal for today!");
                turn.set_and_show_state(State::DeckList, StateData::None)
            }
        }
    }
}

/// Back side + difficulty keyboard for the card picked by [`Rehearsing`]. The
/// card is re-selected rather than carried in the payload; inside one turn the
/// selector is stable, so this is the same card the front was shown for.
pub struct RehearsingCardReview;

impl StateHandler for RehearsingCardReview {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let start_of_today = turn.start_of_today()?;
        let Some(card) = repo::due_card_for_user(turn.conn, turn.user.id, start_of_today)? else {
            return turn.set_and_show_state(State::Rehearsing, StateData::None);
        };

        match labels::quality_from_label(turn.algorithm, event.text()) {
            Some(quality) => {
                turn.reply(review_reply(quality, turn.algorithm.quality_levels()));
                repo::respond(
                    turn.conn,
                    turn.algorithm,
                    card.id,
                    quality,
                    &turn.user.time_zone,
                    turn.now,
                )?;
                turn.set_and_show_state(State::Rehearsing, StateData::None)
            }
            None => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let start_of_today = turn.start_of_today()?;
        match repo::due_card_for_user(turn.conn, turn.user.id, start_of_today)? {
            Some(card) => {
                turn.send_side(&card.back, Some(labels::review_keyboard(turn.algorithm)));
                Ok(())
            }
            None => turn.set_and_show_state(State::Rehearsing, StateData::None),
        }
    }
}

/// Back side + difficulty keyboard for a single-deck review session.
pub struct CardReview;

impl StateHandler for CardReview {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let deck_id = turn.deck_id()?;
        let start_of_today = turn.start_of_today()?;
        let Some(card) = repo::card_for_review(turn.conn, deck_id, start_of_today)? else {
            return turn.set_and_show_state(State::DeckDetails, StateData::Deck { deck_id });
        };

        match labels::quality_from_label(turn.algorithm, event.text()) {
            Some(quality) => {
                turn.reply(review_reply(quality, turn.algorithm.quality_levels()));
                repo::respond(
                    turn.conn,
                    turn.algorithm,
                    card.id,
                    quality,
                    &turn.user.time_zone,
                    turn.now,
                )?;
                turn.set_and_show_state(State::DeckDetails, StateData::Deck { deck_id })
            }
            None => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let deck_id = turn.deck_id()?;
        let start_of_today = turn.start_of_today()?;
        match repo::card_for_review(turn.conn, deck_id, start_of_today)? {
            Some(card) => {
                turn.send_side(&card.back, Some(labels::review_keyboard(turn.algorithm)));
                Ok(())
            }
            None => turn.set_and_show_state(State::DeckDetails, StateData::Deck { deck_id }),
        }
    }
}
