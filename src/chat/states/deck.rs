use super::{require_deck, StateHandler};
use crate::chat::event::{IncomingEvent, Keyboard};
use crate::chat::help::HELP_TEXTS;
use crate::chat::labels;
use crate::chat::turn::Turn;
use crate::errors::TurnError;
use crate::models::{State, StateData};
use crate::repo;

pub struct DeckList;

impl StateHandler for DeckList {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        match event.text() {
            labels::ADD_DECK => turn.set_and_show_state(State::DeckCreate, StateData::None),
            labels::HELP => {
                for text in HELP_TEXTS {
                    turn.reply(text);
                }
                self.show(turn)
            }
            labels::EDIT_SETTINGS => turn.set_and_show_state(State::Settings, StateData::None),
            text => {
                // Any other input is interpreted as a deck button press.
                match repo::get_deck_by_name(turn.conn, turn.user.id, text)? {
                    Some(deck) => turn
                        .set_and_show_state(State::DeckDetails, StateData::Deck { deck_id: deck.id }),
                    None => self.show(turn),
                }
            }
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let decks = repo::list_decks(turn.conn, turn.user.id)?;

        let mut keyboard =
            Keyboard::rows([[labels::HELP, labels::EDIT_SETTINGS, labels::ADD_DECK]]);
        if decks.is_empty() {
            turn.reply_with_keyboard(
                format!(
                    "You're now ready to create your first deck, so press '{}' to get started.",
                    labels::ADD_DECK
                ),
                keyboard,
            );
        } else {
            for deck in &decks {
                keyboard.push_row([deck.name.as_str()]);
            }
            turn.reply_with_keyboard("Select the deck you want to work on.", keyboard);
        }
        Ok(())
    }
}

pub struct DeckCreate;

impl StateHandler for DeckCreate {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let name = repo::normalize_deck_name(event.text());
        if name.is_empty() {
            turn.reply("Please supply a name for the new deck");
            return Ok(());
        }
        if repo::has_deck_with_name(turn.conn, turn.user.id, &name)? {
            turn.reply("Name already taken");
            return Ok(());
        }
        let deck = repo::create_deck(turn.conn, turn.user.id, &name)?;
        turn.reply(format!("Deck '{}' has been created!", name));
        turn.set_and_show_state(State::DeckDetails, StateData::Deck { deck_id: deck.id })
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        turn.reply("What's the name of the new deck?");
        Ok(())
    }
}

pub struct DeckDetails;

impl StateHandler for DeckDetails {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let deck = require_deck(turn)?;
        match event.text() {
            labels::BACK => turn.set_and_show_state(State::DeckList, StateData::None),
            labels::ADD_CARD => turn.set_and_show_state(
                State::CardCreate,
                StateData::Compose {
                    deck_id: deck.id,
                    front: vec![],
                    back: vec![],
                },
            ),
            labels::EDIT_DECK => {
                turn.set_and_show_state(State::DeckEdit, StateData::Deck { deck_id: deck.id })
            }
            labels::EDIT_CARD => {
                let start_of_today = turn.start_of_today()?;
                match repo::card_for_review(turn.conn, deck.id, start_of_today)? {
                    Some(card) => turn
                        .set_and_show_state(State::CardEdit, StateData::Card { card_id: card.id }),
                    None => self.show(turn),
                }
            }
            labels::SHOW_BACK => {
                turn.set_and_show_state(State::CardReview, StateData::Deck { deck_id: deck.id })
            }
            _ => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let deck_id = turn.deck_id()?;
        let start_of_today = turn.start_of_today()?;
        let stats = repo::deck_with_stats(turn.conn, deck_id, start_of_today)?
            .ok_or_else(|| TurnError::missing("deck", deck_id))?;

        let mut keyboard =
            Keyboard::rows([[labels::BACK, labels::EDIT_DECK, labels::ADD_CARD]]);

        if stats.total_cards == 0 {
            turn.reply_with_keyboard(
                format!(
                    "You currently have no cards, so press '{}' to create one.",
                    labels::ADD_CARD
                ),
                keyboard,
            );
            return Ok(());
        }
        if stats.cards_to_rehearse == 0 {
            turn.reply_with_keyboard("No more cards to review today.", keyboard);
            return Ok(());
        }

        turn.reply(format!(
            "{}/{} cards left to rehearse in '{}'",
            stats.cards_to_rehearse, stats.total_cards, stats.deck.name
        ));
        match repo::card_for_review(turn.conn, deck_id, start_of_today)? {
            Some(card) => {
                keyboard.push_row([labels::EDIT_CARD, labels::SHOW_BACK]);
                turn.send_side(&card.front, Some(keyboard));
            }
            // The due count and the selector use the same cutoff inside one
            // transaction, so this only happens on an inconsistent clock.
            None => turn.reply_with_keyboard("No more cards to review today.", keyboard),
        }
        Ok(())
    }
}

pub struct DeckEdit;

impl StateHandler for DeckEdit {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let deck = require_deck(turn)?;
        match event.text() {
            labels::BACK => {
                turn.set_and_show_state(State::DeckDetails, StateData::Deck { deck_id: deck.id })
            }
            labels::EDIT_NAME => {
                turn.set_and_show_state(State::DeckNameEdit, StateData::Deck { deck_id: deck.id })
            }
            labels::DELETE_DECK => {
                turn.set_and_show_state(State::DeckDelete, StateData::Deck { deck_id: deck.id })
            }
            labels::ENABLE_SCHEDULING => {
                repo::set_deck_scheduled(turn.conn, deck.id, true)?;
                self.show(turn)
            }
            labels::DISABLE_SCHEDULING => {
                repo::set_deck_scheduled(turn.conn, deck.id, false)?;
                self.show(turn)
            }
            _ => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let deck = require_deck(turn)?;
        let schedule_label = if deck.scheduled {
            labels::DISABLE_SCHEDULING
        } else {
            labels::ENABLE_SCHEDULING
        };
        let keyboard = Keyboard::rows([
            [labels::BACK, labels::DELETE_DECK],
            [schedule_label, labels::EDIT_NAME],
        ]);
        turn.reply_with_keyboard(
            format!("What do you want to do with '{}'?", deck.name),
            keyboard,
        );
        Ok(())
    }
}

pub struct DeckNameEdit;

impl StateHandler for DeckNameEdit {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let deck = require_deck(turn)?;
        let name = repo::normalize_deck_name(event.text());
        if name.is_empty() {
            turn.reply("Please supply a name for the deck");
            return Ok(());
        }
        // Authoritative uniqueness gate, re-checked at commit time.
        if !repo::can_set_name_to(turn.conn, deck.id, turn.user.id, &name)? {
            turn.reply("Name already used");
            return Ok(());
        }
        repo::set_deck_name(turn.conn, deck.id, &name)?;
        turn.reply(format!("Name changed to '{}'", name));
        turn.set_and_show_state(State::DeckDetails, StateData::Deck { deck_id: deck.id })
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let deck = require_deck(turn)?;
        turn.reply(format!("Please type in the new name for '{}'", deck.name));
        Ok(())
    }
}

pub struct DeckDelete;

impl StateHandler for DeckDelete {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let deck = require_deck(turn)?;
        match event.text() {
            labels::DONT_DELETE_DECK => {
                turn.set_and_show_state(State::DeckEdit, StateData::Deck { deck_id: deck.id })
            }
            labels::CONFIRM_DELETE_DECK => {
                let start_of_today = turn.start_of_today()?;
                let stats = repo::deck_with_stats(turn.conn, deck.id, start_of_today)?
                    .ok_or_else(|| TurnError::missing("deck", deck.id))?;
                repo::delete_deck(turn.conn, deck.id)?;
                turn.reply(format!(
                    "'{}' and {} cards have been deleted",
                    deck.name, stats.total_cards
                ));
                turn.set_and_show_state(State::DeckList, StateData::None)
            }
            _ => self.show(turn),
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let deck_id = turn.deck_id()?;
        let start_of_today = turn.start_of_today()?;
        let stats = repo::deck_with_stats(turn.conn, deck_id, start_of_today)?
            .ok_or_else(|| TurnError::missing("deck", deck_id))?;
        let keyboard = Keyboard::rows([[labels::DONT_DELETE_DECK], [labels::CONFIRM_DELETE_DECK]]);
        turn.reply_with_keyboard(
            format!("Are you sure? You will also delete {} cards.", stats.total_cards),
            keyboard,
        );
        Ok(())
    }
}
