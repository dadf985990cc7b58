use chrono::NaiveDateTime;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::errors::TurnError;
use crate::models::{Deck, DeckWithStats, NewDeck};
use crate::schema::{cards, decks};

/// Canonicalizes a deck name: trims and collapses internal whitespace runs
/// (including newlines) to single spaces. An empty result means the input was
/// not a usable name.
pub fn normalize_deck_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Creates a deck. The caller is responsible for normalizing the name and
/// checking uniqueness first; a race on the unique index still surfaces as a
/// database error and aborts the turn.
pub fn create_deck(conn: &mut SqliteConnection, user_id: i64, name: &str) -> Result<Deck, TurnError> {
    info!(user_id, name, "creating deck");
    let deck = diesel::insert_into(decks::table)
        .values(&NewDeck { user_id, name })
        .returning(Deck::as_returning())
        .get_result(conn)?;
    Ok(deck)
}

pub fn get_deck(conn: &mut SqliteConnection, deck_id: i32) -> Result<Option<Deck>, TurnError> {
    let deck = decks::table
        .filter(decks::id.eq(deck_id))
        .select(Deck::as_select())
        .first(conn)
        .optional()?;
    Ok(deck)
}

/// All of a user's decks, in name order for a stable keyboard layout.
pub fn list_decks(conn: &mut SqliteConnection, user_id: i64) -> Result<Vec<Deck>, TurnError> {
    let all = decks::table
        .filter(decks::user_id.eq(user_id))
        .order(decks::name.asc())
        .select(Deck::as_select())
        .load(conn)?;
    Ok(all)
}

pub fn get_deck_by_name(
    conn: &mut SqliteConnection,
    user_id: i64,
    name: &str,
) -> Result<Option<Deck>, TurnError> {
    let deck = decks::table
        .filter(decks::user_id.eq(user_id))
        .filter(decks::name.eq(name))
        .select(Deck::as_select())
        .first(conn)
        .optional()?;
    Ok(deck)
}

pub fn has_deck_with_name(
    conn: &mut SqliteConnection,
    user_id: i64,
    name: &str,
) -> Result<bool, TurnError> {
    Ok(get_deck_by_name(conn, user_id, name)?.is_some())
}

/// Whether `deck_id` may take `name`: true when no *other* deck of the same
/// user already holds it, so renaming a deck to its current name is allowed.
pub fn can_set_name_to(
    conn: &mut SqliteConnection,
    deck_id: i32,
    user_id: i64,
    name: &str,
) -> Result<bool, TurnError> {
    let conflict = decks::table
        .filter(decks::user_id.eq(user_id))
        .filter(decks::name.eq(name))
        .filter(decks::id.ne(deck_id))
        .select(decks::id)
        .first::<i32>(conn)
        .optional()?;
    Ok(conflict.is_none())
}

pub fn set_deck_name(
    conn: &mut SqliteConnection,
    deck_id: i32,
    name: &str,
) -> Result<(), TurnError> {
    debug!(deck_id, name, "renaming deck");
    diesel::update(decks::table.filter(decks::id.eq(deck_id)))
        .set((decks::name.eq(name), decks::updated_at.eq(diesel::dsl::now)))
        .execute(conn)?;
    Ok(())
}

pub fn set_deck_scheduled(
    conn: &mut SqliteConnection,
    deck_id: i32,
    scheduled: bool,
) -> Result<(), TurnError> {
    debug!(deck_id, scheduled, "updating deck schedule flag");
    diesel::update(decks::table.filter(decks::id.eq(deck_id)))
        .set((
            decks::scheduled.eq(scheduled),
            decks::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(())
}

/// Deletes the deck; its cards go with it via the foreign key cascade.
pub fn delete_deck(conn: &mut SqliteConnection, deck_id: i32) -> Result<(), TurnError> {
    info!(deck_id, "deleting deck");
    diesel::delete(decks::table.filter(decks::id.eq(deck_id))).execute(conn)?;
    Ok(())
}

/// Fetches a deck together with its total and currently-due card counts.
/// `start_of_today` is the due cutoff in the owner's local calendar.
pub fn deck_with_stats(
    conn: &mut SqliteConnection,
    deck_id: i32,
    start_of_today: NaiveDateTime,
) -> Result<Option<DeckWithStats>, TurnError> {
    let Some(deck) = get_deck(conn, deck_id)? else {
        return Ok(None);
    };

    let total_cards: i64 = cards::table
        .filter(cards::deck_id.eq(deck_id))
        .count()
        .get_result(conn)?;
    let cards_to_rehearse: i64 = cards::table
        .filter(cards::deck_id.eq(deck_id))
        .filter(cards::next_repetition.le(start_of_today))
        .count()
        .get_result(conn)?;

    Ok(Some(DeckWithStats {
        deck,
        total_cards,
        cards_to_rehearse,
    }))
}
