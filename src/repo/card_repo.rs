use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rand::Rng;
use tracing::{debug, info};

use crate::errors::TurnError;
use crate::models::{Card, MessageList, NewCard};
use crate::schema::{cards, decks};
use crate::sm::Algorithm;
use crate::tz;

fn sample_random_order() -> i32 {
    rand::rng().random_range(0..i32::MAX)
}

/// Creates a card with fresh scheduling fields. `next_repetition` should be
/// the start of the owner's local day so the card is due immediately.
pub fn create_card(
    conn: &mut SqliteConnection,
    deck_id: i32,
    front: &MessageList,
    back: &MessageList,
    next_repetition: NaiveDateTime,
) -> Result<Card, TurnError> {
    info!(deck_id, "creating card");
    let card = diesel::insert_into(cards::table)
        .values(&NewCard {
            deck_id,
            front,
            back,
            random_order: sample_random_order(),
            next_repetition,
        })
        .returning(Card::as_returning())
        .get_result(conn)?;
    Ok(card)
}

pub fn get_card(conn: &mut SqliteConnection, card_id: i32) -> Result<Option<Card>, TurnError> {
    let card = cards::table
        .filter(cards::id.eq(card_id))
        .select(Card::as_select())
        .first(conn)
        .optional()?;
    Ok(card)
}

pub fn set_card_front(
    conn: &mut SqliteConnection,
    card_id: i32,
    front: &MessageList,
) -> Result<(), TurnError> {
    diesel::update(cards::table.filter(cards::id.eq(card_id)))
        .set((cards::front.eq(front), cards::updated_at.eq(diesel::dsl::now)))
        .execute(conn)?;
    Ok(())
}

pub fn set_card_back(
    conn: &mut SqliteConnection,
    card_id: i32,
    back: &MessageList,
) -> Result<(), TurnError> {
    diesel::update(cards::table.filter(cards::id.eq(card_id)))
        .set((cards::back.eq(back), cards::updated_at.eq(diesel::dsl::now)))
        .execute(conn)?;
    Ok(())
}

pub fn delete_card(conn: &mut SqliteConnection, card_id: i32) -> Result<(), TurnError> {
    info!(card_id, "deleting card");
    diesel::delete(cards::table.filter(cards::id.eq(card_id))).execute(conn)?;
    Ok(())
}

/// Picks the next card to rehearse from one deck, or None when the deck has
/// nothing due.
///
/// A card is due when its `next_repetition` is at or before the start of the
/// owner's local day. Ordering: longest-overdue first, then cards not yet
/// repeated today before same-day repeats, then the per-review random
/// tiebreaker so equally-placed cards come up in a different order each pass.
pub fn card_for_review(
    conn: &mut SqliteConnection,
    deck_id: i32,
    start_of_today: NaiveDateTime,
) -> Result<Option<Card>, TurnError> {
    let card = cards::table
        .filter(cards::deck_id.eq(deck_id))
        .filter(cards::next_repetition.le(start_of_today))
        .order((
            cards::next_repetition.asc(),
            cards::repetition_today.asc(),
            cards::random_order.asc(),
        ))
        .select(Card::as_select())
        .first(conn)
        .optional()?;
    Ok(card)
}

/// Picks the next due card across all of a user's decks, for the cross-deck
/// rehearsal flow. Same due rule and ordering as [`card_for_review`]. The
/// deck-level `scheduled` flag does not apply here: it only silences
/// reminders, it never hides a due card from the user.
pub fn due_card_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    start_of_today: NaiveDateTime,
) -> Result<Option<Card>, TurnError> {
    let card = cards::table
        .inner_join(decks::table)
        .filter(decks::user_id.eq(user_id))
        .filter(cards::next_repetition.le(start_of_today))
        .order((
            cards::next_repetition.asc(),
            cards::repetition_today.asc(),
            cards::random_order.asc(),
        ))
        .select(Card::as_select())
        .first(conn)
        .optional()?;
    Ok(card)
}

/// Like [`due_card_for_user`], restricted to decks with reminders enabled.
/// Used by the reminder poll to decide whether a notice is worth sending.
pub fn due_card_for_reminder(
    conn: &mut SqliteConnection,
    user_id: i64,
    start_of_today: NaiveDateTime,
) -> Result<Option<Card>, TurnError> {
    let card = cards::table
        .inner_join(decks::table)
        .filter(decks::user_id.eq(user_id))
        .filter(decks::scheduled.eq(true))
        .filter(cards::next_repetition.le(start_of_today))
        .order((
            cards::next_repetition.asc(),
            cards::repetition_today.asc(),
            cards::random_order.asc(),
        ))
        .select(Card::as_select())
        .first(conn)
        .optional()?;
    Ok(card)
}

/// Records one review: runs the scheduling algorithm and persists the result.
///
/// Besides the algorithm's output, this maintains the two selector fields:
/// `repetition_today` counts consecutive same-day repeats (reset to 0 once
/// the card leaves today), and `random_order` is resampled on every review.
/// The new `next_repetition` is the start of the user's local day plus the
/// computed interval, so an interval of 0 leaves the card due immediately.
pub fn respond(
    conn: &mut SqliteConnection,
    algorithm: &Algorithm,
    card_id: i32,
    quality: i32,
    tz_name: &str,
    now: DateTime<Utc>,
) -> Result<Card, TurnError> {
    let card = get_card(conn, card_id)?.ok_or_else(|| TurnError::missing("card", card_id))?;

    let scheduling = algorithm.calc(
        quality,
        card.repetition,
        card.easiness_factor,
        card.previous_interval,
    );
    let repetition_today = if scheduling.interval == 0 {
        card.repetition_today + 1
    } else {
        0
    };
    let next_repetition = tz::due_date_utc(tz_name, now, scheduling.interval)?;

    debug!(
        card_id,
        quality,
        repetition = scheduling.repetition,
        easiness_factor = scheduling.easiness_factor,
        interval = scheduling.interval,
        "recording review"
    );

    let updated = diesel::update(cards::table.filter(cards::id.eq(card_id)))
        .set((
            cards::easiness_factor.eq(scheduling.easiness_factor),
            cards::previous_interval.eq(scheduling.interval),
            cards::repetition.eq(scheduling.repetition),
            cards::repetition_today.eq(repetition_today),
            cards::random_order.eq(sample_random_order()),
            cards::next_repetition.eq(next_repetition),
            cards::updated_at.eq(diesel::dsl::now),
        ))
        .returning(Card::as_returning())
        .get_result(conn)?;
    Ok(updated)
}
