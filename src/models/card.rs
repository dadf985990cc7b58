use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::MessageList;

/// A flashcard with its spaced-repetition scheduling fields.
///
/// `front` and `back` are ordered message sequences (text and media), stored
/// as JSON. The scheduling fields mirror the inputs and outputs of
/// [`crate::sm::Algorithm::calc`]: the easiness factor is scaled x100,
/// `previous_interval` is the day count produced by the last review, and
/// `next_repetition` is the UTC instant the card becomes due.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Card {
    pub id: i32,
    pub deck_id: i32,

    pub front: MessageList,
    pub back: MessageList,

    /// Easiness factor, scaled x100 (2.50 stored as 250).
    pub easiness_factor: i32,
    /// Interval in days produced by the most recent review.
    pub previous_interval: i32,
    /// Consecutive-success streak length.
    pub repetition: i32,
    /// Same-day repeat counter; breaks due-selection ties so all due cards
    /// cycle before any repeats.
    pub repetition_today: i32,
    /// Random tiebreaker, resampled on every review.
    pub random_order: i32,
    /// UTC instant the card becomes due again.
    pub next_repetition: NaiveDateTime,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::cards)]
pub struct NewCard<'a> {
    pub deck_id: i32,
    pub front: &'a MessageList,
    pub back: &'a MessageList,
    pub random_order: i32,
    pub next_repetition: NaiveDateTime,
}
