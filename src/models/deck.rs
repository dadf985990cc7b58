use chrono::NaiveDateTime;
use diesel::prelude::*;

/// A named collection of cards owned by one user. Names are unique per user.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::decks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Deck {
    pub id: i32,
    pub user_id: i64,
    pub name: String,
    /// Whether this deck's cards count towards scheduled rehearsal reminders.
    pub scheduled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::decks)]
pub struct NewDeck<'a> {
    pub user_id: i64,
    pub name: &'a str,
}

/// A deck row joined with its card counts, fetched in one query.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckWithStats {
    pub deck: Deck,
    pub total_cards: i64,
    pub cards_to_rehearse: i64,
}
