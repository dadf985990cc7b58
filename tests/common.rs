//! Shared helpers for integration tests.
//!
//! Each test gets its own shared in-memory database, so tests are isolated
//! and need no cleanup. The session resolves every location to UTC, keeping
//! the tests off the network.

use std::sync::Arc;

use memobot::chat::{IncomingEvent, Location, OutgoingAction};
use memobot::db::{self, DbPool};
use memobot::models::Message;
use memobot::session::Session;
use memobot::sm::SM2_MOD;
use memobot::tz::TimezoneResolver;

pub fn test_session() -> (Arc<Session>, DbPool) {
    let database_url = format!(
        "file:itest_{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    let pool = db::init_pool(&database_url);

    let conn = &mut pool.get().expect("Failed to get connection");
    memobot::run_migrations(conn).expect("Failed to run migrations");

    let session = Session::new(
        pool.clone(),
        &SM2_MOD,
        TimezoneResolver::Fixed("UTC".to_string()),
    );
    (Arc::new(session), pool)
}

pub fn text_event(user_id: i64, text: &str) -> IncomingEvent {
    IncomingEvent {
        user_id,
        text: Some(text.to_string()),
        ..Default::default()
    }
}

pub fn location_event(user_id: i64) -> IncomingEvent {
    IncomingEvent {
        user_id,
        location: Some(Location {
            latitude: 52.37,
            longitude: 4.89,
        }),
        ..Default::default()
    }
}

/// The text content of every sent message, in order. Location requests and
/// media blocks are skipped.
pub fn texts(actions: &[OutgoingAction]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| match action {
            OutgoingAction::SendMessage {
                message: Message::Text { text },
                ..
            } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn contains_text(actions: &[OutgoingAction], needle: &str) -> bool {
    texts(actions).iter().any(|text| text.contains(needle))
}
