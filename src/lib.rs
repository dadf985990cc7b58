//! Memobot: a spaced-repetition flash-card chat assistant.
//!
//! The library is organized around one conversation turn: an incoming chat
//! event arrives over HTTP, the [`session::Session`] runs it through the
//! state machine in [`chat`] inside a single database transaction, and the
//! resulting outgoing actions are returned for the transport to deliver.
//!
//! ### Modules
//!
//! - `sm`: the SM-2 scheduling algorithm and its variants
//! - `chat`: the conversation state machine and its message vocabulary
//! - `repo`: database operations on users, decks, and cards
//! - `session`: per-user turn coordination
//! - `poller`: the rehearsal reminder loop
//! - `tz`: time zone resolution and local-day arithmetic

pub mod chat;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod poller;
pub mod repo;
pub mod schema;
pub mod session;
pub mod sm;
pub mod tz;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::trace::TraceLayer;

use chat::{IncomingEvent, OutgoingAction};
use session::Session;

/// Embedded database migrations, applied at startup and in test setup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs all pending migrations on the given connection.
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))?;
    Ok(())
}

/// Handler for processing an incoming chat event
///
/// This function handles POST requests to `/events`. The response is the
/// ordered list of actions the transport should perform for the user.
/// Failures inside the turn have already been converted into a generic
/// message, so the endpoint itself always answers 200.
async fn handle_event_handler(
    State(session): State<Arc<Session>>,
    Json(event): Json<IncomingEvent>,
) -> Json<Vec<OutgoingAction>> {
    Json(session.process_event(event).await)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `session` - The turn coordinator shared with all handlers
pub fn create_app(session: Arc<Session>) -> Router {
    Router::new()
        .route("/events", post(handle_event_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::setup_test_db;
    use crate::sm::SM2_MOD;
    use crate::tz::TimezoneResolver;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use diesel::{Connection, RunQueryDsl, SqliteConnection};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let pool = setup_test_db();
        let session = Session::new(pool, &SM2_MOD, TimezoneResolver::Fixed("UTC".to_string()));
        create_app(Arc::new(session))
    }

    #[tokio::test]
    async fn test_health_handler() {
        let app = test_app();

        let request = Request::builder()
            .uri("/health")
            .method("GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handle_event_handler() {
        let app = test_app();

        let request = Request::builder()
            .uri("/events")
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"user_id":1,"text":"/decks"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let actions: Vec<Value> = serde_json::from_slice(&body).unwrap();

        // A fresh user at the deck list gets the empty-list prompt.
        assert!(!actions.is_empty());
        assert_eq!(actions[0]["action"], "send_message");
    }

    #[tokio::test]
    async fn test_handle_event_handler_rejects_malformed_body() {
        let app = test_app();

        let request = Request::builder()
            .uri("/events")
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"text":"missing user id"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_run_migrations() {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        run_migrations(&mut conn).unwrap();

        let result = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='cards'",
        )
        .execute(&mut conn);
        assert!(result.is_ok());
    }
}
