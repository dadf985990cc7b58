use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use diesel::Connection;
use tracing::{debug, error, warn};

use crate::chat::{self, IncomingEvent, OutgoingAction, Turn};
use crate::db::DbPool;
use crate::errors::TurnError;
use crate::models::Message;
use crate::repo;
use crate::sm::Algorithm;
use crate::tz::{TimezoneInfo, TimezoneResolver};

/// Coordinates conversation turns: one per incoming event, strictly
/// serialized per user, each inside its own transaction.
///
/// SQLite has no row locks, so the per-user ordering guarantee comes from an
/// in-process lock registry: a turn holds its user's mutex from before the
/// transaction starts until after it commits. Turns for different users only
/// contend on the sqlite write lock itself.
pub struct Session {
    pool: DbPool,
    algorithm: &'static Algorithm,
    resolver: TimezoneResolver,
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl Session {
    pub fn new(pool: DbPool, algorithm: &'static Algorithm, resolver: TimezoneResolver) -> Self {
        Session {
            pool,
            algorithm,
            resolver,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn user_lock(&self, user_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("user lock registry poisoned");
        locks.entry(user_id).or_default().clone()
    }

    /// Processes one incoming event to completion.
    ///
    /// On failure the transaction has already rolled back; the error is
    /// reported operator-side and the user gets a single generic message.
    pub async fn process_event(&self, event: IncomingEvent) -> Vec<OutgoingAction> {
        match self.run_turn(&event).await {
            Ok(actions) => actions,
            Err(err) => {
                error!(user_id = event.user_id, error = %err, "turn failed");
                vec![OutgoingAction::SendMessage {
                    message: Message::text("Something went wrong, please try again."),
                    keyboard: None,
                }]
            }
        }
    }

    async fn run_turn(&self, event: &IncomingEvent) -> Result<Vec<OutgoingAction>, TurnError> {
        // The time zone lookup does network I/O, so it happens before the
        // lock and the transaction. A failed lookup is not fatal: the state
        // machine reprompts for the location.
        let resolved_zone = self.resolve_zone(event).await;

        let lock = self.user_lock(event.user_id);
        let _guard = lock.lock().await;

        let conn = &mut self.pool.get()?;
        conn.immediate_transaction(|conn| {
            let user = repo::get_or_create_user(conn, event.user_id)?;
            debug!(
                user_id = user.id,
                state = user.state.as_str(),
                "processing event"
            );
            let mut turn = Turn {
                conn,
                user,
                now: Utc::now(),
                algorithm: self.algorithm,
                resolved_zone,
                actions: Vec::new(),
            };
            chat::handle_event(&mut turn, event)?;
            Ok(turn.actions)
        })
    }

    async fn resolve_zone(&self, event: &IncomingEvent) -> Option<TimezoneInfo> {
        let location = event.location?;
        match self
            .resolver
            .resolve(location.latitude, location.longitude)
            .await
        {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(user_id = event.user_id, error = %err, "time zone lookup failed");
                None
            }
        }
    }
}
