use thiserror::Error;

use crate::models::State;

/// Failures that abort a conversation turn.
///
/// Everything here rolls the turn's transaction back and surfaces as a single
/// generic message to the user plus an operator-facing `tracing::error!`
/// report. Validation problems (empty deck name, duplicate name, unparseable
/// rehearsal time) are deliberately *not* represented: handlers recover from
/// those in place by reprompting, without aborting the turn.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The transient payload references a row that no longer exists. This is
    /// a state/data inconsistency and must not be silently defaulted.
    #[error("{entity} {id} referenced by conversation state no longer exists")]
    MissingEntity { entity: &'static str, id: i32 },

    /// A state was entered without the payload variant it requires.
    #[error("state {state:?} entered without required {expected} payload")]
    MissingData {
        state: State,
        expected: &'static str,
    },

    #[error("invalid IANA time zone stored for user: {0}")]
    InvalidTimeZone(String),

    /// User input is validated before storage, so a malformed stored value is
    /// a data inconsistency, not a user error.
    #[error("invalid rehearsal time stored for user: {0}")]
    InvalidRehearsalTime(String),
}

impl TurnError {
    pub fn missing(entity: &'static str, id: i32) -> Self {
        TurnError::MissingEntity { entity, id }
    }
}
