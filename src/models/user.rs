use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::{State, StateData};

/// A chat user together with their conversation position.
///
/// The row is the single source of truth for where the user is in the
/// conversation: `state` names the node, `data` carries the node's transient
/// payload. Timestamps are stored as naive UTC; `time_zone` is the user's
/// IANA zone name and is only applied when local calendar math is needed.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Chat-transport user id.
    pub id: i64,

    /// Current node in the conversation state machine.
    pub state: State,

    /// Transient payload for the current state.
    pub data: StateData,

    /// IANA time zone name, e.g. "Europe/Amsterdam".
    pub time_zone: String,

    /// Local wall-clock time of the daily rehearsal reminder, "HH:MM".
    pub rehearsal_time: String,

    /// Whether the user receives scheduled rehearsal reminders.
    pub scheduled: bool,

    /// UTC instant of the next pending reminder, if any.
    pub next_rehearsal: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: i64,
    pub state: State,
    pub data: StateData,
}
