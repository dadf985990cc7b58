use chrono::NaiveDateTime;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::errors::TurnError;
use crate::models::{NewUser, State, StateData, User};
use crate::schema::users;

/// Fetches a user, creating the row on first contact.
///
/// New users start at the deck list; `/start` walks them through setup.
pub fn get_or_create_user(conn: &mut SqliteConnection, user_id: i64) -> Result<User, TurnError> {
    let existing = users::table
        .filter(users::id.eq(user_id))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    if let Some(user) = existing {
        return Ok(user);
    }

    info!(user_id, "creating user");
    let user = diesel::insert_into(users::table)
        .values(&NewUser {
            id: user_id,
            state: State::DeckList,
            data: StateData::None,
        })
        .returning(User::as_returning())
        .get_result(conn)?;
    Ok(user)
}

/// Moves the user to a new state, replacing the transient payload wholesale.
pub fn set_state(
    conn: &mut SqliteConnection,
    user_id: i64,
    state: State,
    data: StateData,
) -> Result<(), TurnError> {
    debug!(user_id, state = state.as_str(), "state transition");
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::state.eq(state),
            users::data.eq(data),
            users::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn set_time_zone(
    conn: &mut SqliteConnection,
    user_id: i64,
    time_zone: &str,
) -> Result<(), TurnError> {
    debug!(user_id, time_zone, "updating time zone");
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::time_zone.eq(time_zone),
            users::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn set_rehearsal_time(
    conn: &mut SqliteConnection,
    user_id: i64,
    rehearsal_time: &str,
) -> Result<(), TurnError> {
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::rehearsal_time.eq(rehearsal_time),
            users::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(())
}

/// Toggles rehearsal reminders. `next_rehearsal` is set alongside so the
/// poller never sees an enabled user with no pending reminder.
pub fn set_scheduled(
    conn: &mut SqliteConnection,
    user_id: i64,
    scheduled: bool,
    next_rehearsal: Option<NaiveDateTime>,
) -> Result<(), TurnError> {
    debug!(user_id, scheduled, "updating reminder schedule");
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::scheduled.eq(scheduled),
            users::next_rehearsal.eq(next_rehearsal),
            users::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn set_next_rehearsal(
    conn: &mut SqliteConnection,
    user_id: i64,
    next_rehearsal: Option<NaiveDateTime>,
) -> Result<(), TurnError> {
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::next_rehearsal.eq(next_rehearsal),
            users::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(())
}

/// Users whose reminder instant has passed, for the poller.
pub fn users_due_for_rehearsal(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
) -> Result<Vec<User>, TurnError> {
    let due = users::table
        .filter(users::scheduled.eq(true))
        .filter(users::next_rehearsal.le(now))
        .select(User::as_select())
        .load(conn)?;
    Ok(due)
}
