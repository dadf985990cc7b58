use std::time::Duration;

use chrono::Utc;
use diesel::Connection;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::chat::{labels, Keyboard, OutgoingAction};
use crate::db::DbPool;
use crate::models::{Message, State, StateData};
use crate::repo;
use crate::tz;

/// A pending rehearsal reminder for one user, ready for the transport.
#[derive(Debug)]
pub struct RehearsalNotice {
    pub user_id: i64,
    pub actions: Vec<OutgoingAction>,
}

/// One poll pass: finds users whose reminder instant has passed, advances
/// their `next_rehearsal` to the next local occurrence of their rehearsal
/// time, and builds a notice for everyone idle at the deck list who has a
/// card due in a reminder-enabled deck.
///
/// Runs in a single transaction; only delivery happens outside it. Notified
/// users are moved to the rehearsing state so the buttons sent with the
/// notice are understood by their next turn.
pub fn poll_once(pool: &DbPool) -> anyhow::Result<Vec<RehearsalNotice>> {
    let now = Utc::now();
    let conn = &mut pool.get()?;

    let notices = conn.immediate_transaction(|conn| -> Result<_, anyhow::Error> {
        let due_users = repo::users_due_for_rehearsal(conn, now.naive_utc())?;
        let mut notices = Vec::new();

        for user in due_users {
            let next = match tz::next_rehearsal_utc(&user.time_zone, &user.rehearsal_time, now) {
                Ok(next) => next,
                Err(err) => {
                    // Bad stored zone or time must not wedge the whole poll;
                    // disable the reminder and report.
                    warn!(user_id = user.id, error = %err, "disabling rehearsal reminder");
                    repo::set_scheduled(conn, user.id, false, None)?;
                    continue;
                }
            };
            repo::set_next_rehearsal(conn, user.id, Some(next))?;

            // Never clobber a conversation in progress: a user halfway
            // through composing a card would lose the draft if their state
            // were overwritten here. Only users idling at the deck list (or
            // already rehearsing) are moved.
            if !matches!(user.state, State::DeckList | State::Rehearsing) {
                debug!(user_id = user.id, state = %user.state.as_str(), "mid-conversation, skipping notice");
                continue;
            }

            let start_of_today = tz::start_of_today_utc(&user.time_zone, now)?;
            let Some(card) = repo::due_card_for_reminder(conn, user.id, start_of_today)? else {
                debug!(user_id = user.id, "nothing due, skipping notice");
                continue;
            };

            repo::set_state(conn, user.id, State::Rehearsing, StateData::None)?;

            let mut actions = vec![OutgoingAction::SendMessage {
                message: Message::text("Time for your rehearsal!"),
                keyboard: None,
            }];
            let keyboard = Keyboard::rows([
                vec![labels::BACK],
                vec![labels::EDIT_CARD, labels::SHOW_BACK],
            ]);
            let last = card.front.0.len().saturating_sub(1);
            for (index, message) in card.front.0.iter().enumerate() {
                actions.push(OutgoingAction::SendMessage {
                    message: message.clone(),
                    keyboard: if index == last {
                        Some(keyboard.clone())
                    } else {
                        None
                    },
                });
            }
            notices.push(RehearsalNotice {
                user_id: user.id,
                actions,
            });
        }
        Ok(notices)
    })?;

    if !notices.is_empty() {
        info!(count = notices.len(), "rehearsal notices ready");
    }
    Ok(notices)
}

/// The poll loop: scans at the configured interval and hands each notice to
/// its own delivery task so one slow delivery never blocks the others.
pub async fn run(pool: DbPool, interval: Duration, sink: mpsc::UnboundedSender<RehearsalNotice>) {
    loop {
        match poll_once(&pool) {
            Ok(notices) => {
                for notice in notices {
                    let sink = sink.clone();
                    tokio::spawn(async move {
                        if sink.send(notice).is_err() {
                            warn!("rehearsal notice dropped, transport gone");
                        }
                    });
                }
            }
            Err(err) => error!(error = %err, "rehearsal poll failed"),
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, MessageList};
    use crate::repo::tests::setup_test_db;
    use chrono::Duration as ChronoDuration;

    fn seed_user_with_due_card(pool: &DbPool, user_id: i64) {
        let conn = &mut pool.get().unwrap();
        repo::get_or_create_user(conn, user_id).unwrap();
        let deck = repo::create_deck(conn, user_id, "Spanish").unwrap();
        let front = MessageList(vec![Message::text("hola")]);
        let back = MessageList(vec![Message::text("hello")]);
        // Due at local midnight, so the poll pass sees it immediately.
        let due = tz::start_of_today_utc("UTC", Utc::now()).unwrap();
        repo::create_card(conn, deck.id, &front, &back, due).unwrap();
    }

    #[test]
    fn test_poll_notices_users_with_due_cards() {
        let pool = setup_test_db();
        seed_user_with_due_card(&pool, 1);
        {
            let conn = &mut pool.get().unwrap();
            let past = Utc::now().naive_utc() - ChronoDuration::minutes(1);
            repo::set_scheduled(conn, 1, true, Some(past)).unwrap();
        }

        let notices = poll_once(&pool).unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].user_id, 1);
        assert!(notices[0].actions.len() >= 2);

        let conn = &mut pool.get().unwrap();
        let user = repo::get_or_create_user(conn, 1).unwrap();
        assert_eq!(user.state, State::Rehearsing);
        assert!(user.next_rehearsal.unwrap() > Utc::now().naive_utc());

        // The reminder has been advanced, so a second pass is quiet.
        assert!(poll_once(&pool).unwrap().is_empty());
    }

    #[test]
    fn test_poll_skips_users_with_nothing_due() {
        let pool = setup_test_db();
        {
            let conn = &mut pool.get().unwrap();
            repo::get_or_create_user(conn, 1).unwrap();
            let past = Utc::now().naive_utc() - ChronoDuration::minutes(1);
            repo::set_scheduled(conn, 1, true, Some(past)).unwrap();
        }

        assert!(poll_once(&pool).unwrap().is_empty());

        // next_rehearsal still advances so the user isn't rescanned.
        let conn = &mut pool.get().unwrap();
        let user = repo::get_or_create_user(conn, 1).unwrap();
        assert!(user.next_rehearsal.unwrap() > Utc::now().naive_utc());
    }

    #[test]
    fn test_poll_leaves_mid_conversation_users_alone() {
        let pool = setup_test_db();
        seed_user_with_due_card(&pool, 1);
        let draft = StateData::Compose {
            deck_id: 1,
            front: vec![Message::text("hola")],
            back: vec![],
        };
        {
            let conn = &mut pool.get().unwrap();
            repo::set_state(conn, 1, State::CardCreateBack, draft.clone()).unwrap();
            let past = Utc::now().naive_utc() - ChronoDuration::minutes(1);
            repo::set_scheduled(conn, 1, true, Some(past)).unwrap();
        }

        assert!(poll_once(&pool).unwrap().is_empty());

        // The draft survives and the reminder still advances.
        let conn = &mut pool.get().unwrap();
        let user = repo::get_or_create_user(conn, 1).unwrap();
        assert_eq!(user.state, State::CardCreateBack);
        assert_eq!(user.data, draft);
        assert!(user.next_rehearsal.unwrap() > Utc::now().naive_utc());
    }

    #[test]
    fn test_poll_skips_decks_with_reminders_disabled() {
        let pool = setup_test_db();
        seed_user_with_due_card(&pool, 1);
        {
            let conn = &mut pool.get().unwrap();
            let deck = repo::get_deck_by_name(conn, 1, "Spanish").unwrap().unwrap();
            repo::set_deck_scheduled(conn, deck.id, false).unwrap();
            let past = Utc::now().naive_utc() - ChronoDuration::minutes(1);
            repo::set_scheduled(conn, 1, true, Some(past)).unwrap();
        }

        assert!(poll_once(&pool).unwrap().is_empty());

        // The card is still rehearsable on demand.
        let conn = &mut pool.get().unwrap();
        let sod = tz::start_of_today_utc("UTC", Utc::now()).unwrap();
        assert!(repo::due_card_for_user(conn, 1, sod).unwrap().is_some());
    }

    #[test]
    fn test_poll_disables_reminders_on_bad_zone() {
        let pool = setup_test_db();
        {
            let conn = &mut pool.get().unwrap();
            repo::get_or_create_user(conn, 1).unwrap();
            repo::set_time_zone(conn, 1, "Not/AZone").unwrap();
            let past = Utc::now().naive_utc() - ChronoDuration::minutes(1);
            repo::set_scheduled(conn, 1, true, Some(past)).unwrap();
        }

        assert!(poll_once(&pool).unwrap().is_empty());
        let conn = &mut pool.get().unwrap();
        let user = repo::get_or_create_user(conn, 1).unwrap();
        assert!(!user.scheduled);
    }
}
