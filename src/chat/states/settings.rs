use super::StateHandler;
use crate::chat::event::{IncomingEvent, Keyboard};
use crate::chat::help::HELP_TEXTS;
use crate::chat::labels;
use crate::chat::turn::Turn;
use crate::errors::TurnError;
use crate::models::{State, StateData};
use crate::repo;
use crate::tz;

/// Applies a newly learned zone to the user row and the in-memory copy.
fn apply_time_zone(turn: &mut Turn, zone_id: &str, zone_name: &str) -> Result<(), TurnError> {
    repo::set_time_zone(turn.conn, turn.user.id, zone_id)?;
    turn.user.time_zone = zone_id.to_string();
    turn.reply(format!("Got it! You're in the '{}' time zone.", zone_name));
    Ok(())
}

fn enable_scheduling(turn: &mut Turn) -> Result<(), TurnError> {
    let next =
        tz::next_rehearsal_utc(&turn.user.time_zone, &turn.user.rehearsal_time, turn.now)?;
    repo::set_scheduled(turn.conn, turn.user.id, true, Some(next))?;
    turn.user.scheduled = true;
    turn.user.next_rehearsal = Some(next);
    Ok(())
}

fn disable_scheduling(turn: &mut Turn) -> Result<(), TurnError> {
    repo::set_scheduled(turn.conn, turn.user.id, false, None)?;
    turn.user.scheduled = false;
    turn.user.next_rehearsal = None;
    Ok(())
}

/// The zone carried by this event, either resolved from a sent location or
/// typed as an IANA name.
fn zone_from_event(turn: &Turn, event: &IncomingEvent) -> Option<(String, String)> {
    if let Some(info) = &turn.resolved_zone {
        return Some((info.time_zone_id.clone(), info.time_zone_name.clone()));
    }
    let text = event.text().trim();
    if !text.is_empty() && text.parse::<chrono_tz::Tz>().is_ok() {
        return Some((text.to_string(), text.to_string()));
    }
    None
}

pub struct SetTimeZone;

impl StateHandler for SetTimeZone {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        match zone_from_event(turn, event) {
            Some((zone_id, zone_name)) => {
                apply_time_zone(turn, &zone_id, &zone_name)?;
                turn.set_and_show_state(State::DeckList, StateData::None)
            }
            None => {
                turn.request_location("Please send me your location.");
                Ok(())
            }
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        turn.request_location("Please send me your location, so I can determine your time zone! 🌍");
        Ok(())
    }
}

pub struct Settings;

impl StateHandler for Settings {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        let text = event.text();
        if text.starts_with(labels::CHANGE_LOCATION) {
            turn.set_and_show_state(State::SetTimeZone, StateData::None)
        } else if text.starts_with(labels::CHANGE_REHEARSAL_TIME) {
            turn.set_and_show_state(State::SetRehearsalTime, StateData::None)
        } else if text == labels::ENABLE_SCHEDULING {
            turn.reply("Automatic rehearsing enabled");
            enable_scheduling(turn)?;
            self.show(turn)
        } else if text == labels::DISABLE_SCHEDULING {
            turn.reply("Automatic rehearsing disabled");
            disable_scheduling(turn)?;
            self.show(turn)
        } else {
            // Anything else (including the back button) leaves settings.
            turn.set_and_show_state(State::DeckList, StateData::None)
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let schedule_label = if turn.user.scheduled {
            labels::DISABLE_SCHEDULING
        } else {
            labels::ENABLE_SCHEDULING
        };
        let keyboard = Keyboard::rows([
            vec![labels::BACK.to_string()],
            vec![format!("{} (from {})", labels::CHANGE_LOCATION, turn.user.time_zone)],
            vec![format!(
                "{} (from {})",
                labels::CHANGE_REHEARSAL_TIME, turn.user.rehearsal_time
            )],
            vec![schedule_label.to_string()],
        ]);
        turn.reply_with_keyboard("What setting do you want to change?", keyboard);
        Ok(())
    }
}

/// First-contact walkthrough: help texts, then a location request; once the
/// zone is known, daily rehearsals are switched on.
pub struct UserSetup;

impl StateHandler for UserSetup {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        match zone_from_event(turn, event) {
            Some((zone_id, zone_name)) => {
                apply_time_zone(turn, &zone_id, &zone_name)?;
                enable_scheduling(turn)?;
                turn.reply(
                    "Every day at noon you will get sent your flash cards if there's any that \
                     need rehearsing. You can change the time of rehearsal in your /settings.",
                );
                turn.set_and_show_state(State::DeckList, StateData::None)
            }
            None => {
                turn.request_location("Please send me your location.");
                Ok(())
            }
        }
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        turn.reply("Hi there!");
        for text in HELP_TEXTS {
            turn.reply(text);
        }
        turn.request_location(
            "Now, to get started please send me your location, so I can determine your time zone! 🌍",
        );
        Ok(())
    }
}

pub struct SetRehearsalTime;

impl StateHandler for SetRehearsalTime {
    fn handle_input(&self, turn: &mut Turn, event: &IncomingEvent) -> Result<(), TurnError> {
        match tz::parse_rehearsal_time(event.text()) {
            Some(time) => {
                let formatted = time.format("%H:%M").to_string();
                repo::set_rehearsal_time(turn.conn, turn.user.id, &formatted)?;
                turn.user.rehearsal_time = formatted.clone();
                if turn.user.scheduled {
                    enable_scheduling(turn)?;
                }
                turn.reply(format!("Rehearsal time changed to '{}'", formatted));
            }
            None => {
                turn.reply("I don't understand what you mean, please try again.");
            }
        }
        turn.set_and_show_state(State::Settings, StateData::None)
    }

    fn show(&self, turn: &mut Turn) -> Result<(), TurnError> {
        let mut keyboard = Keyboard(vec![]);
        for hour in 5..23 {
            keyboard.push_row([format!("{:02}:00", hour)]);
        }
        turn.reply_with_keyboard(
            "Please select your preferred time of day to rehearse. You can also type out the time yourself.",
            keyboard,
        );
        Ok(())
    }
}
