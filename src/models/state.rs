use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

use super::Message;

/// The node a user currently occupies in the conversation state machine.
///
/// Persisted as a snake_case token in the `users.state` TEXT column so the
/// stored value stays readable and stable across reorderings of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum State {
    DeckList,
    DeckCreate,
    DeckDetails,
    DeckEdit,
    DeckNameEdit,
    DeckDelete,
    CardCreate,
    CardCreateBack,
    CardEdit,
    CardEditFront,
    CardEditBack,
    Rehearsing,
    RehearsingCardReview,
    CardReview,
    SetTimeZone,
    Settings,
    UserSetup,
    SetRehearsalTime,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::DeckList => "deck_list",
            State::DeckCreate => "deck_create",
            State::DeckDetails => "deck_details",
            State::DeckEdit => "deck_edit",
            State::DeckNameEdit => "deck_name_edit",
            State::DeckDelete => "deck_delete",
            State::CardCreate => "card_create",
            State::CardCreateBack => "card_create_back",
            State::CardEdit => "card_edit",
            State::CardEditFront => "card_edit_front",
            State::CardEditBack => "card_edit_back",
            State::Rehearsing => "rehearsing",
            State::RehearsingCardReview => "rehearsing_card_review",
            State::CardReview => "card_review",
            State::SetTimeZone => "set_time_zone",
            State::Settings => "settings",
            State::UserSetup => "user_setup",
            State::SetRehearsalTime => "set_rehearsal_time",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "deck_list" => State::DeckList,
            "deck_create" => State::DeckCreate,
            "deck_details" => State::DeckDetails,
            "deck_edit" => State::DeckEdit,
            "deck_name_edit" => State::DeckNameEdit,
            "deck_delete" => State::DeckDelete,
            "card_create" => State::CardCreate,
            "card_create_back" => State::CardCreateBack,
            "card_edit" => State::CardEdit,
            "card_edit_front" => State::CardEditFront,
            "card_edit_back" => State::CardEditBack,
            "rehearsing" => State::Rehearsing,
            "rehearsing_card_review" => State::RehearsingCardReview,
            "card_review" => State::CardReview,
            "set_time_zone" => State::SetTimeZone,
            "settings" => State::Settings,
            "user_setup" => State::UserSetup,
            "set_rehearsal_time" => State::SetRehearsalTime,
            _ => return None,
        })
    }
}

impl FromSql<Text, Sqlite> for State {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let token = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        State::parse(&token).ok_or_else(|| format!("unknown conversation state: {}", token).into())
    }
}

impl ToSql<Text, Sqlite> for State {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// The transient payload attached to the current state.
///
/// A tagged sum type rather than a free-form JSON blob: each state family
/// only gets access to the fields it actually needs, and a missing variant is
/// detected as a contract violation instead of a silently-absent field.
/// Replaced wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateData {
    /// States that need no context (DeckList, Settings, UserSetup, ...).
    #[default]
    None,
    /// Deck-scoped states (DeckDetails, DeckEdit, DeckDelete, ...).
    Deck { deck_id: i32 },
    /// Card-scoped states (CardEdit, CardEditFront, CardEditBack).
    Card { card_id: i32 },
    /// Two-phase card composition (CardCreate, CardCreateBack): the front and
    /// back accumulate one message per send until the user commits.
    Compose {
        deck_id: i32,
        #[serde(default)]
        front: Vec<Message>,
        #[serde(default)]
        back: Vec<Message>,
    },
}

impl FromSql<Text, Sqlite> for StateData {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ToSql<Text, Sqlite> for StateData {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(self)?);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_token_round_trip() {
        let all = [
            State::DeckList,
            State::DeckCreate,
            State::DeckDetails,
            State::DeckEdit,
            State::DeckNameEdit,
            State::DeckDelete,
            State::CardCreate,
            State::CardCreateBack,
            State::CardEdit,
            State::CardEditFront,
            State::CardEditBack,
            State::Rehearsing,
            State::RehearsingCardReview,
            State::CardReview,
            State::SetTimeZone,
            State::Settings,
            State::UserSetup,
            State::SetRehearsalTime,
        ];
        for state in all {
            assert_eq!(State::parse(state.as_str()), Some(state));
        }
        assert_eq!(State::parse("not_a_state"), None);
    }

    #[test]
    fn test_state_data_default_is_none() {
        assert_eq!(StateData::default(), StateData::None);
    }

    #[test]
    fn test_state_data_json_round_trip() {
        let data = StateData::Compose {
            deck_id: 7,
            front: vec![Message::text("hola")],
            back: vec![],
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: StateData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_state_data_none_wire_shape() {
        // The migration seeds new rows with this literal.
        let parsed: StateData = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(parsed, StateData::None);
    }
}
