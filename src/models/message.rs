use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

/// One content block of a card side.
///
/// Media variants carry an opaque content-reference id minted by the chat
/// transport plus an optional caption; the core never interprets the id.
/// Values are immutable once stored in a card's front or back sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Text {
        text: String,
    },
    Photo {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Audio {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Document {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Sticker {
        file_id: String,
    },
    Video {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Voice {
        file_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }
}

/// A card side as stored in the database: a JSON array of [`Message`] in a
/// TEXT column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct MessageList(pub Vec<Message>);

impl MessageList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Message>> for MessageList {
    fn from(messages: Vec<Message>) -> Self {
        MessageList(messages)
    }
}

impl FromSql<Text, Sqlite> for MessageList {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ToSql<Text, Sqlite> for MessageList {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(self)?);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_json_round_trip() {
        let messages = MessageList(vec![
            Message::text("hola"),
            Message::Photo {
                file_id: "abc123".to_string(),
                caption: Some("a flag".to_string()),
            },
            Message::Location {
                latitude: 52.37,
                longitude: 4.89,
            },
        ]);
        let json = serde_json::to_string(&messages).unwrap();
        let back: MessageList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, messages);
    }

    #[test]
    fn test_text_message_shape() {
        let json = serde_json::to_value(Message::text("hello")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hello");
    }

    #[test]
    fn test_sticker_has_no_caption_field() {
        let json = serde_json::to_value(Message::Sticker {
            file_id: "s1".to_string(),
        })
        .unwrap();
        assert!(json.get("caption").is_none());
    }
}
