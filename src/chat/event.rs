use serde::{Deserialize, Serialize};

use crate::models::Message;

/// One incoming conversation event from the chat transport. Any of the
/// content fields may be absent; an event with none of them still drives a
/// turn (the state machine reprompts).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingEvent {
    pub user_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Photo,
    Audio,
    Document,
    Sticker,
    Video,
    Voice,
}

/// A media payload attached to an incoming event. `file_id` is the
/// transport's opaque content reference, passed through unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_id: String,
    #[serde(default)]
    pub caption: Option<String>,
}

impl IncomingEvent {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// The event's content as a card content block, if it carries any.
    /// Attachments win over text (a captioned photo is one block).
    pub fn as_message(&self) -> Option<Message> {
        if let Some(attachment) = &self.attachment {
            let file_id = attachment.file_id.clone();
            let caption = attachment.caption.clone();
            return Some(match attachment.kind {
                AttachmentKind::Photo => Message::Photo { file_id, caption },
                AttachmentKind::Audio => Message::Audio { file_id, caption },
                AttachmentKind::Document => Message::Document { file_id, caption },
                AttachmentKind::Sticker => Message::Sticker { file_id },
                AttachmentKind::Video => Message::Video { file_id, caption },
                AttachmentKind::Voice => Message::Voice { file_id, caption },
            });
        }
        if let Some(location) = &self.location {
            return Some(Message::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => Some(Message::text(text)),
            _ => None,
        }
    }
}

/// A keyboard of button rows offered alongside a message. The labels are the
/// exact inputs the next turn will recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyboard(pub Vec<Vec<String>>);

impl Keyboard {
    pub fn rows<R, L>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Keyboard(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn push_row<L: Into<String>>(&mut self, row: impl IntoIterator<Item = L>) {
        self.0.push(row.into_iter().map(Into::into).collect());
    }
}

/// One render instruction for the chat transport, in delivery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutgoingAction {
    SendMessage {
        message: Message,
        #[serde(skip_serializing_if = "Option::is_none")]
        keyboard: Option<Keyboard>,
    },
    RequestLocation {
        text: String,
    },
}
