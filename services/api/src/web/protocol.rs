//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the
//! chat endpoint. Every frame is a JSON text frame tagged by `type`.

use chrono::{DateTime, Utc};
use mindful_core::chat::{suggestions, Suggestion};
use mindful_core::{Locale, Message};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A new user message for the assistant.
    Send { text: String },

    /// Switches the language of the following replies, and the user's stored preference.
    SetLocale { locale: Locale },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub is_from_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.0,
            text: message.text.clone(),
            is_from_user: message.is_from_user,
            timestamp: message.timestamp,
        }
    }
}

/// A one-tap prompt offered below the conversation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SuggestionChip {
    pub action: String,
    pub text: String,
}

impl From<Suggestion> for SuggestionChip {
    fn from(s: Suggestion) -> Self {
        Self {
            action: s.action.to_string(),
            text: s.text.to_string(),
        }
    }
}

pub fn suggestion_chips(locale: Locale) -> Vec<SuggestionChip> {
    suggestions(locale).into_iter().map(SuggestionChip::from).collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect: the conversation so far, which is the greeting.
    History {
        messages: Vec<ChatMessage>,
        locale: Locale,
        suggestions: Vec<SuggestionChip>,
    },

    /// A message appended to the conversation, from either side.
    Message { message: ChatMessage },

    /// The assistant is preparing a reply; input should stay disabled.
    TypingStarted,

    /// The reply has been delivered.
    TypingEnded,

    /// The reply language changed; the chips come in the new language.
    LocaleChanged {
        locale: Locale,
        suggestions: Vec<SuggestionChip>,
    },

    /// A rejected frame; the connection stays open.
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_use_snake_case_tags() {
        let send: ClientMessage =
            serde_json::from_str(r#"{"type":"send","text":"hello"}"#).unwrap();
        assert_eq!(send, ClientMessage::Send { text: "hello".into() });

        let switch: ClientMessage =
            serde_json::from_str(r#"{"type":"set_locale","locale":"en"}"#).unwrap();
        assert_eq!(switch, ClientMessage::SetLocale { locale: Locale::En });

        let unknown = r#"{"type":"set_locale","locale":"fr"}"#;
        assert!(serde_json::from_str::<ClientMessage>(unknown).is_err());
    }

    #[test]
    fn typing_frames_have_no_payload() {
        let json = serde_json::to_string(&ServerMessage::TypingStarted).unwrap();
        assert_eq!(json, r#"{"type":"typing_started"}"#);
    }
}
