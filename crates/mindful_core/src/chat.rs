//! crates/mindful_core/src/chat.rs
//!
//! The scripted chat assistant: a keyword matcher that maps a user's message to
//! a canned reply, and the per-conversation state machine that hosts it.

use crate::locale::Locale;
use crate::validation::{validate_chat_message, ValidationError};
use chrono::{DateTime, Utc};
use std::fmt;

//=========================================================================================
// Response Generator
//=========================================================================================

/// Affect categories, declared in the order they are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affect {
    Stress,
    Anxiety,
    Sadness,
    Happiness,
    Mindfulness,
}

impl Affect {
    pub const PRIORITY: [Affect; 5] = [
        Affect::Stress,
        Affect::Anxiety,
        Affect::Sadness,
        Affect::Happiness,
        Affect::Mindfulness,
    ];

    /// Lowercase substrings that select this category, in either language.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Affect::Stress => &["stress", "overwhelm", "burnout", "burned out", "เครียด"],
            Affect::Anxiety => &[
                "anxious",
                "anxiety",
                "worried",
                "worry",
                "panic",
                "วิตกกังวล",
                "กังวล",
            ],
            // "unhappy" must be caught here before Happiness sees "happy".
            Affect::Sadness => &[
                "sad",
                "unhappy",
                "depressed",
                "lonely",
                "เศร้า",
                "เหงา",
                "ร้องไห้",
            ],
            Affect::Happiness => &["happy", "glad", "grateful", "joy", "มีความสุข", "ดีใจ"],
            Affect::Mindfulness => &["meditat", "breath", "calm", "สมาธิ", "หายใจ"],
        }
    }

    pub fn reply(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Affect::Stress, Locale::Th) => {
                "ฉันเข้าใจว่าคุณรู้สึกเครียด การหายใจลึกๆ จะช่วยให้คุณรู้สึกสงบขึ้นได้ ลองนั่งสมาธิ 5 นาทีกับฉันไหม?"
            }
            (Affect::Stress, Locale::En) => {
                "I understand you're feeling stressed. Deep breathing can help you feel more calm. Would you like to try a 5-minute meditation with me?"
            }
            (Affect::Anxiety, Locale::Th) => {
                "ความกังวลเป็นเรื่องปกติ แต่เราสามารถจัดการกับมันได้ ลองเทคนิค \"อานาปานสติ\" การสังเกตลมหายใจเข้าออกดูไหม?"
            }
            (Affect::Anxiety, Locale::En) => {
                "Anxiety is normal, but we can manage it together. Try the \"Anapanasati\" technique - observing your breath in and out. Would you like me to guide you?"
            }
            (Affect::Sadness, Locale::Th) => {
                "ขอบคุณที่เล่าให้ฉันฟัง ความรู้สึกเศร้าเป็นส่วนหนึ่งของชีวิต ลองเขียนสิ่งที่ขอบคุณ 3 อย่างในวันนี้ดูไหม?"
            }
            (Affect::Sadness, Locale::En) => {
                "Thank you for sharing with me. Sadness is part of life. Try writing down 3 things you're grateful for today. It might help shift your perspective."
            }
            (Affect::Happiness, Locale::Th) => {
                "ดีใจด้วยนะคะที่วันนี้คุณรู้สึกดี ลองบันทึกช่วงเวลานี้ไว้ในบันทึกอารมณ์ เพื่อกลับมาอ่านในวันที่ยากลำบากดูไหม?"
            }
            (Affect::Happiness, Locale::En) => {
                "I'm so glad you're feeling good today! Would you like to save this moment in your mood journal to look back on during harder days?"
            }
            (Affect::Mindfulness, Locale::Th) => {
                "เยี่ยมเลยค่ะ ลองหายใจเข้า 4 วินาที กลั้นไว้ 7 วินาที แล้วหายใจออก 8 วินาที หรือเลือกการนั่งสมาธิสั้นๆ ในหน้าเนื้อหาได้เลย"
            }
            (Affect::Mindfulness, Locale::En) => {
                "Wonderful. Try breathing in for 4 seconds, holding for 7, and breathing out for 8, or pick a short guided meditation from the content section."
            }
        }
    }
}

/// The first category whose keywords occur in `text`, in priority order.
pub fn classify(text: &str) -> Option<Affect> {
    let lowered = text.to_lowercase();
    Affect::PRIORITY
        .into_iter()
        .find(|affect| affect.keywords().iter().any(|kw| lowered.contains(kw)))
}

pub fn fallback_reply(locale: Locale) -> &'static str {
    match locale {
        Locale::Th => {
            "ขอบคุณที่แบ่งปันความรู้สึกกับฉัน ฉันอยู่ที่นี่เพื่อรับฟังและช่วยเหลือคุณเสมอ มีอะไรอื่นที่อยากคุยไหม?"
        }
        Locale::En => {
            "Thank you for sharing your feelings with me. I'm here to listen and help you always. Is there anything else you'd like to talk about?"
        }
    }
}

/// Produces the assistant's reply to `text`. Never fails: no match means the
/// locale's fallback.
pub fn generate_reply(text: &str, locale: Locale) -> &'static str {
    match classify(text) {
        Some(affect) => affect.reply(locale),
        None => fallback_reply(locale),
    }
}

pub fn greeting(locale: Locale) -> &'static str {
    match locale {
        Locale::Th => {
            "สวัสดีค่ะ! ฉันคือผู้ช่วย AI ที่เข้าใจวัฒนธรรมไทย พร้อมที่จะรับฟังและช่วยเหลือคุณ บอกฉันได้เลยว่าวันนี้คุณรู้สึกอย่างไร"
        }
        Locale::En => {
            "Hello! I'm your culturally-aware AI assistant, ready to listen and help. Tell me how you're feeling today."
        }
    }
}

/// A canned prompt the client can offer as a one-tap chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub action: &'static str,
    pub text: &'static str,
}

pub fn suggestions(locale: Locale) -> [Suggestion; 4] {
    let pick = |th: &'static str, en: &'static str| match locale {
        Locale::Th => th,
        Locale::En => en,
    };
    [
        Suggestion {
            action: "breathing",
            text: pick("ลองแบบฝึกหายใจ", "Try breathing exercise"),
        },
        Suggestion {
            action: "stress",
            text: pick("ฉันรู้สึกเครียด", "I feel stressed"),
        },
        Suggestion {
            action: "meditation",
            text: pick("ต้องการนั่งสมาธิ", "Need meditation"),
        },
        Suggestion {
            action: "anxiety",
            text: pick("รู้สึกวิตกกังวล", "Feeling anxious"),
        },
    ]
}

//=========================================================================================
// Chat Session
//=========================================================================================

/// Unique within one conversation and increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub is_from_user: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    /// Input enabled.
    Idle,
    /// A user message is waiting for its reply; the typing indicator is shown.
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("A reply is still being prepared")]
    Busy,
    #[error("There is no message waiting for a reply")]
    NothingPending,
}

/// The ordered message list of one conversation. Lives as long as the
/// connection that owns it; nothing is persisted.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<Message>,
    state: ChatState,
    next_id: u64,
    pending: Option<String>,
}

impl ChatSession {
    /// Starts a conversation with the assistant's greeting.
    pub fn new(locale: Locale) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            state: ChatState::Idle,
            next_id: 1,
            pending: None,
        };
        session.push(greeting(locale).to_string(), false);
        session
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_typing(&self) -> bool {
        self.state == ChatState::Submitting
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Idle → Submitting. The user's message is appended right away.
    pub fn submit(&mut self, text: &str) -> Result<Message, ChatError> {
        if self.state == ChatState::Submitting {
            return Err(ChatError::Busy);
        }
        validate_chat_message(text)?;

        let message = self.push(text.to_string(), true);
        self.pending = Some(message.text.clone());
        self.state = ChatState::Submitting;
        Ok(message)
    }

    /// Submitting → Idle. Appends the reply to the pending message.
    pub fn complete(&mut self, locale: Locale) -> Result<Message, ChatError> {
        let prompt = self.pending.take().ok_or(ChatError::NothingPending)?;
        let reply = generate_reply(&prompt, locale).to_string();
        let message = self.push(reply, false);
        self.state = ChatState::Idle;
        Ok(message)
    }

    fn push(&mut self, text: String, is_from_user: bool) -> Message {
        let message = Message {
            id: MessageId(self.next_id),
            text,
            is_from_user,
            timestamp: Utc::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_stress_in_thai_locale_gets_thai_stress_reply() {
        let reply = generate_reply("I feel stressed", Locale::Th);
        assert_eq!(reply, Affect::Stress.reply(Locale::Th));
        assert_ne!(reply, fallback_reply(Locale::Th));
    }

    #[test]
    fn thai_keywords_match_in_both_locales() {
        assert_eq!(classify("วันนี้เครียดมาก"), Some(Affect::Stress));
        assert_eq!(classify("รู้สึกวิตกกังวล"), Some(Affect::Anxiety));
        assert_eq!(
            generate_reply("ฉันเศร้า", Locale::En),
            Affect::Sadness.reply(Locale::En)
        );
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify("I am SO ANXIOUS"), Some(Affect::Anxiety));
    }

    #[test]
    fn priority_resolves_multiple_matches() {
        // Mentions sadness first, but stress is tested first.
        assert_eq!(classify("sad and stressed"), Some(Affect::Stress));
        assert_eq!(classify("unhappy"), Some(Affect::Sadness));
        assert_eq!(classify("happy but want to meditate"), Some(Affect::Happiness));
    }

    #[test]
    fn unmatched_input_gets_fallback() {
        for locale in Locale::ALL {
            assert_eq!(generate_reply("what's for lunch?", locale), fallback_reply(locale));
        }
    }

    #[test]
    fn replies_are_stable_across_calls() {
        for locale in Locale::ALL {
            for affect in Affect::PRIORITY {
                for kw in affect.keywords() {
                    let first = generate_reply(kw, locale);
                    assert_eq!(first, generate_reply(kw, locale));
                    assert!(!first.is_empty());
                }
            }
        }
    }

    #[test]
    fn every_suggestion_hits_a_category() {
        for locale in Locale::ALL {
            for chip in suggestions(locale) {
                assert!(classify(chip.text).is_some(), "{} unmatched", chip.text);
            }
        }
    }

    #[test]
    fn session_round_trip() {
        let mut chat = ChatSession::new(Locale::En);
        assert_eq!(chat.messages().len(), 1);
        assert!(!chat.messages()[0].is_from_user);

        let sent = chat.submit("Feeling anxious").unwrap();
        assert!(sent.is_from_user);
        assert_eq!(chat.state(), ChatState::Submitting);
        assert_eq!(chat.submit("again"), Err(ChatError::Busy));

        let reply = chat.complete(Locale::En).unwrap();
        assert_eq!(reply.text, Affect::Anxiety.reply(Locale::En));
        assert_eq!(chat.state(), ChatState::Idle);

        let ids: Vec<_> = chat.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MessageId(1), MessageId(2), MessageId(3)]);
    }

    #[test]
    fn invalid_submit_leaves_state_untouched() {
        let mut chat = ChatSession::new(Locale::Th);
        assert!(matches!(chat.submit("  "), Err(ChatError::Invalid(_))));
        assert!(matches!(
            chat.submit("<script>x</script>"),
            Err(ChatError::Invalid(_))
        ));
        assert_eq!(chat.state(), ChatState::Idle);
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.complete(Locale::Th), Err(ChatError::NothingPending));
    }
}
