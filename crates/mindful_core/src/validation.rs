//! crates/mindful_core/src/validation.rs
//!
//! Input schemas and sanitization for user-submitted text. Everything here is
//! pure and runs before any store or provider call, so a rejected input never
//! causes a partial write.

use crate::domain::{FeedbackDraft, MoodEntryDraft, MoodEntryPatch, ProfileUpdate};
use regex::Regex;
use std::sync::OnceLock;

pub const CHAT_MESSAGE_MAX: usize = 1000;
pub const MOOD_SCORE_RANGE: (i32, i32) = (1, 10);
pub const MOOD_TEXT_MAX: usize = 50;
pub const MOOD_NOTES_MAX: usize = 500;
pub const FULL_NAME_MAX: usize = 100;
pub const FEEDBACK_MESSAGE_MAX: usize = 1000;
pub const FEEDBACK_RATING_RANGE: (i32, i32) = (1, 5);
pub const SCREEN_NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i32,
        max: i32,
    },
    #[error("Invalid content detected in {field}")]
    UnsafeContent { field: &'static str },
    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("{0}")]
    WeakPassword(&'static str),
}

pub type ValidationResult = Result<(), ValidationError>;

fn injection_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<script|javascript:|on\w+=").expect("injection pattern is valid")
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// True when `text` carries a script tag, a `javascript:` URL or an inline
/// event-handler attribute.
pub fn contains_markup_injection(text: &str) -> bool {
    injection_pattern().is_match(text)
}

//=========================================================================================
// Field Rules
//=========================================================================================

fn required(field: &'static str, value: &str, max: usize) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    at_most(field, value, max)
}

fn at_most(field: &'static str, value: &str, max: usize) -> ValidationResult {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn in_range(field: &'static str, value: i32, (min, max): (i32, i32)) -> ValidationResult {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}

fn safe(field: &'static str, value: &str) -> ValidationResult {
    if contains_markup_injection(value) {
        return Err(ValidationError::UnsafeContent { field });
    }
    Ok(())
}

//=========================================================================================
// Schemas
//=========================================================================================

pub fn validate_chat_message(text: &str) -> ValidationResult {
    required("message", text, CHAT_MESSAGE_MAX)?;
    safe("message", text)
}

pub fn validate_mood_entry(draft: &MoodEntryDraft) -> ValidationResult {
    in_range("mood_score", draft.mood_score, MOOD_SCORE_RANGE)?;
    if let Some(text) = &draft.mood_text {
        at_most("mood_text", text, MOOD_TEXT_MAX)?;
    }
    if let Some(notes) = &draft.notes {
        at_most("notes", notes, MOOD_NOTES_MAX)?;
        safe("notes", notes)?;
    }
    Ok(())
}

pub fn validate_mood_patch(patch: &MoodEntryPatch) -> ValidationResult {
    if let Some(score) = patch.mood_score {
        in_range("mood_score", score, MOOD_SCORE_RANGE)?;
    }
    if let Some(text) = &patch.mood_text {
        at_most("mood_text", text, MOOD_TEXT_MAX)?;
    }
    if let Some(notes) = &patch.notes {
        at_most("notes", notes, MOOD_NOTES_MAX)?;
        safe("notes", notes)?;
    }
    Ok(())
}

pub fn validate_profile_update(update: &ProfileUpdate) -> ValidationResult {
    required("full_name", &update.full_name, FULL_NAME_MAX)?;
    safe("full_name", &update.full_name)
}

pub fn validate_feedback(draft: &FeedbackDraft) -> ValidationResult {
    required("message", &draft.message, FEEDBACK_MESSAGE_MAX)?;
    safe("message", &draft.message)?;
    in_range("rating", draft.rating, FEEDBACK_RATING_RANGE)?;
    if let Some(screen) = &draft.screen_name {
        at_most("screen_name", screen, SCREEN_NAME_MAX)?;
    }
    Ok(())
}

/// Returns the trimmed address when it is syntactically valid.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();
    if email_pattern().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> ValidationResult {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ValidationError::WeakPassword(
            "Password must be at least 8 characters",
        ));
    }
    let rules: [(fn(&char) -> bool, &'static str); 4] = [
        (
            char::is_ascii_uppercase,
            "Password must contain at least one uppercase letter",
        ),
        (
            char::is_ascii_lowercase,
            "Password must contain at least one lowercase letter",
        ),
        (
            char::is_ascii_digit,
            "Password must contain at least one number",
        ),
        (
            |c: &char| !c.is_ascii_alphanumeric(),
            "Password must contain at least one special character",
        ),
    ];
    for (rule, message) in rules {
        if !password.chars().any(|c| rule(&c)) {
            return Err(ValidationError::WeakPassword(message));
        }
    }
    Ok(())
}

//=========================================================================================
// Sanitization
//=========================================================================================

/// Escapes the HTML-significant characters `< > " ' /` and trims the result.
pub fn sanitize_input(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(sanitize_input)
}

/// Display names given at sign-up lose angle brackets and quotes outright.
pub fn sanitize_display_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    fn mood(score: i32) -> MoodEntryDraft {
        MoodEntryDraft {
            user_id: None,
            mood_score: score,
            mood_text: None,
            notes: None,
        }
    }

    #[test]
    fn sanitize_escapes_each_special_character_once() {
        let raw = r#" <a href="x/y">it's</a> "#;
        let clean = sanitize_input(raw);

        for c in ['<', '>', '"', '\'', '/'] {
            assert!(!clean.contains(c), "raw {c:?} survived in {clean}");
        }
        assert_eq!(clean.matches("&lt;").count(), 2);
        assert_eq!(clean.matches("&gt;").count(), 2);
        assert_eq!(clean.matches("&quot;").count(), 2);
        assert_eq!(clean.matches("&#x27;").count(), 1);
        assert_eq!(clean.matches("&#x2F;").count(), 2);
        assert!(clean.starts_with("&lt;a"));
    }

    #[test]
    fn sanitize_leaves_thai_text_alone() {
        assert_eq!(sanitize_input("  สวัสดีค่ะ  "), "สวัสดีค่ะ");
    }

    #[test]
    fn display_name_drops_markup_characters() {
        assert_eq!(sanitize_display_name(" <b>\"Nok'\" "), "bNok");
    }

    #[test]
    fn chat_message_rules() {
        assert_eq!(
            validate_chat_message("   "),
            Err(ValidationError::Empty { field: "message" })
        );
        assert!(validate_chat_message(&"ก".repeat(CHAT_MESSAGE_MAX)).is_ok());
        assert_eq!(
            validate_chat_message(&"a".repeat(CHAT_MESSAGE_MAX + 1)),
            Err(ValidationError::TooLong {
                field: "message",
                max: CHAT_MESSAGE_MAX
            })
        );
        for bad in ["<SCRIPT>alert(1)", "javascript:void(0)", "<img onerror=x>"] {
            assert_eq!(
                validate_chat_message(bad),
                Err(ValidationError::UnsafeContent { field: "message" })
            );
        }
    }

    #[test]
    fn mood_entry_bounds() {
        assert!(validate_mood_entry(&mood(1)).is_ok());
        assert!(validate_mood_entry(&mood(10)).is_ok());
        assert!(validate_mood_entry(&mood(0)).is_err());
        assert!(validate_mood_entry(&mood(11)).is_err());

        let mut long_text = mood(5);
        long_text.mood_text = Some("x".repeat(MOOD_TEXT_MAX + 1));
        assert!(validate_mood_entry(&long_text).is_err());

        let mut bad_notes = mood(5);
        bad_notes.notes = Some("hello <script>".into());
        assert_eq!(
            validate_mood_entry(&bad_notes),
            Err(ValidationError::UnsafeContent { field: "notes" })
        );
    }

    #[test]
    fn profile_update_requires_a_name() {
        let update = ProfileUpdate {
            full_name: " ".into(),
            preferred_language: Locale::En,
        };
        assert!(validate_profile_update(&update).is_err());
    }

    #[test]
    fn feedback_rating_range() {
        let draft = FeedbackDraft {
            user_id: None,
            message: "Nice app".into(),
            rating: 6,
            screen_name: None,
        };
        assert_eq!(
            validate_feedback(&draft),
            Err(ValidationError::OutOfRange {
                field: "rating",
                min: 1,
                max: 5
            })
        );
    }

    #[test]
    fn email_and_password_rules() {
        assert_eq!(validate_email(" a@b.co ").as_deref(), Ok("a@b.co"));
        assert!(validate_email("not-an-email").is_err());

        assert!(validate_password("Str0ng!pass").is_ok());
        assert!(validate_password("short1!").is_err());
        assert!(validate_password("alllower1!").is_err());
        assert!(validate_password("NoDigits!!").is_err());
        assert!(validate_password("NoSpecial11").is_err());
    }
}
