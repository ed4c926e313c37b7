//! crates/mindful_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use crate::locale::Locale;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Identity
//=========================================================================================

/// The signed-in identity as the auth provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// A browser login session handed out on sign-in or sign-up.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: AuthUser,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Mood Journal
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_score: i32,
    pub mood_text: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What a caller submits. `user_id` may be present in a client payload, but
/// user-scoped writes never trust it.
#[derive(Debug, Clone, Default)]
pub struct MoodEntryDraft {
    pub user_id: Option<Uuid>,
    pub mood_score: i32,
    pub mood_text: Option<String>,
    pub notes: Option<String>,
}

/// The row handed to a repository for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMoodEntry {
    pub user_id: Uuid,
    pub mood_score: i32,
    pub mood_text: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodEntryPatch {
    pub mood_score: Option<i32>,
    pub mood_text: Option<String>,
    pub notes: Option<String>,
}

impl MoodEntryPatch {
    pub fn is_empty(&self) -> bool {
        self.mood_score.is_none() && self.mood_text.is_none() && self.notes.is_none()
    }
}

//=========================================================================================
// Profile
//=========================================================================================

/// One row per user, owned exclusively by that user.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub preferred_language: Locale,
    pub updated_at: DateTime<Utc>,
}

/// The settings-screen form.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub preferred_language: Locale,
}

/// Columns to write on upsert; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub preferred_language: Option<Locale>,
}

//=========================================================================================
// Feedback
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub rating: i32,
    pub screen_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FeedbackDraft {
    pub user_id: Option<Uuid>,
    pub message: String,
    pub rating: i32,
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub user_id: Uuid,
    pub message: String,
    pub rating: i32,
    pub screen_name: Option<String>,
}
