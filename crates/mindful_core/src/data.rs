//! crates/mindful_core/src/data.rs
//!
//! Uniform data access on top of the per-entity repositories.
//!
//! Two modes are offered. `GlobalData` passes queries through untouched, the
//! way an admin tool would. `UserData` is bound to the signed-in user: it
//! refuses to run without one, forces a `user_id` filter onto every read and
//! stamps `user_id` onto every write, whatever the caller put in the payload.
//!
//! Operations never return `Err`. Every outcome is a [`DataResult`] and the
//! caller branches on its `error` field.

use crate::domain::{
    AuthUser, Feedback, FeedbackDraft, MoodEntry, MoodEntryDraft, MoodEntryPatch, NewFeedback,
    NewMoodEntry, Profile, ProfileChanges, ProfileUpdate,
};
use crate::i18n::translate;
use crate::locale::Locale;
use crate::ports::{
    FeedbackQuery, FeedbackRepository, MoodEntryRepository, MoodFilter, MoodQuery,
    OwnershipFilter, PortError, ProfileRepository, Query,
};
use crate::validation::{
    sanitize_display_name, sanitize_input, sanitize_optional, validate_feedback,
    validate_mood_entry, validate_mood_patch, validate_profile_update, ValidationError,
    FULL_NAME_MAX,
};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

//=========================================================================================
// Result Shape
//=========================================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("User not authenticated")]
    AuthenticationRequired,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Access denied")]
    AccessDenied,
    #[error("Not found")]
    NotFound,
    #[error("The operation failed")]
    Failed,
}

impl DataError {
    pub fn message_key(&self) -> &'static str {
        match self {
            DataError::AuthenticationRequired => "auth.error.required",
            DataError::Invalid(_) => "data.error.invalid_input",
            DataError::AccessDenied => "data.error.access_denied",
            DataError::NotFound => "data.error.not_found",
            DataError::Failed => "common.error",
        }
    }

    pub fn message(&self, locale: Locale) -> &'static str {
        translate(locale, self.message_key())
    }
}

/// `{ data, error, count }`: exactly one of `data`/`error` is set; `count` only
/// for list operations.
#[derive(Debug, Clone, PartialEq)]
pub struct DataResult<T> {
    pub data: Option<T>,
    pub error: Option<DataError>,
    pub count: Option<usize>,
}

impl<T> DataResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            count: None,
        }
    }

    pub fn counted(data: T, count: usize) -> Self {
        Self {
            data: Some(data),
            error: None,
            count: Some(count),
        }
    }

    pub fn failed(error: DataError) -> Self {
        Self {
            data: None,
            error: Some(error),
            count: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<T, DataError> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err(DataError::Failed),
        }
    }
}

/// Single-row lookups: a missing row is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Missing,
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Lookup::Missing, Lookup::Found)
    }
}

fn port_failure(operation: &str, e: PortError) -> DataError {
    match e {
        PortError::NotFound(_) => DataError::NotFound,
        PortError::Forbidden(_) | PortError::Unauthorized => DataError::AccessDenied,
        other => {
            error!("Database {} error: {:?}", operation, other);
            DataError::Failed
        }
    }
}

/// Replaces any ownership filters with one for `owner`.
fn owned<F: OwnershipFilter, C>(mut query: Query<F, C>, owner: Uuid) -> Query<F, C> {
    query.filters.retain(|f| !f.is_ownership());
    query.filters.push(F::owned_by(owner));
    query
}

macro_rules! try_data {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(error) => return DataResult::failed(error.into()),
        }
    };
}

//=========================================================================================
// Entry Point
//=========================================================================================

#[derive(Clone)]
pub struct Repositories {
    pub moods: Arc<dyn MoodEntryRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
}

#[derive(Clone)]
pub struct DataAccess {
    repos: Repositories,
}

impl DataAccess {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub fn global(&self) -> GlobalData<'_> {
        GlobalData { repos: &self.repos }
    }

    /// User-scoped access for the current session, if there is one.
    pub fn for_user(&self, user: Option<&AuthUser>) -> UserData<'_> {
        UserData {
            repos: &self.repos,
            owner: user.map(|u| u.id),
        }
    }
}

//=========================================================================================
// Global Mode
//=========================================================================================

pub struct GlobalData<'a> {
    repos: &'a Repositories,
}

impl GlobalData<'_> {
    pub async fn insert_mood(&self, entry: NewMoodEntry) -> DataResult<MoodEntry> {
        let draft = MoodEntryDraft {
            user_id: Some(entry.user_id),
            mood_score: entry.mood_score,
            mood_text: entry.mood_text.clone(),
            notes: entry.notes.clone(),
        };
        try_data!(validate_mood_entry(&draft));
        let entry = NewMoodEntry {
            mood_text: sanitize_optional(entry.mood_text.as_deref()),
            notes: sanitize_optional(entry.notes.as_deref()),
            ..entry
        };
        match self.repos.moods.insert(entry).await {
            Ok(row) => DataResult::ok(row),
            Err(e) => DataResult::failed(port_failure("insert", e)),
        }
    }

    pub async fn list_moods(&self, query: MoodQuery) -> DataResult<Vec<MoodEntry>> {
        match self.repos.moods.select(&query).await {
            Ok(page) => DataResult::counted(page.rows, page.count),
            Err(e) => DataResult::failed(port_failure("select", e)),
        }
    }

    pub async fn delete_moods(&self, filters: Vec<MoodFilter>) -> DataResult<u64> {
        match self.repos.moods.delete(&filters).await {
            Ok(deleted) => DataResult::ok(deleted),
            Err(e) => DataResult::failed(port_failure("delete", e)),
        }
    }

    pub async fn list_feedback(&self, query: FeedbackQuery) -> DataResult<Vec<Feedback>> {
        match self.repos.feedback.select(&query).await {
            Ok(page) => DataResult::counted(page.rows, page.count),
            Err(e) => DataResult::failed(port_failure("select", e)),
        }
    }
}

//=========================================================================================
// User-Scoped Mode
//=========================================================================================

pub struct UserData<'a> {
    repos: &'a Repositories,
    owner: Option<Uuid>,
}

impl UserData<'_> {
    fn owner(&self) -> Result<Uuid, DataError> {
        self.owner.ok_or(DataError::AuthenticationRequired)
    }

    fn ignore_foreign_owner(&self, supplied: Option<Uuid>, owner: Uuid) {
        if let Some(supplied) = supplied.filter(|id| *id != owner) {
            debug!(%supplied, %owner, "Replacing caller-supplied user_id");
        }
    }

    pub async fn record_mood(&self, draft: MoodEntryDraft) -> DataResult<MoodEntry> {
        let owner = try_data!(self.owner());
        try_data!(validate_mood_entry(&draft));
        self.ignore_foreign_owner(draft.user_id, owner);

        let entry = NewMoodEntry {
            user_id: owner,
            mood_score: draft.mood_score,
            mood_text: sanitize_optional(draft.mood_text.as_deref()),
            notes: sanitize_optional(draft.notes.as_deref()),
        };
        match self.repos.moods.insert(entry).await {
            Ok(row) => DataResult::ok(row),
            Err(e) => DataResult::failed(port_failure("insert", e)),
        }
    }

    pub async fn list_moods(&self, query: MoodQuery) -> DataResult<Vec<MoodEntry>> {
        let owner = try_data!(self.owner());
        match self.repos.moods.select(&owned(query, owner)).await {
            Ok(page) => DataResult::counted(page.rows, page.count),
            Err(e) => DataResult::failed(port_failure("select", e)),
        }
    }

    pub async fn update_mood(&self, id: Uuid, patch: MoodEntryPatch) -> DataResult<MoodEntry> {
        let owner = try_data!(self.owner());
        if patch.is_empty() {
            return DataResult::failed(ValidationError::Empty { field: "update" }.into());
        }
        try_data!(validate_mood_patch(&patch));

        let patch = MoodEntryPatch {
            mood_score: patch.mood_score,
            mood_text: sanitize_optional(patch.mood_text.as_deref()),
            notes: sanitize_optional(patch.notes.as_deref()),
        };
        let filters = [MoodFilter::Id(id), MoodFilter::UserId(owner)];
        match self.repos.moods.update(&filters, &patch).await {
            Ok(row) => DataResult::ok(row),
            Err(e) => DataResult::failed(port_failure("update", e)),
        }
    }

    pub async fn delete_mood(&self, id: Uuid) -> DataResult<()> {
        let owner = try_data!(self.owner());
        let filters = [MoodFilter::Id(id), MoodFilter::UserId(owner)];
        match self.repos.moods.delete(&filters).await {
            Ok(0) => DataResult::failed(DataError::NotFound),
            Ok(_) => DataResult::ok(()),
            Err(e) => DataResult::failed(port_failure("delete", e)),
        }
    }

    pub async fn profile(&self) -> DataResult<Lookup<Profile>> {
        let owner = try_data!(self.owner());
        match self.repos.profiles.find(owner).await {
            Ok(found) => DataResult::ok(found.into()),
            Err(e) => DataResult::failed(port_failure("select", e)),
        }
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> DataResult<Profile> {
        let owner = try_data!(self.owner());
        try_data!(validate_profile_update(&update));

        let changes = ProfileChanges {
            full_name: Some(sanitize_input(&update.full_name)),
            preferred_language: Some(update.preferred_language),
        };
        self.upsert_profile(owner, changes).await
    }

    pub async fn set_preferred_language(&self, locale: Locale) -> DataResult<Profile> {
        let owner = try_data!(self.owner());
        let changes = ProfileChanges {
            full_name: None,
            preferred_language: Some(locale),
        };
        self.upsert_profile(owner, changes).await
    }

    /// Creates the profile row right after registration.
    pub async fn init_profile(
        &self,
        full_name: Option<&str>,
        locale: Locale,
    ) -> DataResult<Profile> {
        let owner = try_data!(self.owner());
        let full_name = full_name
            .map(sanitize_display_name)
            .filter(|name| !name.is_empty());
        if let Some(name) = &full_name {
            if name.chars().count() > FULL_NAME_MAX {
                return DataResult::failed(
                    ValidationError::TooLong {
                        field: "full_name",
                        max: FULL_NAME_MAX,
                    }
                    .into(),
                );
            }
        }
        let changes = ProfileChanges {
            full_name,
            preferred_language: Some(locale),
        };
        self.upsert_profile(owner, changes).await
    }

    async fn upsert_profile(&self, owner: Uuid, changes: ProfileChanges) -> DataResult<Profile> {
        match self.repos.profiles.upsert(owner, &changes).await {
            Ok(profile) => DataResult::ok(profile),
            Err(e) => DataResult::failed(port_failure("upsert", e)),
        }
    }

    pub async fn submit_feedback(&self, draft: FeedbackDraft) -> DataResult<Feedback> {
        let owner = try_data!(self.owner());
        try_data!(validate_feedback(&draft));
        self.ignore_foreign_owner(draft.user_id, owner);

        let feedback = NewFeedback {
            user_id: owner,
            message: sanitize_input(&draft.message),
            rating: draft.rating,
            screen_name: sanitize_optional(draft.screen_name.as_deref()),
        };
        match self.repos.feedback.insert(feedback).await {
            Ok(row) => DataResult::ok(row),
            Err(e) => DataResult::failed(port_failure("insert", e)),
        }
    }

    pub async fn list_feedback(&self, query: FeedbackQuery) -> DataResult<Vec<Feedback>> {
        let owner = try_data!(self.owner());
        match self.repos.feedback.select(&owned(query, owner)).await {
            Ok(page) => DataResult::counted(page.rows, page.count),
            Err(e) => DataResult::failed(port_failure("select", e)),
        }
    }
}
