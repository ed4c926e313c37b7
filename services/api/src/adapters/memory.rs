//! services/api/src/adapters/memory.rs
//!
//! Process-memory implementation of every storage port. Backs
//! `STORAGE_BACKEND=memory` and the router tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mindful_core::domain::{
    AuthUser, Feedback, MoodEntry, MoodEntryPatch, NewFeedback, NewMoodEntry, Profile,
    ProfileChanges, UserCredentials,
};
use mindful_core::ports::{
    CredentialStore, FeedbackColumn, FeedbackFilter, FeedbackQuery, FeedbackRepository,
    MoodColumn, MoodEntryRepository, MoodFilter, MoodQuery, Page, PortError, PortResult,
    ProfileRepository, Query, SortDirection,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserCredentials>>,
    sessions: RwLock<HashMap<String, (Uuid, DateTime<Utc>)>>,
    moods: RwLock<Vec<MoodEntry>>,
    profiles: RwLock<HashMap<Uuid, Profile>>,
    feedback: RwLock<Vec<Feedback>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn mood_matches(row: &MoodEntry, filter: &MoodFilter) -> bool {
    match filter {
        MoodFilter::Id(id) => row.id == *id,
        MoodFilter::UserId(user_id) => row.user_id == *user_id,
        MoodFilter::MoodScore(score) => row.mood_score == *score,
    }
}

fn mood_order(a: &MoodEntry, b: &MoodEntry, column: MoodColumn) -> Ordering {
    match column {
        MoodColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        MoodColumn::MoodScore => a.mood_score.cmp(&b.mood_score),
    }
}

fn feedback_matches(row: &Feedback, filter: &FeedbackFilter) -> bool {
    match filter {
        FeedbackFilter::Id(id) => row.id == *id,
        FeedbackFilter::UserId(user_id) => row.user_id == *user_id,
        FeedbackFilter::Rating(rating) => row.rating == *rating,
        FeedbackFilter::ScreenName(name) => row.screen_name.as_deref() == Some(name.as_str()),
    }
}

fn feedback_order(a: &Feedback, b: &Feedback, column: FeedbackColumn) -> Ordering {
    match column {
        FeedbackColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        FeedbackColumn::Rating => a.rating.cmp(&b.rating),
    }
}

/// Filters, sorts and limits in that order; `count` is taken before the limit.
fn run_query<T, F, C>(
    rows: &[T],
    query: &Query<F, C>,
    matches: fn(&T, &F) -> bool,
    order: fn(&T, &T, C) -> Ordering,
) -> Page<T>
where
    T: Clone,
    C: Copy,
{
    let mut selected: Vec<T> = rows
        .iter()
        .filter(|row| query.filters.iter().all(|f| matches(row, f)))
        .cloned()
        .collect();
    if let Some(by) = &query.order {
        selected.sort_by(|a, b| {
            let ordering = order(a, b, by.column);
            match by.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
    let count = selected.len();
    if let Some(limit) = query.limit {
        selected.truncate(limit as usize);
    }
    Page {
        rows: selected,
        count,
    }
}

#[async_trait]
impl MoodEntryRepository for MemoryStore {
    async fn insert(&self, entry: NewMoodEntry) -> PortResult<MoodEntry> {
        let row = MoodEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            mood_score: entry.mood_score,
            mood_text: entry.mood_text,
            notes: entry.notes,
            created_at: Utc::now(),
        };
        self.moods.write().await.push(row.clone());
        Ok(row)
    }

    async fn select(&self, query: &MoodQuery) -> PortResult<Page<MoodEntry>> {
        let rows = self.moods.read().await;
        Ok(run_query(&rows, query, mood_matches, mood_order))
    }

    async fn update(
        &self,
        filters: &[MoodFilter],
        patch: &MoodEntryPatch,
    ) -> PortResult<MoodEntry> {
        let mut rows = self.moods.write().await;
        let row = rows
            .iter_mut()
            .find(|row| filters.iter().all(|f| mood_matches(row, f)))
            .ok_or_else(|| PortError::NotFound("mood entry".to_string()))?;
        if let Some(score) = patch.mood_score {
            row.mood_score = score;
        }
        if let Some(text) = &patch.mood_text {
            row.mood_text = Some(text.clone());
        }
        if let Some(notes) = &patch.notes {
            row.notes = Some(notes.clone());
        }
        Ok(row.clone())
    }

    async fn delete(&self, filters: &[MoodFilter]) -> PortResult<u64> {
        if filters.is_empty() {
            return Err(PortError::Forbidden(
                "refusing to delete mood entries without a filter".to_string(),
            ));
        }
        let mut rows = self.moods.write().await;
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|f| mood_matches(row, f)));
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, user_id: Uuid, changes: &ProfileChanges) -> PortResult<Profile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(user_id).or_insert_with(|| Profile {
            user_id,
            full_name: None,
            preferred_language: Default::default(),
            updated_at: Utc::now(),
        });
        if let Some(name) = &changes.full_name {
            profile.full_name = Some(name.clone());
        }
        if let Some(locale) = changes.preferred_language {
            profile.preferred_language = locale;
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }
}

#[async_trait]
impl FeedbackRepository for MemoryStore {
    async fn insert(&self, feedback: NewFeedback) -> PortResult<Feedback> {
        let row = Feedback {
            id: Uuid::new_v4(),
            user_id: feedback.user_id,
            message: feedback.message,
            rating: feedback.rating,
            screen_name: feedback.screen_name,
            created_at: Utc::now(),
        };
        self.feedback.write().await.push(row.clone());
        Ok(row)
    }

    async fn select(&self, query: &FeedbackQuery) -> PortResult<Page<Feedback>> {
        let rows = self.feedback.read().await;
        Ok(run_query(&rows, query, feedback_matches, feedback_order))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<AuthUser> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(PortError::Conflict(format!("User {} already exists", email)));
        }
        let credentials = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        let user = AuthUser {
            id: credentials.user_id,
            email: credentials.email.clone(),
        };
        users.insert(email.to_string(), credentials);
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, expires)| *expires > now);
        sessions.insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthUser> {
        let user_id = {
            let mut sessions = self.sessions.write().await;
            match sessions.get(session_id).copied() {
                Some((user_id, expires_at)) if expires_at > Utc::now() => user_id,
                Some(_) => {
                    sessions.remove(session_id);
                    return Err(PortError::Unauthorized);
                }
                None => return Err(PortError::Unauthorized),
            }
        };
        self.users
            .read()
            .await
            .values()
            .find(|c| c.user_id == user_id)
            .map(|c| AuthUser {
                id: c.user_id,
                email: c.email.clone(),
            })
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
