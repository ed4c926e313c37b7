//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the PostgreSQL implementation of
//! the repository and credential ports from the `core` crate. It handles all
//! interactions with the database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mindful_core::domain::{
    AuthUser, Feedback, MoodEntry, MoodEntryPatch, NewFeedback, NewMoodEntry, Profile,
    ProfileChanges, UserCredentials,
};
use mindful_core::ports::{
    CredentialStore, FeedbackColumn, FeedbackFilter, FeedbackQuery, FeedbackRepository,
    MoodColumn, MoodEntryRepository, MoodFilter, MoodQuery, OrderBy, Page, PortError,
    PortResult, ProfileRepository, SortDirection,
};
use mindful_core::Locale;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter implementing every storage port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> AuthUser {
        AuthUser {
            id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct MoodEntryRecord {
    id: Uuid,
    user_id: Uuid,
    mood_score: i32,
    mood_text: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}
impl MoodEntryRecord {
    fn to_domain(self) -> MoodEntry {
        MoodEntry {
            id: self.id,
            user_id: self.user_id,
            mood_score: self.mood_score,
            mood_text: self.mood_text,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

/// A row plus the match count of the whole query, before `LIMIT`.
struct Counted<R> {
    row: R,
    total_count: i64,
}

impl<'r, R: FromRow<'r, PgRow>> FromRow<'r, PgRow> for Counted<R> {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            row: R::from_row(row)?,
            total_count: row.try_get("total_count")?,
        })
    }
}

fn into_page<R, T>(records: Vec<Counted<R>>, to_domain: fn(R) -> T) -> Page<T> {
    let count = records.first().map_or(0, |r| r.total_count as usize);
    Page {
        rows: records.into_iter().map(|r| to_domain(r.row)).collect(),
        count,
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    user_id: Uuid,
    full_name: Option<String>,
    preferred_language: String,
    updated_at: DateTime<Utc>,
}
impl ProfileRecord {
    fn to_domain(self) -> PortResult<Profile> {
        let preferred_language = self
            .preferred_language
            .parse::<Locale>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Profile {
            user_id: self.user_id,
            full_name: self.full_name,
            preferred_language,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct FeedbackRecord {
    id: Uuid,
    user_id: Uuid,
    message: String,
    rating: i32,
    screen_name: Option<String>,
    created_at: DateTime<Utc>,
}
impl FeedbackRecord {
    fn to_domain(self) -> Feedback {
        Feedback {
            id: self.id,
            user_id: self.user_id,
            message: self.message,
            rating: self.rating,
            screen_name: self.screen_name,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// Query Building
//=========================================================================================

const MOOD_COLUMNS: &str = "id, user_id, mood_score, mood_text, notes, created_at";
const FEEDBACK_COLUMNS: &str = "id, user_id, message, rating, screen_name, created_at";

fn push_mood_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &[MoodFilter]) {
    let mut joiner = " WHERE ";
    for filter in filters {
        qb.push(joiner);
        joiner = " AND ";
        match filter {
            MoodFilter::Id(id) => qb.push("id = ").push_bind(*id),
            MoodFilter::UserId(user_id) => qb.push("user_id = ").push_bind(*user_id),
            MoodFilter::MoodScore(score) => qb.push("mood_score = ").push_bind(*score),
        };
    }
}

fn push_feedback_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &[FeedbackFilter]) {
    let mut joiner = " WHERE ";
    for filter in filters {
        qb.push(joiner);
        joiner = " AND ";
        match filter {
            FeedbackFilter::Id(id) => qb.push("id = ").push_bind(*id),
            FeedbackFilter::UserId(user_id) => qb.push("user_id = ").push_bind(*user_id),
            FeedbackFilter::Rating(rating) => qb.push("rating = ").push_bind(*rating),
            FeedbackFilter::ScreenName(name) => qb.push("screen_name = ").push_bind(name.clone()),
        };
    }
}

fn push_order_and_limit<C>(
    qb: &mut QueryBuilder<'_, Postgres>,
    order: Option<OrderBy<C>>,
    column_name: fn(C) -> &'static str,
    limit: Option<u32>,
) {
    if let Some(order) = order {
        qb.push(" ORDER BY ").push(column_name(order.column));
        qb.push(match order.direction {
            SortDirection::Ascending => " ASC",
            SortDirection::Descending => " DESC",
        });
    }
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(i64::from(limit));
    }
}

fn mood_column(column: MoodColumn) -> &'static str {
    match column {
        MoodColumn::CreatedAt => "created_at",
        MoodColumn::MoodScore => "mood_score",
    }
}

fn feedback_column(column: FeedbackColumn) -> &'static str {
    match column {
        FeedbackColumn::CreatedAt => "created_at",
        FeedbackColumn::Rating => "rating",
    }
}

//=========================================================================================
// Repository Trait Implementations
//=========================================================================================

#[async_trait]
impl MoodEntryRepository for DbAdapter {
    async fn insert(&self, entry: NewMoodEntry) -> PortResult<MoodEntry> {
        let record = sqlx::query_as::<_, MoodEntryRecord>(
            "INSERT INTO mood_entries (id, user_id, mood_score, mood_text, notes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, mood_score, mood_text, notes, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.mood_score)
        .bind(entry.mood_text)
        .bind(entry.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn select(&self, query: &MoodQuery) -> PortResult<Page<MoodEntry>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(MOOD_COLUMNS)
            .push(", COUNT(*) OVER () AS total_count FROM mood_entries");
        push_mood_filters(&mut qb, &query.filters);
        push_order_and_limit(&mut qb, query.order, mood_column, query.limit);

        let records = qb
            .build_query_as::<Counted<MoodEntryRecord>>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(into_page(records, MoodEntryRecord::to_domain))
    }

    async fn update(
        &self,
        filters: &[MoodFilter],
        patch: &MoodEntryPatch,
    ) -> PortResult<MoodEntry> {
        if patch.is_empty() {
            return Err(PortError::Unexpected("empty mood update".to_string()));
        }
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE mood_entries SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(score) = patch.mood_score {
                set.push("mood_score = ").push_bind_unseparated(score);
            }
            if let Some(text) = &patch.mood_text {
                set.push("mood_text = ").push_bind_unseparated(text.clone());
            }
            if let Some(notes) = &patch.notes {
                set.push("notes = ").push_bind_unseparated(notes.clone());
            }
        }
        push_mood_filters(&mut qb, filters);
        qb.push(" RETURNING ").push(MOOD_COLUMNS);

        qb.build_query_as::<MoodEntryRecord>()
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .map(MoodEntryRecord::to_domain)
            .ok_or_else(|| PortError::NotFound("mood entry".to_string()))
    }

    async fn delete(&self, filters: &[MoodFilter]) -> PortResult<u64> {
        if filters.is_empty() {
            return Err(PortError::Forbidden(
                "refusing to delete mood entries without a filter".to_string(),
            ));
        }
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM mood_entries");
        push_mood_filters(&mut qb, filters);
        let result = qb.build().execute(&self.pool).await.map_err(unexpected)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProfileRepository for DbAdapter {
    async fn find(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        sqlx::query_as::<_, ProfileRecord>(
            "SELECT user_id, full_name, preferred_language, updated_at FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .map(ProfileRecord::to_domain)
        .transpose()
    }

    async fn upsert(&self, user_id: Uuid, changes: &ProfileChanges) -> PortResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "INSERT INTO profiles (user_id, full_name, preferred_language, updated_at) \
             VALUES ($1, $2, COALESCE($3, 'th'), NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 full_name = COALESCE(EXCLUDED.full_name, profiles.full_name), \
                 preferred_language = COALESCE($3, profiles.preferred_language), \
                 updated_at = NOW() \
             RETURNING user_id, full_name, preferred_language, updated_at",
        )
        .bind(user_id)
        .bind(changes.full_name.as_deref())
        .bind(changes.preferred_language.map(Locale::code))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }
}

#[async_trait]
impl FeedbackRepository for DbAdapter {
    async fn insert(&self, feedback: NewFeedback) -> PortResult<Feedback> {
        let record = sqlx::query_as::<_, FeedbackRecord>(
            "INSERT INTO feedback (id, user_id, message, rating, screen_name) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, message, rating, screen_name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(feedback.user_id)
        .bind(feedback.message)
        .bind(feedback.rating)
        .bind(feedback.screen_name)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn select(&self, query: &FeedbackQuery) -> PortResult<Page<Feedback>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(FEEDBACK_COLUMNS)
            .push(", COUNT(*) OVER () AS total_count FROM feedback");
        push_feedback_filters(&mut qb, &query.filters);
        push_order_and_limit(&mut qb, query.order, feedback_column, query.limit);

        let records = qb
            .build_query_as::<Counted<FeedbackRecord>>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(into_page(records, FeedbackRecord::to_domain))
    }
}

//=========================================================================================
// `CredentialStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CredentialStore for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<AuthUser> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("User {} already exists", email))
            }
            other => unexpected(other),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            other => unexpected(other),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        // Expired rows are only ever rejected, so clear them out as new ones arrive.
        let purged = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?
            .rows_affected();
        if purged > 0 {
            debug!(purged, "Removed expired auth sessions");
        }

        sqlx::query(
            "INSERT INTO auth_sessions (session_id, user_id, expires_at) \
             VALUES ($1, $2, $3)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthUser> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT u.user_id, u.email FROM auth_sessions s \
             JOIN users u ON u.user_id = s.user_id \
             WHERE s.session_id = $1 AND s.expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .map(UserRecord::to_domain)
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
