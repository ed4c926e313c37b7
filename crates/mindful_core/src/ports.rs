//! crates/mindful_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or the
//! auth backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AuthUser, Feedback, IssuedSession, MoodEntry, MoodEntryPatch, NewFeedback, NewMoodEntry,
    Profile, ProfileChanges, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The account exists but its email address was never confirmed.
    #[error("Email not confirmed")]
    EmailNotConfirmed,
    /// The auth backend refused the password under its own policy.
    #[error("Password rejected: {0}")]
    PasswordRejected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Query Shapes
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<C> {
    pub column: C,
    pub direction: SortDirection,
}

/// Equality filters (all must hold), an optional single-column ordering and an
/// optional row limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<F, C> {
    pub filters: Vec<F>,
    pub order: Option<OrderBy<C>>,
    pub limit: Option<u32>,
}

impl<F, C> Default for Query<F, C> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }
}

impl<F, C> Query<F, C> {
    pub fn filter(mut self, filter: F) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, column: C, direction: SortDirection) -> Self {
        self.order = Some(OrderBy { column, direction });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Filters that know how to express row ownership, so the user-scoped layer
/// can strip caller-supplied ownership and force its own.
pub trait OwnershipFilter: Sized {
    fn owned_by(user_id: Uuid) -> Self;
    fn is_ownership(&self) -> bool;
}

/// Rows matching a query plus the number of matches before the limit applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodFilter {
    Id(Uuid),
    UserId(Uuid),
    MoodScore(i32),
}

impl OwnershipFilter for MoodFilter {
    fn owned_by(user_id: Uuid) -> Self {
        MoodFilter::UserId(user_id)
    }

    fn is_ownership(&self) -> bool {
        matches!(self, MoodFilter::UserId(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodColumn {
    CreatedAt,
    MoodScore,
}

pub type MoodQuery = Query<MoodFilter, MoodColumn>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackFilter {
    Id(Uuid),
    UserId(Uuid),
    Rating(i32),
    ScreenName(String),
}

impl OwnershipFilter for FeedbackFilter {
    fn owned_by(user_id: Uuid) -> Self {
        FeedbackFilter::UserId(user_id)
    }

    fn is_ownership(&self) -> bool {
        matches!(self, FeedbackFilter::UserId(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackColumn {
    CreatedAt,
    Rating,
}

pub type FeedbackQuery = Query<FeedbackFilter, FeedbackColumn>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait MoodEntryRepository: Send + Sync {
    async fn insert(&self, entry: NewMoodEntry) -> PortResult<MoodEntry>;

    async fn select(&self, query: &MoodQuery) -> PortResult<Page<MoodEntry>>;

    /// Updates the single row matching every filter. `NotFound` when none does.
    async fn update(
        &self,
        filters: &[MoodFilter],
        patch: &MoodEntryPatch,
    ) -> PortResult<MoodEntry>;

    /// Deletes every row matching the filters and reports how many went.
    async fn delete(&self, filters: &[MoodFilter]) -> PortResult<u64>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find(&self, user_id: Uuid) -> PortResult<Option<Profile>>;

    /// Creates the user's row on first write, otherwise updates the given columns.
    async fn upsert(&self, user_id: Uuid, changes: &ProfileChanges) -> PortResult<Profile>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn insert(&self, feedback: NewFeedback) -> PortResult<Feedback>;

    async fn select(&self, query: &FeedbackQuery) -> PortResult<Page<Feedback>>;
}

/// Storage for accounts and browser sessions, backing the password auth provider.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Conflict` when the email is already registered.
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<AuthUser>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// `Unauthorized` when the session is unknown or expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthUser>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

/// The hosted authentication backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `Conflict` when the address is taken.
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<IssuedSession>;

    /// `Unauthorized` on unknown email or wrong password.
    async fn sign_in(&self, email: &str, password: &str) -> PortResult<IssuedSession>;

    async fn sign_out(&self, token: &str) -> PortResult<()>;

    /// The user behind a live session token.
    async fn session_user(&self, token: &str) -> PortResult<AuthUser>;
}
