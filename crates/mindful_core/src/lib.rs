pub mod auth;
pub mod catalog;
pub mod chat;
pub mod data;
pub mod domain;
pub mod i18n;
pub mod locale;
pub mod navigation;
pub mod ports;
pub mod preferences;
pub mod rate_limit;
pub mod validation;

pub use auth::{AuthError, AuthEvent, SessionManager};
pub use chat::{generate_reply, ChatError, ChatSession, ChatState, Message, MessageId};
pub use data::{DataAccess, DataError, DataResult, Lookup, Repositories};
pub use domain::{
    AuthUser, Feedback, FeedbackDraft, IssuedSession, MoodEntry, MoodEntryDraft, MoodEntryPatch,
    NewFeedback, NewMoodEntry, Profile, ProfileChanges, ProfileUpdate, UserCredentials,
};
pub use locale::{Locale, LocaleChanged, LocaleManager};
pub use ports::{
    AuthProvider, CredentialStore, FeedbackRepository, MoodEntryRepository, PortError, PortResult,
    ProfileRepository,
};
pub use rate_limit::RateLimiter;
pub use validation::ValidationError;
