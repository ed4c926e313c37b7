//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use mindful_core::ports::{
    AuthProvider, CredentialStore, FeedbackRepository, MoodEntryRepository, ProfileRepository,
};
use mindful_core::{DataAccess, LocaleManager, RateLimiter, Repositories, SessionManager};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adapters::{MemoryStore, PasswordAuthProvider};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub data: DataAccess,
    pub sessions: SessionManager,
    pub locales: LocaleManager,
    /// Cancelled on server shutdown; open chat sockets close when it fires.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Arc<Config>, repos: Repositories, auth: Arc<dyn AuthProvider>) -> Self {
        let limiter = RateLimiter::new(config.auth_max_attempts, config.auth_window);
        Self {
            data: DataAccess::new(repos),
            sessions: SessionManager::new(auth, limiter),
            locales: LocaleManager::new(config.default_locale),
            shutdown: CancellationToken::new(),
            config,
        }
    }

    /// Wires every port to one store that also holds the credentials.
    pub fn with_store<S>(config: Arc<Config>, store: Arc<S>) -> Self
    where
        S: MoodEntryRepository + ProfileRepository + FeedbackRepository + CredentialStore + 'static,
    {
        let repos = Repositories {
            moods: store.clone(),
            profiles: store.clone(),
            feedback: store.clone(),
        };
        let ttl = chrono::Duration::days(config.session_ttl_days);
        let auth = Arc::new(PasswordAuthProvider::new(store, ttl));
        Self::new(config, repos, auth)
    }

    /// Everything in process memory.
    pub fn in_memory(config: Arc<Config>) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }
}
