//! crates/mindful_core/src/auth.rs
//!
//! The session manager: rate-limited, validated sign-in/up/out on top of the
//! auth provider port, with provider failures mapped to fixed user-facing
//! errors and session changes broadcast to whoever listens.

use crate::domain::{AuthUser, IssuedSession};
use crate::i18n::translate;
use crate::locale::Locale;
use crate::ports::{AuthProvider, PortError};
use crate::rate_limit::RateLimiter;
use crate::validation::{validate_email, validate_password, ValidationError};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut { user_id: Uuid },
}

/// What a caller may show the user. Provider details never end up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Too many attempts")]
    RateLimited,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already registered")]
    AlreadyRegistered,
    #[error("Email not confirmed")]
    EmailNotConfirmed,
    #[error("Sign in failed")]
    SignInFailed,
    #[error("Registration failed")]
    SignUpFailed,
    #[error("Sign out failed")]
    SignOutFailed,
    #[error("Authentication required")]
    Unauthenticated,
}

impl AuthError {
    pub fn message_key(&self) -> &'static str {
        match self {
            AuthError::RateLimited => "auth.error.rate_limited",
            AuthError::Invalid(ValidationError::InvalidEmail) => "auth.error.invalid_email",
            AuthError::Invalid(ValidationError::WeakPassword(_)) => "auth.error.weak_password",
            AuthError::Invalid(_) => "data.error.invalid_input",
            AuthError::InvalidCredentials => "auth.error.invalid_credentials",
            AuthError::AlreadyRegistered => "auth.error.already_registered",
            AuthError::EmailNotConfirmed => "auth.error.email_not_confirmed",
            AuthError::SignInFailed => "auth.error.sign_in_failed",
            AuthError::SignUpFailed => "auth.error.sign_up_failed",
            AuthError::SignOutFailed => "auth.error.sign_out_failed",
            AuthError::Unauthenticated => "auth.error.required",
        }
    }

    pub fn message(&self, locale: Locale) -> &'static str {
        translate(locale, self.message_key())
    }
}

pub struct SessionManager {
    provider: Arc<dyn AuthProvider>,
    limiter: RateLimiter,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn AuthProvider>, limiter: RateLimiter) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            provider,
            limiter,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Rate limit, then validate, then ask the provider.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let email = self.admit(email)?;

        match self.provider.sign_in(&email, password).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "User signed in");
                self.publish(AuthEvent::SignedIn(session.user.clone()));
                Ok(session)
            }
            Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => {
                warn!("Sign in rejected: invalid credentials");
                Err(AuthError::InvalidCredentials)
            }
            Err(PortError::EmailNotConfirmed) => {
                warn!("Sign in rejected: email not confirmed");
                Err(AuthError::EmailNotConfirmed)
            }
            Err(e) => {
                error!("Sign in error: {:?}", e);
                Err(AuthError::SignInFailed)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let email = self.admit(email)?;
        validate_password(password)?;

        match self.provider.sign_up(&email, password).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "User registered");
                self.publish(AuthEvent::SignedIn(session.user.clone()));
                Ok(session)
            }
            Err(PortError::Conflict(_)) => {
                warn!("Sign up rejected: email already registered");
                Err(AuthError::AlreadyRegistered)
            }
            Err(PortError::PasswordRejected(reason)) => {
                warn!("Sign up rejected by password policy: {}", reason);
                Err(AuthError::Invalid(ValidationError::WeakPassword(
                    "Password does not meet security requirements",
                )))
            }
            Err(e) => {
                error!("Sign up error: {:?}", e);
                Err(AuthError::SignUpFailed)
            }
        }
    }

    /// Ends the session behind `token` and returns who it belonged to, if anyone.
    pub async fn sign_out(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        let user = self.current_user(token).await;

        self.provider.sign_out(token).await.map_err(|e| {
            error!("Sign out error: {:?}", e);
            AuthError::SignOutFailed
        })?;

        if let Some(user) = &user {
            info!(user_id = %user.id, "User signed out");
            self.publish(AuthEvent::SignedOut { user_id: user.id });
        }
        Ok(user)
    }

    /// The user behind a session token; `None` for unknown or expired tokens.
    pub async fn current_user(&self, token: &str) -> Option<AuthUser> {
        match self.provider.session_user(token).await {
            Ok(user) => Some(user),
            Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => {
                debug!("Session token not recognised");
                None
            }
            Err(e) => {
                error!("Failed to resolve session: {:?}", e);
                None
            }
        }
    }

    fn admit(&self, email: &str) -> Result<String, AuthError> {
        let key = email.trim().to_lowercase();
        if !self.limiter.check(&key) {
            warn!("Auth attempt rate limited");
            return Err(AuthError::RateLimited);
        }
        Ok(validate_email(email)?.to_lowercase())
    }

    fn publish(&self, event: AuthEvent) {
        // Nobody subscribed is not an error.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::num::NonZeroU32;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Plain-text credentials; good enough to drive the manager.
    #[derive(Default)]
    struct FakeProvider {
        users: Mutex<HashMap<String, (AuthUser, String)>>,
        sessions: Mutex<HashMap<String, AuthUser>>,
        broken: bool,
        /// Sign-in answers as a hosted service does for unconfirmed accounts.
        unconfirmed: bool,
        /// Sign-up answers as a hosted service with a stricter password policy.
        strict_passwords: bool,
    }

    impl FakeProvider {
        async fn issue(&self, user: AuthUser) -> IssuedSession {
            let token = Uuid::new_v4().to_string();
            self.sessions.lock().await.insert(token.clone(), user.clone());
            IssuedSession {
                token,
                user,
                expires_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn sign_up(&self, email: &str, password: &str) -> PortResult<IssuedSession> {
            if self.broken {
                return Err(PortError::Unexpected("db down".into()));
            }
            if self.strict_passwords {
                return Err(PortError::PasswordRejected("needs 12 characters".into()));
            }
            let mut users = self.users.lock().await;
            if users.contains_key(email) {
                return Err(PortError::Conflict(email.into()));
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: email.into(),
            };
            users.insert(email.into(), (user.clone(), password.into()));
            drop(users);
            Ok(self.issue(user).await)
        }

        async fn sign_in(&self, email: &str, password: &str) -> PortResult<IssuedSession> {
            if self.broken {
                return Err(PortError::Unexpected("db down".into()));
            }
            let user = match self.users.lock().await.get(email) {
                Some((user, stored)) if stored == password => user.clone(),
                _ => return Err(PortError::Unauthorized),
            };
            if self.unconfirmed {
                return Err(PortError::EmailNotConfirmed);
            }
            Ok(self.issue(user).await)
        }

        async fn sign_out(&self, token: &str) -> PortResult<()> {
            self.sessions.lock().await.remove(token);
            Ok(())
        }

        async fn session_user(&self, token: &str) -> PortResult<AuthUser> {
            self.sessions
                .lock()
                .await
                .get(token)
                .cloned()
                .ok_or(PortError::Unauthorized)
        }
    }

    fn manager_with(provider: FakeProvider, max: u32) -> SessionManager {
        SessionManager::new(
            Arc::new(provider),
            RateLimiter::new(NonZeroU32::new(max).unwrap(), Duration::from_secs(900)),
        )
    }

    const PASSWORD: &str = "Calm-Mind1";

    #[tokio::test]
    async fn sign_up_then_sign_in_and_out() {
        let manager = manager_with(FakeProvider::default(), 10);
        let mut events = manager.subscribe();

        let registered = manager.sign_up("Nok@Example.com", PASSWORD).await.unwrap();
        assert_eq!(registered.user.email, "nok@example.com");

        let session = manager.sign_in("nok@example.com", PASSWORD).await.unwrap();
        assert_eq!(
            manager.current_user(&session.token).await,
            Some(session.user.clone())
        );

        let gone = manager.sign_out(&session.token).await.unwrap();
        assert_eq!(gone, Some(session.user.clone()));
        assert_eq!(manager.current_user(&session.token).await, None);

        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(_)));
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(_)));
        assert_eq!(
            events.recv().await.unwrap(),
            AuthEvent::SignedOut {
                user_id: session.user.id
            }
        );
    }

    #[tokio::test]
    async fn provider_errors_map_to_fixed_messages() {
        let manager = manager_with(FakeProvider::default(), 10);
        manager.sign_up("a@b.co", PASSWORD).await.unwrap();

        assert_eq!(
            manager.sign_up("a@b.co", PASSWORD).await.unwrap_err(),
            AuthError::AlreadyRegistered
        );
        let wrong = manager.sign_in("a@b.co", "Wrong-pass1").await.unwrap_err();
        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(
            wrong.message(Locale::En),
            "Invalid email or password. Please check your credentials and try again."
        );

        let broken = manager_with(
            FakeProvider {
                broken: true,
                ..Default::default()
            },
            10,
        );
        let err = broken.sign_in("a@b.co", PASSWORD).await.unwrap_err();
        assert_eq!(err, AuthError::SignInFailed);
        assert!(!err.message(Locale::En).contains("db down"));
    }

    #[tokio::test]
    async fn validation_runs_before_the_provider() {
        let manager = manager_with(FakeProvider::default(), 10);
        assert_eq!(
            manager.sign_in("nope", PASSWORD).await.unwrap_err(),
            AuthError::Invalid(ValidationError::InvalidEmail)
        );
        let weak = manager.sign_up("a@b.co", "password").await.unwrap_err();
        assert_eq!(weak.message_key(), "auth.error.weak_password");
    }

    #[tokio::test]
    async fn attempts_are_rate_limited_per_email() {
        let manager = manager_with(FakeProvider::default(), 2);
        for _ in 0..2 {
            assert_eq!(
                manager.sign_in("x@y.co", PASSWORD).await.unwrap_err(),
                AuthError::InvalidCredentials
            );
        }
        assert_eq!(
            manager.sign_in(" X@Y.co ", PASSWORD).await.unwrap_err(),
            AuthError::RateLimited
        );
        assert_eq!(
            manager.sign_in("other@y.co", PASSWORD).await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn hosted_provider_rejections_keep_their_meaning() {
        let provider = FakeProvider {
            unconfirmed: true,
            ..Default::default()
        };
        provider.users.lock().await.insert(
            "new@b.co".into(),
            (
                AuthUser {
                    id: Uuid::new_v4(),
                    email: "new@b.co".into(),
                },
                PASSWORD.into(),
            ),
        );
        let manager = manager_with(provider, 10);
        let err = manager.sign_in("new@b.co", PASSWORD).await.unwrap_err();
        assert_eq!(err, AuthError::EmailNotConfirmed);
        assert_eq!(
            err.message(Locale::En),
            "Please check your email and click the confirmation link before signing in."
        );

        let strict = manager_with(
            FakeProvider {
                strict_passwords: true,
                ..Default::default()
            },
            10,
        );
        let err = strict.sign_up("a@b.co", PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::Invalid(ValidationError::WeakPassword(_))));
        assert_eq!(err.message_key(), "auth.error.weak_password");
    }
}
