//! services/api/src/adapters/password_auth.rs
//!
//! Email/password authentication with argon2 hashes and opaque session tokens,
//! implementing the `AuthProvider` port over any `CredentialStore`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use mindful_core::domain::{AuthUser, IssuedSession};
use mindful_core::ports::{AuthProvider, CredentialStore, PortError, PortResult};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

pub struct PasswordAuthProvider {
    store: Arc<dyn CredentialStore>,
    session_ttl: Duration,
}

impl PasswordAuthProvider {
    pub fn new(store: Arc<dyn CredentialStore>, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    async fn issue_session(&self, user: AuthUser) -> PortResult<IssuedSession> {
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.session_ttl;
        self.store
            .create_auth_session(&token, user.id, expires_at)
            .await?;
        Ok(IssuedSession {
            token,
            user,
            expires_at,
        })
    }
}

fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            PortError::Unexpected("Failed to hash password".to_string())
        })
}

fn verify_password(password: &str, stored: &str) -> PortResult<bool> {
    let parsed_hash = PasswordHash::new(stored).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        PortError::Unexpected("Stored password hash is unreadable".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[async_trait]
impl AuthProvider for PasswordAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<IssuedSession> {
        let password_hash = hash_password(password)?;
        let user = self
            .store
            .create_user_with_email(email, &password_hash)
            .await?;
        self.issue_session(user).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<IssuedSession> {
        let credentials = match self.store.get_user_by_email(email).await {
            Ok(credentials) => credentials,
            Err(PortError::NotFound(_)) => {
                debug!("Sign in for unknown email");
                return Err(PortError::Unauthorized);
            }
            Err(e) => return Err(e),
        };
        if !verify_password(password, &credentials.hashed_password)? {
            return Err(PortError::Unauthorized);
        }
        self.issue_session(AuthUser {
            id: credentials.user_id,
            email: credentials.email,
        })
        .await
    }

    async fn sign_out(&self, token: &str) -> PortResult<()> {
        self.store.delete_auth_session(token).await
    }

    async fn session_user(&self, token: &str) -> PortResult<AuthUser> {
        self.store.validate_auth_session(token).await
    }
}
