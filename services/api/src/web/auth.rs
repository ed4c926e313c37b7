//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout and the current
//! session.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use mindful_core::navigation::AppRoute;
use mindful_core::{AuthError, IssuedSession, Lookup};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    cookies,
    response::{auth_failure, request_locale, ApiResult, ErrorBody},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    /// Shown in the app; stored on the profile.
    pub full_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    /// Where the client goes next.
    pub redirect_to: String,
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub redirect_to: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub email: String,
}

fn signed_in(
    state: &AppState,
    status: StatusCode,
    session: IssuedSession,
) -> impl IntoResponse {
    let max_age = chrono::Duration::days(state.config.session_ttl_days).num_seconds();
    let cookie = cookies::session_cookie(&session.token, max_age);
    let response = AuthResponse {
        user_id: session.user.id,
        email: session.user.email,
        redirect_to: AppRoute::AFTER_SIGN_IN.path().to_string(),
    };
    (status, [(header::SET_COOKIE, cookie)], Json(response))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid email or weak password", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 429, description = "Too many attempts", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let locale = request_locale(&state, None, &headers).await;
    let session = state
        .sessions
        .sign_up(&req.email, &req.password)
        .await
        .map_err(|e| auth_failure(&e, locale))?;

    // The account exists either way; a missing profile row is created on the first write.
    let profile = state
        .data
        .for_user(Some(&session.user))
        .init_profile(req.full_name.as_deref(), locale)
        .await;
    if let Some(e) = profile.error {
        warn!(user_id = %session.user.id, "Failed to create profile after signup: {}", e);
    }
    state.locales.seed(session.user.id, locale).await;

    Ok(signed_in(&state, StatusCode::CREATED, session))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Malformed email", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 403, description = "Email not confirmed", body = ErrorBody),
        (status = 429, description = "Too many attempts", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let locale = request_locale(&state, None, &headers).await;
    let session = state
        .sessions
        .sign_in(&req.email, &req.password)
        .await
        .map_err(|e| auth_failure(&e, locale))?;

    // The stored preference wins over whatever the visitor browsed in.
    match state.data.for_user(Some(&session.user)).profile().await.data {
        Some(Lookup::Found(profile)) => {
            state
                .locales
                .select(session.user.id, profile.preferred_language)
                .await
        }
        _ => state.locales.seed(session.user.id, locale).await,
    }

    Ok(signed_in(&state, StatusCode::OK, session))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
        (status = 401, description = "No active session", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let locale = request_locale(&state, None, &headers).await;
    let token = cookies::session_token(&headers)
        .ok_or_else(|| auth_failure(&AuthError::Unauthenticated, locale))?;

    let user = state
        .sessions
        .sign_out(token)
        .await
        .map_err(|e| auth_failure(&e, locale))?;
    // The language selection stays: other sessions of the same user keep it.
    if let Some(user) = user {
        info!(user_id = %user.id, "Session closed");
    }

    let response = LogoutResponse {
        redirect_to: AppRoute::SIGN_IN.path().to_string(),
    };
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookies::clear_session_cookie())],
        Json(response),
    ))
}

/// GET /auth/session - The user behind the session cookie
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>> {
    let user = match cookies::session_token(&headers) {
        Some(token) => state.sessions.current_user(token).await,
        None => None,
    };
    match user {
        Some(user) => Ok(Json(SessionResponse {
            user_id: user.id,
            email: user.email,
        })),
        None => {
            let locale = request_locale(&state, None, &headers).await;
            Err(auth_failure(&AuthError::Unauthenticated, locale))
        }
    }
}
