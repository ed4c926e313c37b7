//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::{
    cookies,
    response::{seed_locale, ErrorBody},
    state::AppState,
};
use mindful_core::AuthError;

/// Middleware that resolves the session cookie to the signed-in user.
///
/// If valid, inserts the `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let prefs = cookies::preferences(req.headers());

    let user = match cookies::session_token(req.headers()) {
        Some(token) => state.sessions.current_user(token).await,
        None => None,
    };
    let Some(user) = user else {
        debug!(path = %req.uri().path(), "Rejected request without a live session");
        let locale = prefs.locale_or(state.locales.fallback());
        let err = AuthError::Unauthenticated;
        let body = ErrorBody {
            error: err.message(locale).to_string(),
            code: err.message_key().to_string(),
            detail: None,
        };
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    };

    seed_locale(&state, &user, req.headers()).await;

    req.extensions_mut().insert(user);
    next.run(req).await
}
