//! services/api/src/web/response.rs
//!
//! The error body every handler answers with, and the mapping from core
//! errors to status codes. Messages are the fixed, translated texts; backend
//! detail only reaches the log.

use axum::{http::StatusCode, Json};
use mindful_core::{AuthError, AuthUser, DataError, DataResult, Locale, Lookup};
use serde::Serialize;
use utoipa::ToSchema;

use crate::web::{cookies, state::AppState};
use axum::http::HeaderMap;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Translated message safe to show the user.
    pub error: String,
    /// Translation key of `error`.
    pub code: String,
    /// Which input rule failed, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub type ApiFailure = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<T, ApiFailure>;

fn failure(
    status: StatusCode,
    code: &'static str,
    locale: Locale,
    detail: Option<String>,
) -> ApiFailure {
    (
        status,
        Json(ErrorBody {
            error: mindful_core::i18n::translate(locale, code).to_string(),
            code: code.to_string(),
            detail,
        }),
    )
}

pub fn auth_failure(err: &AuthError, locale: Locale) -> ApiFailure {
    let status = match err {
        AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AuthError::Invalid(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AuthError::AlreadyRegistered => StatusCode::CONFLICT,
        AuthError::EmailNotConfirmed => StatusCode::FORBIDDEN,
        AuthError::SignInFailed | AuthError::SignUpFailed | AuthError::SignOutFailed => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let detail = match err {
        AuthError::Invalid(v) => Some(v.to_string()),
        _ => None,
    };
    failure(status, err.message_key(), locale, detail)
}

pub fn data_failure(err: &DataError, locale: Locale) -> ApiFailure {
    let status = match err {
        DataError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        DataError::Invalid(_) => StatusCode::BAD_REQUEST,
        DataError::AccessDenied => StatusCode::FORBIDDEN,
        DataError::NotFound => StatusCode::NOT_FOUND,
        DataError::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let detail = match err {
        DataError::Invalid(v) => Some(v.to_string()),
        _ => None,
    };
    failure(status, err.message_key(), locale, detail)
}

pub fn bad_request(detail: String, locale: Locale) -> ApiFailure {
    failure(
        StatusCode::BAD_REQUEST,
        "data.error.invalid_input",
        locale,
        Some(detail),
    )
}

pub fn not_found(locale: Locale) -> ApiFailure {
    failure(StatusCode::NOT_FOUND, "data.error.not_found", locale, None)
}

/// Unwraps a data result or turns its error into a response.
pub fn data<T>(result: DataResult<T>, locale: Locale) -> ApiResult<T> {
    result.into_result().map_err(|e| data_failure(&e, locale))
}

/// The language to answer in: the user's selection when signed in, else the
/// language cookie, else the configured default.
pub async fn request_locale(
    state: &AppState,
    user: Option<&AuthUser>,
    headers: &HeaderMap,
) -> Locale {
    match user {
        Some(user) => {
            seed_locale(state, user, headers).await;
            state.locales.current(user.id).await
        }
        None => cookies::preferences(headers).locale_or(state.locales.fallback()),
    }
}

/// Seeds the user's language when this process has none for them yet (e.g.
/// after a restart): the stored profile preference wins, then a language chosen
/// before signing in.
pub async fn seed_locale(state: &AppState, user: &AuthUser, headers: &HeaderMap) {
    if state.locales.selection(user.id).await.is_some() {
        return;
    }
    let stored = match state.data.for_user(Some(user)).profile().await.data {
        Some(Lookup::Found(profile)) => Some(profile.preferred_language),
        _ => None,
    };
    if let Some(locale) = stored.or(cookies::preferences(headers).language) {
        state.locales.seed(user.id, locale).await;
    }
}
