//! services/api/src/web/prefs.rs
//!
//! Visitor preferences kept in cookies: the consent answer and the display
//! language, plus the translation tables the client renders with.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use mindful_core::preferences::ClientPreferences;
use mindful_core::{i18n, DataError, Locale, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::web::{
    cookies,
    response::{data_failure, not_found, request_locale, ApiResult, ErrorBody},
    rest::LanguageRequest,
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct TranslationsResponse {
    #[schema(value_type = String, example = "en")]
    pub locale: Locale,
    pub translations: BTreeMap<String, String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ConsentRequest {
    pub granted: bool,
}

#[derive(Serialize, ToSchema)]
pub struct PreferencesResponse {
    /// Null until the visitor answered the consent prompt.
    pub consent: Option<bool>,
    pub consent_date: Option<DateTime<Utc>>,
    /// The language the service answers this visitor in.
    #[schema(value_type = String, example = "th")]
    pub language: Locale,
}

fn with_cookies(prefs: &ClientPreferences, language: Locale) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    for cookie in cookies::preference_cookies(prefs) {
        headers.append(header::SET_COOKIE, cookie);
    }
    let body = PreferencesResponse {
        consent: prefs.consent,
        consent_date: prefs.consent_date,
        language,
    };
    (headers, Json(body))
}

/// The full translation table for one language.
#[utoipa::path(
    get,
    path = "/i18n/{locale}",
    params(("locale" = String, Path, description = "`th` or `en`")),
    responses(
        (status = 200, description = "Every key with its text", body = TranslationsResponse),
        (status = 404, description = "Unsupported language", body = ErrorBody)
    )
)]
pub async fn translations_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> ApiResult<Json<TranslationsResponse>> {
    let Ok(locale) = code.parse::<Locale>() else {
        return Err(not_found(request_locale(&state, None, &headers).await));
    };
    let translations = i18n::table(locale)
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Ok(Json(TranslationsResponse {
        locale,
        translations,
    }))
}

#[utoipa::path(
    get,
    path = "/privacy/consent",
    responses((status = 200, description = "Stored preferences", body = PreferencesResponse))
)]
pub async fn get_consent_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<PreferencesResponse> {
    let prefs = cookies::preferences(&headers);
    Json(PreferencesResponse {
        consent: prefs.consent,
        consent_date: prefs.consent_date,
        language: prefs.locale_or(state.locales.fallback()),
    })
}

/// Record the visitor's answer to the data-processing prompt.
#[utoipa::path(
    post,
    path = "/privacy/consent",
    request_body = ConsentRequest,
    responses((status = 200, description = "Answer stored in cookies", body = PreferencesResponse))
)]
pub async fn record_consent_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ConsentRequest>,
) -> impl IntoResponse {
    let mut prefs = cookies::preferences(&headers);
    prefs.record_consent(req.granted, Utc::now());
    info!(granted = req.granted, "Consent answer recorded");
    let language = prefs.locale_or(state.locales.fallback());
    with_cookies(&prefs, language)
}

/// Pick the display language. Signed-in users also get it stored on their
/// profile, and their open chats switch.
#[utoipa::path(
    put,
    path = "/preferences/language",
    request_body = LanguageRequest,
    responses(
        (status = 200, description = "Language stored in cookies", body = PreferencesResponse),
        (status = 400, description = "Unsupported language", body = ErrorBody)
    )
)]
pub async fn set_language_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LanguageRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = match cookies::session_token(&headers) {
        Some(token) => state.sessions.current_user(token).await,
        None => None,
    };
    let current = request_locale(&state, user.as_ref(), &headers).await;
    let selected = req.locale.parse::<Locale>().map_err(|_| {
        let err = ValidationError::UnsupportedLanguage(req.locale.clone());
        data_failure(&DataError::Invalid(err), current)
    })?;

    if let Some(user) = &user {
        state.locales.select(user.id, selected).await;
        let stored = state
            .data
            .for_user(Some(user))
            .set_preferred_language(selected)
            .await;
        if let Some(e) = stored.error {
            warn!(user_id = %user.id, "Failed to store language preference: {}", e);
        }
    }

    let mut prefs = cookies::preferences(&headers);
    prefs.select_language(selected);
    Ok(with_cookies(&prefs, selected))
}
