//! services/api/src/web/pages.rs
//!
//! The page gate. Every app path either renders (described as JSON for the
//! client shell), redirects with 303, or is not found.

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Json, Redirect, Response},
};
use mindful_core::i18n::translate;
use mindful_core::navigation::{resolve, AppRoute, RouteDecision};
use mindful_core::Locale;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::web::{
    cookies,
    response::{not_found, request_locale, ErrorBody},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct PageResponse {
    pub route: String,
    /// Translated page title.
    pub title: String,
    pub requires_auth: bool,
    #[schema(value_type = String, example = "th")]
    pub locale: Locale,
    /// Whether the visitor accepted data processing.
    pub consented: bool,
}

/// Resolve an app path for the visitor behind the request cookies.
#[utoipa::path(
    get,
    path = "/app/{section}",
    params(("section" = String, Path, description = "home, chat, content, therapist or profile")),
    responses(
        (status = 200, description = "The page renders", body = PageResponse),
        (status = 303, description = "Sign in first, or already signed in"),
        (status = 404, description = "No such page", body = ErrorBody)
    )
)]
pub async fn page_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let user = match cookies::session_token(&headers) {
        Some(token) => state.sessions.current_user(token).await,
        None => None,
    };
    let locale = request_locale(&state, user.as_ref(), &headers).await;

    match resolve(uri.path(), user.is_some()) {
        RouteDecision::Render(route) => Json(page(route, locale, &headers)).into_response(),
        RouteDecision::Redirect(target) => {
            debug!(from = uri.path(), to = target.path(), "Redirecting");
            Redirect::to(target.path()).into_response()
        }
        RouteDecision::NotFound => not_found(locale).into_response(),
    }
}

fn page(route: AppRoute, locale: Locale, headers: &HeaderMap) -> PageResponse {
    PageResponse {
        route: route.path().to_string(),
        title: translate(locale, route.title_key()).to_string(),
        requires_auth: route.requires_auth(),
        locale,
        consented: cookies::preferences(headers).has_consented(),
    }
}

/// Unknown paths answer like unknown pages.
pub async fn fallback_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    not_found(request_locale(&state, None, &headers).await)
}
