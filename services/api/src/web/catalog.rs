//! services/api/src/web/catalog.rs
//!
//! Read-only library endpoints: guided content, the therapist directory and
//! the tip of the day. Open to visitors; answered in the request's language.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{NaiveDate, Utc};
use mindful_core::catalog::{self, ContentItem, ContentKind, Therapist, TherapistFilter};
use mindful_core::i18n::translate;
use mindful_core::Locale;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::web::{cookies, response::request_locale, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct ContentResponse {
    pub id: String,
    /// `meditation`, `breathing` or `article`.
    pub kind: String,
    pub title: String,
    pub duration_minutes: u32,
    pub theme: String,
    pub premium: bool,
    pub rating: f32,
    pub description: String,
}

impl From<ContentItem> for ContentResponse {
    fn from(item: ContentItem) -> Self {
        let kind = match item.kind {
            ContentKind::Meditation => "meditation",
            ContentKind::Breathing => "breathing",
            ContentKind::Article => "article",
        };
        Self {
            id: item.id.to_string(),
            kind: kind.to_string(),
            title: item.title.to_string(),
            duration_minutes: item.duration_minutes,
            theme: item.theme.to_string(),
            premium: item.premium,
            rating: item.rating,
            description: item.description.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TherapistResponse {
    pub id: String,
    pub name: String,
    pub specialties: Vec<String>,
    pub experience_years: u32,
    pub rating: f32,
    pub review_count: u32,
    /// Thai baht.
    pub price_per_session: u32,
    pub location: String,
    pub languages: String,
    pub premium_only: bool,
    pub next_available: String,
}

impl From<Therapist> for TherapistResponse {
    fn from(t: Therapist) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.to_string(),
            specialties: t.specialties.into_iter().map(str::to_string).collect(),
            experience_years: t.experience_years,
            rating: t.rating,
            review_count: t.review_count,
            price_per_session: t.price_per_session,
            location: t.location.to_string(),
            languages: t.languages.to_string(),
            premium_only: t.premium_only,
            next_available: t.next_available.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TipResponse {
    /// Translated heading, "Daily Tip".
    pub title: String,
    pub tip: String,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "th")]
    pub locale: Locale,
}

#[derive(Deserialize, IntoParams)]
pub struct ContentParams {
    /// One of `meditation`, `breathing`, `article`.
    #[param(value_type = Option<String>)]
    pub kind: Option<ContentKind>,
    /// Case-insensitive text in the title, theme or description.
    pub q: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct TherapistParams {
    pub query: Option<String>,
    /// A city, in Thai or English.
    pub location: Option<String>,
    /// A specialty name, in Thai or English.
    pub specialty: Option<String>,
}

/// The signed-in user's language if the cookie holds a live session.
async fn locale_for(state: &AppState, headers: &HeaderMap) -> Locale {
    let user = match cookies::session_token(headers) {
        Some(token) => state.sessions.current_user(token).await,
        None => None,
    };
    request_locale(state, user.as_ref(), headers).await
}

#[utoipa::path(
    get,
    path = "/content",
    params(ContentParams),
    responses((status = 200, description = "Matching library entries", body = [ContentResponse]))
)]
pub async fn list_content_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ContentParams>,
) -> Json<Vec<ContentResponse>> {
    let locale = locale_for(&state, &headers).await;
    let items = catalog::search_content(locale, params.kind, params.q.as_deref());
    Json(items.into_iter().map(ContentResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/therapists",
    params(TherapistParams),
    responses((status = 200, description = "Matching therapists", body = [TherapistResponse]))
)]
pub async fn list_therapists_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<TherapistParams>,
) -> Json<Vec<TherapistResponse>> {
    let locale = locale_for(&state, &headers).await;
    let filter = TherapistFilter {
        query: params.query,
        location: params.location,
        specialty: params.specialty,
    };
    let therapists = catalog::search_therapists(locale, &filter);
    Json(therapists.into_iter().map(TherapistResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/tips/today",
    responses((status = 200, description = "Today's tip", body = TipResponse))
)]
pub async fn daily_tip_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<TipResponse> {
    let locale = locale_for(&state, &headers).await;
    let date = Utc::now().date_naive();
    Json(TipResponse {
        title: translate(locale, "home.daily_tip").to_string(),
        tip: catalog::daily_tip(locale, date).to_string(),
        date,
        locale,
    })
}
