//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the signed-in REST endpoints (mood journal,
//! profile, feedback) and the master definition of the OpenAPI document.

use crate::web::{
    auth, catalog, pages, prefs,
    response::{bad_request, data, data_failure, ApiResult, ErrorBody},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use mindful_core::domain::{Feedback, MoodEntry, Profile};
use mindful_core::ports::{
    FeedbackColumn, FeedbackQuery, MoodColumn, MoodFilter, MoodQuery, SortDirection,
};
use mindful_core::{
    AuthUser, DataError, FeedbackDraft, Locale, Lookup, MoodEntryDraft, MoodEntryPatch,
    ProfileUpdate, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::session_handler,
        list_moods_handler,
        create_mood_handler,
        update_mood_handler,
        delete_mood_handler,
        get_profile_handler,
        update_profile_handler,
        update_profile_language_handler,
        create_feedback_handler,
        list_feedback_handler,
        catalog::list_content_handler,
        catalog::list_therapists_handler,
        catalog::daily_tip_handler,
        prefs::translations_handler,
        prefs::get_consent_handler,
        prefs::record_consent_handler,
        prefs::set_language_handler,
        pages::page_handler,
    ),
    components(
        schemas(
            ErrorBody,
            auth::SignupRequest, auth::LoginRequest, auth::AuthResponse,
            auth::LogoutResponse, auth::SessionResponse,
            MoodEntryResponse, MoodListResponse, CreateMoodRequest, UpdateMoodRequest,
            ProfileResponse, ProfileEnvelope, UpdateProfileRequest, LanguageRequest,
            FeedbackResponse, FeedbackListResponse, CreateFeedbackRequest,
            catalog::ContentResponse, catalog::TherapistResponse, catalog::TipResponse,
            prefs::ConsentRequest, prefs::PreferencesResponse, prefs::TranslationsResponse,
            pages::PageResponse,
        )
    ),
    tags(
        (name = "Mindful Thai API", description = "Mental wellness companion: mood journal, chat, content and therapists.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct MoodEntryResponse {
    pub id: Uuid,
    pub mood_score: i32,
    pub mood_text: Option<String>,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MoodEntry> for MoodEntryResponse {
    fn from(entry: MoodEntry) -> Self {
        Self {
            id: entry.id,
            mood_score: entry.mood_score,
            mood_text: entry.mood_text,
            notes: entry.notes,
            created_at: entry.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MoodListResponse {
    pub data: Vec<MoodEntryResponse>,
    /// Matches before `limit` was applied.
    pub count: usize,
}

/// A `user_id` in the payload is accepted but never trusted.
#[derive(Deserialize, ToSchema)]
pub struct CreateMoodRequest {
    pub mood_score: i32,
    pub mood_text: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateMoodRequest {
    pub mood_score: Option<i32>,
    pub mood_text: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MoodSort {
    CreatedAt,
    MoodScore,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => SortDirection::Ascending,
            Direction::Desc => SortDirection::Descending,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct ListMoodsParams {
    pub mood_score: Option<i32>,
    /// Defaults to `created_at`.
    pub sort_by: Option<MoodSort>,
    /// Defaults to `desc`.
    pub order: Option<Direction>,
    pub limit: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    #[schema(value_type = String, example = "th")]
    pub preferred_language: Locale,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProfileResponse {
    fn new(profile: Profile, user: &AuthUser) -> Self {
        Self {
            user_id: profile.user_id,
            email: user.email.clone(),
            full_name: profile.full_name,
            preferred_language: profile.preferred_language,
            updated_at: profile.updated_at,
        }
    }
}

/// `profile` is null until the first profile write.
#[derive(Serialize, ToSchema)]
pub struct ProfileEnvelope {
    pub profile: Option<ProfileResponse>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: String,
    #[schema(value_type = String, example = "en")]
    pub preferred_language: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LanguageRequest {
    #[schema(value_type = String, example = "en")]
    pub locale: String,
}

#[derive(Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub message: String,
    pub rating: i32,
    pub screen_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            message: feedback.message,
            rating: feedback.rating,
            screen_name: feedback.screen_name,
            created_at: feedback.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FeedbackListResponse {
    pub data: Vec<FeedbackResponse>,
    pub count: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFeedbackRequest {
    pub message: String,
    pub rating: i32,
    pub screen_name: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Unsupported codes are a validation failure, reported like any other.
fn parse_locale(raw: &str, locale: Locale) -> ApiResult<Locale> {
    raw.parse::<Locale>().map_err(|_| {
        let err = ValidationError::UnsupportedLanguage(raw.to_string());
        data_failure(&DataError::Invalid(err), locale)
    })
}

//=========================================================================================
// Mood Journal
//=========================================================================================

/// List the signed-in user's mood entries.
#[utoipa::path(
    get,
    path = "/moods",
    params(ListMoodsParams),
    responses(
        (status = 200, description = "The user's entries", body = MoodListResponse),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn list_moods_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListMoodsParams>,
) -> ApiResult<Json<MoodListResponse>> {
    let locale = state.locales.current(user.id).await;

    let column = match params.sort_by.unwrap_or(MoodSort::CreatedAt) {
        MoodSort::CreatedAt => MoodColumn::CreatedAt,
        MoodSort::MoodScore => MoodColumn::MoodScore,
    };
    let direction = params.order.unwrap_or(Direction::Desc).into();
    let mut query = MoodQuery::default().order_by(column, direction);
    if let Some(score) = params.mood_score {
        query = query.filter(MoodFilter::MoodScore(score));
    }
    if let Some(limit) = params.limit {
        if limit == 0 {
            return Err(bad_request("limit must be positive".to_string(), locale));
        }
        query = query.limit(limit);
    }

    let result = state.data.for_user(Some(&user)).list_moods(query).await;
    let count = result.count.unwrap_or_default();
    let rows = data(result, locale)?;
    Ok(Json(MoodListResponse {
        data: rows.into_iter().map(MoodEntryResponse::from).collect(),
        count,
    }))
}

/// Record a mood entry for the signed-in user.
#[utoipa::path(
    post,
    path = "/moods",
    request_body = CreateMoodRequest,
    responses(
        (status = 201, description = "Entry stored", body = MoodEntryResponse),
        (status = 400, description = "Invalid entry", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn create_mood_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateMoodRequest>,
) -> ApiResult<impl IntoResponse> {
    let locale = state.locales.current(user.id).await;
    let draft = MoodEntryDraft {
        user_id: req.user_id,
        mood_score: req.mood_score,
        mood_text: req.mood_text,
        notes: req.notes,
    };
    let entry = data(state.data.for_user(Some(&user)).record_mood(draft).await, locale)?;
    Ok((StatusCode::CREATED, Json(MoodEntryResponse::from(entry))))
}

/// Change fields of one of the user's entries.
#[utoipa::path(
    patch,
    path = "/moods/{id}",
    params(("id" = Uuid, Path, description = "Mood entry id")),
    request_body = UpdateMoodRequest,
    responses(
        (status = 200, description = "Updated entry", body = MoodEntryResponse),
        (status = 400, description = "Invalid or empty update", body = ErrorBody),
        (status = 404, description = "No such entry for this user", body = ErrorBody)
    )
)]
pub async fn update_mood_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMoodRequest>,
) -> ApiResult<Json<MoodEntryResponse>> {
    let locale = state.locales.current(user.id).await;
    let patch = MoodEntryPatch {
        mood_score: req.mood_score,
        mood_text: req.mood_text,
        notes: req.notes,
    };
    let entry = data(
        state.data.for_user(Some(&user)).update_mood(id, patch).await,
        locale,
    )?;
    Ok(Json(entry.into()))
}

/// Delete one of the user's entries.
#[utoipa::path(
    delete,
    path = "/moods/{id}",
    params(("id" = Uuid, Path, description = "Mood entry id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such entry for this user", body = ErrorBody)
    )
)]
pub async fn delete_mood_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let locale = state.locales.current(user.id).await;
    data(state.data.for_user(Some(&user)).delete_mood(id).await, locale)?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Profile
//=========================================================================================

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The user's profile, or null before the first write", body = ProfileEnvelope),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ProfileEnvelope>> {
    let locale = state.locales.current(user.id).await;
    let profile = match data(state.data.for_user(Some(&user)).profile().await, locale)? {
        Lookup::Found(profile) => Some(ProfileResponse::new(profile, &user)),
        Lookup::Missing => None,
    };
    Ok(Json(ProfileEnvelope { profile }))
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Saved profile", body = ProfileResponse),
        (status = 400, description = "Invalid name or language", body = ErrorBody)
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let locale = state.locales.current(user.id).await;
    let preferred_language = parse_locale(&req.preferred_language, locale)?;
    let update = ProfileUpdate {
        full_name: req.full_name,
        preferred_language,
    };
    let profile = data(
        state.data.for_user(Some(&user)).update_profile(update).await,
        locale,
    )?;
    state
        .locales
        .select(user.id, profile.preferred_language)
        .await;
    Ok(Json(ProfileResponse::new(profile, &user)))
}

/// Switch the user's language; open chats follow.
#[utoipa::path(
    put,
    path = "/profile/language",
    request_body = LanguageRequest,
    responses(
        (status = 200, description = "Saved profile", body = ProfileResponse),
        (status = 400, description = "Unsupported language", body = ErrorBody)
    )
)]
pub async fn update_profile_language_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<LanguageRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let locale = state.locales.current(user.id).await;
    let selected = parse_locale(&req.locale, locale)?;
    let profile = data(
        state
            .data
            .for_user(Some(&user))
            .set_preferred_language(selected)
            .await,
        locale,
    )?;
    state.locales.select(user.id, selected).await;
    Ok(Json(ProfileResponse::new(profile, &user)))
}

//=========================================================================================
// Feedback
//=========================================================================================

#[utoipa::path(
    post,
    path = "/feedback",
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackResponse),
        (status = 400, description = "Invalid feedback", body = ErrorBody)
    )
)]
pub async fn create_feedback_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateFeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    let locale = state.locales.current(user.id).await;
    let draft = FeedbackDraft {
        user_id: req.user_id,
        message: req.message,
        rating: req.rating,
        screen_name: req.screen_name,
    };
    let feedback = data(
        state.data.for_user(Some(&user)).submit_feedback(draft).await,
        locale,
    )?;
    Ok((StatusCode::CREATED, Json(FeedbackResponse::from(feedback))))
}

#[derive(Deserialize, IntoParams)]
pub struct ListFeedbackParams {
    pub limit: Option<u32>,
}

/// The user's own feedback, newest first.
#[utoipa::path(
    get,
    path = "/feedback",
    params(ListFeedbackParams),
    responses(
        (status = 200, description = "The user's feedback", body = FeedbackListResponse)
    )
)]
pub async fn list_feedback_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListFeedbackParams>,
) -> ApiResult<Json<FeedbackListResponse>> {
    let locale = state.locales.current(user.id).await;
    let mut query =
        FeedbackQuery::default().order_by(FeedbackColumn::CreatedAt, SortDirection::Descending);
    if let Some(limit) = params.limit {
        if limit == 0 {
            return Err(bad_request("limit must be positive".to_string(), locale));
        }
        query = query.limit(limit);
    }
    let result = state.data.for_user(Some(&user)).list_feedback(query).await;
    let count = result.count.unwrap_or_default();
    let rows = data(result, locale)?;
    Ok(Json(FeedbackListResponse {
        data: rows.into_iter().map(FeedbackResponse::from).collect(),
        count,
    }))
}
