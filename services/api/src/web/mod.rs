pub mod auth;
pub mod catalog;
pub mod chat_ws;
pub mod cookies;
pub mod middleware;
pub mod pages;
pub mod prefs;
pub mod protocol;
pub mod response;
pub mod rest;
pub mod state;

pub use chat_ws::chat_ws_handler;
pub use middleware::require_auth;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use self::{rest::ApiDoc, state::AppState};

/// The full HTTP surface: public routes, the session-guarded routes and the
/// Swagger UI.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/session", get(auth::session_handler))
        .route("/i18n/{locale}", get(prefs::translations_handler))
        .route(
            "/privacy/consent",
            get(prefs::get_consent_handler).post(prefs::record_consent_handler),
        )
        .route("/preferences/language", put(prefs::set_language_handler))
        .route("/content", get(catalog::list_content_handler))
        .route("/therapists", get(catalog::list_therapists_handler))
        .route("/tips/today", get(catalog::daily_tip_handler))
        .route("/", get(pages::page_handler))
        .route("/auth", get(pages::page_handler))
        .route("/privacy", get(pages::page_handler))
        .route("/app", get(pages::page_handler))
        .route("/app/{*section}", get(pages::page_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/moods",
            get(rest::list_moods_handler).post(rest::create_mood_handler),
        )
        .route(
            "/moods/{id}",
            patch(rest::update_mood_handler).delete(rest::delete_mood_handler),
        )
        .route(
            "/profile",
            get(rest::get_profile_handler).put(rest::update_profile_handler),
        )
        .route("/profile/language", put(rest::update_profile_language_handler))
        .route(
            "/feedback",
            get(rest::list_feedback_handler).post(rest::create_feedback_handler),
        )
        .route("/chat/ws", get(chat_ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(pages::fallback_handler)
        .with_state(state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
