//! crates/mindful_core/src/navigation.rs
//!
//! The application's route table and the authentication gate in front of the
//! app sections.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Landing,
    Auth,
    Privacy,
    Home,
    Chat,
    Content,
    Therapist,
    Profile,
}

impl AppRoute {
    pub const ALL: [AppRoute; 8] = [
        AppRoute::Landing,
        AppRoute::Auth,
        AppRoute::Privacy,
        AppRoute::Home,
        AppRoute::Chat,
        AppRoute::Content,
        AppRoute::Therapist,
        AppRoute::Profile,
    ];

    pub const SIGN_IN: AppRoute = AppRoute::Auth;
    pub const AFTER_SIGN_IN: AppRoute = AppRoute::Home;

    pub fn path(self) -> &'static str {
        match self {
            AppRoute::Landing => "/",
            AppRoute::Auth => "/auth",
            AppRoute::Privacy => "/privacy",
            AppRoute::Home => "/app/home",
            AppRoute::Chat => "/app/chat",
            AppRoute::Content => "/app/content",
            AppRoute::Therapist => "/app/therapist",
            AppRoute::Profile => "/app/profile",
        }
    }

    /// Key of the route's title in the translation tables.
    pub fn title_key(self) -> &'static str {
        match self {
            AppRoute::Landing => "home.welcome",
            AppRoute::Auth => "nav.sign_in",
            AppRoute::Privacy => "privacy.title",
            AppRoute::Home => "nav.home",
            AppRoute::Chat => "nav.chat",
            AppRoute::Content => "nav.content",
            AppRoute::Therapist => "nav.therapist",
            AppRoute::Profile => "nav.profile",
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            AppRoute::Home
                | AppRoute::Chat
                | AppRoute::Content
                | AppRoute::Therapist
                | AppRoute::Profile
        )
    }

    pub fn from_path(path: &str) -> Option<AppRoute> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        AppRoute::ALL.into_iter().find(|r| r.path() == trimmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(AppRoute),
    Redirect(AppRoute),
    NotFound,
}

/// Decides what a visit to `path` shows.
///
/// App sections need a session and otherwise send the visitor to sign in.
/// Signed-in visitors skip the sign-in screen, and the bare `/app` prefix
/// lands on the home section.
pub fn resolve(path: &str, authenticated: bool) -> RouteDecision {
    if path.trim_end_matches('/') == "/app" {
        return if authenticated {
            RouteDecision::Redirect(AppRoute::AFTER_SIGN_IN)
        } else {
            RouteDecision::Redirect(AppRoute::SIGN_IN)
        };
    }
    match AppRoute::from_path(path) {
        None => RouteDecision::NotFound,
        Some(route) if route.requires_auth() && !authenticated => {
            RouteDecision::Redirect(AppRoute::SIGN_IN)
        }
        Some(AppRoute::Auth) if authenticated => RouteDecision::Redirect(AppRoute::AFTER_SIGN_IN),
        Some(route) => RouteDecision::Render(route),
    }
}
