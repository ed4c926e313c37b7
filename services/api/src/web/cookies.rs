//! services/api/src/web/cookies.rs
//!
//! Reading and writing the cookies the service relies on: the login session
//! and the client preferences.

use axum::http::{header, HeaderMap, HeaderValue};
use mindful_core::preferences::ClientPreferences;
use tracing::warn;

pub const SESSION_COOKIE: &str = "session";

/// Client preferences outlive any single login.
const PREFERENCE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 365;

/// All `name=value` pairs from every `Cookie` header.
pub fn cookie_pairs(headers: &HeaderMap) -> Vec<(&str, &str)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .collect()
}

pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    cookie_pairs(headers)
        .into_iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, SESSION_COOKIE)
}

pub fn preferences(headers: &HeaderMap) -> ClientPreferences {
    ClientPreferences::from_pairs(cookie_pairs(headers))
}

pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

pub fn clear_session_cookie() -> String {
    session_cookie("", 0)
}

/// `Set-Cookie` values for every preference that is set.
pub fn preference_cookies(prefs: &ClientPreferences) -> Vec<HeaderValue> {
    prefs
        .to_pairs()
        .into_iter()
        .filter_map(|(key, value)| {
            let cookie = format!(
                "{}={}; SameSite=Lax; Path=/; Max-Age={}",
                key, value, PREFERENCE_MAX_AGE_SECS
            );
            HeaderValue::from_str(&cookie)
                .map_err(|e| warn!(key, "Skipping unrepresentable cookie: {}", e))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindful_core::preferences::{CONSENT_KEY, LANGUAGE_KEY};
    use mindful_core::Locale;

    #[test]
    fn reads_session_and_preferences_from_split_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("session=abc; theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("mindful-thai-language=en; mindful-thai-pdpa-consent=true"),
        );

        assert_eq!(session_token(&headers), Some("abc"));
        let prefs = preferences(&headers);
        assert_eq!(prefs.language, Some(Locale::En));
        assert!(prefs.has_consented());
    }

    #[test]
    fn empty_session_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn preference_cookies_cover_set_values_only() {
        let mut prefs = ClientPreferences::default();
        prefs.select_language(Locale::Th);
        let cookies = preference_cookies(&prefs);
        assert_eq!(cookies.len(), 1);
        let cookie = cookies[0].to_str().unwrap();
        assert!(cookie.starts_with(&format!("{}=th;", LANGUAGE_KEY)));
        assert!(!cookie.contains(CONSENT_KEY));
    }
}
