use api_lib::adapters::MemoryStore;
use api_lib::config::{Config, StorageBackend};
use api_lib::web::{router, state::AppState};
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const PASSWORD: &str = "Calm-Mind1";

fn test_config() -> Arc<Config> {
    Arc::new(Config {
        storage: StorageBackend::Memory,
        chat_reply_delay: Duration::ZERO,
        ..Config::default()
    })
}

fn test_router() -> Router {
    router(Arc::new(AppState::in_memory(test_config())))
}

async fn body_json(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `name=value` of every `Set-Cookie` header.
fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string())
        .collect()
}

/// Signs up a fresh account and returns its session cookie.
async fn sign_up(app: &Router, email: &str) -> String {
    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": email, "password": PASSWORD, "full_name": "Nok" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    set_cookies(&resp).remove(0)
}

#[tokio::test]
async fn sign_in_gates_the_app_sections() {
    let app = test_router();

    let resp = app.clone().oneshot(get("/app/chat", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/auth");

    sign_up(&app, "flow@example.com").await;
    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "Flow@Example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = set_cookies(&resp).remove(0);
    assert!(cookie.starts_with("session="));
    let body = body_json(resp).await;
    assert_eq!(body["redirect_to"], "/app/home");

    let resp = app.clone().oneshot(get("/app/chat", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;
    assert_eq!(page["route"], "/app/chat");
    assert_eq!(page["title"], "แชท AI");
    assert_eq!(page["requires_auth"], true);

    let resp = app.clone().oneshot(get("/auth", Some(&cookie))).await.unwrap();
    assert_eq!(resp.headers()[header::LOCATION], "/app/home");

    let resp = app
        .clone()
        .oneshot(send_json("POST", "/auth/logout", Some(&cookie), json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["redirect_to"], "/auth");

    let resp = app.clone().oneshot(get("/app/chat", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/auth");
}

#[tokio::test]
async fn unknown_pages_are_not_found() {
    let app = test_router();
    let resp = app.clone().oneshot(get("/app/settings", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.clone().oneshot(get("/app", None)).await.unwrap();
    assert_eq!(resp.headers()[header::LOCATION], "/auth");

    let resp = app.clone().oneshot(get("/nowhere", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["code"], "data.error.not_found");

    let resp = app.oneshot(get("/privacy", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let app = test_router();
    let resp = app
        .clone()
        .oneshot(send_json("POST", "/moods", None, json!({ "mood_score": 5 })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["code"], "auth.error.required");

    let resp = app
        .oneshot(get("/profile", Some("session=not-a-token")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mood_entries_belong_to_the_session_user() {
    let app = test_router();
    let alice = sign_up(&app, "alice@example.com").await;
    let bob = sign_up(&app, "bob@example.com").await;

    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/moods",
            Some(&alice),
            json!({
                "mood_score": 7,
                "mood_text": "<b>calm</b>",
                "user_id": "00000000-0000-0000-0000-000000000001"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let entry = body_json(resp).await;
    assert_eq!(entry["mood_text"], "&lt;b&gt;calm&lt;&#x2F;b&gt;");

    let resp = app.clone().oneshot(get("/moods", Some(&alice))).await.unwrap();
    let list = body_json(resp).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["id"], entry["id"]);

    let resp = app.clone().oneshot(get("/moods", Some(&bob))).await.unwrap();
    assert_eq!(body_json(resp).await["count"], 0);

    let path = format!("/moods/{}", entry["id"].as_str().unwrap());
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&path)
                .header(header::COOKIE, &bob)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .clone()
        .oneshot(send_json("PATCH", &path, Some(&alice), json!({ "mood_score": 3 })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["mood_score"], 3);
}

#[tokio::test]
async fn mood_listing_filters_and_limits() {
    let app = test_router();
    let cookie = sign_up(&app, "list@example.com").await;
    for score in [2, 8, 8, 5] {
        app.clone()
            .oneshot(send_json("POST", "/moods", Some(&cookie), json!({ "mood_score": score })))
            .await
            .unwrap();
    }

    let resp = app
        .clone()
        .oneshot(get("/moods?mood_score=8", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["count"], 2);

    let resp = app
        .clone()
        .oneshot(get("/moods?limit=1&sort_by=mood_score&order=asc", Some(&cookie)))
        .await
        .unwrap();
    let list = body_json(resp).await;
    assert_eq!(list["count"], 4);
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
    assert_eq!(list["data"][0]["mood_score"], 2);
}

#[tokio::test]
async fn invalid_input_is_a_bad_request() {
    let app = test_router();
    let cookie = sign_up(&app, "invalid@example.com").await;

    let resp = app
        .clone()
        .oneshot(send_json("POST", "/moods", Some(&cookie), json!({ "mood_score": 11 })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "data.error.invalid_input");

    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/feedback",
            Some(&cookie),
            json!({ "message": "Great app", "rating": 9 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .oneshot(send_json(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": "weak@example.com", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_sign_in_attempts_are_throttled() {
    let app = test_router();
    sign_up(&app, "throttle@example.com").await;

    for _ in 0..4 {
        let resp = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/auth/login",
                None,
                json!({ "email": "throttle@example.com", "password": "Wrong-Pass1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let resp = app
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "throttle@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn duplicate_sign_up_conflicts() {
    let app = test_router();
    sign_up(&app, "twice@example.com").await;
    let resp = app
        .oneshot(send_json(
            "POST",
            "/auth/signup",
            None,
            json!({ "email": "twice@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn profile_language_switches_responses() {
    let app = test_router();
    let cookie = sign_up(&app, "lang@example.com").await;

    let resp = app.clone().oneshot(get("/profile", Some(&cookie))).await.unwrap();
    let profile = body_json(resp).await;
    assert_eq!(profile["profile"]["full_name"], "Nok");
    assert_eq!(profile["profile"]["preferred_language"], "th");

    let resp = app
        .clone()
        .oneshot(send_json("PUT", "/profile/language", Some(&cookie), json!({ "locale": "en" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["preferred_language"], "en");

    let resp = app.clone().oneshot(get("/app/chat", Some(&cookie))).await.unwrap();
    assert_eq!(body_json(resp).await["title"], "AI Chat");

    let resp = app
        .oneshot(send_json("PUT", "/profile/language", Some(&cookie), json!({ "locale": "fr" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Invalid input.");
}

#[tokio::test]
async fn signing_out_one_session_keeps_the_language_of_another() {
    let app = test_router();
    let first = sign_up(&app, "two@example.com").await;

    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "two@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let second = set_cookies(&resp).remove(0);

    let resp = app
        .clone()
        .oneshot(send_json("PUT", "/profile/language", Some(&second), json!({ "locale": "en" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(send_json("POST", "/auth/logout", Some(&first), json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(get("/app/chat", Some(&second))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["title"], "AI Chat");
}

#[tokio::test]
async fn stored_language_survives_a_restart() {
    let store = Arc::new(MemoryStore::new());
    let before = router(Arc::new(AppState::with_store(test_config(), store.clone())));
    let cookie = sign_up(&before, "restart@example.com").await;
    let resp = before
        .oneshot(send_json("PUT", "/profile/language", Some(&cookie), json!({ "locale": "en" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Same store, fresh process state.
    let after = router(Arc::new(AppState::with_store(test_config(), store)));
    let resp = after.oneshot(get("/app/chat", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["title"], "AI Chat");
}

#[tokio::test]
async fn consent_is_kept_in_cookies() {
    let app = test_router();

    let resp = app.clone().oneshot(get("/privacy/consent", None)).await.unwrap();
    let prefs = body_json(resp).await;
    assert!(prefs["consent"].is_null());
    assert_eq!(prefs["language"], "th");

    let resp = app
        .clone()
        .oneshot(send_json("POST", "/privacy/consent", None, json!({ "granted": true })))
        .await
        .unwrap();
    let cookies = set_cookies(&resp);
    assert!(cookies.contains(&"mindful-thai-pdpa-consent=true".to_string()));
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("mindful-thai-consent-date=")));

    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/privacy/consent",
            Some("mindful-thai-language=en"),
            json!({ "granted": false }),
        ))
        .await
        .unwrap();
    let cookies = set_cookies(&resp);
    assert!(cookies.contains(&"mindful-thai-pdpa-consent=false".to_string()));
    assert!(!cookies
        .iter()
        .any(|c| c.starts_with("mindful-thai-consent-date=")));
    assert_eq!(body_json(resp).await["language"], "en");

    let resp = app
        .oneshot(get("/privacy", Some("mindful-thai-pdpa-consent=true")))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["consented"], true);
}

#[tokio::test]
async fn visitor_language_cookie_localizes_the_catalog() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(send_json("PUT", "/preferences/language", None, json!({ "locale": "en" })))
        .await
        .unwrap();
    assert_eq!(set_cookies(&resp), vec!["mindful-thai-language=en".to_string()]);

    let resp = app
        .clone()
        .oneshot(get("/therapists?location=Bangkok", None))
        .await
        .unwrap();
    let therapists = body_json(resp).await;
    assert_eq!(therapists.as_array().unwrap().len(), 2);
    assert_eq!(therapists[0]["location"], "กรุงเทพฯ");

    let resp = app
        .clone()
        .oneshot(get("/content?kind=breathing", Some("mindful-thai-language=en")))
        .await
        .unwrap();
    let content = body_json(resp).await;
    assert_eq!(content.as_array().unwrap().len(), 2);
    assert_eq!(content[0]["kind"], "breathing");

    let resp = app
        .clone()
        .oneshot(get("/tips/today", Some("mindful-thai-language=en")))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["title"], "Daily Tip");

    let resp = app.clone().oneshot(get("/i18n/en", None)).await.unwrap();
    assert_eq!(body_json(resp).await["translations"]["nav.home"], "Home");

    let resp = app.oneshot(get("/i18n/fr", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let resp = test_router()
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await;
    assert!(doc["paths"]["/moods"].is_object());
    assert!(doc["paths"]["/auth/login"].is_object());
}
