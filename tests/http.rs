//! HTTP surface checks that are answered before any query runs, so no database is needed.

mod common;

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::test;
use chrono::Duration;
use laundry_tracker::auth::{TokenManager, SESSION_COOKIE};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, fake_user, init_app, lazy_pool, test_config, token_for, TEST_SECRET};

#[actix_rt::test]
async fn test_health_and_ping() {
    let config = test_config();
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");

    let req = test::TestRequest::get().uri("/ping").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "hello world: test");
}

#[actix_rt::test]
async fn test_unknown_route_uses_envelope() {
    let config = test_config();
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::get().uri("/api/v1/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert!(body["data"].is_null());
}

#[actix_rt::test]
async fn test_signup_rejections() {
    let config = test_config();
    let app = init_app(lazy_pool(&config), config).await;

    // Field validation
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "full_name": "Jane",
            "email": "not-an-email",
            "password": "password123",
            "confirm_password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Name that is only whitespace
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "full_name": "   ",
            "email": "jane@example.com",
            "password": "password123",
            "confirm_password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_message"], "full name must not be blank");

    // Confirmation mismatch
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "full_name": "Jane",
            "email": "jane@example.com",
            "password": "password123",
            "confirm_password": "password321"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_message"], "mismatched password confirmation");

    // Malformed body
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[actix_rt::test]
async fn test_login_validation() {
    let config = test_config();
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "test@example.com", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn test_protected_routes_require_token() {
    let config = test_config();
    let app = init_app(lazy_pool(&config), config).await;

    for uri in ["/api/v1/categories", "/api/v1/laundry"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error_message"], "token is invalid");
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/verify-email")
        .insert_header(bearer("garbage"))
        .set_json(json!({ "token": "123456" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_expired_token_is_reported() {
    let config = test_config();
    let expired = TokenManager::new(TEST_SECRET, Duration::seconds(-60), Duration::hours(1), false)
        .issue(&fake_user("late@example.com"))
        .unwrap();
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/laundry")
        .insert_header(bearer(&expired))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_message"], "expired token");
}

#[actix_rt::test]
async fn test_add_laundry_rejections_before_database() {
    let config = test_config();
    let token = token_for(&config, &fake_user("laundry@example.com"));
    let app = init_app(lazy_pool(&config), config).await;
    let category_id = Uuid::new_v4();

    // Quantity out of range
    let req = test::TestRequest::post()
        .uri("/api/v1/laundry")
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "Weekly",
            "laundry_date": "2024-05-01",
            "items": [{ "category_id": category_id, "quantity": 0 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Title that is only whitespace
    let req = test::TestRequest::post()
        .uri("/api/v1/laundry")
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "   ",
            "laundry_date": "2024-05-01",
            "items": [{ "category_id": category_id, "quantity": 1 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_message"], "title must not be blank");

    // No items
    let req = test::TestRequest::post()
        .uri("/api/v1/laundry")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Weekly", "laundry_date": "2024-05-01", "items": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Same category twice
    let req = test::TestRequest::post()
        .uri("/api/v1/laundry")
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "Weekly",
            "laundry_date": "2024-05-01",
            "items": [
                { "category_id": category_id, "quantity": 1 },
                { "category_id": category_id, "quantity": 2 }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Bad date
    let req = test::TestRequest::post()
        .uri("/api/v1/laundry")
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "Weekly",
            "laundry_date": "01/05/2024",
            "items": [{ "category_id": category_id, "quantity": 1 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_invalid_laundry_id_is_bad_request() {
    let config = test_config();
    let token = token_for(&config, &fake_user("ids@example.com"));
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/laundry/not-a-uuid")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_category_name_validation() {
    let config = test_config();
    let token = token_for(&config, &fake_user("categories@example.com"));
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/categories")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "<script>" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn test_refresh_flow() {
    let config = test_config();
    let user = fake_user("refresh@example.com");
    let valid = token_for(&config, &user);
    let expired = TokenManager::new(TEST_SECRET, Duration::seconds(-60), Duration::hours(1), false)
        .issue(&user)
        .unwrap();
    let app = init_app(lazy_pool(&config), config).await;

    // Nothing presented
    let req = test::TestRequest::post().uri("/api/v1/auth/refresh").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Still valid: returned unchanged
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(bearer(&valid))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["token"], valid.as_str());

    // Recently expired, presented as a cookie: renewed
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .cookie(Cookie::new(SESSION_COOKIE, expired.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .response()
        .cookies()
        .any(|c| c.name() == SESSION_COOKIE && !c.value().is_empty()));

    let body: Value = test::read_body_json(resp).await;
    let renewed = body["data"]["token"].as_str().unwrap().to_string();
    assert!(renewed != expired);

    let req = test::TestRequest::get()
        .uri("/api/v1/laundry/not-a-uuid")
        .insert_header(bearer(&renewed))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // Past the guard: rejected for the path, not the token.
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_logout_clears_cookie() {
    let config = test_config();
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("logout should send a removal cookie");
    assert_eq!(cookie.value(), "");
}

#[actix_rt::test]
async fn test_pages_follow_session() {
    let config = test_config();
    let token = token_for(&config, &fake_user("pages@example.com"));
    let app = init_app(lazy_pool(&config), config).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");

    let req = test::TestRequest::get().uri("/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&html).contains("signin-form"));

    let req = test::TestRequest::get()
        .uri("/login")
        .cookie(Cookie::new(SESSION_COOKIE, token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new(SESSION_COOKIE, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
