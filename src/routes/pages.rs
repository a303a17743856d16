//! The two browser pages and their scripts, embedded at compile time.

use actix_web::{get, http::header::ContentType, web, HttpResponse};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

const LOGIN_HTML: &str = include_str!("../../static/login.html");
const DASHBOARD_HTML: &str = include_str!("../../static/dashboard.html");
const LOGIN_JS: &str = include_str!("../../static/login.js");
const DASHBOARD_JS: &str = include_str!("../../static/dashboard.js");

/// Sign-in page. Visitors who already hold a valid session go to the dashboard.
#[get("/login", wrap = "AuthMiddleware::login_page()")]
pub async fn login_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(LOGIN_HTML)
}

/// Dashboard. Requires a session cookie.
#[get("/", wrap = "AuthMiddleware::session()")]
pub async fn dashboard() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(DASHBOARD_HTML)
}

#[get("/static/{file}")]
pub async fn script(file: web::Path<String>) -> Result<HttpResponse, AppError> {
    let body = match file.as_str() {
        "login.js" => LOGIN_JS,
        "dashboard.js" => DASHBOARD_JS,
        _ => return Err(AppError::NotFound("file not found".into())),
    };
    Ok(HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(body))
}
