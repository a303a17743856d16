pub mod auth;
pub mod categories;
pub mod health;
pub mod laundry;
pub mod pages;

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Malformed JSON bodies are answered with a 400 envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(format!("invalid request body: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(format!("invalid query string: {}", err)).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, _req: &HttpRequest| {
        AppError::BadRequest(format!("invalid path parameter: {}", err)).into()
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("route not found".into()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(health::health)
        .service(health::ping)
        .service(pages::login_page)
        .service(pages::dashboard)
        .service(pages::script)
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .service(auth::signup)
                        .service(auth::login)
                        .service(auth::verify_email)
                        .service(auth::resend_verification)
                        .service(auth::forgot_password)
                        .service(auth::reset_password)
                        .service(auth::refresh)
                        .service(auth::logout),
                )
                .service(
                    web::scope("/categories")
                        .wrap(AuthMiddleware::bearer())
                        .service(categories::list_categories)
                        .service(categories::create_category),
                )
                .service(
                    web::scope("/laundry")
                        .wrap(AuthMiddleware::bearer())
                        .service(laundry::list_laundry)
                        .service(laundry::create_laundry)
                        .service(laundry::get_laundry)
                        .service(laundry::update_laundry_status),
                ),
        );
}
