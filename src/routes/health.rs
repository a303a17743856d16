use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::config::Config;

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}

/// Liveness probe that also reports which environment is running.
#[get("/ping")]
pub async fn ping(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": format!("hello world: {}", config.env)
    }))
}
