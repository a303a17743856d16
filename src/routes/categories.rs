use crate::{
    auth::AuthenticatedUser, error::AppError, models::CategoryInput, response::ApiResponse,
    services::categories as service,
};
use actix_web::{get, post, web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

/// Lists the caller's active categories, alphabetically.
#[get("")]
pub async fn list_categories(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let categories = service::list(&pool, user.user_id()).await?;
    Ok(ApiResponse::ok(categories))
}

/// Creates a category.
///
/// ## Responses:
/// - `201 Created`: the new category.
/// - `409 Conflict`: the caller already has a category with that name, in any letter case.
/// - `422 Unprocessable Entity`: the name is empty, too long or has unsupported characters.
#[post("")]
pub async fn create_category(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    payload: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let category = service::add(&pool, user.user_id(), &payload).await?;
    Ok(ApiResponse::created(category))
}
