use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{AddLaundryRequest, LaundryFilter, LaundryListParams, StatusUpdateRequest},
    response::ApiResponse,
    services::laundry as service,
};
use actix_web::{get, patch, post, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Retrieves a page of the caller's laundry records.
///
/// ## Query Parameters:
/// - `category_name` (optional): only records with an item in this category (any letter case).
/// - `laundry_date_from`, `laundry_date_to` (optional): inclusive `YYYY-MM-DD` bounds.
/// - `detail_number` (optional): case-insensitive substring of the detail number.
/// - `page` (optional): 1-based page number, 10 records per page.
///
/// Unparsable values are ignored rather than rejected.
#[get("")]
pub async fn list_laundry(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    params: web::Query<LaundryListParams>,
) -> Result<HttpResponse, AppError> {
    let filter = LaundryFilter::from(params.into_inner());
    let (records, meta) = service::list(&pool, user.user_id(), &filter).await?;
    Ok(ApiResponse::paged(records, meta))
}

/// Records a new laundry with its per-category item counts.
///
/// ## Responses:
/// - `201 Created`: the record with its items and generated detail number.
/// - `400 Bad Request`: no items, a repeated category, or a category the caller does not own.
/// - `422 Unprocessable Entity`: title or quantities out of range.
#[post("")]
pub async fn create_laundry(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    payload: web::Json<AddLaundryRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    for item in &payload.items {
        item.validate()?;
    }

    let record = service::add(&pool, user.user_id(), &payload).await?;
    Ok(ApiResponse::created(record))
}

#[get("/{id}")]
pub async fn get_laundry(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    laundry_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let record = service::get(&pool, user.user_id(), laundry_id.into_inner()).await?;
    Ok(ApiResponse::ok(record))
}

/// Moves a record along its lifecycle. `done` and `cancelled` records cannot change.
#[patch("/{id}/status")]
pub async fn update_laundry_status(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    laundry_id: web::Path<Uuid>,
    payload: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let record = service::update_status(
        &pool,
        user.user_id(),
        laundry_id.into_inner(),
        payload.status,
    )
    .await?;
    Ok(ApiResponse::ok(record))
}
