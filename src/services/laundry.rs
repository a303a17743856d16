use chrono::NaiveDate;
use rand::Rng;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::db;
use crate::db::laundries::NewLaundry;
use crate::error::AppError;
use crate::models::{
    AddLaundryRequest, LaundryFilter, LaundryItem, LaundryResponse, LaundryStatus,
};
use crate::response::PageMeta;

pub const INVALID_CATEGORY: &str = "invalid category id";
pub const LAUNDRY_NOT_FOUND: &str = "laundry not found";

const DETAIL_NUMBER_PREFIX: &str = "LDR";
const DETAIL_SUFFIX_LEN: usize = 6;
const DETAIL_SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Attempts before giving up on a colliding detail number.
const DETAIL_NUMBER_ATTEMPTS: usize = 3;

/// `LDR-YYYYMMDD-XXXXXX` with a random uppercase alphanumeric suffix.
pub fn generate_detail_number(date: NaiveDate) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..DETAIL_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..DETAIL_SUFFIX_CHARSET.len());
            DETAIL_SUFFIX_CHARSET[idx] as char
        })
        .collect();
    format!("{}-{}-{}", DETAIL_NUMBER_PREFIX, date.format("%Y%m%d"), suffix)
}

pub const BLANK_TITLE: &str = "title must not be blank";

/// Checks the title and item list before any database access.
fn check_items(request: &AddLaundryRequest) -> Result<Vec<Uuid>, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::BadRequest(BLANK_TITLE.into()));
    }
    if request.items.is_empty() {
        return Err(AppError::BadRequest("laundry must contain at least one item".into()));
    }

    let mut seen = HashSet::new();
    for item in &request.items {
        if !seen.insert(item.category_id) {
            return Err(AppError::BadRequest("duplicate category in laundry items".into()));
        }
    }
    Ok(request.items.iter().map(|item| item.category_id).collect())
}

pub async fn add(
    pool: &PgPool,
    user_id: Uuid,
    request: &AddLaundryRequest,
) -> Result<LaundryResponse, AppError> {
    let category_ids = check_items(request)?;

    let categories = db::categories::find_owned_active(pool, user_id, &category_ids).await?;
    if categories.len() != category_ids.len() {
        log::warn!("User {} submitted laundry with unknown categories", user_id);
        return Err(AppError::BadRequest(INVALID_CATEGORY.into()));
    }
    let names: HashMap<Uuid, String> = categories
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    let title = request.title.trim();
    let mut attempt = 0;
    let record = loop {
        attempt += 1;
        let detail_number = generate_detail_number(request.laundry_date);
        let new_laundry = NewLaundry {
            user_id,
            detail_number: &detail_number,
            title,
            laundry_date: request.laundry_date,
            items: &request.items,
        };
        match db::laundries::insert(pool, new_laundry).await.map_err(AppError::from) {
            Ok(record) => break record,
            Err(AppError::Conflict(_)) if attempt < DETAIL_NUMBER_ATTEMPTS => {
                log::warn!("Detail number {} already taken, retrying", detail_number);
            }
            Err(err) => return Err(err),
        }
    };
    log::info!("Laundry {} recorded for user {}", record.detail_number, user_id);

    let items = request
        .items
        .iter()
        .map(|item| LaundryItem {
            category_id: item.category_id,
            category_name: names.get(&item.category_id).cloned().unwrap_or_default(),
            quantity: item.quantity,
        })
        .collect();
    Ok(LaundryResponse::with_items(record, items))
}

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    filter: &LaundryFilter,
) -> Result<(Vec<LaundryResponse>, PageMeta), AppError> {
    let records = db::laundries::list(pool, user_id, filter).await?;
    let total = db::laundries::count(pool, user_id, filter).await?;

    let data = records.into_iter().map(LaundryResponse::from).collect();
    Ok((data, PageMeta::new(filter.page, filter.limit(), total)))
}

pub async fn get(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<LaundryResponse, AppError> {
    let record = db::laundries::find(pool, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(LAUNDRY_NOT_FOUND.into()))?;
    let items = db::laundries::items(pool, record.id).await?;
    Ok(LaundryResponse::with_items(record, items))
}

/// Moves a record to `status`. Records that are `Done` or `Cancelled` are final; the check
/// runs inside the `UPDATE` itself.
pub async fn update_status(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    status: LaundryStatus,
) -> Result<LaundryResponse, AppError> {
    if let Some(updated) = db::laundries::update_status(pool, user_id, id, status).await? {
        return Ok(LaundryResponse::from(updated));
    }

    let current = db::laundries::find(pool, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(LAUNDRY_NOT_FOUND.into()))?;
    Err(already_final(current.status))
}

fn already_final(status: LaundryStatus) -> AppError {
    AppError::BadRequest(format!(
        "laundry is already {}",
        status.label().to_lowercase()
    ))
}
