use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Category, CategoryInput};

pub const CATEGORY_EXISTS: &str = "category already exists";

pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Category>, AppError> {
    Ok(db::categories::list(pool, user_id).await?)
}

/// Creates a category for `user_id`. Names are unique per user regardless of case.
pub async fn add(pool: &PgPool, user_id: Uuid, input: &CategoryInput) -> Result<Category, AppError> {
    let name = input.normalized_name();
    if name.is_empty() {
        return Err(AppError::BadRequest("category name must not be blank".into()));
    }

    if db::categories::name_exists(pool, user_id, &name).await? {
        return Err(AppError::Conflict(CATEGORY_EXISTS.into()));
    }

    // A concurrent insert of the same name trips the unique index instead.
    match db::categories::insert(pool, user_id, &name).await {
        Ok(category) => {
            log::info!("Category {} created for user {}", category.id, user_id);
            Ok(category)
        }
        Err(err) => match AppError::from(err) {
            AppError::Conflict(_) => Err(AppError::Conflict(CATEGORY_EXISTS.into())),
            other => Err(other),
        },
    }
}
