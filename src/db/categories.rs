use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Category;

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, user_id, is_active, created_at FROM categories \
         WHERE user_id = $1 AND is_active ORDER BY LOWER(name)",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// The active categories of `user_id` among `ids`. Unknown or foreign ids are simply absent.
pub async fn find_owned_active<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, user_id, is_active, created_at FROM categories \
         WHERE user_id = $1 AND is_active AND id = ANY($2)",
    )
    .bind(user_id)
    .bind(ids)
    .fetch_all(executor)
    .await
}

pub async fn name_exists<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    name: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE user_id = $1 AND LOWER(name) = LOWER($2))",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(executor)
    .await
}

pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    name: &str,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, user_id, name) VALUES ($1, $2, $3) \
         RETURNING id, name, user_id, is_active, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .fetch_one(executor)
    .await
}
