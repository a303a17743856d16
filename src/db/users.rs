use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{Role, User};

const USER_COLUMNS: &str = "id, full_name, email, password_hash, role, is_verified, is_active, \
                            created_at, updated_at, deleted_at, last_login";

/// Inserts a new, unverified account. A taken email surfaces as a unique violation.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    full_name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, full_name, email, password_hash, role) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(full_name)
    .bind(email)
    .bind(password_hash)
    .bind(Role::User)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn touch_last_login<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn mark_verified<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn update_password<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
