//! One-time codes. A code is usable while it is active and `expired_at` lies in the future;
//! consuming it deactivates it.

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::OtpAction;

pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    code: &str,
    action: OtpAction,
    ttl: Duration,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO otps (user_id, otp_code, action, is_active, expired_at) \
         VALUES ($1, $2, $3, TRUE, $4)",
    )
    .bind(user_id)
    .bind(code)
    .bind(action.as_str())
    .bind(Utc::now() + ttl)
    .execute(executor)
    .await?;
    Ok(())
}

/// Revokes every active code of `user_id` for `action`.
pub async fn deactivate_outstanding<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    action: OtpAction,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE otps SET is_active = FALSE WHERE user_id = $1 AND action = $2 AND is_active",
    )
    .bind(user_id)
    .bind(action.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Marks the newest live code matching `code` as used. Returns `false` when there is none.
///
/// Must run inside the caller's transaction; the row is locked until it commits.
pub async fn consume(
    conn: &mut PgConnection,
    user_id: Uuid,
    code: &str,
    action: OtpAction,
) -> Result<bool, sqlx::Error> {
    let id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM otps \
         WHERE user_id = $1 AND otp_code = $2 AND action = $3 \
           AND is_active AND expired_at > NOW() \
         ORDER BY created_at DESC LIMIT 1 FOR UPDATE",
    )
    .bind(user_id)
    .bind(code)
    .bind(action.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let Some(id) = id else {
        return Ok(false);
    };

    sqlx::query("UPDATE otps SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(true)
}
