use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Laundry, LaundryFilter, LaundryItem, LaundryItemInput, LaundryStatus};

const LAUNDRY_COLUMNS: &str = "l.id, l.user_id, l.detail_number, l.title, l.laundry_date, \
                               l.total_items, l.status, l.created_at, l.updated_at";

/// Values for a new laundry row; `items` go to `laundry_items`.
#[derive(Debug, Clone)]
pub struct NewLaundry<'a> {
    pub user_id: Uuid,
    pub detail_number: &'a str,
    pub title: &'a str,
    pub laundry_date: NaiveDate,
    pub items: &'a [LaundryItemInput],
}

/// Escapes `LIKE` wildcards and wraps `value` for a substring match.
fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends the `WHERE` clause shared by the list and count queries.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, filter: &LaundryFilter) {
    builder.push(" WHERE l.user_id = ").push_bind(user_id);

    if let Some(category_name) = &filter.category_name {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM laundry_items li \
                 JOIN categories c ON c.id = li.category_id \
                 WHERE li.laundry_id = l.id AND LOWER(c.name) = LOWER(",
            )
            .push_bind(category_name.clone())
            .push("))");
    }
    if let Some(date_from) = filter.date_from {
        builder.push(" AND l.laundry_date >= ").push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        builder.push(" AND l.laundry_date <= ").push_bind(date_to);
    }
    if let Some(detail_number) = &filter.detail_number {
        builder
            .push(" AND l.detail_number ILIKE ")
            .push_bind(contains_pattern(detail_number));
    }
}

/// One page of the caller's laundry, newest laundry date first.
pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    filter: &LaundryFilter,
) -> Result<Vec<Laundry>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM laundries l", LAUNDRY_COLUMNS));
    push_filters(&mut builder, user_id, filter);
    builder
        .push(" ORDER BY l.laundry_date DESC, l.created_at DESC LIMIT ")
        .push_bind(filter.limit())
        .push(" OFFSET ")
        .push_bind(filter.offset());

    builder.build_query_as::<Laundry>().fetch_all(executor).await
}

/// Number of records matching `filter`, ignoring pagination.
pub async fn count<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    filter: &LaundryFilter,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM laundries l");
    push_filters(&mut builder, user_id, filter);

    builder.build_query_scalar::<i64>().fetch_one(executor).await
}

pub async fn find<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Laundry>, sqlx::Error> {
    sqlx::query_as::<_, Laundry>(&format!(
        "SELECT {} FROM laundries l WHERE l.id = $1 AND l.user_id = $2",
        LAUNDRY_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn items<'e>(
    executor: impl PgExecutor<'e>,
    laundry_id: Uuid,
) -> Result<Vec<LaundryItem>, sqlx::Error> {
    sqlx::query_as::<_, LaundryItem>(
        "SELECT li.category_id, c.name AS category_name, li.quantity \
         FROM laundry_items li JOIN categories c ON c.id = li.category_id \
         WHERE li.laundry_id = $1 ORDER BY LOWER(c.name)",
    )
    .bind(laundry_id)
    .fetch_all(executor)
    .await
}

/// Writes the record and its items in one transaction. New records start `Pending`.
pub async fn insert(pool: &PgPool, laundry: NewLaundry<'_>) -> Result<Laundry, sqlx::Error> {
    let total_items: i32 = laundry.items.iter().map(|item| item.quantity).sum();
    let mut tx = pool.begin().await?;

    let record = sqlx::query_as::<_, Laundry>(
        "INSERT INTO laundries (id, user_id, detail_number, title, laundry_date, total_items, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, user_id, detail_number, title, laundry_date, total_items, status, \
                   created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(laundry.user_id)
    .bind(laundry.detail_number)
    .bind(laundry.title)
    .bind(laundry.laundry_date)
    .bind(total_items)
    .bind(LaundryStatus::Pending)
    .fetch_one(&mut *tx)
    .await?;

    if !laundry.items.is_empty() {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO laundry_items (laundry_id, category_id, quantity) ",
        );
        builder.push_values(laundry.items, |mut row, item| {
            row.push_bind(record.id)
                .push_bind(item.category_id)
                .push_bind(item.quantity);
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(record)
}

const UPDATE_STATUS: &str = "UPDATE laundries SET status = $1, updated_at = NOW() \
     WHERE id = $2 AND user_id = $3 AND status NOT IN ($4, $5) \
     RETURNING id, user_id, detail_number, title, laundry_date, total_items, status, \
               created_at, updated_at";

/// Returns the updated record, or `None` when it does not exist, belongs to someone else or
/// is already `Done` or `Cancelled`.
pub async fn update_status<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    id: Uuid,
    status: LaundryStatus,
) -> Result<Option<Laundry>, sqlx::Error> {
    sqlx::query_as::<_, Laundry>(UPDATE_STATUS)
        .bind(status)
        .bind(id)
        .bind(user_id)
        .bind(LaundryStatus::Done)
        .bind(LaundryStatus::Cancelled)
        .fetch_optional(executor)
        .await
}
