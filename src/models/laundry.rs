use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Number of laundry records per page in list responses.
pub const PAGE_SIZE: i64 = 10;
/// Largest page whose offset still fits in an `i64`.
const MAX_PAGE: i64 = i64::MAX / PAGE_SIZE;

/// Accepted format for date filters in query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lifecycle of a laundry record. Stored as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum LaundryStatus {
    Cancelled = 0,
    Pending = 1,
    InProgress = 2,
    Done = 3,
}

impl LaundryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LaundryStatus::Cancelled => "Cancelled",
            LaundryStatus::Pending => "Pending",
            LaundryStatus::InProgress => "In Progress",
            LaundryStatus::Done => "Done",
        }
    }

    /// `Done` and `Cancelled` records can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LaundryStatus::Done | LaundryStatus::Cancelled)
    }
}

/// A row of the `laundries` table.
#[derive(Debug, Clone, FromRow)]
pub struct Laundry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub detail_number: String,
    pub title: String,
    pub laundry_date: NaiveDate,
    pub total_items: i32,
    pub status: LaundryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One category line of a laundry record, joined with the category name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LaundryItem {
    pub category_id: Uuid,
    pub category_name: String,
    pub quantity: i32,
}

/// Laundry record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaundryResponse {
    pub id: Uuid,
    pub detail_number: String,
    pub title: String,
    pub laundry_date: NaiveDate,
    pub total_items: i32,
    pub status: LaundryStatus,
    pub status_label: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LaundryItem>>,
}

impl From<Laundry> for LaundryResponse {
    fn from(laundry: Laundry) -> Self {
        Self {
            id: laundry.id,
            detail_number: laundry.detail_number,
            title: laundry.title,
            laundry_date: laundry.laundry_date,
            total_items: laundry.total_items,
            status: laundry.status,
            status_label: laundry.status.label().to_string(),
            created_at: laundry.created_at,
            items: None,
        }
    }
}

impl LaundryResponse {
    pub fn with_items(laundry: Laundry, items: Vec<LaundryItem>) -> Self {
        Self {
            items: Some(items),
            ..Self::from(laundry)
        }
    }
}

/// One line of a new laundry record.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LaundryItemInput {
    pub category_id: Uuid,
    /// Between 1 and 1000 pieces.
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}

/// Payload for recording a new laundry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddLaundryRequest {
    /// Between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub laundry_date: NaiveDate,
    pub items: Vec<LaundryItemInput>,
}

impl AddLaundryRequest {
    pub fn total_items(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: LaundryStatus,
}

/// Raw list query string. Every field is a string so malformed values can be ignored
/// instead of failing the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct LaundryListParams {
    pub category_name: Option<String>,
    pub laundry_date_from: Option<String>,
    pub laundry_date_to: Option<String>,
    pub detail_number: Option<String>,
    pub page: Option<String>,
}

/// Parsed list filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaundryFilter {
    pub category_name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub detail_number: Option<String>,
    pub page: i64,
}

impl Default for LaundryFilter {
    fn default() -> Self {
        Self {
            category_name: None,
            date_from: None,
            date_to: None,
            detail_number: None,
            page: 1,
        }
    }
}

impl LaundryFilter {
    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    non_empty(value).and_then(|v| NaiveDate::parse_from_str(&v, DATE_FORMAT).ok())
}

impl From<LaundryListParams> for LaundryFilter {
    fn from(params: LaundryListParams) -> Self {
        let page = non_empty(params.page)
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| (1..=MAX_PAGE).contains(p))
            .unwrap_or(1);

        Self {
            category_name: non_empty(params.category_name),
            date_from: parse_date(params.laundry_date_from),
            date_to: parse_date(params.laundry_date_to),
            detail_number: non_empty(params.detail_number),
            page,
        }
    }
}
