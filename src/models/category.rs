use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    // Letters, digits, spaces, underscores and hyphens.
    static ref CATEGORY_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[\p{L}\p{N} _-]+$").unwrap();
}

/// A laundry category owned by one user (e.g. "Shirts", "Bed linen").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    /// Between 1 and 50 characters.
    #[validate(
        length(min = 1, max = 50),
        regex(
            path = "CATEGORY_NAME_REGEX",
            message = "Category name may contain letters, digits, spaces, underscores or hyphens"
        )
    )]
    pub name: String,
}

impl CategoryInput {
    pub fn normalized_name(&self) -> String {
        self.name.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
