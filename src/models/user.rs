use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Access level of an account. Stored and serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(into = "i32", try_from = "i32")]
pub enum Role {
    Guest = 0,
    User = 1,
    Admin = 8,
    SuperAdmin = 9,
}

impl From<Role> for i32 {
    fn from(role: Role) -> i32 {
        role as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownRole(pub i32);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown role code {}", self.0)
    }
}

impl TryFrom<i32> for Role {
    type Error = UnknownRole;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Role::Guest),
            1 => Ok(Role::User),
            8 => Ok(Role::Admin),
            9 => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other)),
        }
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the account may still sign in.
    pub fn can_login(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}
