//! The JSON envelope shared by every API response.

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// Pagination details attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total_data: i64,
    pub total_page: i64,
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total_data: i64) -> Self {
        let total_page = if limit > 0 {
            (total_data + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total_data,
            total_page,
        }
    }
}

/// `{ status, data, error_message, meta? }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: Option<T>,
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status: StatusCode, data: T, meta: Option<PageMeta>) -> Self {
        Self {
            status: status.as_u16(),
            data: Some(data),
            error_message: None,
            meta,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            data: None,
            error_message: Some(message.into()),
            meta: None,
        }
    }

    /// 200 with `data`.
    pub fn ok(data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::success(StatusCode::OK, data, None))
    }

    /// 201 with `data`.
    pub fn created(data: T) -> HttpResponse {
        HttpResponse::Created().json(Self::success(StatusCode::CREATED, data, None))
    }

    /// 200 with `data` and pagination `meta`.
    pub fn paged(data: T, meta: PageMeta) -> HttpResponse {
        HttpResponse::Ok().json(Self::success(StatusCode::OK, data, Some(meta)))
    }
}
