//! Vendor models and the admin listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::promotion::Promotion;

/// Longest vendor name accepted.
pub const MAX_VENDOR_NAME_LEN: usize = 255;

/// Represents a vendor record from the database.
///
/// Vendors are a flat list; payments reference them by `id`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Form body for `POST /admin/vendor/add`.
#[derive(Debug, Deserialize)]
pub struct VendorForm {
    pub name: String,
}

/// Response for a created vendor.
#[derive(Debug, Serialize)]
pub struct VendorCreated {
    pub vendor: i64,
}

/// Query string for `GET /admin`.
///
/// - `limit`: defaults to 50, capped at 200
/// - `offset`: defaults to 0
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Response for `GET /admin`.
#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub promos: Vec<Promotion>,
    pub vendors: Vec<Vendor>,
    pub limit: i64,
    pub offset: i64,
}
