//! Promotion models.
//!
//! A promotion is a grant of promo credit created by an administrator. Creating
//! one also applies its amount to every magic account, according to the
//! configured `PromotionPolicy`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Represents a promotion record from the database.
///
/// Maps to the `promotions` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Promotion {
    pub id: i64,

    /// Promo credit in cents
    pub amount_cents: i64,

    /// Last day the promotion is advertised
    pub expiration: NaiveDate,

    pub created_at: DateTime<Utc>,
}

/// Form body for `POST /admin/promo/add`.
///
/// ```text
/// amount=5000&expiration=2025-12-31
/// ```
///
/// # Validation
///
/// - `amount`: cents, must be positive
/// - `expiration`: `YYYY-MM-DD`, not in the past
#[derive(Debug, Deserialize)]
pub struct PromotionForm {
    pub amount: i64,
    pub expiration: String,
}

/// Response for a created promotion.
#[derive(Debug, Serialize)]
pub struct PromotionCreated {
    pub promo: i64,
    pub accounts_updated: u64,
}
