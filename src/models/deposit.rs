//! Deposit audit rows.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a deposit record from the database.
///
/// # Database Table
///
/// Maps to the `deposits` table. Rows are immutable once written; the sum of
/// today's rows is what the daily deposit cap is checked against.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Deposit {
    pub id: i64,
    pub account_number: String,
    /// Raw amount in cents, before the multiplier
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}
