//! Withdrawal audit rows.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents a withdrawal record from the database.
///
/// Maps to the `withdrawals` table. Only raw deposited money is ever paid out,
/// so `amount_cents` is in deposit units.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Withdrawal {
    pub id: i64,
    pub account_number: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}
