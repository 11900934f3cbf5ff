//! Payment data models and API request/response types.
//!
//! This module defines:
//! - `Payment`: Database entity for a purchase at a vendor
//! - `PaymentStatus`: Settlement state, driven by the payment processor
//! - `PaymentForm`: Form body for `POST /account/payment`
//! - `SettlementRequest`: JSON body of the processor's status callback

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::PaymentSplit;

/// Settlement state of a payment.
///
/// Stored as the Postgres enum `payment_status`. A payment is created as
/// `Pending` and moves exactly once to `Settled` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Settled,
    Failed,
}

/// Represents a payment record from the database.
///
/// # Database Table
///
/// Maps to the `payments` table. Besides the charged amount, each row keeps
/// how much came out of promo credit and how much out of raw deposits, so a
/// failed settlement can be reversed exactly.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Payment {
    pub id: i64,

    pub account_number: String,

    pub vendor_id: i64,

    /// Charged amount in cents (spendable units)
    pub amount_cents: i64,

    /// Part of the amount paid with promo credit
    pub promo_used_cents: i64,

    /// Raw deposit units given up for the rest of the amount
    pub deposit_used_cents: i64,

    pub status: PaymentStatus,

    pub created_at: DateTime<Utc>,

    /// Set when the processor reports the outcome
    pub settled_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn split(&self) -> PaymentSplit {
        PaymentSplit {
            promo_used_cents: self.promo_used_cents,
            deposit_used_cents: self.deposit_used_cents,
        }
    }
}

/// Form body for `POST /account/payment`.
///
/// ```text
/// amount=4500&vendor_id=2
/// ```
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub amount: i64,
    pub vendor_id: i64,
}

/// Response for an accepted payment.
///
/// `balance` is the spendable balance left after the payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: i64,
    pub status: PaymentStatus,
    pub balance: i64,
    pub promo: i64,
    pub errors: Vec<String>,
}

/// Outcome reported by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementOutcome {
    Settled,
    Failed,
}

impl From<SettlementOutcome> for PaymentStatus {
    fn from(outcome: SettlementOutcome) -> Self {
        match outcome {
            SettlementOutcome::Settled => PaymentStatus::Settled,
            SettlementOutcome::Failed => PaymentStatus::Failed,
        }
    }
}

/// JSON body of `POST /payments/{id}/settlement`.
///
/// ```json
/// { "status": "settled" }
/// ```
#[derive(Debug, Deserialize)]
pub struct SettlementRequest {
    pub status: SettlementOutcome,
}
