//! Magic account data models and API request/response types.
//!
//! This module defines:
//! - `MagicAccount`: Database entity representing a user's magic account
//! - `AmountForm`: Form body for deposit and withdraw
//! - `AccountOverview`, `DepositResponse`, `WithdrawResponse`: Response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::Balances;

/// Represents a magic account record from the database.
///
/// # Database Table
///
/// Maps to the `magic_accounts` table. Each account:
/// - Belongs to exactly one user (via `user_id`)
/// - Stores raw deposits and promo credit separately, in cents
///
/// The spendable balance is never stored. It is derived from these two
/// columns and the current multiplier on every read.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct MagicAccount {
    /// Public account number, referenced by deposits, payments and withdrawals
    pub account_number: String,

    /// Owner of this account
    pub user_id: Uuid,

    /// Sum of unspent raw deposits in cents
    ///
    /// Must be >= 0 (enforced by database CHECK constraint).
    pub deposit_balance_cents: i64,

    /// Promotional credit in cents
    ///
    /// Must be >= 0 (enforced by database CHECK constraint).
    pub promo_value_cents: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl MagicAccount {
    pub fn balances(&self) -> Balances {
        Balances::new(self.deposit_balance_cents, self.promo_value_cents)
    }
}

/// Form body for `POST /account/deposit` and `POST /account/withdraw`.
///
/// ```text
/// amount=2000
/// ```
///
/// `amount` is in cents.
#[derive(Debug, Deserialize)]
pub struct AmountForm {
    pub amount: i64,
}

/// Response for `GET /account`.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "alice",
///   "account_number": "MA-000001",
///   "deposit": 5000,
///   "balance": 15000,
///   "promo": 2000,
///   "spendable": 17000,
///   "multiplier": 3
/// }
/// ```
///
/// - `deposit`: raw deposited money, the only part that can be withdrawn
/// - `balance`: `deposit * multiplier`
/// - `spendable`: `balance + promo`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AccountOverview {
    pub username: String,
    pub account_number: String,
    pub deposit: i64,
    pub balance: i64,
    pub promo: i64,
    pub spendable: i64,
    pub multiplier: i64,
}

impl AccountOverview {
    pub fn new(username: String, account: &MagicAccount, multiplier: i64) -> Self {
        let balances = account.balances();
        Self {
            username,
            account_number: account.account_number.clone(),
            deposit: balances.deposit_cents,
            balance: balances.multiplied(multiplier),
            promo: balances.promo_cents,
            spendable: balances.spendable(multiplier),
            multiplier,
        }
    }
}

/// Response for a successful deposit.
///
/// `balance` is the new spendable balance. `errors` is always empty here;
/// rejected deposits are reported through `AppError::Rule`.
#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub balance: i64,
    pub deposit: i64,
    pub promo: i64,
    pub errors: Vec<String>,
}

/// Response for a successful withdrawal.
///
/// `balance` is the remaining raw deposit balance.
#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    pub balance: i64,
    pub withdrawal: i64,
    pub errors: Vec<String>,
}
