//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the form bodies and JSON responses built from them.

/// Magic account rows and account endpoint bodies
pub mod account;
/// API key lookup model
pub mod api_key;
/// Admin-controlled settings
pub mod config_setting;
/// Deposit audit rows
pub mod deposit;
/// Payments and settlement callbacks
pub mod payment;
/// Promotions
pub mod promotion;
/// Vendors
pub mod vendor;
/// Withdrawal audit rows
pub mod withdrawal;
