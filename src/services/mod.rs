//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They own the database transactions and row locks, and delegate the
//! arithmetic to `crate::ledger`.

pub mod account_service;
pub mod admin_service;
pub mod config_service;
pub mod settlement_service;
