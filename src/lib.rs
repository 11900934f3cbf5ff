//! Magic Account service.
//!
//! Users deposit money into a magic account, which multiplies it into
//! spendable credit and holds admin-granted promo credit. Funds are spent at
//! vendors during the afternoon and evening; only raw deposits can be
//! withdrawn. Administrators manage promotions, vendors and the settings
//! that drive the ledger rules.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
