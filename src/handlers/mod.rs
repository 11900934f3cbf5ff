//! HTTP request handlers.
//!
//! Handlers extract the request, call a service, and shape the JSON reply.

pub mod accounts;
pub mod admin;
pub mod health;
pub mod settlement;
