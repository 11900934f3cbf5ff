//! HTTP middleware components.
//!
//! Middleware run before route handlers and can short-circuit a request
//! (e.g. reject an unknown API key) before it reaches a handler.

/// API key authentication middleware and the admin capability
pub mod auth;
