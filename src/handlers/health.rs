//! Health check endpoint for service monitoring.

use crate::{db::DbPool, error::AppError, ledger::LedgerSettings, services::config_service};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,

    pub database: String,

    /// Settings currently in force
    pub multiplier: i64,
    pub max_balance: i64,
    pub max_daily: i64,

    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    fn healthy(settings: LedgerSettings) -> Self {
        Self {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            multiplier: settings.multiplier,
            max_balance: settings.max_balance_cents,
            max_daily: settings.max_daily_cents,
            timestamp: Utc::now(),
        }
    }
}

/// Health check handler.
///
/// Loading the settings snapshot proves both that the database answers and
/// that the `config` table is seeded.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "multiplier": 3,
///   "max_balance": 50000,
///   "max_daily": 10000,
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
pub async fn health_check(State(pool): State<DbPool>) -> Result<Json<HealthResponse>, AppError> {
    let settings = config_service::load_settings(&pool).await?;

    Ok(Json(HealthResponse::healthy(settings)))
}
