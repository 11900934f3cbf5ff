//! Payment processor callback.
//!
//! `POST /payments/{id}/settlement` is not behind API key authentication.
//! The processor signs the raw body with the shared `SETTLEMENT_SECRET`
//! instead, and the signature is checked before anything is parsed or read
//! from the database.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
};

use crate::{
    error::AppError,
    models::payment::{Payment, SettlementRequest},
    services::settlement_service::{self, SIGNATURE_HEADER},
    state::AppState,
};

/// Record the final status of a payment.
///
/// # Request
///
/// ```text
/// X-Signature: sha256=<hex HMAC-SHA256(secret, body)>
///
/// { "status": "failed" }
/// ```
///
/// # Response
///
/// - **200**: the updated payment
/// - **401**: missing or wrong signature
/// - **404**: unknown payment
/// - **409**: payment is no longer pending
pub async fn settle_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Payment>, AppError> {
    settlement_service::verify_signature(
        &state.config.settlement_secret,
        &body,
        headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok()),
    )?;

    let request: SettlementRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation(format!("Invalid settlement body: {e}")))?;

    let payment =
        settlement_service::settle_payment(&state.pool, payment_id, request.status).await?;

    Ok(Json(payment))
}
