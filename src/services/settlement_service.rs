//! Settlement service for payment processor callbacks.
//!
//! The payment processor reports the outcome of each pending payment by
//! calling `POST /payments/{id}/settlement`. Calls are authenticated with an
//! HMAC-SHA256 signature over the raw request body.
//!
//! # Signature Format
//!
//! `X-Signature: sha256=<hex_encoded_hmac>`

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    db::DbPool,
    error::AppError,
    ledger,
    models::{
        account::MagicAccount,
        payment::{Payment, PaymentStatus, SettlementOutcome},
    },
    services::account_service,
};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the callback signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Compute the signature header value for a callback body.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, AppError> {
    let mut mac = new_mac(secret)?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify a callback signature in constant time.
///
/// # Errors
///
/// `InvalidSignature` if the header is missing, malformed, or does not match.
pub fn verify_signature(secret: &str, body: &[u8], header: Option<&str>) -> Result<(), AppError> {
    let provided = header
        .and_then(|h| h.strip_prefix("sha256="))
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(AppError::InvalidSignature)?;

    let mut mac = new_mac(secret)?;
    mac.update(body);
    mac.verify_slice(&provided).map_err(|_| {
        tracing::warn!("Settlement callback signature mismatch");
        AppError::InvalidSignature
    })
}

fn new_mac(secret: &str) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AppError::InvalidSignature)
}

/// Move a pending payment to its final state.
///
/// # Process
///
/// 1. Lock the payment row
/// 2. Reject if it is no longer `pending`
/// 3. On `failed`, lock the account and give back exactly what the payment took
/// 4. Store the new status and commit
///
/// # Errors
///
/// - `PaymentNotFound`: no payment with this id
/// - `PaymentAlreadySettled`: payment already settled or failed
/// - `Database`: Database error occurred
pub async fn settle_payment(
    pool: &DbPool,
    payment_id: i64,
    outcome: SettlementOutcome,
) -> Result<Payment, AppError> {
    let mut tx = pool.begin().await?;

    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 FOR UPDATE")
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::PaymentNotFound)?;

    if payment.status != PaymentStatus::Pending {
        tx.rollback().await?;
        return Err(AppError::PaymentAlreadySettled);
    }

    let status = PaymentStatus::from(outcome);

    if status == PaymentStatus::Failed {
        let account = sqlx::query_as::<_, MagicAccount>(
            "SELECT * FROM magic_accounts WHERE account_number = $1 FOR UPDATE",
        )
        .bind(&payment.account_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::AccountNotFound)?;

        let refunded = ledger::refund_payment(account.balances(), payment.split());
        account_service::store_balances(&mut tx, &account.account_number, refunded).await?;
    }

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = $1,
            settled_at = NOW()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(status)
    .bind(payment_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(payment_id, status = ?payment.status, "Payment settled");

    Ok(payment)
}
