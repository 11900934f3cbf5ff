//! Magic account HTTP handlers.
//!
//! This module implements the account holder's endpoints:
//! - GET /account - Balance overview
//! - POST /account/deposit - Deposit funds
//! - POST /account/payment - Pay a vendor
//! - POST /account/withdraw - Withdraw deposited funds
//!
//! Request bodies are form-encoded; amounts are in cents. Business-rule
//! rejections come back as HTTP 200 with a non-empty `errors` list.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        account::{AccountOverview, AmountForm, DepositResponse, WithdrawResponse},
        payment::{PaymentForm, PaymentResponse},
    },
    services::account_service,
};
use axum::{
    Extension, Form, Json,
    extract::{State, rejection::FormRejection},
};
use chrono::Local;

/// Balance overview for the authenticated user.
///
/// # Response (200)
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
/// - **Error (404)**: the user has no magic account
pub async fn get_account(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AccountOverview>, AppError> {
    let overview = account_service::get_overview(&pool, &auth).await?;

    Ok(Json(overview))
}

/// Deposit raw money.
///
/// # Request Body
///
/// ```text
/// amount=2000
/// ```
///
/// # Response (200)
///
/// ```json
/// { "balance": 21000, "deposit": 7000, "promo": 0, "errors": [] }
/// ```
///
/// `balance` is the new spendable balance. Over the daily cap, over the max
/// balance, or a non-positive amount:
///
/// ```json
/// { "errors": ["You can only deposit a maximum of 6kr"] }
/// ```
pub async fn deposit(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<AmountForm>, FormRejection>,
) -> Result<Json<DepositResponse>, AppError> {
    let Form(form) = form?;

    let response = account_service::deposit(&pool, auth.user_id, form.amount, Local::now()).await?;

    Ok(Json(response))
}

/// Pay a vendor.
///
/// # Request Body
///
/// ```text
/// amount=4500&vendor_id=2
/// ```
///
/// # Response (200)
///
/// ```json
/// { "payment": 17, "status": "pending", "balance": 12500, "promo": 0, "errors": [] }
/// ```
///
/// Only accepted between 12:00:00 and 23:59:59 server local time.
/// - **Error (400)**: unknown `vendor_id`
pub async fn payment(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<PaymentForm>, FormRejection>,
) -> Result<Json<PaymentResponse>, AppError> {
    let Form(form) = form?;

    let response =
        account_service::pay(&pool, auth.user_id, form.vendor_id, form.amount, Local::now())
            .await?;

    Ok(Json(response))
}

/// Withdraw raw deposited money.
///
/// # Request Body
///
/// ```text
/// amount=1000
/// ```
///
/// # Response (200)
///
/// ```json
/// { "balance": 4000, "withdrawal": 3, "errors": [] }
/// ```
///
/// `balance` is the deposit balance left.
pub async fn withdraw(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<AmountForm>, FormRejection>,
) -> Result<Json<WithdrawResponse>, AppError> {
    let Form(form) = form?;

    let response = account_service::withdraw(&pool, auth.user_id, form.amount).await?;

    Ok(Json(response))
}
