//! Account service - deposits, payments and withdrawals.
//!
//! This service handles:
//! - Per-account serialization (row lock on the account)
//! - Loading the settings snapshot once per operation
//! - Applying the ledger rules
//! - Writing the audit row and the new balances atomically
//!
//! # Atomicity Guarantees
//!
//! Every mutating operation runs inside one PostgreSQL transaction that
//! starts with `SELECT ... FOR UPDATE` on the caller's account. Concurrent
//! requests against the same account queue on that lock, so balances are
//! never computed from a stale read. A rule rejection rolls the transaction
//! back and nothing is written.

use chrono::{DateTime, Local, Utc};
use sqlx::{PgConnection, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    ledger::{self, Balances, LedgerError},
    middleware::auth::AuthContext,
    models::{
        account::{AccountOverview, DepositResponse, MagicAccount, WithdrawResponse},
        deposit::Deposit,
        payment::{Payment, PaymentResponse},
        withdrawal::Withdrawal,
    },
    services::config_service,
};

/// Balance overview for the authenticated user.
///
/// Read-only; two calls with no write in between return identical values.
pub async fn get_overview(pool: &DbPool, auth: &AuthContext) -> Result<AccountOverview, AppError> {
    let settings = config_service::load_settings(pool).await?;

    let account = sqlx::query_as::<_, MagicAccount>(
        "SELECT * FROM magic_accounts WHERE user_id = $1",
    )
    .bind(auth.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::AccountNotFound)?;

    Ok(AccountOverview::new(
        auth.username.clone(),
        &account,
        settings.multiplier,
    ))
}

/// Deposit raw money into the user's account.
///
/// # Process
///
/// 1. Lock the account row
/// 2. Load settings and sum today's deposits (local day of `now`)
/// 3. Apply the deposit rules
/// 4. Record the deposit and store the new deposit balance
/// 5. Commit
///
/// # Errors
///
/// - `AccountNotFound`: user has no magic account
/// - `Rule`: non-positive amount, daily cap, or max balance exceeded
/// - `Database`: Database error occurred
pub async fn deposit(
    pool: &DbPool,
    user_id: Uuid,
    amount_cents: i64,
    now: DateTime<Local>,
) -> Result<DepositResponse, AppError> {
    let mut tx = pool.begin().await?;

    let account = lock_account(&mut tx, user_id).await?;
    let settings = config_service::load_settings(&mut *tx).await?;

    let todays_total_cents: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount_cents), 0)::BIGINT
        FROM deposits
        WHERE account_number = $1 AND created_at >= $2
        "#,
    )
    .bind(&account.account_number)
    .bind(ledger::start_of_day(&now))
    .fetch_one(&mut *tx)
    .await?;

    let balances = match ledger::apply_deposit(
        account.balances(),
        amount_cents,
        todays_total_cents,
        &settings,
    ) {
        Ok(balances) => balances,
        Err(rule) => return reject(tx, &account.account_number, rule).await,
    };

    let deposit = sqlx::query_as::<_, Deposit>(
        r#"
        INSERT INTO deposits (account_number, amount_cents, created_at)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&account.account_number)
    .bind(amount_cents)
    .bind(now.with_timezone(&Utc))
    .fetch_one(&mut *tx)
    .await?;

    let account = store_balances(&mut tx, &account.account_number, balances).await?;

    tx.commit().await?;

    tracing::info!(
        account_number = %account.account_number,
        deposit_id = deposit.id,
        amount_cents,
        "Deposit recorded"
    );

    let balances = account.balances();
    Ok(DepositResponse {
        balance: balances.spendable(settings.multiplier),
        deposit: balances.deposit_cents,
        promo: balances.promo_cents,
        errors: Vec::new(),
    })
}

/// Pay a vendor from the user's account.
///
/// Promo credit is used first; the rest comes out of raw deposits at the
/// current multiplier. The payment is stored as `pending` until the payment
/// processor calls back.
///
/// # Errors
///
/// - `AccountNotFound`: user has no magic account
/// - `Rule`: outside the payment window, non-positive amount, insufficient funds
/// - `Validation`: unknown vendor
/// - `Database`: Database error occurred
pub async fn pay(
    pool: &DbPool,
    user_id: Uuid,
    vendor_id: i64,
    amount_cents: i64,
    now: DateTime<Local>,
) -> Result<PaymentResponse, AppError> {
    let mut tx = pool.begin().await?;

    let account = lock_account(&mut tx, user_id).await?;
    let settings = config_service::load_settings(&mut *tx).await?;

    let (balances, split) = match ledger::apply_payment(
        account.balances(),
        amount_cents,
        settings.multiplier,
        now.time(),
    ) {
        Ok(outcome) => outcome,
        Err(rule) => return reject(tx, &account.account_number, rule).await,
    };

    let vendor_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vendors WHERE id = $1)")
            .bind(vendor_id)
            .fetch_one(&mut *tx)
            .await?;

    if !vendor_exists {
        tx.rollback().await?;
        return Err(AppError::validation(format!(
            "vendor_id: no vendor with id {vendor_id}"
        )));
    }

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (
            account_number,
            vendor_id,
            amount_cents,
            promo_used_cents,
            deposit_used_cents,
            status,
            created_at
        )
        VALUES ($1, $2, $3, $4, $5, 'pending', $6)
        RETURNING *
        "#,
    )
    .bind(&account.account_number)
    .bind(vendor_id)
    .bind(amount_cents)
    .bind(split.promo_used_cents)
    .bind(split.deposit_used_cents)
    .bind(now.with_timezone(&Utc))
    .fetch_one(&mut *tx)
    .await?;

    let account = store_balances(&mut tx, &account.account_number, balances).await?;

    tx.commit().await?;

    tracing::info!(
        account_number = %account.account_number,
        payment_id = payment.id,
        vendor_id,
        amount_cents,
        promo_used_cents = split.promo_used_cents,
        deposit_used_cents = split.deposit_used_cents,
        "Payment accepted"
    );

    let balances = account.balances();
    Ok(PaymentResponse {
        payment: payment.id,
        status: payment.status,
        balance: balances.spendable(settings.multiplier),
        promo: balances.promo_cents,
        errors: Vec::new(),
    })
}

/// Withdraw raw deposited money.
///
/// Promo credit and the multiplied part of the balance are never paid out.
///
/// # Errors
///
/// - `AccountNotFound`: user has no magic account
/// - `Rule`: non-positive amount or more than the deposit balance
/// - `Database`: Database error occurred
pub async fn withdraw(
    pool: &DbPool,
    user_id: Uuid,
    amount_cents: i64,
) -> Result<WithdrawResponse, AppError> {
    let mut tx = pool.begin().await?;

    let account = lock_account(&mut tx, user_id).await?;

    let balances = match ledger::apply_withdraw(account.balances(), amount_cents) {
        Ok(balances) => balances,
        Err(rule) => return reject(tx, &account.account_number, rule).await,
    };

    let withdrawal = sqlx::query_as::<_, Withdrawal>(
        r#"
        INSERT INTO withdrawals (account_number, amount_cents)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(&account.account_number)
    .bind(amount_cents)
    .fetch_one(&mut *tx)
    .await?;

    let account = store_balances(&mut tx, &account.account_number, balances).await?;

    tx.commit().await?;

    tracing::info!(
        account_number = %account.account_number,
        withdrawal_id = withdrawal.id,
        amount_cents,
        "Withdrawal recorded"
    );

    Ok(WithdrawResponse {
        balance: account.deposit_balance_cents,
        withdrawal: withdrawal.id,
        errors: Vec::new(),
    })
}

/// Lock the user's account row for the rest of the transaction.
async fn lock_account(conn: &mut PgConnection, user_id: Uuid) -> Result<MagicAccount, AppError> {
    sqlx::query_as::<_, MagicAccount>(
        "SELECT * FROM magic_accounts WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::AccountNotFound)
}

/// Write both stored balances of an account. Caller must hold the row lock.
pub(crate) async fn store_balances(
    conn: &mut PgConnection,
    account_number: &str,
    balances: Balances,
) -> Result<MagicAccount, AppError> {
    let account = sqlx::query_as::<_, MagicAccount>(
        r#"
        UPDATE magic_accounts
        SET deposit_balance_cents = $1,
            promo_value_cents = $2,
            updated_at = NOW()
        WHERE account_number = $3
        RETURNING *
        "#,
    )
    .bind(balances.deposit_cents)
    .bind(balances.promo_cents)
    .bind(account_number)
    .fetch_one(&mut *conn)
    .await?;

    Ok(account)
}

async fn reject<T>(
    tx: Transaction<'_, Postgres>,
    account_number: &str,
    rule: LedgerError,
) -> Result<T, AppError> {
    tx.rollback().await?;
    tracing::warn!(account_number, reason = %rule, "Ledger rule rejected operation");
    Err(AppError::Rule(rule))
}
