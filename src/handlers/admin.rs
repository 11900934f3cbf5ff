//! Admin HTTP handlers.
//!
//! - GET /admin - List promotions and vendors
//! - POST /admin/promo/add - Create a promotion and apply it to all accounts
//! - POST /admin/vendor/add - Create a vendor
//! - PUT /admin/multiplier/update - Update the multiplier (floor 1)
//! - PUT /admin/max-balance/update - Update the max balance
//! - PUT /admin/max-daily/update - Update the max daily deposit
//!
//! All routes sit behind the API key middleware; each handler additionally
//! requires the caller to be an administrator (403 otherwise).

use axum::{
    Extension, Form, Json,
    extract::{
        Query, State,
        rejection::{FormRejection, QueryRejection},
    },
};
use chrono::Local;

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        config_setting::{ConfigValueResponse, MaxBalanceForm, MaxDailyForm, MultiplierForm},
        promotion::{PromotionCreated, PromotionForm},
        vendor::{AdminDashboard, ListQuery, VendorCreated, VendorForm},
    },
    services::admin_service,
    state::AppState,
};

/// List promotions and vendors.
///
/// # Query
///
/// `?limit=50&offset=0` (both optional)
pub async fn home(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<AdminDashboard>, AppError> {
    let admin = auth.require_admin()?;
    let Query(query) = query?;

    let dashboard = admin_service::dashboard(&pool, &admin, &query).await?;

    Ok(Json(dashboard))
}

/// Create a promotion.
///
/// # Request Body
///
/// ```text
/// amount=5000&expiration=2025-12-31
/// ```
///
/// # Response (200)
///
/// ```json
/// { "promo": 4, "accounts_updated": 120 }
/// ```
///
/// Whether the amount replaces or adds to each account's promo value is
/// decided by `PROMOTION_POLICY`.
pub async fn add_promo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<PromotionForm>, FormRejection>,
) -> Result<Json<PromotionCreated>, AppError> {
    let admin = auth.require_admin()?;
    let Form(form) = form?;

    let created = admin_service::add_promotion(
        &state.pool,
        &admin,
        form,
        state.config.promotion_policy,
        Local::now().date_naive(),
    )
    .await?;

    Ok(Json(created))
}

/// Create a vendor.
///
/// # Response (200)
///
/// ```json
/// { "vendor": 7 }
/// ```
pub async fn add_vendor(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<VendorForm>, FormRejection>,
) -> Result<Json<VendorCreated>, AppError> {
    let admin = auth.require_admin()?;
    let Form(form) = form?;

    let created = admin_service::add_vendor(&pool, &admin, &form.name).await?;

    Ok(Json(created))
}

/// Update the multiplier. Values below 1 are stored (and returned) as 1.
///
/// # Response (200)
///
/// ```json
/// { "configValue": 3 }
/// ```
///
/// - **Error (404)**: no config row with `config_id`
pub async fn update_multiplier(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<MultiplierForm>, FormRejection>,
) -> Result<Json<ConfigValueResponse>, AppError> {
    let admin = auth.require_admin()?;
    let Form(form) = form?;

    let updated =
        admin_service::update_multiplier(&pool, &admin, form.config_id, form.multiplier).await?;

    Ok(Json(updated))
}

pub async fn update_max_balance(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<MaxBalanceForm>, FormRejection>,
) -> Result<Json<ConfigValueResponse>, AppError> {
    let admin = auth.require_admin()?;
    let Form(form) = form?;

    let updated =
        admin_service::update_max_balance(&pool, &admin, form.config_id, form.max_balance).await?;

    Ok(Json(updated))
}

pub async fn update_max_daily(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    form: Result<Form<MaxDailyForm>, FormRejection>,
) -> Result<Json<ConfigValueResponse>, AppError> {
    let admin = auth.require_admin()?;
    let Form(form) = form?;

    let updated =
        admin_service::update_max_daily(&pool, &admin, form.config_id, form.max_daily).await?;

    Ok(Json(updated))
}
