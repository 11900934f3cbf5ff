//! Admin service - promotions, vendors and settings.
//!
//! Every public function takes an `AdminCapability`, which can only be
//! obtained from an authenticated administrator's `AuthContext`.

use chrono::NaiveDate;

use crate::{
    db::DbPool,
    error::AppError,
    ledger::{PromotionPolicy, clamp_multiplier},
    middleware::auth::AdminCapability,
    models::{
        config_setting::{ConfigSetting, ConfigValueResponse, MAX_BALANCE, MAX_DAILY, MULTIPLIER},
        promotion::{Promotion, PromotionCreated, PromotionForm},
        vendor::{AdminDashboard, ListQuery, MAX_VENDOR_NAME_LEN, Vendor, VendorCreated},
    },
};

/// Promotions and vendors, newest first, one page at a time.
pub async fn dashboard(
    pool: &DbPool,
    _admin: &AdminCapability,
    query: &ListQuery,
) -> Result<AdminDashboard, AppError> {
    let (limit, offset) = (query.limit(), query.offset());

    let promos = sqlx::query_as::<_, Promotion>(
        "SELECT * FROM promotions ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let vendors = sqlx::query_as::<_, Vendor>(
        "SELECT * FROM vendors ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(AdminDashboard {
        promos,
        vendors,
        limit,
        offset,
    })
}

/// Check a promotion form and return the parsed expiration date.
///
/// All problems are reported together.
pub fn validate_promotion(form: &PromotionForm, today: NaiveDate) -> Result<NaiveDate, AppError> {
    let mut errors = Vec::new();

    if form.amount <= 0 {
        errors.push("amount: must be greater than 0".to_string());
    }

    let expiration = match NaiveDate::parse_from_str(form.expiration.trim(), "%Y-%m-%d") {
        Ok(date) if date < today => {
            errors.push("expiration: must not be in the past".to_string());
            None
        }
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("expiration: expected a date formatted YYYY-MM-DD".to_string());
            None
        }
    };

    match expiration {
        Some(date) if errors.is_empty() => Ok(date),
        _ => Err(AppError::Validation(errors)),
    }
}

/// Create a promotion and apply it to every account.
///
/// # Process
///
/// 1. Validate the form
/// 2. Insert the promotion
/// 3. Lock all accounts and compute each new promo value with `policy`
/// 4. Write all promo values in one statement, commit
pub async fn add_promotion(
    pool: &DbPool,
    admin: &AdminCapability,
    form: PromotionForm,
    policy: PromotionPolicy,
    today: NaiveDate,
) -> Result<PromotionCreated, AppError> {
    let expiration = validate_promotion(&form, today)?;

    let mut tx = pool.begin().await?;

    let promotion = sqlx::query_as::<_, Promotion>(
        "INSERT INTO promotions (amount_cents, expiration) VALUES ($1, $2) RETURNING *",
    )
    .bind(form.amount)
    .bind(expiration)
    .fetch_one(&mut *tx)
    .await?;

    let current: Vec<(String, i64)> = sqlx::query_as(
        "SELECT account_number, promo_value_cents FROM magic_accounts ORDER BY account_number FOR UPDATE",
    )
    .fetch_all(&mut *tx)
    .await?;

    let (account_numbers, promo_values): (Vec<String>, Vec<i64>) = current
        .into_iter()
        .map(|(number, promo)| (number, policy.apply(promo, promotion.amount_cents)))
        .unzip();

    let accounts_updated = if account_numbers.is_empty() {
        0
    } else {
        sqlx::query(
            r#"
            UPDATE magic_accounts AS a
            SET promo_value_cents = v.promo,
                updated_at = NOW()
            FROM UNNEST($1::TEXT[], $2::BIGINT[]) AS v(account_number, promo)
            WHERE a.account_number = v.account_number
            "#,
        )
        .bind(&account_numbers)
        .bind(&promo_values)
        .execute(&mut *tx)
        .await?
        .rows_affected()
    };

    tx.commit().await?;

    tracing::info!(
        admin = %admin.user_id(),
        promotion_id = promotion.id,
        amount_cents = promotion.amount_cents,
        ?policy,
        accounts_updated,
        "Promotion applied"
    );

    Ok(PromotionCreated {
        promo: promotion.id,
        accounts_updated,
    })
}

/// Trimmed vendor name, or the validation error.
pub fn validate_vendor_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(AppError::validation("name: must not be empty"));
    }
    if name.chars().count() > MAX_VENDOR_NAME_LEN {
        return Err(AppError::validation(format!(
            "name: must be at most {MAX_VENDOR_NAME_LEN} characters"
        )));
    }

    Ok(name)
}

pub async fn add_vendor(
    pool: &DbPool,
    admin: &AdminCapability,
    name: &str,
) -> Result<VendorCreated, AppError> {
    let name = validate_vendor_name(name)?;

    let vendor = sqlx::query_as::<_, Vendor>("INSERT INTO vendors (name) VALUES ($1) RETURNING *")
        .bind(name)
        .fetch_one(pool)
        .await?;

    tracing::info!(
        admin = %admin.user_id(),
        vendor_id = vendor.id,
        name = %vendor.name,
        "Vendor added"
    );

    Ok(VendorCreated { vendor: vendor.id })
}

/// Set the multiplier. Values below 1 are stored as 1.
pub async fn update_multiplier(
    pool: &DbPool,
    admin: &AdminCapability,
    config_id: i64,
    multiplier: i64,
) -> Result<ConfigValueResponse, AppError> {
    update_setting(pool, admin, config_id, MULTIPLIER, clamp_multiplier(multiplier)).await
}

pub async fn update_max_balance(
    pool: &DbPool,
    admin: &AdminCapability,
    config_id: i64,
    max_balance_cents: i64,
) -> Result<ConfigValueResponse, AppError> {
    update_setting(pool, admin, config_id, MAX_BALANCE, max_balance_cents).await
}

pub async fn update_max_daily(
    pool: &DbPool,
    admin: &AdminCapability,
    config_id: i64,
    max_daily_cents: i64,
) -> Result<ConfigValueResponse, AppError> {
    update_setting(pool, admin, config_id, MAX_DAILY, max_daily_cents).await
}

/// Overwrite one `config` row, checking it is the setting the endpoint is for.
async fn update_setting(
    pool: &DbPool,
    admin: &AdminCapability,
    config_id: i64,
    expected_name: &str,
    value: i64,
) -> Result<ConfigValueResponse, AppError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, ConfigSetting>(
        "SELECT id, name, value FROM config WHERE id = $1 FOR UPDATE",
    )
    .bind(config_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::ConfigNotFound(format!("id {config_id}")))?;

    if row.name != expected_name {
        tx.rollback().await?;
        return Err(AppError::validation(format!(
            "config_id: setting {config_id} is '{}', not '{expected_name}'",
            row.name
        )));
    }

    sqlx::query("UPDATE config SET value = $1 WHERE id = $2")
        .bind(value)
        .bind(config_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        admin = %admin.user_id(),
        setting = expected_name,
        old_value = row.value,
        new_value = value,
        "Setting updated"
    );

    Ok(ConfigValueResponse {
        config_value: value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn form(amount: i64, expiration: &str) -> PromotionForm {
        PromotionForm {
            amount,
            expiration: expiration.to_string(),
        }
    }

    #[test]
    fn promotion_form_accepts_today_and_later() {
        assert_eq!(
            validate_promotion(&form(5_000, "2024-06-01"), today()).unwrap(),
            today()
        );
        assert!(validate_promotion(&form(1, " 2025-01-31 "), today()).is_ok());
    }

    #[test]
    fn promotion_form_collects_all_errors() {
        match validate_promotion(&form(0, "yesterday"), today()) {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn promotion_in_the_past_is_rejected() {
        match validate_promotion(&form(100, "2024-05-31"), today()) {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors, vec!["expiration: must not be in the past"])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn vendor_name_rules() {
        assert_eq!(validate_vendor_name("  The Bar  ").unwrap(), "The Bar");
        assert!(validate_vendor_name("   ").is_err());
        assert!(validate_vendor_name(&"x".repeat(MAX_VENDOR_NAME_LEN)).is_ok());
        assert!(validate_vendor_name(&"x".repeat(MAX_VENDOR_NAME_LEN + 1)).is_err());
    }
}
