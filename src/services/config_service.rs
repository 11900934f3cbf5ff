//! Reading the admin-controlled settings.
//!
//! Every request that needs the multiplier or the caps loads one snapshot at
//! its start and passes it down explicitly. Nothing is cached between
//! requests, so admin changes apply to the next request.

use sqlx::PgExecutor;

use crate::{
    error::AppError,
    ledger::LedgerSettings,
    models::config_setting::{
        ConfigSetting, MAX_BALANCE, MAX_DAILY, MULTIPLIER, settings_from_rows,
    },
};

const SETTING_NAMES: [&str; 3] = [MULTIPLIER, MAX_BALANCE, MAX_DAILY];

/// Load the settings snapshot.
///
/// # Errors
///
/// - `ConfigNotFound`: one of the seeded rows is missing
/// - `Database`: query failed
pub async fn load_settings<'e, E>(executor: E) -> Result<LedgerSettings, AppError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ConfigSetting>(
        "SELECT id, name, value FROM config WHERE name = ANY($1)",
    )
    .bind(&SETTING_NAMES[..])
    .fetch_all(executor)
    .await?;

    settings_from_rows(&rows).map_err(|name| AppError::ConfigNotFound(format!("name {name}")))
}
