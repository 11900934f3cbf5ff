//! Admin-controlled settings stored in the `config` table.

use serde::{Deserialize, Serialize};

use crate::ledger::{LedgerSettings, clamp_multiplier};

/// Known setting names.
pub const MULTIPLIER: &str = "multiplier";
pub const MAX_BALANCE: &str = "max_balance";
pub const MAX_DAILY: &str = "max_daily";

/// One row of the `config` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ConfigSetting {
    pub id: i64,
    pub name: String,
    pub value: i64,
}

/// Build a settings snapshot from the `config` rows.
///
/// Returns the name of the first missing setting as the error.
pub fn settings_from_rows(rows: &[ConfigSetting]) -> Result<LedgerSettings, &'static str> {
    let find = |name: &'static str| {
        rows.iter()
            .find(|row| row.name == name)
            .map(|row| row.value)
            .ok_or(name)
    };

    Ok(LedgerSettings {
        multiplier: clamp_multiplier(find(MULTIPLIER)?),
        max_balance_cents: find(MAX_BALANCE)?,
        max_daily_cents: find(MAX_DAILY)?,
    })
}

/// Form body for `PUT /admin/multiplier/update`.
#[derive(Debug, Deserialize)]
pub struct MultiplierForm {
    pub multiplier: i64,
    pub config_id: i64,
}

/// Form body for `PUT /admin/max-balance/update` (cents).
#[derive(Debug, Deserialize)]
pub struct MaxBalanceForm {
    pub max_balance: i64,
    pub config_id: i64,
}

/// Form body for `PUT /admin/max-daily/update` (cents).
#[derive(Debug, Deserialize)]
pub struct MaxDailyForm {
    pub max_daily: i64,
    pub config_id: i64,
}

/// Response for config updates. The key matches what the admin UI reads.
#[derive(Debug, Serialize)]
pub struct ConfigValueResponse {
    #[serde(rename = "configValue")]
    pub config_value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, value: i64) -> ConfigSetting {
        ConfigSetting {
            id,
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn snapshot_from_seeded_rows() {
        let rows = vec![
            row(1, MULTIPLIER, 3),
            row(2, MAX_BALANCE, 50_000),
            row(3, MAX_DAILY, 10_000),
        ];
        assert_eq!(settings_from_rows(&rows), Ok(LedgerSettings::default()));
    }

    #[test]
    fn snapshot_clamps_stored_multiplier() {
        let rows = vec![
            row(1, MULTIPLIER, 0),
            row(2, MAX_BALANCE, 1),
            row(3, MAX_DAILY, 1),
        ];
        assert_eq!(settings_from_rows(&rows).unwrap().multiplier, 1);
    }

    #[test]
    fn snapshot_names_missing_setting() {
        let rows = vec![row(1, MULTIPLIER, 3), row(3, MAX_DAILY, 10_000)];
        assert_eq!(settings_from_rows(&rows), Err(MAX_BALANCE));
    }

    #[test]
    fn response_uses_camel_case_key() {
        let body = serde_json::to_value(ConfigValueResponse { config_value: 4 }).unwrap();
        assert_eq!(body, serde_json::json!({ "configValue": 4 }));
    }
}
