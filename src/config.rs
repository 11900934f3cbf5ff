//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.
//!
//! Business settings (multiplier, max balance, max daily deposit) are not
//! part of this struct; administrators change those at runtime through the
//! `config` table.

use serde::Deserialize;

use crate::ledger::PromotionPolicy;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SETTLEMENT_SECRET` (required): shared HMAC key for payment settlement callbacks
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `PROMOTION_POLICY` (optional): `overwrite` or `stack`, defaults to `overwrite`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub settlement_secret: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub promotion_policy: PromotionPolicy,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config: Config = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/magic_account"),
            ("SETTLEMENT_SECRET", "shh"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.promotion_policy, PromotionPolicy::Overwrite);
    }

    #[test]
    fn promotion_policy_from_env() {
        let config: Config = envy::from_iter(vars(&[
            ("DATABASE_URL", "postgres://localhost/magic_account"),
            ("SETTLEMENT_SECRET", "shh"),
            ("SERVER_PORT", "8080"),
            ("PROMOTION_POLICY", "stack"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.promotion_policy, PromotionPolicy::Stack);
    }

    #[test]
    fn settlement_secret_is_required() {
        let result = envy::from_iter::<_, Config>(vars(&[(
            "DATABASE_URL",
            "postgres://localhost/magic_account",
        )]));
        assert!(result.is_err());
    }
}
