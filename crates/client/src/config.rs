//! Engine configuration loaded from environment variables.
//!
//! Every knob has a default matching the storefront's shipped behavior, so
//! `EngineConfig::default()` is always valid and `from_env` only overrides
//! what is explicitly set.
//!
//! # Environment Variables (all optional)
//!
//! - `DLIZZA_ROLE_LOOKUP_TIMEOUT_MS` - Deadline for the authoritative role
//!   lookup (default: 2000)
//! - `DLIZZA_POLL_INTERVAL_MS` - Wait between business-status poll attempts
//!   (default: 2000)
//! - `DLIZZA_POLL_MAX_ATTEMPTS` - Shared retry budget for the profile and
//!   business lookups (default: 15)
//! - `DLIZZA_DELIVERY_BASE_FEE` - Flat delivery fee (default: 20)
//! - `DLIZZA_DELIVERY_PER_KM_FEE` - Delivery fee per kilometer (default: 5)

use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::cart::pricing::DeliveryFees;

const DEFAULT_ROLE_LOOKUP_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 15;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Environment variable {0} must be at least {1}")]
    BelowMinimum(String, u64),
    #[error("Environment variable {0} must not be negative")]
    Negative(String),
}

/// Tunables for the session engine and pricing.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline raced against the authoritative role lookup.
    pub role_lookup_timeout: Duration,
    /// Wait between business-status poll attempts.
    pub poll_interval: Duration,
    /// Shared retry budget across the profile and business poll phases.
    pub poll_max_attempts: u32,
    /// Delivery fee policy.
    pub delivery_fees: DeliveryFees,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            role_lookup_timeout: Duration::from_millis(DEFAULT_ROLE_LOOKUP_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            delivery_fees: DeliveryFees::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse or violates
    /// its bounds. Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let role_lookup_timeout = duration_ms(
            "DLIZZA_ROLE_LOOKUP_TIMEOUT_MS",
            env_value("DLIZZA_ROLE_LOOKUP_TIMEOUT_MS"),
            DEFAULT_ROLE_LOOKUP_TIMEOUT_MS,
        )?;
        let poll_interval = duration_ms(
            "DLIZZA_POLL_INTERVAL_MS",
            env_value("DLIZZA_POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        let poll_max_attempts = attempts(
            "DLIZZA_POLL_MAX_ATTEMPTS",
            env_value("DLIZZA_POLL_MAX_ATTEMPTS"),
            DEFAULT_POLL_MAX_ATTEMPTS,
        )?;
        let base = fee(
            "DLIZZA_DELIVERY_BASE_FEE",
            env_value("DLIZZA_DELIVERY_BASE_FEE"),
            DeliveryFees::default().base,
        )?;
        let per_km = fee(
            "DLIZZA_DELIVERY_PER_KM_FEE",
            env_value("DLIZZA_DELIVERY_PER_KM_FEE"),
            DeliveryFees::default().per_km,
        )?;

        Ok(Self {
            role_lookup_timeout,
            poll_interval,
            poll_max_attempts,
            delivery_fees: DeliveryFees { base, per_km },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse a millisecond duration, requiring it to be non-zero.
fn duration_ms(key: &str, raw: Option<String>, default_ms: u64) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_millis(default_ms));
    };
    let ms: u64 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(key.to_owned(), raw.clone()))?;
    if ms == 0 {
        return Err(ConfigError::BelowMinimum(key.to_owned(), 1));
    }
    Ok(Duration::from_millis(ms))
}

/// Parse a retry budget, requiring at least one attempt.
fn attempts(key: &str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let count: u32 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(key.to_owned(), raw.clone()))?;
    if count == 0 {
        return Err(ConfigError::BelowMinimum(key.to_owned(), 1));
    }
    Ok(count)
}

/// Parse a non-negative decimal fee.
fn fee(key: &str, raw: Option<String>, default: Decimal) -> Result<Decimal, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: Decimal = raw
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(key.to_owned(), raw.clone()))?;
    if value.is_sign_negative() {
        return Err(ConfigError::Negative(key.to_owned()));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.role_lookup_timeout, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_max_attempts, 15);
        assert_eq!(config.delivery_fees.base, Decimal::from(20));
        assert_eq!(config.delivery_fees.per_km, Decimal::from(5));
    }

    #[test]
    fn test_duration_ms_unset_uses_default() {
        let duration = duration_ms("TEST", None, 2_000).unwrap();
        assert_eq!(duration, Duration::from_secs(2));
    }

    #[test]
    fn test_duration_ms_override() {
        let duration = duration_ms("TEST", Some("500".to_owned()), 2_000).unwrap();
        assert_eq!(duration, Duration::from_millis(500));
    }

    #[test]
    fn test_duration_ms_rejects_zero_and_garbage() {
        assert!(matches!(
            duration_ms("TEST", Some("0".to_owned()), 2_000),
            Err(ConfigError::BelowMinimum(_, 1))
        ));
        assert!(matches!(
            duration_ms("TEST", Some("soon".to_owned()), 2_000),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_attempts_rejects_zero() {
        assert!(attempts("TEST", Some("0".to_owned()), 15).is_err());
        assert_eq!(attempts("TEST", Some("3".to_owned()), 15).unwrap(), 3);
        assert_eq!(attempts("TEST", None, 15).unwrap(), 15);
    }

    #[test]
    fn test_fee_rejects_negative() {
        assert!(matches!(
            fee("TEST", Some("-1".to_owned()), Decimal::ZERO),
            Err(ConfigError::Negative(_))
        ));
        assert_eq!(
            fee("TEST", Some("12.50".to_owned()), Decimal::ZERO).unwrap(),
            Decimal::new(1250, 2)
        );
    }
}
