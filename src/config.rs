use crate::utils::error::{AppError, AppResult};
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use strum_macros::{Display, EnumString};

// 30 days
const MAX_EXPIRED_HOLD_RETENTION: Duration = Duration::from_secs(30 * 86_400);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Memory,
    Mysql,
}

/// How expired holds get their seats back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExpiryPolicy {
    /// Purge on the next access to the showing only.
    Lazy,
    /// Also purge every showing from a background task.
    Sweep,
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub hold_ttl: Duration,
    pub max_hold_ttl: Duration,
    pub max_seats_per_hold: usize,
    pub expiry_policy: ExpiryPolicy,
    pub sweep_interval: Duration,
    pub expired_hold_retention: Duration,
}

impl Default for BookingConfig {
    fn default() -> Self {
        BookingConfig {
            store_backend: StoreBackend::Memory,
            database_url: None,
            hold_ttl: Duration::from_secs(300),
            max_hold_ttl: Duration::from_secs(900),
            max_seats_per_hold: 10,
            expiry_policy: ExpiryPolicy::Sweep,
            sweep_interval: Duration::from_secs(15),
            expired_hold_retention: Duration::from_secs(86_400),
        }
    }
}

impl BookingConfig {
    /// Read the configuration from the process environment, loading `.env` first.
    pub fn from_env() -> AppResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = BookingConfig::default();

        let config = BookingConfig {
            store_backend: parse_or(&lookup, "STORE_BACKEND", defaults.store_backend)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            hold_ttl: seconds_or(&lookup, "HOLD_TTL_SECONDS", defaults.hold_ttl)?,
            max_hold_ttl: seconds_or(&lookup, "MAX_HOLD_TTL_SECONDS", defaults.max_hold_ttl)?,
            max_seats_per_hold: parse_or(&lookup, "MAX_SEATS_PER_HOLD", defaults.max_seats_per_hold)?,
            expiry_policy: parse_or(&lookup, "EXPIRY_POLICY", defaults.expiry_policy)?,
            sweep_interval: seconds_or(&lookup, "SWEEP_INTERVAL_SECONDS", defaults.sweep_interval)?,
            expired_hold_retention: seconds_or(
                &lookup,
                "EXPIRED_HOLD_RETENTION_SECONDS",
                defaults.expired_hold_retention,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.store_backend == StoreBackend::Mysql && self.database_url.is_none() {
            return Err(AppError::Configuration(
                "DATABASE_URL must be set for the mysql store backend".into(),
            ));
        }
        if self.hold_ttl.is_zero() || self.sweep_interval.is_zero() {
            return Err(AppError::Configuration(
                "HOLD_TTL_SECONDS and SWEEP_INTERVAL_SECONDS must be positive".into(),
            ));
        }
        if self.max_hold_ttl < self.hold_ttl {
            return Err(AppError::Configuration(
                "MAX_HOLD_TTL_SECONDS must not be below HOLD_TTL_SECONDS".into(),
            ));
        }
        if self.max_seats_per_hold == 0 {
            return Err(AppError::Configuration("MAX_SEATS_PER_HOLD must be positive".into()));
        }
        if self.expired_hold_retention > MAX_EXPIRED_HOLD_RETENTION {
            return Err(AppError::Configuration(format!(
                "EXPIRED_HOLD_RETENTION_SECONDS must not exceed {}",
                MAX_EXPIRED_HOLD_RETENTION.as_secs()
            )));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid value for {}: {}", key, raw))),
        _ => Ok(default),
    }
}

fn seconds_or<F>(lookup: &F, key: &str, default: Duration) -> AppResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}
