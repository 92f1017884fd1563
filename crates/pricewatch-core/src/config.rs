use rust_decimal::Decimal;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so tests can drive it from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<Decimal>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PRICEWATCH_ENV", "development"))?;
    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");

    let merchant_id = lookup("PRICEWATCH_MERCHANT_ID")
        .ok()
        .filter(|s| !s.is_empty());
    let merchant_key = lookup("PRICEWATCH_MERCHANT_KEY")
        .ok()
        .filter(|s| !s.is_empty());
    let ranking_base_url = or_default(
        "PRICEWATCH_RANKING_BASE_URL",
        "https://services.7pixel.it/api/v1",
    );

    let request_timeout_secs = parse_u64("PRICEWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    let token_timeout_secs = parse_u64("PRICEWATCH_TOKEN_TIMEOUT_SECS", "10")?;
    let max_retries = parse_u32("PRICEWATCH_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("PRICEWATCH_RETRY_BACKOFF_BASE_SECS", "1")?;

    let high_priority_popularity_max = parse_u32("PRICEWATCH_HIGH_PRIORITY_POPULARITY_MAX", "3")?;
    let critical_gap_threshold = parse_decimal("PRICEWATCH_CRITICAL_GAP_THRESHOLD", "1.00")?;
    if critical_gap_threshold < Decimal::ZERO {
        return Err(invalid(
            "PRICEWATCH_CRITICAL_GAP_THRESHOLD",
            "must not be negative".to_string(),
        ));
    }

    let image_placeholder_url = or_default(
        "PRICEWATCH_IMAGE_PLACEHOLDER_URL",
        "https://placehold.co/400x400?text=No+Image",
    );
    let brands_path = PathBuf::from(or_default("PRICEWATCH_BRANDS_PATH", "./config/brands.yaml"));
    let reports_dir = PathBuf::from(or_default("PRICEWATCH_REPORTS_DIR", "./reports"));
    let market_seed = parse_u64("PRICEWATCH_MARKET_SEED", "0")?;

    Ok(AppConfig {
        env,
        log_level,
        merchant_id,
        merchant_key,
        ranking_base_url,
        request_timeout_secs,
        token_timeout_secs,
        max_retries,
        retry_backoff_base_secs,
        high_priority_popularity_max,
        critical_gap_threshold,
        image_placeholder_url,
        brands_path,
        reports_dir,
        market_seed,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
