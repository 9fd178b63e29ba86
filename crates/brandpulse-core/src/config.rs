use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or is out of range.
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
/// Returns `ConfigError` if a value cannot be parsed or is out of range.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields the stock
/// training setup (seed 42, 80/20 split, `min_df` 5, `max_df` 0.9).
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("BRANDPULSE_ENV", "development"))?;
    let log_level = or_default("BRANDPULSE_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("BRANDPULSE_DATA_DIR", "./data"));
    let model_path = PathBuf::from(or_default(
        "BRANDPULSE_MODEL_PATH",
        "./models/sentiment_pipeline.json",
    ));

    let seed: u64 = parse_var(&or_default, "BRANDPULSE_SEED", "42")?;
    let test_fraction: f64 = parse_var(&or_default, "BRANDPULSE_TEST_FRACTION", "0.2")?;
    let min_df: usize = parse_var(&or_default, "BRANDPULSE_MIN_DF", "5")?;
    let max_df: f64 = parse_var(&or_default, "BRANDPULSE_MAX_DF", "0.9")?;
    let max_iter: usize = parse_var(&or_default, "BRANDPULSE_MAX_ITER", "1000")?;
    let regularization_c: f64 = parse_var(&or_default, "BRANDPULSE_REGULARIZATION_C", "1.0")?;
    let tolerance: f64 = parse_var(&or_default, "BRANDPULSE_TOLERANCE", "0.0001")?;

    let config = AppConfig {
        env,
        log_level,
        data_dir,
        model_path,
        seed,
        test_fraction,
        min_df,
        max_df,
        max_iter,
        regularization_c,
        tolerance,
    };
    validate_app_config(&config)?;
    Ok(config)
}

fn parse_var<T, D>(or_default: &D, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: Fn(&str, &str) -> String,
{
    let raw = or_default(var, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn validate_app_config(config: &AppConfig) -> Result<(), ConfigError> {
    if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(ConfigError::Validation(format!(
            "BRANDPULSE_TEST_FRACTION must be in (0, 1), got {}",
            config.test_fraction
        )));
    }
    if !(config.max_df > 0.0 && config.max_df <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "BRANDPULSE_MAX_DF must be in (0, 1], got {}",
            config.max_df
        )));
    }
    if config.min_df == 0 {
        return Err(ConfigError::Validation(
            "BRANDPULSE_MIN_DF must be at least 1".to_string(),
        ));
    }
    if config.max_iter == 0 {
        return Err(ConfigError::Validation(
            "BRANDPULSE_MAX_ITER must be at least 1".to_string(),
        ));
    }
    if !(config.regularization_c > 0.0 && config.regularization_c.is_finite()) {
        return Err(ConfigError::Validation(format!(
            "BRANDPULSE_REGULARIZATION_C must be positive, got {}",
            config.regularization_c
        )));
    }
    if !(config.tolerance > 0.0) {
        return Err(ConfigError::Validation(format!(
            "BRANDPULSE_TOLERANCE must be positive, got {}",
            config.tolerance
        )));
    }
    Ok(())
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
