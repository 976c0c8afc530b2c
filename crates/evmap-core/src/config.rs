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

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_secs = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        let secs = raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        Ok(secs)
    };

    let optional_secret = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let env = parse_environment(&or_default("EVMAP_ENV", "development"))?;
    let log_level = or_default("EVMAP_LOG_LEVEL", "info");
    let detectors_path =
        PathBuf::from(or_default("EVMAP_DETECTORS_PATH", "./config/detectors.yaml"));

    let http_timeout_secs = parse_secs("EVMAP_HTTP_TIMEOUT_SECS", "10")?;
    let http_connect_timeout_secs = parse_secs("EVMAP_HTTP_CONNECT_TIMEOUT_SECS", "10")?;
    let lookup_timeout_secs = parse_secs("EVMAP_LOOKUP_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("EVMAP_USER_AGENT", "evmap/0.1 (availability)");

    let chargeprice_api_key = optional_secret("CHARGEPRICE_API_KEY");
    let fronyx_api_key = optional_secret("FRONYX_API_KEY");

    Ok(AppConfig {
        env,
        log_level,
        detectors_path,
        http_timeout_secs,
        http_connect_timeout_secs,
        user_agent,
        lookup_timeout_secs,
        chargeprice_api_key,
        fronyx_api_key,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "EVMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
