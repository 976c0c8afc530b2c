use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "EVMAP_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.detectors_path,
        std::path::PathBuf::from("./config/detectors.yaml")
    );
    assert_eq!(cfg.http_timeout_secs, 10);
    assert_eq!(cfg.http_connect_timeout_secs, 10);
    assert_eq!(cfg.lookup_timeout_secs, 20);
    assert_eq!(cfg.user_agent, "evmap/0.1 (availability)");
    assert!(cfg.chargeprice_api_key.is_none());
    assert!(cfg.fronyx_api_key.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("EVMAP_ENV", "production");
    map.insert("EVMAP_LOG_LEVEL", "debug");
    map.insert("EVMAP_HTTP_TIMEOUT_SECS", "5");
    map.insert("EVMAP_LOOKUP_TIMEOUT_SECS", "30");
    map.insert("EVMAP_USER_AGENT", "custom-agent/2.0");
    map.insert("CHARGEPRICE_API_KEY", "cp-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.http_timeout_secs, 5);
    assert_eq!(cfg.lookup_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
    assert_eq!(cfg.chargeprice_api_key.as_deref(), Some("cp-key"));
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = HashMap::new();
    map.insert("EVMAP_HTTP_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EVMAP_HTTP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(EVMAP_HTTP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_lookup_timeout() {
    let mut map = HashMap::new();
    map.insert("EVMAP_LOOKUP_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EVMAP_LOOKUP_TIMEOUT_SECS"),
        "expected InvalidEnvVar(EVMAP_LOOKUP_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn blank_api_keys_are_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("FRONYX_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.fronyx_api_key.is_none());
}

#[test]
fn debug_output_redacts_api_keys() {
    let mut map = HashMap::new();
    map.insert("CHARGEPRICE_API_KEY", "super-secret");
    map.insert("FRONYX_API_KEY", "also-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("super-secret"));
    assert!(!debug.contains("also-secret"));
    assert!(debug.contains("[redacted]"));
}
