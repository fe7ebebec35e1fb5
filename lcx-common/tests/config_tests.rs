//! Configuration loading and graceful degradation
//!
//! Uses serial_test to keep tests that touch LCX_* environment variables
//! from racing each other.

use lcx_common::config::{write_toml_config, TomlConfig, CONFIG_PATH_ENV};
use lcx_common::Error;
use serial_test::serial;
use std::env;

fn clear_env() {
    for name in [
        CONFIG_PATH_ENV,
        "LCX_REPORT_CACHE_MINUTES",
        "LCX_MIN_RADIUS_METERS",
        "LCX_MAX_RADIUS_METERS",
        "LCX_LOG_LEVEL",
    ] {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_toml_file_values_are_used() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[logging]
level = "debug"

[enrichment]
report_cache_minutes = 60
min_radius_meters = 100
max_radius_meters = 2500

[enrichment.category_weights]
Safety = 2.0
"#,
    )
    .unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.enrichment.report_cache_minutes, 60);
    assert_eq!(config.enrichment.min_radius_meters, 100);
    assert_eq!(config.enrichment.max_radius_meters, 2500);
    assert_eq!(config.enrichment.category_weights.get("Safety"), Some(&2.0));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[enrichment]\nreport_cache_minutes = 60\n").unwrap();

    env::set_var("LCX_REPORT_CACHE_MINUTES", "5");
    env::set_var("LCX_LOG_LEVEL", "warn");
    let config = TomlConfig::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.enrichment.report_cache_minutes, 5);
    assert_eq!(config.logging.level, "warn");
}

#[test]
#[serial]
fn test_config_path_from_env() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("from-env.toml");
    std::fs::write(&path, "[enrichment]\nmax_radius_meters = 3000\n").unwrap();

    env::set_var(CONFIG_PATH_ENV, &path);
    let config = TomlConfig::load(None).unwrap();
    clear_env();

    assert_eq!(config.enrichment.max_radius_meters, 3000);
}

#[test]
#[serial]
fn test_invalid_env_value_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    env::set_var("LCX_MIN_RADIUS_METERS", "two hundred");
    let result = TomlConfig::load(Some(&path));
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_inverted_radius_bounds_fail_validation() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    env::set_var("LCX_MIN_RADIUS_METERS", "800");
    env::set_var("LCX_MAX_RADIUS_METERS", "400");
    let result = TomlConfig::load(Some(&path));
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_malformed_toml_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[enrichment\nreport_cache_minutes = ").unwrap();

    assert!(matches!(TomlConfig::load(Some(&path)), Err(Error::Toml(_))));
}

#[test]
#[serial]
fn test_written_config_loads_back() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = TomlConfig::default();
    config.enrichment.http_timeout_secs = 30;
    config
        .enrichment
        .category_weights
        .insert("Environment".to_string(), 0.5);
    write_toml_config(&config, &path).unwrap();

    let loaded = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(loaded.enrichment.http_timeout_secs, 30);
    assert_eq!(
        loaded.enrichment.category_weights.get("Environment"),
        Some(&0.5)
    );
}
