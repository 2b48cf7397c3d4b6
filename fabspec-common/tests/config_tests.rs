//! Unit tests for configuration resolution
//!
//! Covers config file location priority, graceful degradation when the file
//! is missing, and API key resolution.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate FABSPEC_* variables are marked with #[serial].

use fabspec_common::config::{
    resolve_api_key, ConfigResolver, ExtractorBackend, ExtractorConfig, TomlConfig,
    API_KEY_ENV_VARS, CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    for var in API_KEY_ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_cli_path_overrides_env() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let cli = dir.path().join("cli.toml");
    let from_env = dir.path().join("env.toml");
    fs::write(&cli, "[extractor]\nbackend = \"model\"\n").unwrap();
    fs::write(&from_env, "[extractor]\nbackend = \"rules\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let resolver = ConfigResolver::new(Some(cli.clone()));
    assert_eq!(resolver.resolve_path(), Some(cli));
    let config = resolver.load().unwrap();
    assert_eq!(config.extractor.backend, ExtractorBackend::Model);

    clear_env();
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let from_env = dir.path().join("env.toml");
    fs::write(&from_env, "[vocabulary]\nfiber_scheme = \"iso\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let config = ConfigResolver::new(None).load().unwrap();
    assert_eq!(config.vocabulary.fiber_scheme, "iso");

    clear_env();
}

#[test]
#[serial]
fn test_missing_explicit_file_falls_back_to_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let config = ConfigResolver::new(Some(missing)).load().unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_file_is_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[extractor\nbackend = ").unwrap();

    let result = ConfigResolver::new(Some(bad)).load();
    assert!(result.is_err(), "Malformed TOML should be reported");
}

#[test]
#[serial]
fn test_env_key_overrides_toml_key() {
    clear_env();
    env::set_var("GEMINI_API_KEY", "env-key");
    let config = ExtractorConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_api_key(&config).unwrap(), "env-key");

    clear_env();
}

#[test]
#[serial]
fn test_env_priority_order() {
    clear_env();
    env::set_var("FABSPEC_API_KEY", "first");
    env::set_var("GOOGLE_GENERATIVE_AI_API_KEY", "third");

    let result = resolve_api_key(&ExtractorConfig::default()).unwrap();
    assert_eq!(result, "first");

    clear_env();
}

#[test]
#[serial]
fn test_toml_key_fallback() {
    clear_env();
    let config = ExtractorConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_api_key(&config).unwrap(), "toml-key");
}

#[test]
#[serial]
fn test_whitespace_key_is_not_configured() {
    clear_env();
    env::set_var("FABSPEC_API_KEY", "   ");
    let config = ExtractorConfig {
        api_key: Some("".to_string()),
        ..Default::default()
    };

    assert!(resolve_api_key(&config).is_err());

    clear_env();
}
