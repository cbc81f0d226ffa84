//! Accessors and loaders reading the real process environment.

use onboard_fnd::config::{get_boolean_env, get_env, get_number_env, Config, ConfigError};
use onboard_fnd::Environment;
use serial_test::serial;
use std::io::Write;

fn clear(vars: &[&str]) {
    for var in vars {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn get_env_missing_without_default() {
    clear(&["ONBOARD_TEST_REQUIRED"]);
    let err = get_env("ONBOARD_TEST_REQUIRED", None).unwrap_err();
    assert!(matches!(err, ConfigError::MissingValue(ref n) if n == "ONBOARD_TEST_REQUIRED"));

    std::env::set_var("ONBOARD_TEST_REQUIRED", "present");
    assert_eq!(get_env("ONBOARD_TEST_REQUIRED", None).unwrap(), "present");
    clear(&["ONBOARD_TEST_REQUIRED"]);
}

#[test]
#[serial]
fn typed_accessors_read_process_env() {
    std::env::set_var("ONBOARD_TEST_FLAG", "Yes");
    std::env::set_var("ONBOARD_TEST_NUM", "42");
    assert!(get_boolean_env("ONBOARD_TEST_FLAG", false).unwrap());
    assert_eq!(get_number_env("ONBOARD_TEST_NUM", 0u32).unwrap(), 42);

    std::env::set_var("ONBOARD_TEST_FLAG", "enabled");
    assert!(matches!(
        get_boolean_env("ONBOARD_TEST_FLAG", false),
        Err(ConfigError::InvalidValue { .. })
    ));
    clear(&["ONBOARD_TEST_FLAG", "ONBOARD_TEST_NUM"]);
}

#[test]
#[serial]
fn backend_loader_defaults_to_localhost_in_development() {
    clear(&["API_URL", "APP_ENV", "CONFIG_FILE", "API_TIMEOUT", "DEBUG", "SERVER_ADDR"]);
    std::env::set_var("APP_ENV", "development");

    let config = Config::backend().build().unwrap();
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.api_base_url, "http://localhost:8000");
    clear(&["APP_ENV"]);
}

#[test]
#[serial]
fn backend_loader_rejects_empty_url_in_production() {
    clear(&["CONFIG_FILE"]);
    std::env::set_var("APP_ENV", "production");
    std::env::set_var("API_URL", "");

    let err = Config::backend().build().unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
    assert!(err.to_string().contains("API URL cannot be empty"));
    clear(&["APP_ENV", "API_URL"]);
}

#[test]
#[serial]
fn frontend_loader_reads_vite_namespace() {
    clear(&["VITE_APP_ENV"]);
    std::env::set_var("VITE_API_URL", "https://api.example.com");
    std::env::set_var("API_URL", "https://ignored.example.com");

    let config = Config::frontend().build().unwrap();
    assert_eq!(config.api_base_url, "https://api.example.com");
    clear(&["VITE_API_URL", "API_URL"]);
}

#[test]
#[serial]
fn backend_loader_reads_config_file_named_in_env() {
    clear(&["API_URL", "APP_ENV", "APP_NAME", "APP_TITLE", "DEBUG", "SERVER_ADDR"]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        app_name = "From File"
        [api]
        url = "https://file.example.com"
        timeout = 1234
        "#
    )
    .unwrap();
    std::env::set_var("CONFIG_FILE", file.path());
    std::env::set_var("API_TIMEOUT", "");
    std::env::set_var("APP_TITLE", "From Env");

    let config = Config::backend().build().unwrap();
    assert_eq!(config.api_base_url, "https://file.example.com");
    assert_eq!(config.api_timeout_ms, 1234);
    assert_eq!(config.app_name, "From File");
    assert_eq!(config.app_title, "From Env");
    clear(&["CONFIG_FILE", "API_TIMEOUT", "APP_TITLE"]);
}

#[test]
#[serial]
fn backend_loader_fails_when_named_config_file_is_missing() {
    std::env::set_var("CONFIG_FILE", "/nonexistent/onboard.toml");

    let err = Config::backend().build().unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
    clear(&["CONFIG_FILE"]);
}
