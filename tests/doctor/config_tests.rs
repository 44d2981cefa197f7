use crate::common::create_temp_dir;
use jarvis_doctor::config::{DoctorConfig, TIMEOUT_ENV_VAR};
use jarvis_doctor::core::doctor::http_check::{StatusPolicy, DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS};
use jarvis_doctor::core::doctor::types::{DoctorError, HttpCheck};
use jarvis_doctor::core::doctor::url::{validate_health_url, UrlError};
use serial_test::serial;
use std::env;

#[test]
fn test_parse_full_config() {
    let toml = r#"
timeout_ms = 1500
status_policy = "require_success"
follow_redirects = false

[[checks]]
name = "run-gateway"
url = "http://127.0.0.1:8080/v1/health"

[[checks]]
name = "daemon"
url = "https://daemon.example.test/v1/health"
"#;

    let config = DoctorConfig::from_toml(toml).unwrap();

    assert_eq!(config.timeout_ms, 1500);
    assert_eq!(config.status_policy, StatusPolicy::RequireSuccess);
    assert!(!config.follow_redirects);
    assert_eq!(config.checks.len(), 2);
    assert_eq!(config.checks[1], HttpCheck::new("daemon", "https://daemon.example.test/v1/health"));

    let options = config.probe_options();
    assert_eq!(options.timeout_ms, 1500);
    assert_eq!(options.status_policy, StatusPolicy::RequireSuccess);
    assert!(!options.follow_redirects);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config = DoctorConfig::from_toml("timeout_ms = 750").unwrap();

    assert_eq!(config.timeout_ms, 750);
    assert_eq!(config.status_policy, StatusPolicy::AnyResponse);
    assert!(config.follow_redirects);
    assert_eq!(config.checks, DoctorConfig::default().checks);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let err = DoctorConfig::from_toml("timeout_ms = \"soon\"").unwrap_err();
    assert!(matches!(err, DoctorError::ConfigParse(_)));
}

#[test]
fn test_check_rejects_bad_urls_and_duplicates() {
    let mut config = DoctorConfig::default();
    assert!(config.check().is_ok());

    config.checks.push(HttpCheck::new("broken", "not a url"));
    assert!(matches!(
        config.check(),
        Err(DoctorError::InvalidUrl { ref name, source: UrlError::ParseError(_) }) if name == "broken"
    ));

    config.checks.pop();
    config.checks.push(HttpCheck::new("ftp", "ftp://example.test/health"));
    assert!(matches!(
        config.check(),
        Err(DoctorError::InvalidUrl { source: UrlError::UnsupportedScheme(ref scheme), .. }) if scheme == "ftp"
    ));

    config.checks.pop();
    config.checks.push(HttpCheck::new("run-gateway", "http://other.test/health"));
    let err = config.check().unwrap_err();
    assert!(err.to_string().contains("duplicate"));

    config.checks.pop();
    config.timeout_ms = 0;
    assert!(config.check().is_err());
}

#[test]
fn test_init_and_load_roundtrip() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("nested").join("doctor.toml");

    DoctorConfig::init_at(&path).unwrap();
    let loaded = DoctorConfig::load_from(&path).unwrap();
    assert_eq!(loaded, DoctorConfig::default());

    // Second init must not clobber the file
    let err = DoctorConfig::init_at(&path).unwrap_err();
    assert!(matches!(err, DoctorError::ConfigExists(_)));
}

#[test]
fn test_load_missing_file_is_read_error() {
    let temp_dir = create_temp_dir();
    let err = DoctorConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, DoctorError::ConfigRead { .. }));
}

#[test]
#[serial]
fn test_env_timeout_override_is_capped() {
    let mut config = DoctorConfig::default();

    env::set_var(TIMEOUT_ENV_VAR, "1200");
    config.apply_env_overrides();
    assert_eq!(config.timeout_ms, 1200);

    env::set_var(TIMEOUT_ENV_VAR, "999999");
    config.apply_env_overrides();
    assert_eq!(config.timeout_ms, MAX_TIMEOUT_MS);

    env::remove_var(TIMEOUT_ENV_VAR);
}

#[test]
#[serial]
fn test_env_timeout_ignores_garbage() {
    let mut config = DoctorConfig::default();

    env::set_var(TIMEOUT_ENV_VAR, "fast");
    config.apply_env_overrides();
    assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);

    env::remove_var(TIMEOUT_ENV_VAR);
}

#[test]
fn test_validate_health_url() {
    let url = validate_health_url("http://127.0.0.1:8080/v1/health").unwrap();
    assert_eq!(url.port(), Some(8080));
    assert!(validate_health_url("https://gateway.test/healthz").is_ok());

    assert!(matches!(validate_health_url("not a url"), Err(UrlError::ParseError(_))));
    assert!(matches!(
        validate_health_url("file:///etc/hosts"),
        Err(UrlError::UnsupportedScheme(ref scheme)) if scheme == "file"
    ));

    let err = validate_health_url("ftp://example.test/health").unwrap_err();
    assert_eq!(err.to_string(), "Unsupported scheme 'ftp' (expected http or https)");
}

#[test]
fn test_invalid_url_error_names_check() {
    let config = DoctorConfig {
        checks: vec![HttpCheck::new("daemon", "gopher://daemon.test/")],
        ..DoctorConfig::default()
    };
    let err = config.check().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid URL for check 'daemon': Unsupported scheme 'gopher' (expected http or https)"
    );
}
