use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.registry, "gcr.io");
    assert_eq!(config.parallel, 10);
    assert!(config.noop);
    assert!(config.account.is_none());
    assert_eq!(config.listen, ":3000");
    assert_eq!(config.log.level, "info");
    assert_eq!(config.log.format, LogFormat::Pretty);
    assert_eq!(config.network.timeout, 30);
}

#[test]
fn test_from_str_empty_yaml() {
    let config = Config::from_yaml_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_from_str_partial_yaml() {
    let yaml = r#"
registry: eu.gcr.io
parallel: 4
log:
  format: json
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(config.registry, "eu.gcr.io");
    assert_eq!(config.parallel, 4);
    assert_eq!(config.log.format, LogFormat::Json);
    // Untouched settings keep their defaults
    assert!(config.noop);
    assert_eq!(config.log.level, "info");
    assert_eq!(config.network.timeout, 30);
}

#[test]
fn test_from_str_full_yaml() {
    let yaml = r#"
registry: us.gcr.io
parallel: 2
noop: false
account: /etc/gcr/account.json
listen: ":8080"
log:
  level: debug
  format: pretty
network:
  timeout: 60
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    assert!(!config.noop);
    assert_eq!(
        config.account,
        Some(PathBuf::from("/etc/gcr/account.json"))
    );
    assert_eq!(config.listen, ":8080");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.network.timeout, 60);
}

#[test]
fn test_from_str_invalid_type() {
    let result = Config::from_yaml_str("parallel: many");
    assert!(matches!(result, Err(CleanError::Config { .. })));
}

#[test]
fn test_load_without_path_is_default() {
    let config = Config::load(None).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gcr-clean.yaml");
    fs::write(&path, "registry: asia.gcr.io\nnoop: false\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.registry, "asia.gcr.io");
    assert!(!config.noop);
}

#[test]
fn test_load_missing_file_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.yaml");

    let err = Config::load(Some(&path)).unwrap_err();
    match err {
        CleanError::Config { path: Some(p), .. } => assert!(p.contains("missing.yaml")),
        other => panic!("Expected Config error with path, got {:?}", other),
    }
}

#[test]
fn test_validate_rejects_zero_parallel() {
    let config = Config {
        parallel: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_empty_registry() {
    let config = Config {
        registry: "  ".to_string(),
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_accepts_defaults() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_log_format_from_str() {
    assert_eq!(LogFormat::from("json"), LogFormat::Json);
    assert_eq!(LogFormat::from("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::from("pretty"), LogFormat::Pretty);
    assert_eq!(LogFormat::from("anything"), LogFormat::Pretty);
}
