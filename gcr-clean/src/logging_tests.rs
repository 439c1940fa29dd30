use super::*;

#[test]
fn test_filter_accepts_known_levels() {
    for level in ["trace", "debug", "info", "warn", "error", "INFO"] {
        assert!(filter(level, None).is_ok(), "level {} rejected", level);
    }
}

#[test]
fn test_filter_rejects_unknown_level() {
    let err = filter("verbose", None).unwrap_err();
    assert!(matches!(err, CleanError::Config { .. }));
    assert!(err.to_string().contains("verbose"));
}

#[test]
fn test_filter_uses_level_as_default() {
    let filter = filter("warn", None).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
}

#[test]
fn test_rust_log_extends_level() {
    let filter = filter("warn", Some("libgcrclean=debug")).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn test_blank_rust_log_is_ignored() {
    let filter = filter("error", Some("  ")).unwrap();
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
}

#[test]
fn test_invalid_rust_log_is_config_error() {
    let err = filter("info", Some("libgcrclean=loud")).unwrap_err();
    assert!(matches!(err, CleanError::Config { .. }));
}
