use super::*;

#[test]
fn test_display_has_one_line_per_crate() {
    let info = VersionInfo {
        binary: "1.2.3",
        library: "0.4.0",
    };
    assert_eq!(info.to_string(), "gcr-clean 1.2.3\nlibgcrclean 0.4.0");
}

#[test]
fn test_current_reports_package_versions() {
    let info = VersionInfo::current();
    assert_eq!(info.binary, env!("CARGO_PKG_VERSION"));
    assert_eq!(info.library, libgcrclean::version());
}
