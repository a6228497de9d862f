// Loading AppConfig from disk

use std::io::Write;

use formbind::AppConfig;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load(dir.path().join("formbind.toml")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn empty_file_gives_defaults() {
    let file = write_config("   \n");
    assert_eq!(AppConfig::load(file.path()).unwrap(), AppConfig::default());
}

#[test]
fn overrides_are_applied() {
    let file = write_config(
        r#"
        [cache]
        stale_time_secs = 30
        gc_time_secs = 120

        [upload]
        max_file_size = 1048576
        allowed_mime_types = ["text/csv"]
        "#,
    );

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.cache.stale_time().as_secs(), 30);
    assert!(config.upload.check_file(1024, "text/csv").is_ok());
    assert!(config.upload.check_file(1024, "image/png").is_err());
    assert_eq!(config.pagination.default_page_size, 10);
}

#[test]
fn malformed_toml_is_an_error_with_context() {
    let file = write_config("[pagination\ndefault_page_size = ");
    let err = AppConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn inconsistent_settings_are_rejected() {
    let file = write_config(
        r#"
        [pagination]
        default_page_size = 15
        "#,
    );
    let err = AppConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));
    assert!(format!("{:#}", err).contains("page_size_options"));
}
