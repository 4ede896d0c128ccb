use std::io::Write;
use tempfile::NamedTempFile;
use toolbox_notes::config::{ConfigLoader, MissingPagePolicy};

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn explicit_file_overrides_defaults() {
    let file = toml_file(
        r#"
        [usernotes]
        missing_page = "fail"
        identifier = "via modbot"
        default_moderator = "modbot"

        [wiki]
        max_page_size = 1000
        "#,
    );
    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert_eq!(config.usernotes.missing_page, MissingPagePolicy::Fail);
    assert_eq!(config.usernotes.identifier, "via modbot");
    assert_eq!(config.usernotes.default_moderator.as_deref(), Some("modbot"));
    assert_eq!(config.usernotes_page_limit(), 2000);
    assert_eq!(config.usernotes.page, "usernotes");
    assert_eq!(config.usernotes.schema_version, 6);
}

#[test]
fn invalid_values_are_rejected() {
    let file = toml_file(
        r#"
        [usernotes]
        compression_level = 11
        "#,
    );
    assert!(ConfigLoader::load_from_file(file.path()).is_err());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ConfigLoader::load(Some(&dir.path().join("absent.toml"))).is_err());
}

#[test]
fn environment_overrides_file() {
    let file = toml_file(
        r#"
        [reddit]
        timeout_secs = 5
        "#,
    );
    std::env::set_var("TOOLBOX_NOTES__REDDIT__TIMEOUT_SECS", "77");
    let config = ConfigLoader::load_from_file(file.path());
    std::env::remove_var("TOOLBOX_NOTES__REDDIT__TIMEOUT_SECS");
    assert_eq!(config.unwrap().reddit.timeout_secs, 77);
}
