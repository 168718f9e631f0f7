//! Integration tests for fontweave-config crate.
//!
//! These tests verify defaults, YAML persistence, and validation.

use fontweave_config::{Config, ConfigError, LogLevel, RepresentativeChars};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.log_level, LogLevel::Off);
    assert!(config.load_system_fonts, "system fonts load by default");
    assert!(config.font_dirs.is_empty());
    assert!(config.font_files.is_empty());
    assert_eq!(config.default_pixel_size, 16);
    assert_eq!(config.dpi, None);
    assert_eq!(config.max_shape_attempts, 3);
    assert!(config.representative_chars.is_empty());
    assert!(config.validate().is_ok(), "defaults must validate");
}

#[test]
fn test_empty_yaml_uses_defaults() {
    let config: Config = serde_yaml_ng::from_str("{}").expect("empty mapping parses");
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nested").join("config.yaml");

    let mut config = Config::default();
    config.log_level = LogLevel::Debug;
    config.load_system_fonts = false;
    config.font_dirs.push(temp_dir.path().join("fonts"));
    config.dpi = Some(96);
    config.representative_chars.insert(
        "han".to_string(),
        RepresentativeChars::Any(vec![0x5B57, 0x6F22]),
    );

    config.save_to(&path).expect("save should succeed");
    assert!(path.exists(), "config file should be written");
    assert!(
        !path.with_extension("yaml.tmp").exists(),
        "temp file should be renamed away"
    );

    let loaded = Config::load_from(&path).expect("load should succeed");
    assert_eq!(loaded, config);
}

#[test]
fn test_representative_chars_yaml_forms() {
    let yaml = "representative_chars:\n  latin:\n    all: [65, 90]\n  thai:\n    any: [3607]\n";
    let config: Config = serde_yaml_ng::from_str(yaml).expect("yaml parses");
    assert_eq!(
        config.representative_chars.get("latin"),
        Some(&RepresentativeChars::All(vec![65, 90]))
    );
    assert_eq!(
        config.representative_chars.get("thai"),
        Some(&RepresentativeChars::Any(vec![3607]))
    );
}

#[test]
fn test_representative_chars_flow_map_with_hex() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.yaml");
    fs::write(
        &path,
        "representative_chars:\n  latin: { all: [0x41, 0x5A, 0x61, 0x7A] }\n  han: { any: [0x5B57, 0x6F22] }\n",
    )
    .expect("write config");

    let config = Config::load_from(&path).expect("flow mappings load");
    assert_eq!(
        config.representative_chars.get("latin"),
        Some(&RepresentativeChars::All(vec![0x41, 0x5A, 0x61, 0x7A]))
    );
    assert_eq!(
        config.representative_chars.get("han"),
        Some(&RepresentativeChars::Any(vec![0x5B57, 0x6F22]))
    );
}

#[test]
fn test_saved_representative_chars_use_map_form() {
    let mut config = Config::default();
    config
        .representative_chars
        .insert("thai".to_string(), RepresentativeChars::Any(vec![3607]));
    let yaml = serde_yaml_ng::to_string(&config).expect("config serializes");
    assert!(yaml.contains("any:"), "written as a plain mapping: {yaml}");
    assert!(!yaml.contains('!'), "no YAML tags in output: {yaml}");
}

#[test]
fn test_unknown_field_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, "font_size: 12\n").expect("write config");

    let err = Config::load_from(&path).expect_err("unknown field must fail");
    assert!(
        matches!(&err, ConfigError::Parse { path: p, .. } if *p == path),
        "expected a parse error naming the file, got {err:?}"
    );
}

#[test]
fn test_zero_attempts_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, "max_shape_attempts: 0\n").expect("write config");

    let err = Config::load_from(&path).expect_err("zero attempts must fail");
    assert!(
        matches!(&err, ConfigError::Invalid { field, .. } if field == "max_shape_attempts"),
        "expected a validation error, got {err:?}"
    );
    assert_eq!(err.path(), None);
}

#[test]
fn test_invalid_code_point_rejected() {
    let mut config = Config::default();
    config
        .representative_chars
        .insert("broken".to_string(), RepresentativeChars::All(vec![0xD800]));
    let err = config.validate().expect_err("surrogates are not characters");
    assert!(matches!(
        &err,
        ConfigError::Invalid { field, reason }
            if field == "representative_chars.broken" && reason.contains("0xD800")
    ));
    assert_eq!(
        err.to_string(),
        "representative_chars.broken: contains invalid code point 0xD800"
    );
}

#[test]
fn test_missing_file_is_read_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let absent = temp_dir.path().join("absent.yaml");
    let err = Config::load_from(&absent).expect_err("missing file must fail");
    assert!(matches!(err, ConfigError::Read { .. }), "got {err:?}");
    assert_eq!(err.path(), Some(absent.as_path()));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_log_level_names() {
    assert_eq!(LogLevel::from_name("warn"), Some(LogLevel::Warn));
    assert_eq!(LogLevel::from_name(" DEBUG "), Some(LogLevel::Debug));
    assert_eq!(LogLevel::from_name("loud"), None);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}

#[test]
fn test_config_path_layout() {
    let path = Config::config_path();
    assert!(path.ends_with("config.yaml"));
    assert_eq!(path.parent(), Some(Config::config_dir().as_path()));
}
