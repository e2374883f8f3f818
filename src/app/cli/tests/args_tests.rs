//! Tests for CLI argument parsing

use crate::app::cli::args::Args;
use std::path::PathBuf;

fn argv(items: &[&str]) -> Vec<String> {
    std::iter::once("seda")
        .chain(items.iter().copied())
        .map(String::from)
        .collect()
}

#[test]
fn test_defaults_without_arguments() {
    let args = Args::parse_from_args(&argv(&[])).unwrap();

    assert_eq!(args.config_file, None);
    assert_eq!(args.duration_secs, 5);
    assert_eq!(args.events, 1000);
    assert!(!args.no_color);
    assert_eq!(args.log_file_path(), None);
}

#[test]
fn test_all_options() {
    let args = Args::parse_from_args(&argv(&[
        "--config-file",
        "custom.toml",
        "--log-level",
        "debug",
        "--log-format",
        "ext",
        "--log-file",
        "seda.log",
        "--no-color",
        "--duration-secs",
        "3",
        "--events",
        "42",
    ]))
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("custom.toml")));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file_path().as_deref(), Some("seda.log"));
    assert!(args.no_color);
    assert!(!args.use_color());
    assert_eq!(args.duration_secs, 3);
    assert_eq!(args.events, 42);
}

#[test]
fn test_equals_syntax() {
    let args = Args::parse_from_args(&argv(&["--log-level=warn", "--events=7"])).unwrap();

    assert_eq!(args.log_level.as_deref(), Some("warn"));
    assert_eq!(args.events, 7);
}

#[test]
fn test_log_file_none_disables_file_logging() {
    let args = Args::parse_from_args(&argv(&["--log-file", "none"])).unwrap();
    assert_eq!(args.log_file_path(), None);
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(Args::parse_from_args(&argv(&["--log-level", "loud"])).is_err());
    assert!(Args::parse_from_args(&argv(&["--log-format", "xml"])).is_err());
    assert!(Args::parse_from_args(&argv(&["--events", "many"])).is_err());
    assert!(Args::parse_from_args(&argv(&["--unknown"])).is_err());
}

#[test]
fn test_default_matches_parsed_defaults() {
    let parsed = Args::parse_from_args(&argv(&[])).unwrap();
    let default = Args::default();

    assert_eq!(parsed.duration_secs, default.duration_secs);
    assert_eq!(parsed.events, default.events);
}
