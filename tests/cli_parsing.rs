//! Tests for command-line parsing.

use clap::Parser;
use safe_link_scanner::config::{LogFormat, LogLevel};
use safe_link_scanner::Config;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_positional_urls() {
    let config =
        Config::try_parse_from(["safe_link_scanner", "example.com", "https://login.example.net/"])
            .unwrap();
    assert_eq!(config.urls, vec!["example.com", "https://login.example.net/"]);
    assert!(config.file.is_none());
    assert!(config.output.is_none());
}

#[test]
fn test_file_and_output() {
    let config = Config::try_parse_from([
        "safe_link_scanner",
        "-f",
        "-",
        "-o",
        "results.jsonl",
        "--pretty",
    ])
    .unwrap();
    assert!(config.urls.is_empty());
    assert_eq!(config.file, Some(PathBuf::from("-")));
    assert_eq!(config.output, Some(PathBuf::from("results.jsonl")));
    assert!(config.pretty);
}

#[test]
fn test_timeouts_and_concurrency() {
    let config = Config::try_parse_from([
        "safe_link_scanner",
        "--navigation-timeout-secs",
        "45",
        "--body-text-timeout-secs",
        "2",
        "--max-concurrency",
        "4",
        "example.com",
    ])
    .unwrap();
    assert_eq!(config.navigation_timeout(), Duration::from_secs(45));
    assert_eq!(config.body_text_timeout(), Duration::from_secs(2));
    assert_eq!(config.max_concurrency, 4);
    assert!(config.validate().is_ok());
}

#[test]
fn test_log_options() {
    let config = Config::try_parse_from([
        "safe_link_scanner",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "example.com",
    ])
    .unwrap();
    assert!(matches!(config.log_level, LogLevel::Debug));
    assert!(matches!(config.log_format, LogFormat::Json));
}

#[test]
fn test_invalid_values_rejected() {
    assert!(Config::try_parse_from(["safe_link_scanner", "--log-level", "loud"]).is_err());
    assert!(Config::try_parse_from(["safe_link_scanner", "--max-concurrency", "many"]).is_err());
    assert!(
        Config::try_parse_from(["safe_link_scanner", "--navigation-timeout-secs", "-1"]).is_err()
    );
}

#[test]
fn test_chrome_path_and_summarizer_flags() {
    let config = Config::try_parse_from([
        "safe_link_scanner",
        "--chrome-path",
        "/usr/bin/chromium",
        "--summarizer-cmd",
        "python3 summarize.py",
        "--summarizer-timeout-secs",
        "15",
        "--fail-on-suspicious",
        "example.com",
    ])
    .unwrap();
    assert_eq!(config.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
    assert_eq!(config.summarizer_cmd.as_deref(), Some("python3 summarize.py"));
    assert_eq!(config.summarizer_timeout(), Duration::from_secs(15));
    assert!(config.fail_on_suspicious);
}
