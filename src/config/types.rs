//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    BODY_TEXT_TIMEOUT, DEFAULT_MAX_CONCURRENCY, MAX_CONCURRENCY_LIMIT, NAVIGATION_TIMEOUT,
    SUMMARIZER_TIMEOUT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Scanner configuration.
///
/// Parsed from the command line by the binary, or built programmatically
/// (starting from `Default`) by library users.
///
/// # Examples
///
/// ```no_run
/// use safe_link_scanner::Config;
///
/// let config = Config {
///     urls: vec!["https://example.com".to_string()],
///     max_concurrency: 1,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "safe_link_scanner",
    about = "Render URLs in a headless browser and flag phishing indicators"
)]
pub struct Config {
    /// URLs to analyze (bare hosts get an https:// prefix)
    pub urls: Vec<String>,

    /// File with one URL per line (`-` reads stdin)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Write JSON Lines results here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Pretty-print the record as indented JSON. The output is no longer
    /// JSON Lines, so this is only accepted for a single URL.
    #[arg(long)]
    pub pretty: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Maximum number of concurrent browser instances
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Navigation timeout in seconds
    #[arg(long, default_value_t = NAVIGATION_TIMEOUT.as_secs())]
    pub navigation_timeout_secs: u64,

    /// Body text extraction timeout in seconds
    #[arg(long, default_value_t = BODY_TEXT_TIMEOUT.as_secs())]
    pub body_text_timeout_secs: u64,

    /// Chrome/Chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// External command that turns a JSON summary on stdin into a plain-language assessment
    #[arg(long, env = "SAFE_LINK_SUMMARIZER_CMD")]
    pub summarizer_cmd: Option<String>,

    /// Seconds before a summarizer call is abandoned and the command killed
    #[arg(long, default_value_t = SUMMARIZER_TIMEOUT.as_secs())]
    pub summarizer_timeout_secs: u64,

    /// Exit with status 2 when any URL is flagged suspicious
    #[arg(long)]
    pub fail_on_suspicious: bool,
}

impl Config {
    /// Navigation timeout as a `Duration`.
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Body text timeout as a `Duration`.
    pub fn body_text_timeout(&self) -> Duration {
        Duration::from_secs(self.body_text_timeout_secs)
    }

    /// Summarizer deadline as a `Duration`.
    pub fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.summarizer_timeout_secs)
    }

    /// Rejects settings no analysis could run with.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(format!(
                "max_concurrency must be between 1 and {MAX_CONCURRENCY_LIMIT} (got {})",
                self.max_concurrency
            ));
        }
        if self.navigation_timeout_secs == 0 {
            return Err("navigation_timeout_secs must be greater than 0".to_string());
        }
        if self.body_text_timeout_secs == 0 {
            return Err("body_text_timeout_secs must be greater than 0".to_string());
        }
        if self.summarizer_timeout_secs == 0 {
            return Err("summarizer_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            file: None,
            output: None,
            pretty: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            navigation_timeout_secs: NAVIGATION_TIMEOUT.as_secs(),
            body_text_timeout_secs: BODY_TEXT_TIMEOUT.as_secs(),
            chrome_path: None,
            summarizer_cmd: None,
            summarizer_timeout_secs: SUMMARIZER_TIMEOUT.as_secs(),
            fail_on_suspicious: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_log_format_debug() {
        assert_eq!(format!("{:?}", LogFormat::Plain), "Plain");
        assert_eq!(format!("{:?}", LogFormat::Json), "Json");
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.urls.is_empty());
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.navigation_timeout(), Duration::from_secs(30));
        assert_eq!(config.body_text_timeout(), Duration::from_secs(5));
        assert!(!config.pretty);
        assert!(!config.fail_on_suspicious);
        assert!(config.summarizer_cmd.is_none());
        assert_eq!(config.summarizer_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_parse_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["safe_link_scanner", "example.com"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.urls, vec!["example.com".to_string()]);
        assert_eq!(parsed.max_concurrency, default.max_concurrency);
        assert_eq!(parsed.navigation_timeout_secs, default.navigation_timeout_secs);
        assert_eq!(parsed.body_text_timeout_secs, default.body_text_timeout_secs);
    }

    #[test]
    fn test_config_parse_overrides() {
        let parsed = Config::try_parse_from([
            "safe_link_scanner",
            "--file",
            "urls.txt",
            "--navigation-timeout-secs",
            "10",
            "--log-format",
            "json",
            "--fail-on-suspicious",
        ])
        .unwrap();
        assert_eq!(parsed.file, Some(PathBuf::from("urls.txt")));
        assert_eq!(parsed.navigation_timeout(), Duration::from_secs(10));
        assert!(matches!(parsed.log_format, LogFormat::Json));
        assert!(parsed.fail_on_suspicious);
    }

    #[test]
    fn test_config_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.max_concurrency = 0;
        assert!(config.validate().is_err());
        config.max_concurrency = MAX_CONCURRENCY_LIMIT + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.navigation_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.body_text_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.summarizer_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
