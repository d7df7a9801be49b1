//! Error type definitions.
//!
//! This module defines the fatal and per-query error types used throughout the
//! application, plus the error/info categories tracked by `ProcessingStats`.

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Errors that abort a whole analysis.
///
/// Anything raised here turns the result record into `status = error`. Failures
/// of individual DOM queries never surface as an `AnalysisError`; see
/// [`QueryError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The browser process could not be started or no page could be opened.
    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    /// The page was opened but network event capture could not be attached.
    #[error("Page setup failed: {0}")]
    PageSetup(String),

    /// Navigation failed (DNS error, refused connection, aborted load).
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that was being loaded
        url: String,
        /// Message reported by the browser
        message: String,
    },

    /// The document was not parsed within the navigation timeout.
    #[error("Navigation to {url} timed out after {}s", .timeout.as_secs())]
    NavigationTimeout {
        /// URL that was being loaded
        url: String,
        /// Timeout that expired
        timeout: Duration,
    },

    /// The blocking analysis task panicked or was cancelled.
    #[error("Analysis task aborted: {0}")]
    TaskAborted(String),
}

impl AnalysisError {
    /// Statistics category for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            AnalysisError::BrowserLaunch(_) => ErrorType::BrowserLaunchError,
            AnalysisError::PageSetup(_) => ErrorType::PageSetupError,
            AnalysisError::Navigation { .. } => ErrorType::NavigationError,
            AnalysisError::NavigationTimeout { .. } => ErrorType::NavigationTimeout,
            AnalysisError::TaskAborted(_) => ErrorType::AnalysisTaskAborted,
        }
    }
}

/// A secondary DOM query that failed after navigation succeeded.
///
/// The collector keeps going after a `QueryError`; the affected check is
/// counted but never passes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The browser reported an error for the query.
    #[error("{query} query failed: {message}")]
    Failed {
        /// Name of the query (e.g. "meta refresh")
        query: &'static str,
        /// Message reported by the browser
        message: String,
    },

    /// The query did not complete within its own timeout.
    #[error("{query} query timed out after {}s", .timeout.as_secs())]
    TimedOut {
        /// Name of the query
        query: &'static str,
        /// Timeout that expired
        timeout: Duration,
    },
}

/// Marker error a browser session returns when an operation exceeds its timeout.
///
/// Sessions wrap it in `anyhow::Error`; the collector looks for it in the chain
/// to tell timeouts apart from other failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation timed out after {}s", .0.as_secs())]
pub struct OperationTimeout(pub Duration);

/// Types of errors that can occur during URL analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Fatal
    /// Browser could not be started
    BrowserLaunchError,
    /// Network capture could not be attached
    PageSetupError,
    /// Navigation failed
    NavigationError,
    /// Document not parsed within the navigation timeout
    NavigationTimeout,
    /// Blocking analysis task panicked or was cancelled
    AnalysisTaskAborted,
    // Per-query, analysis continues
    /// Title query failed
    TitleQueryError,
    /// Markup query failed
    ContentQueryError,
    /// Meta refresh probe failed
    MetaRefreshQueryError,
    /// Password field probe failed
    PasswordFieldQueryError,
    /// Frame tree could not be read
    FrameEnumerationError,
    /// A single frame URL could not be read
    FrameUrlError,
    /// Body text query failed
    BodyTextQueryError,
    /// Body text not available within its timeout
    BodyTextTimeout,
    // Augmentation
    /// Summarizer command failed or timed out
    SummarizerError,
}

/// Types of informational metrics recorded per analyzed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// At least one check fired
    SuspiciousVerdict,
    /// No check fired
    CleanVerdict,
    /// At least one counted check could not be evaluated
    IncompleteVerdict,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::BrowserLaunchError => "Browser launch error",
            ErrorType::PageSetupError => "Page setup error",
            ErrorType::NavigationError => "Navigation error",
            ErrorType::NavigationTimeout => "Navigation timeout",
            ErrorType::AnalysisTaskAborted => "Analysis task aborted",
            ErrorType::TitleQueryError => "Title query error",
            ErrorType::ContentQueryError => "Content query error",
            ErrorType::MetaRefreshQueryError => "Meta refresh query error",
            ErrorType::PasswordFieldQueryError => "Password field query error",
            ErrorType::FrameEnumerationError => "Frame enumeration error",
            ErrorType::FrameUrlError => "Frame URL error",
            ErrorType::BodyTextQueryError => "Body text query error",
            ErrorType::BodyTextTimeout => "Body text timeout",
            ErrorType::SummarizerError => "Summarizer error",
        }
    }

    /// Whether this error aborts the whole analysis.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorType::BrowserLaunchError
                | ErrorType::PageSetupError
                | ErrorType::NavigationError
                | ErrorType::NavigationTimeout
                | ErrorType::AnalysisTaskAborted
        )
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::SuspiciousVerdict => "Suspicious verdict",
            InfoType::CleanVerdict => "Clean verdict",
            InfoType::IncompleteVerdict => "Verdict with skipped checks",
        }
    }
}
