//! Page observation collector.
//!
//! Loads one URL in a [`PageSession`] and records what happened: every
//! request, every 3xx response, the title, a markup preview, child frames and
//! the DOM probes the analyzer needs.
//!
//! Only page setup and navigation are fatal. The six secondary queries each
//! fail on their own: a failure is logged, counted, replaced by a
//! best-effort default, and the remaining queries still run.

mod network;

use std::time::Duration;

use log::{debug, warn};

use crate::browser::PageSession;
use crate::config::{
    Config, BODY_TEXT_TIMEOUT, CONTENT_ERROR_SENTINEL, CONTENT_PREVIEW_CHARS, NAVIGATION_TIMEOUT,
};
use crate::error_handling::{
    AnalysisError, ErrorType, OperationTimeout, ProcessingStats, QueryError,
};
use crate::models::{FrameUrl, Observation};

pub use network::NetworkLog;

/// Tunables for one collection run.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Deadline for the document to be parsed
    pub navigation_timeout: Duration,
    /// Deadline for body text extraction
    pub body_text_timeout: Duration,
    /// Characters of markup kept in the preview
    pub preview_chars: usize,
}

impl CollectorOptions {
    /// Collector tunables taken from the run configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            navigation_timeout: config.navigation_timeout(),
            body_text_timeout: config.body_text_timeout(),
            preview_chars: CONTENT_PREVIEW_CHARS,
        }
    }
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: NAVIGATION_TIMEOUT,
            body_text_timeout: BODY_TEXT_TIMEOUT,
            preview_chars: CONTENT_PREVIEW_CHARS,
        }
    }
}

/// Collects an [`Observation`] for `url` from an already launched session.
///
/// # Errors
///
/// Returns `AnalysisError::PageSetup` when network capture cannot be attached,
/// and `AnalysisError::Navigation`/`NavigationTimeout` when the page does not load.
pub fn collect<S: PageSession>(
    session: &mut S,
    url: &str,
    options: &CollectorOptions,
    stats: &ProcessingStats,
) -> Result<Observation, AnalysisError> {
    let network = NetworkLog::new();
    session
        .subscribe(network.handler())
        .map_err(|e| AnalysisError::PageSetup(format!("{e:#}")))?;

    debug!("Navigating to {}", url);
    session
        .navigate(url, options.navigation_timeout)
        .map_err(|e| navigation_error(url, options.navigation_timeout, &e))?;

    let mut observation = Observation::new(url);

    observation.title = session.title().unwrap_or_else(|e| {
        warn!("Error getting page title for {}: {:#}", url, e);
        stats.increment_error(ErrorType::TitleQueryError);
        String::new()
    });

    observation.content_preview = match session.content() {
        Ok(content) => truncate_chars(&content, options.preview_chars),
        Err(e) => {
            warn!("Error getting page content for {}: {:#}", url, e);
            stats.increment_error(ErrorType::ContentQueryError);
            CONTENT_ERROR_SENTINEL.to_string()
        }
    };

    observation.meta_refresh = session.meta_refresh().map_err(|e| {
        warn!("Error checking meta refresh for {}: {:#}", url, e);
        stats.increment_error(ErrorType::MetaRefreshQueryError);
        query_failed("meta refresh", &e)
    });

    observation.password_field = session.has_password_field().map_err(|e| {
        warn!("Error checking for password field on {}: {:#}", url, e);
        stats.increment_error(ErrorType::PasswordFieldQueryError);
        query_failed("password field", &e)
    });

    observation.frames = collect_frames(session, url, stats);

    observation.body_text = match session.body_text(options.body_text_timeout) {
        Ok(text) => Ok(text.to_lowercase()),
        Err(e) if is_timeout(&e) => {
            warn!(
                "Body text for {} not available within {:?}",
                url, options.body_text_timeout
            );
            stats.increment_error(ErrorType::BodyTextTimeout);
            Err(QueryError::TimedOut {
                query: "body text",
                timeout: options.body_text_timeout,
            })
        }
        Err(e) => {
            warn!("Error getting body text for {}: {:#}", url, e);
            stats.increment_error(ErrorType::BodyTextQueryError);
            Err(query_failed("body text", &e))
        }
    };

    // Snapshot last: requests issued while the queries ran belong to the page too
    let (request_urls, redirect_urls) = network.snapshot();
    observation.request_urls = request_urls;
    observation.redirect_urls = redirect_urls;

    debug!(
        "Collected {} requests, {} redirects, {} frames for {}",
        observation.request_urls.len(),
        observation.redirect_urls.len(),
        observation.frames.len(),
        url
    );
    Ok(observation)
}

fn collect_frames<S: PageSession>(
    session: &S,
    url: &str,
    stats: &ProcessingStats,
) -> Vec<FrameUrl> {
    let frames = match session.child_frame_urls() {
        Ok(frames) => frames,
        Err(e) => {
            warn!("Error enumerating frames for {}: {:#}", url, e);
            stats.increment_error(ErrorType::FrameEnumerationError);
            return Vec::new();
        }
    };

    frames
        .into_iter()
        .map(|frame| match frame {
            Ok(frame_url) => FrameUrl::classify(&frame_url),
            Err(e) => {
                stats.increment_error(ErrorType::FrameUrlError);
                FrameUrl::Unreadable(format!("{e:#}"))
            }
        })
        .collect()
}

fn navigation_error(url: &str, timeout: Duration, error: &anyhow::Error) -> AnalysisError {
    if is_timeout(error) {
        AnalysisError::NavigationTimeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        AnalysisError::Navigation {
            url: url.to_string(),
            message: format!("{error:#}"),
        }
    }
}

fn is_timeout(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<OperationTimeout>())
}

fn query_failed(query: &'static str, error: &anyhow::Error) -> QueryError {
    QueryError::Failed {
        query,
        message: format!("{error:#}"),
    }
}

/// Keeps the first `max_chars` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
