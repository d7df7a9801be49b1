//! Observation, verdict and result record types.
//!
//! `Observation` is what the collector saw while loading one URL;
//! `AnalysisVerdict` is what the analyzer concluded from it; `ResultRecord`
//! is the serialized output combining both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::INTERNAL_FRAME_SENTINEL;
use crate::error_handling::QueryError;

/// Overall outcome of one URL analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// Analysis has not finished
    #[default]
    Pending,
    /// Page loaded and the checks ran
    Analyzed,
    /// A fatal error ended the analysis
    Error,
}

/// URL of a non-primary frame, as far as it could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameUrl {
    /// A real, navigable frame URL
    Url(String),
    /// Empty URL, `about:blank` or a `data:` URL
    InternalOrBlank,
    /// The frame URL could not be read (frame detached mid-query, etc.)
    Unreadable(String),
}

impl FrameUrl {
    /// Classifies a frame URL reported by the browser.
    pub fn classify(url: &str) -> Self {
        if url.is_empty() || url == "about:blank" || url.starts_with("data:") {
            FrameUrl::InternalOrBlank
        } else {
            FrameUrl::Url(url.to_string())
        }
    }

    /// The frame URL, unless it is internal/blank or unreadable.
    pub fn real_url(&self) -> Option<&str> {
        match self {
            FrameUrl::Url(url) => Some(url),
            FrameUrl::InternalOrBlank | FrameUrl::Unreadable(_) => None,
        }
    }
}

impl fmt::Display for FrameUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameUrl::Url(url) => f.write_str(url),
            FrameUrl::InternalOrBlank => f.write_str(INTERNAL_FRAME_SENTINEL),
            FrameUrl::Unreadable(message) => write!(f, "[Error fetching frame URL: {message}]"),
        }
    }
}

/// A `meta[http-equiv="refresh"]` element found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetaRefresh {
    /// Raw `content` attribute, if the element has one
    pub content: Option<String>,
}

/// Everything the collector observed while loading one URL.
///
/// Probe fields hold a `QueryError` when the corresponding DOM query failed;
/// the analyzer then counts the check without passing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Input URL, verbatim
    pub url: String,
    /// Final page title, empty if unavailable
    pub title: String,
    /// First characters of the serialized markup, or the content sentinel
    pub content_preview: String,
    /// Every outbound request URL, in arrival order
    pub request_urls: Vec<String>,
    /// URL of every 3xx response, in arrival order
    pub redirect_urls: Vec<String>,
    /// Non-primary frames, in enumeration order
    pub frames: Vec<FrameUrl>,
    /// Meta refresh probe: `Ok(None)` when no element exists
    pub meta_refresh: Result<Option<MetaRefresh>, QueryError>,
    /// Password input probe
    pub password_field: Result<bool, QueryError>,
    /// Lower-cased body text probe
    pub body_text: Result<String, QueryError>,
}

impl Observation {
    /// An observation of a blank page: no traffic, no frames, all probes empty.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content_preview: String::new(),
            request_urls: Vec::new(),
            redirect_urls: Vec::new(),
            frames: Vec::new(),
            meta_refresh: Ok(None),
            password_field: Ok(false),
            body_text: Ok(String::new()),
        }
    }

    /// Frame entries as reported in the result record.
    pub fn frame_urls(&self) -> Vec<String> {
        self.frames.iter().map(ToString::to_string).collect()
    }
}

/// Outcome of the external text-generation step, merged into `analysis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAssessment {
    /// True when no assessment was produced
    pub ai_skipped: bool,
    /// Why the assessment was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reason: Option<String>,
    /// Free-text verdict and explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_assessment: Option<String>,
}

/// Heuristic verdict for one observation.
///
/// `checks_total` counts check slots that applied to the page; a slot can
/// contribute several reasons but is counted once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    /// True iff at least one check fired
    pub suspicious: bool,
    /// One entry per finding, in check evaluation order
    pub reasons: Vec<String>,
    /// Applicable checks that ran and did not fire
    #[serde(rename = "local_checks_passed")]
    pub checks_passed: usize,
    /// Applicable check slots
    #[serde(rename = "local_checks_total")]
    pub checks_total: usize,
    /// Optional plain-language assessment
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiAssessment>,
}

/// Top-level output of one URL analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Outcome of the analysis
    pub status: AnalysisStatus,
    /// Analyzed URL as given
    pub url: String,
    /// Page title, empty on error
    pub title: String,
    /// Outbound request URLs in arrival order
    #[serde(rename = "requests")]
    pub request_urls: Vec<String>,
    /// 3xx response URLs in arrival order
    #[serde(rename = "redirects")]
    pub redirect_urls: Vec<String>,
    /// Non-primary frame URLs or their sentinels
    #[serde(rename = "iframes")]
    pub frame_urls: Vec<String>,
    /// Truncated markup or the content sentinel
    #[serde(rename = "page_content_preview")]
    pub content_preview: String,
    /// Heuristic verdict, defaults on error
    pub analysis: AnalysisVerdict,
    /// Set only when `status` is `error`
    pub error: Option<String>,
}

impl ResultRecord {
    /// A record for `url` with every field at its initial default.
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::Pending,
            url: url.into(),
            title: String::new(),
            request_urls: Vec::new(),
            redirect_urls: Vec::new(),
            frame_urls: Vec::new(),
            content_preview: String::new(),
            analysis: AnalysisVerdict::default(),
            error: None,
        }
    }

    /// Whether the heuristic verdict flagged the URL.
    pub fn is_suspicious(&self) -> bool {
        self.analysis.suspicious
    }
}
