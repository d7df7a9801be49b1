//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including timeouts, heuristic thresholds, and the fixed indicator lists the
//! analyzer matches against.

use std::time::Duration;

// Browser timeouts
/// Navigation timeout. Navigation only waits for the document to be parsed,
/// not for every sub-resource, so 30s leaves room for slow phishing kits
/// behind several redirect hops.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for extracting the rendered body text.
/// Independent of the navigation timeout; expiry only skips the keyword check.
pub const BODY_TEXT_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for one external summarizer call. Expiry kills the command and
/// marks the assessment skipped.
pub const SUMMARIZER_TIMEOUT: Duration = Duration::from_secs(60);
/// How long an idle headless browser is kept alive before it shuts itself down.
pub const BROWSER_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Extra Chromium flags. The OS-level sandbox is disabled separately through
/// the launch options; Chromium's own site isolation still applies.
pub const BROWSER_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--disable-gpu",
];

// Observation limits
/// Number of characters of serialized markup kept as the page preview
pub const CONTENT_PREVIEW_CHARS: usize = 500;
/// Stored in place of the preview when the markup could not be fetched
pub const CONTENT_ERROR_SENTINEL: &str = "[Error fetching content]";
/// Stored for frames whose URL is empty, `about:blank` or a `data:` URL
pub const INTERNAL_FRAME_SENTINEL: &str = "[Internal/Blank Frame]";

// Heuristic thresholds
/// Hosts with more labels than this are flagged (e.g. `a.b.c.d.example.com` has 6)
pub const MAX_HOST_LABELS: usize = 5;
/// Flag the page when it talks to more distinct external domains than this
pub const MAX_EXTERNAL_DOMAINS: usize = 10;
/// Flag the page when more 3xx responses than this were observed
pub const MAX_REDIRECTS: usize = 5;
/// Minimum number of distinct phishing keywords in the body text to flag the page
pub const MIN_PHISHING_KEYWORDS: usize = 2;
/// Second-to-last labels at most this long are treated as part of a
/// two-label public suffix (`co.uk`, `com.br`)
pub const SHORT_SECOND_LEVEL_LABEL_LEN: usize = 3;

// Indicator lists
/// Final host labels historically popular with throwaway phishing domains
pub const SUSPICIOUS_TLDS: &[&str] = &[".xyz", ".top", ".info", ".tk", ".ml", ".ga", ".cf", ".gq"];
/// Brands commonly impersonated in subdomains. Order decides which brand is
/// reported when several match.
pub const COMMON_BRANDS: &[&str] = &[
    "paypal",
    "google",
    "amazon",
    "microsoft",
    "apple",
    "facebook",
    "netflix",
    "ebay",
];
/// Credential-harvesting vocabulary matched against the lower-cased body text
pub const PHISHING_KEYWORDS: &[&str] = &[
    "login",
    "password",
    "verify",
    "confirm",
    "account",
    "update",
    "secure",
    "suspended",
    "payment",
    "credentials",
];

// Input handling
/// Maximum URL length (2048 characters), matching common browser and server limits
pub const MAX_URL_LENGTH: usize = 2048;
/// Maximum error message length kept in a result record
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;

// Batch runs
/// Progress logging interval in seconds
pub const LOGGING_INTERVAL: u64 = 5;
/// Default number of concurrent browsers in batch mode. Each analysis owns a
/// full Chromium instance, so this stays small.
pub const DEFAULT_MAX_CONCURRENCY: usize = 2;
/// Upper bound on concurrent browsers accepted from configuration
pub const MAX_CONCURRENCY_LIMIT: usize = 32;
