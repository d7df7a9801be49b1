//! Verdict assembly: one URL in, one well-formed [`ResultRecord`] out.

use log::{debug, info, warn};

use crate::analysis::analyze;
use crate::browser::BrowserLauncher;
use crate::collect::{collect, CollectorOptions};
use crate::error_handling::{AnalysisError, InfoType, ProcessingStats};
use crate::models::{AnalysisStatus, Observation, ResultRecord};
use crate::utils::sanitize_error_message;

/// Builds the record for `url` from a collection attempt.
///
/// A successful observation is analyzed and embedded. A fatal error yields
/// `status = error` with the sanitized message and every other field left at
/// its default, so callers never see a half-filled record.
pub fn assemble(url: &str, observation: Result<Observation, AnalysisError>) -> ResultRecord {
    let mut record = ResultRecord::pending(url);
    match observation {
        Ok(observation) => {
            record.analysis = analyze(&observation);
            record.status = AnalysisStatus::Analyzed;
            record.frame_urls = observation.frame_urls();
            record.title = observation.title;
            record.request_urls = observation.request_urls;
            record.redirect_urls = observation.redirect_urls;
            record.content_preview = observation.content_preview;
        }
        Err(e) => {
            record.status = AnalysisStatus::Error;
            record.error = Some(sanitize_error_message(&e.to_string()));
        }
    }
    record
}

/// Launches a fresh browser, collects `url` and assembles the record.
///
/// The session lives only inside this call and is dropped (closing the
/// browser) exactly once, whether collection succeeds or fails.
pub fn analyze_with<L: BrowserLauncher>(
    launcher: &L,
    url: &str,
    options: &CollectorOptions,
    stats: &ProcessingStats,
) -> ResultRecord {
    let observation = launcher
        .launch()
        .map_err(|e| AnalysisError::BrowserLaunch(format!("{e:#}")))
        .and_then(|mut session| collect(&mut session, url, options, stats));

    match &observation {
        Ok(observed) => record_verdict_stats(observed, stats),
        Err(e) => {
            warn!("Analysis of {} failed: {}", url, e);
            stats.increment_error(e.error_type());
        }
    }

    let record = assemble(url, observation);
    if record.status == AnalysisStatus::Analyzed {
        stats.increment_info(if record.is_suspicious() {
            InfoType::SuspiciousVerdict
        } else {
            InfoType::CleanVerdict
        });
        info!(
            "Analyzed {}: suspicious={} ({}/{} checks passed)",
            url,
            record.analysis.suspicious,
            record.analysis.checks_passed,
            record.analysis.checks_total
        );
    }
    record
}

fn record_verdict_stats(observation: &Observation, stats: &ProcessingStats) {
    let probes_failed = observation.meta_refresh.is_err()
        || observation.password_field.is_err()
        || observation.body_text.is_err();
    if probes_failed {
        debug!("Verdict for {} has skipped checks", observation.url);
        stats.increment_info(InfoType::IncompleteVerdict);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::FrameUrl;

    #[test]
    fn test_assemble_success_copies_observation() {
        let mut observation = Observation::new("https://example.com/");
        observation.title = "Example".into();
        observation.content_preview = "<html>".into();
        observation.request_urls = vec!["https://example.com/".into()];
        observation.frames = vec![
            FrameUrl::InternalOrBlank,
            FrameUrl::Url("https://example.com/embed".into()),
        ];
        observation.password_field = Ok(true);

        let record = assemble("https://example.com/", Ok(observation));
        assert_eq!(record.status, AnalysisStatus::Analyzed);
        assert_eq!(record.title, "Example");
        assert_eq!(record.request_urls, vec!["https://example.com/"]);
        assert_eq!(
            record.frame_urls,
            vec!["[Internal/Blank Frame]", "https://example.com/embed"]
        );
        assert!(record.error.is_none());
        assert!(record.is_suspicious());
        assert_eq!(
            record.analysis.reasons,
            vec!["Password input field found on page."]
        );
    }

    #[test]
    fn test_assemble_error_leaves_defaults() {
        let error = AnalysisError::NavigationTimeout {
            url: "https://slow.example/".into(),
            timeout: Duration::from_secs(30),
        };
        let record = assemble("https://slow.example/", Err(error));
        assert_eq!(record.status, AnalysisStatus::Error);
        assert_eq!(
            record.error.as_deref(),
            Some("Navigation to https://slow.example/ timed out after 30s")
        );
        assert!(!record.analysis.suspicious);
        assert!(record.analysis.reasons.is_empty());
        assert_eq!(record.analysis.checks_total, 0);
        assert_eq!(record.analysis.checks_passed, 0);
        assert!(record.title.is_empty());
        assert!(record.request_urls.is_empty());
    }

    #[test]
    fn test_assemble_error_message_sanitized() {
        let error = AnalysisError::Navigation {
            url: "https://x.example/".into(),
            message: "net::ERR_FAILED\x00\x07".into(),
        };
        let record = assemble("https://x.example/", Err(error));
        assert_eq!(
            record.error.as_deref(),
            Some("Navigation to https://x.example/ failed: net::ERR_FAILED")
        );
    }
}
