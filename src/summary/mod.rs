//! Optional plain-language assessment of a verdict.
//!
//! A [`Summarizer`] turns the heuristic findings into a short human-readable
//! verdict. The crate does not talk to any model itself: [`CommandSummarizer`]
//! hands the request to an external command and uses whatever it prints.
//! Records stay complete and meaningful when no summarizer is configured.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures::future::BoxFuture;
use log::{debug, warn};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time;

use crate::config::SUMMARIZER_TIMEOUT;
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::models::{AiAssessment, AnalysisStatus, ResultRecord};

/// Skip reason recorded when the record never reached the analysis step.
pub const SKIPPED_LOCAL_FAILURE: &str = "Local analysis failed before AI step.";

/// What a summarizer gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRequest {
    /// Analyzed URL
    pub url: String,
    /// Heuristic verdict
    pub suspicious: bool,
    /// Heuristic findings, in check order
    pub reasons: Vec<String>,
    /// Number of redirect responses observed
    pub redirect_count: usize,
}

impl From<&ResultRecord> for SummaryRequest {
    fn from(record: &ResultRecord) -> Self {
        Self {
            url: record.url.clone(),
            suspicious: record.analysis.suspicious,
            reasons: record.analysis.reasons.clone(),
            redirect_count: record.redirect_urls.len(),
        }
    }
}

/// Produces a free-text verdict and explanation for a request.
pub trait Summarizer: Send + Sync {
    /// Returns the assessment text.
    fn summarize<'a>(&'a self, request: &'a SummaryRequest) -> BoxFuture<'a, Result<String>>;
}

/// Runs an external command per request.
///
/// The request is written to the command's stdin as one JSON object; its
/// trimmed stdout is the assessment. A non-zero exit status, empty output or
/// running past the deadline counts as a failure. The command is killed when
/// the call is abandoned.
#[derive(Debug, Clone)]
pub struct CommandSummarizer {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSummarizer {
    /// Builds a summarizer from a whitespace-separated command line.
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("Summarizer command is empty"))?;
        Ok(Self {
            program: PathBuf::from(program),
            args: parts.map(str::to_string).collect(),
            timeout: SUMMARIZER_TIMEOUT,
        })
    }

    /// Replaces the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, payload: Vec<u8>) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program.display()))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Summarizer stdin was not captured")?;
        // Output is drained while the request is still being written; a
        // command echoing a large request would otherwise fill its stdout pipe
        let send = async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
            Ok::<(), io::Error>(())
        };
        let (sent, output) = tokio::join!(send, child.wait_with_output());

        let output = output.context("Failed to read summarizer output")?;
        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        match sent {
            Ok(()) => {}
            // The command answered without reading the whole request
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("{} closed stdin early", self.program.display());
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to send summary request")),
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            bail!("{} produced no output", self.program.display());
        }
        Ok(text)
    }

    async fn run_with_deadline(&self, request: &SummaryRequest) -> Result<String> {
        let payload = serde_json::to_vec(request).context("Failed to encode summary request")?;
        // Dropping the run future drops the child, which kills it
        match time::timeout(self.timeout, self.run(payload)).await {
            Ok(result) => result,
            Err(_) => bail!(
                "{} timed out after {}s",
                self.program.display(),
                self.timeout.as_secs_f64()
            ),
        }
    }
}

impl Summarizer for CommandSummarizer {
    fn summarize<'a>(&'a self, request: &'a SummaryRequest) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.run_with_deadline(request))
    }
}

/// Merges a summarizer assessment into `record.analysis`.
///
/// Error records are marked skipped without calling the summarizer. A
/// summarizer failure is recorded as a skip with its message; it never changes
/// the heuristic verdict or the record status.
pub async fn augment(
    record: &mut ResultRecord,
    summarizer: &dyn Summarizer,
    stats: &ProcessingStats,
) {
    if record.status != AnalysisStatus::Analyzed {
        record.analysis.ai = Some(AiAssessment {
            ai_skipped: true,
            ai_reason: Some(SKIPPED_LOCAL_FAILURE.to_string()),
            ai_assessment: None,
        });
        return;
    }

    let request = SummaryRequest::from(&*record);
    record.analysis.ai = Some(match summarizer.summarize(&request).await {
        Ok(assessment) => {
            debug!("Summarizer assessment for {}: {}", record.url, assessment);
            AiAssessment {
                ai_skipped: false,
                ai_reason: None,
                ai_assessment: Some(assessment),
            }
        }
        Err(e) => {
            warn!("Summarizer failed for {}: {:#}", record.url, e);
            stats.increment_error(ErrorType::SummarizerError);
            AiAssessment {
                ai_skipped: true,
                ai_reason: Some(format!("API call failed: {e:#}")),
                ai_assessment: None,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    struct Fixed(&'static str);

    impl Summarizer for Fixed {
        fn summarize<'a>(&'a self, request: &'a SummaryRequest) -> BoxFuture<'a, Result<String>> {
            let text = format!("{} ({} reasons)", self.0, request.reasons.len());
            futures::future::ready(Ok(text)).boxed()
        }
    }

    struct Failing;

    impl Summarizer for Failing {
        fn summarize<'a>(&'a self, _request: &'a SummaryRequest) -> BoxFuture<'a, Result<String>> {
            futures::future::ready(Err(anyhow!("connection refused"))).boxed()
        }
    }

    fn analyzed_record() -> ResultRecord {
        let mut record = ResultRecord::pending("https://paypal.verify.example/");
        record.status = AnalysisStatus::Analyzed;
        record.analysis.suspicious = true;
        record.analysis.reasons = vec!["Password input field found on page.".into()];
        record.redirect_urls = vec!["https://a/".into(), "https://b/".into()];
        record
    }

    #[test]
    fn test_request_from_record() {
        let request = SummaryRequest::from(&analyzed_record());
        assert_eq!(request.url, "https://paypal.verify.example/");
        assert!(request.suspicious);
        assert_eq!(request.reasons.len(), 1);
        assert_eq!(request.redirect_count, 2);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["redirect_count"], 2);
    }

    #[tokio::test]
    async fn test_augment_success() {
        let stats = ProcessingStats::new();
        let mut record = analyzed_record();
        augment(&mut record, &Fixed("Phishing"), &stats).await;
        let ai = record.analysis.ai.as_ref().unwrap();
        assert!(!ai.ai_skipped);
        assert_eq!(ai.ai_assessment.as_deref(), Some("Phishing (1 reasons)"));
        assert!(record.analysis.suspicious);
    }

    #[tokio::test]
    async fn test_augment_failure_is_skip() {
        let stats = ProcessingStats::new();
        let mut record = analyzed_record();
        augment(&mut record, &Failing, &stats).await;
        let ai = record.analysis.ai.as_ref().unwrap();
        assert!(ai.ai_skipped);
        assert_eq!(
            ai.ai_reason.as_deref(),
            Some("API call failed: connection refused")
        );
        assert_eq!(stats.get_error_count(ErrorType::SummarizerError), 1);
        assert_eq!(record.status, AnalysisStatus::Analyzed);
    }

    #[tokio::test]
    async fn test_augment_error_record_not_sent() {
        let stats = ProcessingStats::new();
        let mut record = ResultRecord::pending("https://down.example/");
        record.status = AnalysisStatus::Error;
        record.error = Some("Navigation failed".into());
        augment(&mut record, &Failing, &stats).await;

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["analysis"]["ai_skipped"], true);
        assert_eq!(value["analysis"]["ai_reason"], SKIPPED_LOCAL_FAILURE);
        assert_eq!(stats.get_error_count(ErrorType::SummarizerError), 0);
    }

    #[test]
    fn test_command_line_parsing() {
        let summarizer = CommandSummarizer::from_command_line("python3 summarize.py --brief").unwrap();
        assert_eq!(summarizer.program, PathBuf::from("python3"));
        assert_eq!(summarizer.args, vec!["summarize.py", "--brief"]);
        assert_eq!(summarizer.timeout, SUMMARIZER_TIMEOUT);
        assert!(CommandSummarizer::from_command_line("   ").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_summarizer_reads_stdout() {
        let summarizer = CommandSummarizer::from_command_line("cat").unwrap();
        let request = SummaryRequest::from(&analyzed_record());
        let text = summarizer.summarize(&request).await.unwrap();
        let echoed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(echoed["url"], "https://paypal.verify.example/");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_summarizer_echoes_request_larger_than_pipe() {
        let mut record = analyzed_record();
        record.analysis.reasons = (0..5000)
            .map(|i| format!("Request to suspicious TLD (.xyz): https://cdn{i}.tracker.xyz/pixel.gif"))
            .collect();
        let request = SummaryRequest::from(&record);
        let summarizer = CommandSummarizer::from_command_line("cat")
            .unwrap()
            .with_timeout(Duration::from_secs(20));

        let text = summarizer.summarize(&request).await.unwrap();
        assert!(text.len() > 256 * 1024);
        let echoed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(echoed["reasons"].as_array().unwrap().len(), 5000);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_summarizer_failure_status() {
        let summarizer = CommandSummarizer::from_command_line("false").unwrap();
        let request = SummaryRequest::from(&analyzed_record());
        assert!(summarizer.summarize(&request).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_command_is_abandoned() {
        let summarizer = CommandSummarizer::from_command_line("sleep 30")
            .unwrap()
            .with_timeout(Duration::from_millis(200));
        let stats = ProcessingStats::new();
        let mut record = analyzed_record();

        let started = std::time::Instant::now();
        augment(&mut record, &summarizer, &stats).await;
        assert!(started.elapsed() < Duration::from_secs(10));

        let ai = record.analysis.ai.as_ref().unwrap();
        assert!(ai.ai_skipped);
        assert!(ai.ai_reason.as_deref().unwrap().contains("timed out"));
        assert_eq!(stats.get_error_count(ErrorType::SummarizerError), 1);
    }
}
