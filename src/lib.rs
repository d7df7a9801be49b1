//! safe_link_scanner library: render a URL in a headless browser and flag
//! phishing indicators.
//!
//! Each analysis launches its own Chrome/Chromium, loads the URL, records the
//! network traffic, frames and a handful of DOM probes, then runs a fixed
//! battery of heuristic checks over what it saw. The outcome is always a
//! well-formed [`ResultRecord`], even when the browser cannot start or the
//! page never loads.
//!
//! # Example
//!
//! ```no_run
//! use safe_link_scanner::{analyze_url, Config};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config::default();
//! let record = analyze_url("https://example.com", &config).await;
//! println!(
//!     "suspicious={} reasons={:?}",
//!     record.analysis.suspicious, record.analysis.reasons
//! );
//! # }
//! ```
//!
//! # Requirements
//!
//! A Tokio runtime (browser work runs on `spawn_blocking`) and a local
//! Chrome/Chromium binary, auto-detected or given with `Config::chrome_path`.

#![warn(missing_docs)]

pub mod analysis;
mod app;
pub mod browser;
pub mod collect;
pub mod config;
pub mod domain;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod models;
pub mod summary;
mod utils;
pub mod verdict;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use models::{AnalysisStatus, AnalysisVerdict, ResultRecord};
pub use run::{analyze_url, analyze_url_with, run_batch, run_batch_with, BatchReport};

// Single-URL and batch entry points
mod run {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{bail, Context, Result};
    use futures::stream::FuturesUnordered;
    use futures::StreamExt;
    use log::{info, warn};
    use tokio::io::AsyncReadExt;
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        log_progress, print_error_statistics, print_summary, read_url_lines, shutdown_gracefully,
        validate_and_normalize_url,
    };
    use crate::browser::{BrowserLauncher, HeadlessLauncher};
    use crate::collect::CollectorOptions;
    use crate::config::{Config, LOGGING_INTERVAL};
    use crate::error_handling::{AnalysisError, ProcessingStats};
    use crate::export::JsonlWriter;
    use crate::initialization::init_semaphore;
    use crate::models::{AnalysisStatus, ResultRecord};
    use crate::summary::{augment, CommandSummarizer, Summarizer};
    use crate::verdict::{analyze_with, assemble};

    /// Outcome of a batch run.
    #[derive(Debug, Clone, PartialEq)]
    pub struct BatchReport {
        /// URLs that passed validation and were analyzed
        pub total: usize,
        /// Records with `status = analyzed`
        pub analyzed: usize,
        /// Records with `status = error`
        pub errored: usize,
        /// Analyzed records flagged suspicious
        pub suspicious: usize,
        /// Wall-clock duration of the batch in seconds
        pub elapsed_seconds: f64,
    }

    /// Analyzes one URL with a fresh headless browser.
    ///
    /// Never fails: launch, navigation and task failures all come back as a
    /// record with `status = error`.
    pub async fn analyze_url(url: &str, config: &Config) -> ResultRecord {
        let launcher = Arc::new(HeadlessLauncher::new(config.chrome_path.clone()));
        analyze_url_with(
            launcher,
            url.to_string(),
            CollectorOptions::from_config(config),
            Arc::new(ProcessingStats::new()),
            None,
        )
        .await
    }

    /// Analyzes one URL with the given launcher on a blocking thread.
    ///
    /// When a summarizer is given its assessment is merged into the record.
    pub async fn analyze_url_with<L>(
        launcher: Arc<L>,
        url: String,
        options: CollectorOptions,
        stats: Arc<ProcessingStats>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> ResultRecord
    where
        L: BrowserLauncher + Send + Sync + 'static,
    {
        let task_url = url.clone();
        let task_stats = Arc::clone(&stats);
        let joined = tokio::task::spawn_blocking(move || {
            analyze_with(launcher.as_ref(), &task_url, &options, &task_stats)
        })
        .await;

        let mut record = match joined {
            Ok(record) => record,
            Err(join_error) => {
                warn!("Analysis task for {} aborted: {}", url, join_error);
                let error = AnalysisError::TaskAborted(join_error.to_string());
                stats.increment_error(error.error_type());
                assemble(&url, Err(error))
            }
        };
        // The browser is already closed here; only the command holds resources
        if let Some(summarizer) = summarizer {
            augment(&mut record, summarizer.as_ref(), &stats).await;
        }
        record
    }

    /// Analyzes every URL named by `config` with headless Chrome and writes
    /// the records as JSON Lines.
    ///
    /// # Errors
    ///
    /// Fails when no valid URL was given, `--pretty` is combined with more than
    /// one URL, the URL file cannot be read, the output cannot be written, or
    /// the summarizer command is malformed.
    /// Individual analysis failures never fail the batch.
    pub async fn run_batch(config: Config) -> Result<BatchReport> {
        let launcher = Arc::new(HeadlessLauncher::new(config.chrome_path.clone()));
        run_batch_with(config, launcher).await
    }

    /// [`run_batch`] with a caller-supplied browser launcher.
    pub async fn run_batch_with<L>(config: Config, launcher: Arc<L>) -> Result<BatchReport>
    where
        L: BrowserLauncher + Send + Sync + 'static,
    {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
        let urls = collect_input_urls(&config).await?;
        if urls.is_empty() {
            bail!("No valid URLs to analyze");
        }
        let total = urls.len();
        if config.pretty && total > 1 {
            bail!(
                "--pretty writes multi-line records and is only supported for a single URL (got {total})"
            );
        }
        info!("Analyzing {} URL{}", total, if total == 1 { "" } else { "s" });

        let summarizer: Option<Arc<dyn Summarizer>> = match config.summarizer_cmd.as_deref() {
            Some(command_line) => {
                let summarizer = CommandSummarizer::from_command_line(command_line)
                    .context("Invalid summarizer command")?
                    .with_timeout(config.summarizer_timeout());
                info!("Summarizer enabled: {}", command_line);
                Some(Arc::new(summarizer) as Arc<dyn Summarizer>)
            }
            None => None,
        };

        let mut writer = JsonlWriter::create(config.output.as_deref(), config.pretty)?;
        let options = CollectorOptions::from_config(&config);
        let stats = Arc::new(ProcessingStats::new());
        let semaphore = init_semaphore(config.max_concurrency);
        let completed = Arc::new(AtomicUsize::new(0));
        let start_time = Instant::now();

        let cancel = CancellationToken::new();
        let cancel_logging = cancel.child_token();
        let completed_for_logging = Arc::clone(&completed);
        let logging_task = tokio::task::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL));
            // The first tick fires immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &completed_for_logging, total);
                    }
                    _ = cancel_logging.cancelled() => {
                        break;
                    }
                }
            }
        });

        let mut tasks = FuturesUnordered::new();
        for url in urls {
            let semaphore = Arc::clone(&semaphore);
            let launcher = Arc::clone(&launcher);
            let options = options.clone();
            let stats = Arc::clone(&stats);
            let summarizer = summarizer.clone();
            let completed = Arc::clone(&completed);
            tasks.push(async move {
                // Never closed, so acquire only fails if the semaphore is dropped
                let _permit = semaphore.acquire_owned().await.ok();
                let record = analyze_url_with(launcher, url, options, stats, summarizer).await;
                completed.fetch_add(1, Ordering::SeqCst);
                record
            });
        }

        let mut report = BatchReport {
            total,
            analyzed: 0,
            errored: 0,
            suspicious: 0,
            elapsed_seconds: 0.0,
        };
        let mut write_result = Ok(());
        while let Some(record) = tasks.next().await {
            match record.status {
                AnalysisStatus::Analyzed => report.analyzed += 1,
                AnalysisStatus::Error => report.errored += 1,
                AnalysisStatus::Pending => {}
            }
            if record.is_suspicious() {
                report.suspicious += 1;
            }
            if write_result.is_ok() {
                write_result = writer.write_record(&record);
            }
        }

        shutdown_gracefully(cancel, Some(logging_task)).await;
        write_result?;

        report.elapsed_seconds = start_time.elapsed().as_secs_f64();
        print_error_statistics(&stats);
        print_summary(
            report.total,
            report.analyzed,
            report.errored,
            report.suspicious,
            report.elapsed_seconds,
        );
        Ok(report)
    }

    /// URLs from the command line followed by URLs from `--file`, validated.
    async fn collect_input_urls(config: &Config) -> Result<Vec<String>> {
        let mut candidates = config.urls.clone();

        if let Some(path) = &config.file {
            let text = if path.as_os_str() == "-" {
                info!("Reading URLs from stdin");
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("Failed to read URLs from stdin")?;
                text
            } else {
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read URL file: {}", path.display()))?
            };
            candidates.extend(read_url_lines(&text));
        }

        Ok(candidates
            .iter()
            .filter_map(|candidate| validate_and_normalize_url(candidate))
            .collect())
    }
}
