//! Progress logging.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Logs how many analyses finished so far out of `total`.
pub fn log_progress(start_time: Instant, completed: &Arc<AtomicUsize>, total: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = completed.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Analyzed {}/{} URLs in {:.1} seconds (~{:.2} URLs/sec)",
        completed, total, elapsed_secs, rate
    );
}
