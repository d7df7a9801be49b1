//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};

/// Logs every non-zero error and verdict counter.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let total_errors = stats.total_errors();
    if total_errors > 0 {
        info!(
            "Error Counts ({} total, {} fatal):",
            total_errors,
            stats.total_fatal_errors()
        );
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if stats.total_info() > 0 {
        info!("Verdicts:");
        for info_type in InfoType::iter() {
            let count = stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

/// One-line summary of a batch.
pub fn print_summary(total: usize, analyzed: usize, errored: usize, suspicious: usize, elapsed_secs: f64) {
    info!(
        "✅ Analyzed {} URL{} ({} analyzed, {} errors, {} suspicious) in {:.1}s",
        total,
        if total == 1 { "" } else { "s" },
        analyzed,
        errored,
        suspicious,
        elapsed_secs
    );
}
