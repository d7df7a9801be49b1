//! Batch-run helpers used by the binary and `run_batch`.
//!
//! URL validation, progress logging, shutdown handling and the end-of-run
//! statistics dump.

pub mod logging;
pub mod shutdown;
pub mod statistics;
pub mod url;

pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_summary};
pub use url::{read_url_lines, validate_and_normalize_url};
