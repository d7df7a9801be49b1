//! Process-wide setup: logging and the batch concurrency limit.

mod logger;

use std::sync::Arc;

use tokio::sync::Semaphore;

pub use logger::init_logger_with;

/// Creates the semaphore bounding how many browsers run at once.
///
/// A count of zero is raised to one so a batch can always make progress.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count.max(1)))
}
