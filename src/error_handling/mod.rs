//! Error handling and processing statistics.
//!
//! This module provides:
//! - Fatal analysis errors and recoverable query errors
//! - Processing statistics tracking (errors and info metrics)
//!
//! Error types are categorized into:
//! - **Fatal**: browser launch or navigation failures that end an analysis
//! - **Per-query**: a single DOM query failed, the analysis continues
//! - **Info**: verdict outcomes (suspicious, clean, incomplete)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    AnalysisError, ErrorType, InfoType, InitializationError, OperationTimeout, QueryError,
};
