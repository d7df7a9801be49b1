//! Result record output.
//!
//! Records are written as JSON Lines, one complete `ResultRecord` per line,
//! so output can be piped straight into `jq` or appended to a log.

mod jsonl;

pub use jsonl::{IgnoreBrokenPipe, JsonlWriter};
