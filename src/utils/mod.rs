//! Small shared helpers.

pub mod sanitize;

pub use sanitize::sanitize_error_message;
