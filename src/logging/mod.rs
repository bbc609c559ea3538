//! Logging for the patch dataset builder
//!
//! This module provides:
//! - Bracketed event formatting with the active span name
//! - Dual logging (log file + stderr)
//! - Timestamped log file names

mod formatter;
mod setup;

pub use formatter::BracketedFormatter;
pub use setup::{default_filter, setup_logging};
