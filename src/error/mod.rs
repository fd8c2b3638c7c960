//! Error handling for export runs.
//!
//! This module provides:
//! - The error taxonomy of a run (connection, table list, invalid table,
//!   file open, query, write, configuration and usage errors)
//! - Structured extraction of MySQL error numbers and SQLSTATEs from driver
//!   errors, used to build operator-facing messages

pub mod driver;
pub mod kinds;

// Re-export commonly used types
pub use driver::DriverErrorInfo;
pub use kinds::{ConfigError, ConnectionError, ExportError, Result};
