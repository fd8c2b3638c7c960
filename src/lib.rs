//! export-table library
//!
//! Core of the `export-table` tool: validates a table name against the
//! database's table list, pages through the table with `LIMIT offset, count`
//! and streams every row into a JSON array file without holding the result
//! set in memory.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: MySQL connection setup
//! - `error`: Error types and handling
//! - `export`: Validation, pagination and JSON writing
//! - `source`: Table sources and row-to-JSON conversion
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use export_table::{config::Config, connection::ConnectionParams, export};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let params = ConnectionParams {
//!         host: "localhost".to_string(),
//!         user: "reader".to_string(),
//!         password: "secret".to_string(),
//!         database: "shop".to_string(),
//!     };
//!
//!     let result = export::run(params, "orders", Path::new("orders.json"), &Config::default()).await?;
//!     println!("Exported {} rows", result.rows_exported);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod source;

// Re-export commonly used types
pub use config::Config;
pub use connection::ConnectionManager;
pub use error::{ExportError, Result};
pub use export::{ExportResult, TableExporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
