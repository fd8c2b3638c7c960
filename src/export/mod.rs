//! Table export pipeline
//!
//! An export run is a three-stage pipeline:
//!
//! 1. **TableValidator**: checks the requested name against the live table list
//! 2. **PageFetcher**: pulls `LIMIT offset, page_size` windows until one is empty
//! 3. **JsonArrayWriter**: streams each row into a single JSON array on disk
//!
//! These components are orchestrated by the **ExportCoordinator**, which also
//! drives progress reporting and guarantees the output file is closed on
//! every path.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use export_table::config::Config;
//! use export_table::connection::{ConnectionManager, ConnectionParams};
//! use export_table::export::{ExportOptions, TableExporter};
//!
//! # async fn example() -> export_table::Result<()> {
//! let config = Config::default();
//! let params = ConnectionParams {
//!     host: "localhost".into(),
//!     user: "reader".into(),
//!     password: "secret".into(),
//!     database: "shop".into(),
//! };
//! let mut source = ConnectionManager::new(params, config.connection.clone())
//!     .connect()
//!     .await?;
//! let exporter = TableExporter::new(ExportOptions::from(&config.export));
//! let result = exporter.export(&mut source, "orders", Path::new("orders.json")).await;
//! source.close().await?;
//! println!("{} rows", result?.rows_exported);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use tracing::{info, warn};

use crate::config::{Config, ExportConfig};
use crate::connection::{ConnectionManager, ConnectionParams};
use crate::error::Result;
use crate::source::TableSource;

pub mod coordinator;
pub mod progress;
pub mod streaming;
pub mod validator;
pub mod writers;

pub use coordinator::{ExportCoordinator, ExportResult};
pub use progress::ProgressTracker;
pub use streaming::{DEFAULT_PAGE_SIZE, PageFetcher, StreamingQuery};
pub use validator::TableValidator;
pub use writers::{FormatWriter, JsonArrayWriter};

/// Tunables for a single export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Rows per page query
    pub page_size: u64,
    /// Show a progress spinner
    pub progress: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            progress: false,
        }
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            page_size: config.page_size,
            progress: config.progress,
        }
    }
}

/// Exports one table of a [`TableSource`] to a JSON file
pub struct TableExporter {
    options: ExportOptions,
}

impl TableExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Validate, page through and serialize `table` into `output`
    ///
    /// The output file is created only after the table passed validation,
    /// so a rejected name never touches the filesystem.
    ///
    /// # Arguments
    /// * `source` - Connected data source, borrowed for the run
    /// * `table` - Requested table name (untrusted)
    /// * `output` - Output file path, truncated if present
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Export statistics or the first error
    pub async fn export<S>(&self, source: &mut S, table: &str, output: &Path) -> Result<ExportResult>
    where
        S: TableSource + ?Sized,
    {
        let table = TableValidator::validate(source, table).await?;
        let writer = JsonArrayWriter::create(output).await?;

        info!(
            "Exporting table '{}' to {} (page size {})",
            table.name(),
            output.display(),
            self.options.page_size
        );

        let query = PageFetcher::new(source, table, self.options.page_size);
        let tracker = ProgressTracker::new(self.options.progress);
        let mut coordinator = ExportCoordinator::new(Box::new(query), tracker, Box::new(writer));
        coordinator.execute().await
    }
}

/// Connect, export one table, and close the connection
///
/// The connection is closed on every path once it has been opened, after
/// the export has already released the output file.
///
/// # Arguments
/// * `params` - Credentials and database
/// * `table` - Requested table name
/// * `output` - Output file path
/// * `config` - Effective configuration
pub async fn run(
    params: ConnectionParams,
    table: &str,
    output: &Path,
    config: &Config,
) -> Result<ExportResult> {
    let manager = ConnectionManager::new(params, config.connection.clone());
    let mut source = manager.connect().await?;

    let exporter = TableExporter::new(ExportOptions::from(&config.export));
    let result = exporter.export(&mut source, table, output).await;

    if let Err(e) = source.close().await {
        warn!("Failed to close connection cleanly: {}", e);
    }
    result
}
