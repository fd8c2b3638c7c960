//! Format writers for export operations
//!
//! A writer owns the output file for the duration of a run and closes it
//! exactly once, whether the run completes ([`FormatWriter::finalize`]) or
//! fails part way ([`FormatWriter::abort`]).

use async_trait::async_trait;
use std::path::Path;
use tokio::fs::File;
use tokio::io::BufWriter;

use crate::error::{ExportError, Result};
use crate::source::Row;

pub mod json;

pub use json::JsonArrayWriter;

/// Trait for writing rows to an output format
#[async_trait]
pub trait FormatWriter: Send {
    /// Write a batch of rows
    ///
    /// # Arguments
    /// * `rows` - Slice of rows to write
    ///
    /// # Returns
    /// * `Result<usize>` - Number of rows written
    async fn write_batch(&mut self, rows: &[Row]) -> Result<usize>;

    /// Write any footer, flush and close the output
    async fn finalize(&mut self) -> Result<()>;

    /// Flush and close the output as-is, without a footer
    async fn abort(&mut self) -> Result<()>;

    /// Get the current file size in bytes
    async fn file_size(&self) -> Result<u64>;
}

/// Create (or truncate) the output file behind a buffered writer
///
/// # Arguments
/// * `path` - File path to create
///
/// # Returns
/// * `Result<BufWriter<File>>` - Buffered writer or `ExportError::FileOpen`
pub(crate) async fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .await
        .map_err(|source| ExportError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(BufWriter::with_capacity(1024 * 1024, file))
}
