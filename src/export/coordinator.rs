//! Export coordinator for orchestrating export operations
//!
//! This module brings together the page fetcher, progress tracking and the
//! format writer. Fetching and writing are strictly sequential: page N is
//! fully written before page N+1 is requested.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;

use super::progress::ProgressTracker;
use super::streaming::StreamingQuery;
use super::writers::FormatWriter;

/// Result of an export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of rows exported
    pub rows_exported: u64,
    /// Page queries issued, including the terminating empty one
    pub pages_fetched: u64,
    /// File size in bytes
    pub file_size_bytes: u64,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Coordinator for export operations
pub struct ExportCoordinator<'a> {
    /// Streaming query for fetching rows
    query: Box<dyn StreamingQuery + 'a>,
    /// Progress tracker for user feedback
    tracker: ProgressTracker,
    /// Format writer for output
    writer: Box<dyn FormatWriter + 'a>,
}

impl<'a> ExportCoordinator<'a> {
    /// Create a new export coordinator
    pub fn new(
        query: Box<dyn StreamingQuery + 'a>,
        tracker: ProgressTracker,
        writer: Box<dyn FormatWriter + 'a>,
    ) -> Self {
        Self {
            query,
            tracker,
            writer,
        }
    }

    /// Execute the export operation
    ///
    /// On success the writer is finalized. On any fetch or write error the
    /// writer is closed without a footer, so rows already written stay on
    /// disk, and the error is returned.
    ///
    /// # Returns
    /// * `Result<ExportResult>` - Export statistics or error
    pub async fn execute(&mut self) -> Result<ExportResult> {
        let start_time = Instant::now();
        info!("Starting export operation");

        let exported = match self.stream_all().await {
            Ok(exported) => exported,
            Err(e) => {
                warn!(
                    "Export failed after {} rows, closing output unterminated",
                    self.tracker.processed()
                );
                if let Err(close_err) = self.writer.abort().await {
                    warn!("Failed to close output file: {}", close_err);
                }
                if let Err(close_err) = self.query.close().await {
                    warn!("Failed to close page query: {}", close_err);
                }
                self.tracker.finish();
                return Err(e);
            }
        };

        debug!("Finalizing output file");
        let finalized = self.writer.finalize().await;
        self.query.close().await?;
        self.tracker.finish();
        finalized?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        let file_size_bytes = self.writer.file_size().await?;
        let pages_fetched = self.query.pages_requested();

        info!(
            "Export completed: {} rows, {} pages, {} bytes, {} ms",
            exported, pages_fetched, file_size_bytes, elapsed_ms
        );

        Ok(ExportResult {
            rows_exported: exported,
            pages_fetched,
            file_size_bytes,
            elapsed_ms,
        })
    }

    async fn stream_all(&mut self) -> Result<u64> {
        let mut exported = 0u64;
        let mut batch_count = 0u32;

        while let Some(rows) = self.query.next_batch().await? {
            let written = self.writer.write_batch(&rows).await?;
            exported += written as u64;
            self.tracker.update(exported);
            batch_count += 1;

            if batch_count % 10 == 0 {
                info!(
                    "Progress: {} rows exported ({} pages)",
                    exported, batch_count
                );
            }
        }

        debug!("No more rows available");
        Ok(exported)
    }
}
