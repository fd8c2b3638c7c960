//! Paginated fetching of a validated table
//!
//! This module provides a unified interface for streaming rows out of a table
//! page by page without loading all results into memory.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::source::{Row, TableSource, ValidatedTable};

/// Default number of rows per page query
pub const DEFAULT_PAGE_SIZE: u64 = 10_000;

/// Trait for streaming query results in batches
#[async_trait]
pub trait StreamingQuery: Send {
    /// Fetch the next batch of rows
    ///
    /// # Returns
    /// * `Result<Option<Vec<Row>>>` - Next non-empty batch, or None if exhausted
    async fn next_batch(&mut self) -> Result<Option<Vec<Row>>>;

    /// Number of page queries issued so far
    fn pages_requested(&self) -> u64;

    /// Close the query and release resources
    async fn close(&mut self) -> Result<()>;
}

/// `LIMIT offset, page_size` pager over one table
///
/// Finite and non-restartable: once a page comes back empty, or a page query
/// fails, every later call returns `Ok(None)` without touching the source.
pub struct PageFetcher<'a, S: TableSource + ?Sized> {
    source: &'a mut S,
    table: ValidatedTable,
    page_size: u64,
    offset: u64,
    pages_requested: u64,
    total_fetched: u64,
    exhausted: bool,
}

impl<'a, S: TableSource + ?Sized> PageFetcher<'a, S> {
    /// Create a pager starting at offset 0
    ///
    /// # Arguments
    /// * `source` - Data source, borrowed for the life of the pager
    /// * `table` - Whitelisted table
    /// * `page_size` - Rows per page query, must be positive
    pub fn new(source: &'a mut S, table: ValidatedTable, page_size: u64) -> Self {
        debug_assert!(page_size > 0);
        Self {
            source,
            table,
            page_size,
            offset: 0,
            pages_requested: 0,
            total_fetched: 0,
            exhausted: false,
        }
    }

    /// Offset the next page query will use
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

#[async_trait]
impl<'a, S: TableSource + ?Sized> StreamingQuery for PageFetcher<'a, S> {
    async fn next_batch(&mut self) -> Result<Option<Vec<Row>>> {
        if self.exhausted {
            return Ok(None);
        }

        self.pages_requested += 1;
        debug!(
            "Fetching page #{} of '{}' (offset {}, limit {})",
            self.pages_requested,
            self.table.name(),
            self.offset,
            self.page_size
        );

        let rows = match self
            .source
            .fetch_page(&self.table, self.offset, self.page_size)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };

        if rows.is_empty() {
            debug!(
                "Table '{}' exhausted after {} rows",
                self.table.name(),
                self.total_fetched
            );
            self.exhausted = true;
            return Ok(None);
        }

        self.offset += self.page_size;
        self.total_fetched += rows.len() as u64;
        debug!(
            "Fetched page of {} rows (total: {})",
            rows.len(),
            self.total_fetched
        );
        Ok(Some(rows))
    }

    fn pages_requested(&self) -> u64 {
        self.pages_requested
    }

    async fn close(&mut self) -> Result<()> {
        if !self.exhausted {
            self.exhausted = true;
            info!(
                "Closed pager on '{}' after fetching {} rows",
                self.table.name(),
                self.total_fetched
            );
        }
        Ok(())
    }
}
