//! Data source abstraction for table exports
//!
//! The export pipeline only needs two things from a database: the list of
//! tables it currently holds and one `LIMIT offset, count` window of a table.
//! [`TableSource`] captures exactly that, so the pipeline can be driven by
//! the MySQL implementation in production and by an in-memory double in
//! tests.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

pub mod mysql;
pub mod value;

#[cfg(test)]
pub mod memory;

pub use mysql::MySqlSource;

/// A single row: column name to JSON value, in backend column order.
pub type Row = Map<String, Value>;

/// A table name that was found in the data source's own table list.
///
/// Only [`crate::export::TableValidator`] constructs this, so holding one is
/// proof the identifier passed the whitelist check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTable(String);

impl ValidatedTable {
    pub(crate) fn new(name: String) -> Self {
        Self(name)
    }

    /// The table name exactly as the data source reported it.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted identifier for the unparametrizable query position.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0.replace('`', "``"))
    }
}

/// Read side of a relational database, as needed by an export run.
#[async_trait]
pub trait TableSource: Send {
    /// Enumerate all tables in the current database.
    ///
    /// # Returns
    /// * `Result<Vec<String>>` - Table names, or `ExportError::TableList`
    async fn list_tables(&mut self) -> Result<Vec<String>>;

    /// Fetch one window of rows.
    ///
    /// # Arguments
    /// * `table` - Whitelisted table
    /// * `offset` - Rows to skip
    /// * `limit` - Maximum rows to return
    ///
    /// # Returns
    /// * `Result<Vec<Row>>` - Rows in backend order, or `ExportError::Query`
    async fn fetch_page(
        &mut self,
        table: &ValidatedTable,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Row>>;
}
