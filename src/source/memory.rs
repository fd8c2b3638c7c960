//! In-memory [`TableSource`] for pipeline tests

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{ExportError, Result};

use super::{Row, TableSource, ValidatedTable};

/// Tables held in memory, with a log of every page request
#[derive(Default)]
pub struct MemorySource {
    tables: BTreeMap<String, Vec<Row>>,
    /// `(offset, limit)` of each page query, in order
    pub page_requests: Vec<(u64, u64)>,
    /// Number of `list_tables` calls
    pub list_calls: usize,
    fail_listing: bool,
    fail_on_page: Option<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    /// Make the enumerate-tables query fail
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make the page query with this zero-based index fail
    pub fn failing_on_page(mut self, index: usize) -> Self {
        self.fail_on_page = Some(index);
        self
    }
}

#[async_trait]
impl TableSource for MemorySource {
    async fn list_tables(&mut self) -> Result<Vec<String>> {
        self.list_calls += 1;
        if self.fail_listing {
            return Err(ExportError::TableList("SHOW TABLES denied".to_string()));
        }
        Ok(self.tables.keys().cloned().collect())
    }

    async fn fetch_page(
        &mut self,
        table: &ValidatedTable,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Row>> {
        let index = self.page_requests.len();
        self.page_requests.push((offset, limit));
        if self.fail_on_page == Some(index) {
            return Err(ExportError::Query("Lost connection during query".to_string()));
        }

        let rows = self
            .tables
            .get(table.name())
            .ok_or_else(|| ExportError::Query(format!("Table '{}' doesn't exist", table.name())))?;
        Ok(rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Rows `{"id": 1, "name": "row-1"}` .. `{"id": n, ...}`
pub fn numbered_rows(n: usize) -> Vec<Row> {
    (1..=n)
        .map(|i| {
            let mut row = Row::new();
            row.insert("id".to_string(), serde_json::json!(i));
            row.insert("name".to_string(), serde_json::json!(format!("row-{i}")));
            row
        })
        .collect()
}
