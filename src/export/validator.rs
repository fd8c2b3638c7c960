//! Table-name whitelisting
//!
//! A table identifier cannot be a bound parameter, so the requested name is
//! checked against the list the database itself reports before it is ever
//! placed into a query string.

use tracing::{debug, warn};

use crate::error::{ExportError, Result};
use crate::source::{TableSource, ValidatedTable};

/// Validates requested table names against the live table list
pub struct TableValidator;

impl TableValidator {
    /// Confirm `requested` is a table of the connected database
    ///
    /// Issues exactly one enumerate-tables query. The comparison is exact:
    /// no case folding, no trimming.
    ///
    /// # Arguments
    /// * `source` - Connected data source
    /// * `requested` - Untrusted table name
    ///
    /// # Returns
    /// * `Result<ValidatedTable>` - Whitelisted table, `ExportError::InvalidTable`
    ///   or the table-list error
    pub async fn validate<S>(source: &mut S, requested: &str) -> Result<ValidatedTable>
    where
        S: TableSource + ?Sized,
    {
        let tables = source.list_tables().await?;

        match tables.into_iter().find(|name| name == requested) {
            Some(name) => {
                debug!("Table '{}' found in table list", name);
                Ok(ValidatedTable::new(name))
            }
            None => {
                warn!("Requested table '{}' is not in the table list", requested);
                Err(ExportError::InvalidTable(requested.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::{MemorySource, numbered_rows};

    #[tokio::test]
    async fn test_known_table() {
        let mut source = MemorySource::new().with_table("users", numbered_rows(1));
        let table = TableValidator::validate(&mut source, "users").await.unwrap();
        assert_eq!(table.name(), "users");
        assert_eq!(source.list_calls, 1);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let mut source = MemorySource::new().with_table("users", vec![]);
        let err = TableValidator::validate(&mut source, "users` WHERE 1 --")
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidTable(_)));
    }

    #[tokio::test]
    async fn test_match_is_exact() {
        let mut source = MemorySource::new().with_table("Users", vec![]);
        for candidate in ["users", "Users ", " Users"] {
            let err = TableValidator::validate(&mut source, candidate)
                .await
                .unwrap_err();
            assert!(matches!(err, ExportError::InvalidTable(_)));
        }
    }

    #[tokio::test]
    async fn test_listing_failure_propagates() {
        let mut source = MemorySource::new()
            .with_table("users", vec![])
            .failing_listing();
        let err = TableValidator::validate(&mut source, "users").await.unwrap_err();
        assert!(matches!(err, ExportError::TableList(_)));
    }
}
