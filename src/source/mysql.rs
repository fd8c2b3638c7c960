//! MySQL-backed [`TableSource`]
//!
//! Holds one dedicated connection for the lifetime of a run. The table list
//! comes from `SHOW TABLES`; pages come from a prepared
//! `SELECT * FROM `table` LIMIT ?, ?` with both numbers bound.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Row as _};
use tracing::{debug, info};

use crate::error::{ConnectionError, ExportError, Result};

use super::value::row_to_json;
use super::{Row, TableSource, ValidatedTable};

/// Single MySQL connection used as an export source
pub struct MySqlSource {
    conn: MySqlConnection,
}

impl MySqlSource {
    /// Open the connection, bounded by `timeout`
    ///
    /// # Arguments
    /// * `options` - Driver connect options
    /// * `timeout` - Upper bound for the whole handshake
    ///
    /// # Returns
    /// * `Result<Self>` - Connected source or `ExportError::Connection`
    pub async fn connect(options: &MySqlConnectOptions, timeout: Duration) -> Result<Self> {
        let conn = tokio::time::timeout(timeout, options.connect())
            .await
            .map_err(|_| ConnectionError::Timeout(timeout.as_secs()))?
            .map_err(|e| ConnectionError::from_connect_error(&e))?;

        debug!("MySQL connection established");
        Ok(Self { conn })
    }

    /// Close the connection gracefully
    ///
    /// Consumes the source so it cannot be closed twice.
    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| ConnectionError::from_connect_error(&e))?;
        info!("MySQL connection closed");
        Ok(())
    }

    fn page_query(table: &ValidatedTable) -> String {
        format!("SELECT * FROM {} LIMIT ?, ?", table.quoted())
    }
}

#[async_trait]
impl TableSource for MySqlSource {
    async fn list_tables(&mut self) -> Result<Vec<String>> {
        let rows = sqlx::query("SHOW TABLES")
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ExportError::table_list(&e))?;

        let tables = rows
            .iter()
            .map(|row| row.try_get_unchecked::<String, _>(0))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ExportError::table_list(&e))?;

        debug!("Database reports {} tables", tables.len());
        Ok(tables)
    }

    async fn fetch_page(
        &mut self,
        table: &ValidatedTable,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Row>> {
        let sql = Self::page_query(table);
        let rows = sqlx::query(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| ExportError::query(&e))?;

        rows.iter()
            .map(row_to_json)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ExportError::query(&e))
    }
}
