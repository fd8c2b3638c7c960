//! Connection management for MySQL
//!
//! This module turns the operator's credentials into driver options and opens
//! the single connection an export run owns.

use sqlx::mysql::MySqlConnectOptions;
use tracing::info;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::source::MySqlSource;

/// Credentials and target database for one run
#[derive(Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

// Keeps the password out of debug logs.
impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// MySQL connection manager
///
/// Builds connect options from the parameters and configuration, and opens
/// the connection with the configured timeout.
pub struct ConnectionManager {
    /// Credentials and database
    params: ConnectionParams,

    /// Connection configuration
    config: ConnectionConfig,
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `params` - Credentials and database
    /// * `config` - Connection configuration
    ///
    /// # Returns
    /// * `Self` - New connection manager instance
    pub fn new(params: ConnectionParams, config: ConnectionConfig) -> Self {
        Self { params, config }
    }

    /// Establish the connection
    ///
    /// # Returns
    /// * `Result<MySqlSource>` - Open source or connection error
    pub async fn connect(&self) -> Result<MySqlSource> {
        info!("Connecting to {}", self.display_target());
        MySqlSource::connect(&self.connect_options(), self.config.connect_timeout()).await
    }

    /// Driver options for the configured target
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.params.host)
            .port(self.config.port)
            .username(&self.params.user)
            .password(&self.params.password)
            .database(&self.params.database)
    }

    /// Target description for logs, without credentials
    ///
    /// # Returns
    /// * `String` - `user@host:port/database`
    pub fn display_target(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.params.user, self.params.host, self.config.port, self.params.database
        )
    }
}
