use std::path::PathBuf;
use std::{fmt, io};

use crate::error::driver::DriverErrorInfo;

/// Crate-wide `Result` type using [`ExportError`] as the error.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for an export run.
///
/// Every variant is terminal: the run stops, releases the output file and the
/// connection, and the process exits with status 1.
#[derive(Debug)]
pub enum ExportError {
    /// Cannot reach or authenticate to the data source.
    Connection(ConnectionError),

    /// The enumerate-tables query failed.
    TableList(String),

    /// The requested table is not in the enumerated list.
    InvalidTable(String),

    /// The output path could not be created or truncated.
    FileOpen { path: PathBuf, source: io::Error },

    /// A page fetch failed at prepare, bind or execute stage.
    Query(String),

    /// Writing to the already opened output file failed.
    Write(io::Error),

    /// Configuration errors.
    Config(ConfigError),

    /// Command-line usage errors; `usage` goes to stdout.
    Usage { reason: String, usage: String },
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Server could not be reached or refused the session.
    Unreachable(String),

    /// Credentials were rejected.
    AuthenticationFailed(String),

    /// Connect attempt exceeded the configured timeout.
    Timeout(u64),

    /// Connection parameters could not be turned into driver options.
    InvalidOptions(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Connection(e) => write!(f, "Unable to connect to database: {e}"),
            ExportError::TableList(msg) => write!(f, "Unable to get tables' names: {msg}"),
            ExportError::InvalidTable(name) => {
                write!(f, "Specified table does not exist: {name}")
            }
            ExportError::FileOpen { path, source } => write!(
                f,
                "Unable to open file for writing: {}: {source}",
                path.display()
            ),
            ExportError::Query(msg) => write!(f, "Error occurred while executing query: {msg}"),
            ExportError::Write(e) => write!(f, "Error occurred while writing output: {e}"),
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Usage { reason, .. } => write!(f, "{reason}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Unreachable(msg) => write!(f, "{msg}"),
            ConnectionError::AuthenticationFailed(msg) => {
                write!(f, "Authentication failed: {msg}")
            }
            ConnectionError::Timeout(secs) => write!(f, "Connection timed out after {secs}s"),
            ConnectionError::InvalidOptions(msg) => {
                write!(f, "Invalid connection options: {msg}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::FileOpen { source, .. } => Some(source),
            ExportError::Write(e) => Some(e),
            ExportError::Connection(e) => Some(e),
            ExportError::Config(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Write(err)
    }
}

impl From<ConnectionError> for ExportError {
    fn from(err: ConnectionError) -> Self {
        ExportError::Connection(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::InvalidFormat(err.to_string())
    }
}

impl ConnectionError {
    /// Classify a driver error raised while opening the session.
    pub fn from_connect_error(err: &sqlx::Error) -> Self {
        let info = DriverErrorInfo::from_sqlx(err);
        if info.is_access_denied() {
            ConnectionError::AuthenticationFailed(info.to_string())
        } else {
            match err {
                sqlx::Error::Configuration(_) | sqlx::Error::Tls(_) => {
                    ConnectionError::InvalidOptions(info.to_string())
                }
                _ => ConnectionError::Unreachable(info.to_string()),
            }
        }
    }
}

impl ExportError {
    /// Wrap a driver error raised by the enumerate-tables query.
    pub fn table_list(err: &sqlx::Error) -> Self {
        ExportError::TableList(DriverErrorInfo::from_sqlx(err).to_string())
    }

    /// Wrap a driver error raised by a page query.
    pub fn query(err: &sqlx::Error) -> Self {
        ExportError::Query(DriverErrorInfo::from_sqlx(err).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_table_message() {
        let err = ExportError::InvalidTable("users; DROP".to_string());
        assert_eq!(err.to_string(), "Specified table does not exist: users; DROP");
    }

    #[test]
    fn test_file_open_carries_source() {
        use std::error::Error;

        let err = ExportError::FileOpen {
            path: PathBuf::from("/nope/out.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope/out.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_timeout_display() {
        let err: ExportError = ConnectionError::Timeout(5).into();
        assert_eq!(
            err.to_string(),
            "Unable to connect to database: Connection timed out after 5s"
        );
    }

    #[test]
    fn test_connect_error_classification() {
        let err = sqlx::Error::Configuration("bad url".into());
        assert!(matches!(
            ConnectionError::from_connect_error(&err),
            ConnectionError::InvalidOptions(_)
        ));

        let err = sqlx::Error::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(matches!(
            ConnectionError::from_connect_error(&err),
            ConnectionError::Unreachable(_)
        ));
    }
}
