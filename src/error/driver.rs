use std::fmt;

use serde::Serialize;
use sqlx::mysql::MySqlDatabaseError;

/// MySQL server error numbers that mean the credentials were refused.
const ACCESS_DENIED_ERRORS: &[u16] = &[
    1044, // ER_DBACCESS_DENIED_ERROR
    1045, // ER_ACCESS_DENIED_ERROR
    1698, // ER_ACCESS_DENIED_NO_PASSWORD_ERROR
];

/// Structured error information extracted from `sqlx` errors.
///
/// Serialized to JSON for debug logging; its `Display` form is what ends up
/// in the operator-facing message.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DriverErrorInfo {
    #[serde(rename = "type")]
    pub(crate) error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sqlstate: Option<String>,
    pub(crate) message: String,
}

impl DriverErrorInfo {
    /// Extract structured information using the driver's typed error values.
    pub fn from_sqlx(error: &sqlx::Error) -> Self {
        let mut info = DriverErrorInfo {
            error_type: error_type_name(error),
            message: error.to_string(),
            ..Default::default()
        };

        if let Some(db_err) = error.as_database_error() {
            info.message = db_err.message().to_string();
            info.sqlstate = db_err.code().map(|c| c.into_owned());
            if let Some(mysql_err) = db_err.try_downcast_ref::<MySqlDatabaseError>() {
                info.number = Some(mysql_err.number());
            }
        }

        tracing::debug!("driver error: {}", info.to_json_compact());
        info
    }

    /// True when the server refused the login.
    pub fn is_access_denied(&self) -> bool {
        self.number
            .is_some_and(|n| ACCESS_DENIED_ERRORS.contains(&n))
    }

    /// Compact single-line JSON form.
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

impl fmt::Display for DriverErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.number, &self.sqlstate) {
            (Some(number), Some(state)) => write!(f, "[{number} ({state})] {}", self.message),
            (Some(number), None) => write!(f, "[{number}] {}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

fn error_type_name(error: &sqlx::Error) -> &'static str {
    match error {
        sqlx::Error::Configuration(_) => "configuration",
        sqlx::Error::Database(_) => "database",
        sqlx::Error::Io(_) => "io",
        sqlx::Error::Tls(_) => "tls",
        sqlx::Error::Protocol(_) => "protocol",
        sqlx::Error::RowNotFound => "row_not_found",
        sqlx::Error::ColumnIndexOutOfBounds { .. } | sqlx::Error::ColumnNotFound(_) => "column",
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "decode",
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "pool",
        _ => "other",
    }
}
