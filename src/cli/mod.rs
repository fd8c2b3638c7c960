//! Command-line interface for export-table
//!
//! This module handles:
//! - Positional argument parsing using clap
//! - Configuration loading and CLI overrides
//! - Building connection parameters for the export run

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::config::{Config, LogLevel};
use crate::connection::ConnectionParams;
use crate::error::{ExportError, Result};

/// Export a MySQL table to a JSON file
#[derive(Parser, Debug)]
#[command(
    name = "export-table",
    version,
    about = "Export a MySQL table to a JSON file",
    long_about = "Reads every row of TABLE page by page and writes them to OUTPUT_PATH
as a single JSON array of objects, one row per line."
)]
pub struct CliArgs {
    /// Database server host
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Username for authentication
    #[arg(value_name = "USER")]
    pub user: String,

    /// Password for authentication
    #[arg(value_name = "PASSWORD")]
    pub password: String,

    /// Database (schema) name
    #[arg(value_name = "DATABASE")]
    pub database: String,

    /// Table to export, must exist in DATABASE
    #[arg(value_name = "TABLE")]
    pub table: String,

    /// Output file, created or truncated
    #[arg(value_name = "OUTPUT_PATH")]
    pub output: PathBuf,

    /// Server port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Rows fetched per page query
    #[arg(long, value_name = "ROWS")]
    pub page_size: Option<u64>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub connect_timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Disable the progress spinner
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,
}

/// Parsed arguments together with the effective configuration
pub struct CliInterface {
    args: CliArgs,
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load configuration
    ///
    /// `--help` and `--version` print and exit with status 0 here. Every
    /// other parse failure becomes `ExportError::Usage`.
    ///
    /// # Returns
    /// * `Result<Self>` - Initialized CLI interface or error
    pub fn new() -> Result<Self> {
        Self::try_from_args(std::env::args_os())
    }

    /// Parse an explicit argument list (first item is the program name)
    ///
    /// # Arguments
    /// * `args` - Argument iterator
    ///
    /// # Returns
    /// * `Result<Self>` - Initialized CLI interface or error
    pub fn try_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = Self::parse_args(args)?;
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    fn parse_args<I, T>(args: I) -> Result<CliArgs>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match CliArgs::try_parse_from(args) {
            Ok(args) => Ok(args),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => Err(ExportError::Usage {
                reason: first_line(&e.to_string()),
                usage: usage_text(),
            }),
        }
    }

    /// Load configuration and apply CLI overrides
    ///
    /// Precedence: CLI arguments, then environment, then file, then defaults.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_logging_args(config, args);
        Self::apply_connection_args(config, args);
        Self::apply_export_args(config, args);
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else {
            config.logging.level
        };
    }

    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(port) = args.port {
            config.connection.port = port;
        }
        if let Some(timeout) = args.connect_timeout {
            config.connection.connect_timeout = timeout;
        }
    }

    fn apply_export_args(config: &mut Config, args: &CliArgs) {
        if let Some(page_size) = args.page_size {
            config.export.page_size = page_size;
        }
        if args.no_progress {
            config.export.progress = false;
        }
    }

    /// Connection parameters taken from the positionals
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.args.host.clone(),
            user: self.args.user.clone(),
            password: self.args.password.clone(),
            database: self.args.database.clone(),
        }
    }

    /// Requested table name, not yet validated
    pub fn table(&self) -> &str {
        &self.args.table
    }

    pub fn output_path(&self) -> &Path {
        &self.args.output
    }

    /// Get the configuration
    ///
    /// # Returns
    /// * `&Config` - Reference to effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Rendered usage text, as printed on argument errors
pub fn usage_text() -> String {
    CliArgs::command().render_help().to_string()
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONALS: [&str; 7] = [
        "export-table",
        "db.local",
        "reader",
        "s3cret",
        "shop",
        "orders",
        "/tmp/orders.json",
    ];

    fn with_extra(extra: &[&str]) -> Vec<String> {
        POSITIONALS
            .iter()
            .chain(extra.iter())
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(POSITIONALS).unwrap();
        assert_eq!(args.host, "db.local");
        assert_eq!(args.user, "reader");
        assert_eq!(args.password, "s3cret");
        assert_eq!(args.database, "shop");
        assert_eq!(args.table, "orders");
        assert_eq!(args.output, PathBuf::from("/tmp/orders.json"));
        assert!(args.port.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args = CliArgs::try_parse_from(with_extra(&[
            "--port",
            "3307",
            "--page-size",
            "500",
            "--no-progress",
            "-v",
        ]))
        .unwrap();
        assert_eq!(args.port, Some(3307));
        assert_eq!(args.page_size, Some(500));
        assert!(args.no_progress);
        assert!(args.verbose);
    }

    #[test]
    fn test_too_few_positionals_is_usage_error() {
        let err = CliInterface::parse_args(&POSITIONALS[..6]).unwrap_err();
        match err {
            ExportError::Usage { reason, usage } => {
                assert!(!reason.is_empty());
                assert!(usage.contains("HOST"));
                assert!(usage.contains("OUTPUT_PATH"));
            }
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_too_many_positionals_is_usage_error() {
        let err = CliInterface::parse_args(with_extra(&["extra"])).unwrap_err();
        assert!(matches!(err, ExportError::Usage { .. }));
    }

    #[test]
    fn test_args_override_config() {
        let args = CliArgs::try_parse_from(with_extra(&[
            "--port",
            "3307",
            "--page-size",
            "25",
            "--connect-timeout",
            "5",
            "--no-progress",
            "--vv",
        ]))
        .unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);

        assert_eq!(config.connection.port, 3307);
        assert_eq!(config.connection.connect_timeout, 5);
        assert_eq!(config.export.page_size, 25);
        assert!(!config.export.progress);
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = CliArgs::try_parse_from(POSITIONALS).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_explicit_missing_config_file() {
        let err = CliInterface::try_from_args(with_extra(&["-c", "/nonexistent/export.toml"]))
            .err()
            .unwrap();
        assert!(matches!(err, ExportError::Config(_)));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();
        let config_arg = config_path.to_string_lossy().to_string();

        let err = CliInterface::try_from_args(with_extra(&[
            "-c",
            &config_arg,
            "--page-size",
            "0",
        ]))
        .err()
        .unwrap();
        assert!(matches!(err, ExportError::Config(_)));
    }

    #[test]
    fn test_connection_params_from_positionals() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[export]\nprogress = false\n").unwrap();
        let config_arg = config_path.to_string_lossy().to_string();

        let cli = CliInterface::try_from_args(with_extra(&["-c", &config_arg])).unwrap();
        let params = cli.connection_params();
        assert_eq!(params.host, "db.local");
        assert_eq!(params.database, "shop");
        assert_eq!(cli.table(), "orders");
        assert_eq!(cli.output_path(), Path::new("/tmp/orders.json"));
        assert!(!cli.config().export.progress);
    }

    #[test]
    fn test_cli_verify() {
        CliArgs::command().debug_assert();
    }
}
