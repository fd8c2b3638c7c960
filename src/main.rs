//! export-table
//!
//! Exports one MySQL table to a JSON file as an array of row objects.
//!
//! # Usage
//!
//! ```bash
//! export-table HOST USER PASSWORD DATABASE TABLE OUTPUT_PATH
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use export_table::cli::CliInterface;
use export_table::error::{ExportError, Result};
use export_table::export;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        match e {
            ExportError::Usage { reason, usage } => {
                eprintln!("{reason}");
                println!("{usage}");
            }
            e => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the export
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    initialize_logging(&cli);

    let result = export::run(
        cli.connection_params(),
        cli.table(),
        cli.output_path(),
        cli.config(),
    )
    .await?;

    info!(
        "Exported {} rows from '{}' to {} ({} bytes, {} ms)",
        result.rows_exported,
        cli.table(),
        cli.output_path().display(),
        result.file_size_bytes,
        result.elapsed_ms
    );
    Ok(())
}

/// Initialize logging on stderr
///
/// `RUST_LOG` directives take precedence over the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
