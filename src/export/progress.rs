//! Progress tracking for export operations
//!
//! The total row count is never queried up front, so progress is a spinner
//! with a running row count and throughput rather than a bar.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress tracker for export operations
pub struct ProgressTracker {
    /// Number of rows processed so far
    processed: u64,
    /// Start time of the operation
    start_time: Instant,
    /// Spinner (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `enable_bar` - Whether to display a spinner; ignored when stderr is
    ///   not a terminal
    pub fn new(enable_bar: bool) -> Self {
        let bar = (enable_bar && std::io::stderr().is_terminal()).then(|| {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            let style = ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} rows {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });

        Self {
            processed: 0,
            start_time: Instant::now(),
            bar,
        }
    }

    /// Update progress with new count
    ///
    /// # Arguments
    /// * `count` - Total number of rows processed so far
    pub fn update(&mut self, count: u64) {
        self.processed = count;

        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} rows/sec)", speed));
            }
        }
    }

    /// Rows processed so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Finish and clear the spinner
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
