//! Logging setup
//!
//! Lines look like `2024-05-02 14:03:11  INFO Reading file sample_Arecon.h5`.

use crate::errors::{Result, TomoError};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Installs the global subscriber.
///
/// Logs at INFO, or DEBUG when `verbose`. With `log_file` the output goes to that
/// file (truncated) instead of stderr.
///
/// # Errors
///
/// Fails if the log file cannot be created or a subscriber is already installed.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| TomoError::invalid(format!("failed to install logger: {}", e)))
}
