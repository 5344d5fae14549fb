use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::utils::error::{RatError, RatResult};

/// Route tracing events to the append-only diagnostic log.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
pub fn init_logging(log_file: &Path, verbose: bool) -> RatResult<()> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RatError::Configuration(format!("Cannot create log directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| RatError::Configuration(format!("Cannot open log file {}: {}", log_file.display(), e)))?;

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, repeated runner construction) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(())
}

/// Read the whole log file
pub fn read_log(log_file: &Path) -> RatResult<Option<String>> {
    if !log_file.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(log_file)
        .map(Some)
        .map_err(|e| RatError::Internal(format!("Error reading log file: {}", e)))
}
