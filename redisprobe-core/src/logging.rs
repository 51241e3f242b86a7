//! Shared logging utilities for redisprobe binaries.
//!
//! Probe narration flows through `tracing`; the subscriber writes to
//! stderr so rendered reports and JSON on stdout stay machine-readable.

use crate::Result;
use tracing_subscriber::EnvFilter;

/// Initializes structured logging based on verbosity level.
///
/// A `RUST_LOG` filter in the environment takes precedence over both
/// arguments.
///
/// # Arguments
/// * `verbose` - Verbosity level (0=INFO, 1=DEBUG, 2+=TRACE)
/// * `quiet` - If true, only show ERROR level logs
///
/// # Returns
/// Ok(()) if logging was initialized successfully
///
/// # Example
/// ```rust,no_run
/// use redisprobe_core::logging::init_logging;
///
/// // Initialize at DEBUG level
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let fallback = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::ProbeError::configuration(format!("Failed to initialize logging: {e}"))
        })?;

    Ok(())
}
