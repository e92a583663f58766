//! Utilities: logging setup.
//!
//! Key items:
//!   derive_level (from -v / -q)
//!   init_logging (tracing subscriber on stderr, RUST_LOG overrides)

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map CLI verbosity flags to a log level. Default is WARN so command output
/// on stdout stays clean.
pub fn derive_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!(
            "table_admin={},warn",
            level.as_str().to_ascii_lowercase()
        )));
    // A second init (tests) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
