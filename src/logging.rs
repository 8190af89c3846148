//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

use crate::error::{OlapError, OlapResult};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install a `fmt` subscriber writing to stderr, filtered by `RUST_LOG`.
///
/// Stdout is left to the report itself. Fails if a global subscriber is already set.
pub fn init_tracing() -> OlapResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| OlapError::Logging(err.to_string()))
}
