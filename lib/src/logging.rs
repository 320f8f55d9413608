//! Logger installation for binaries, demos and benchmarks.
//!
//! The library only emits `tracing` events; it never installs a subscriber on
//! its own.

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;

/// Installs a compact `fmt` subscriber as the global default.
///
/// `verbose` lowers the maximum level from `INFO` to `DEBUG`. Fails if a
/// global subscriber is already set.
pub fn install_logger(verbose: bool) -> Result<(), SetGlobalDefaultError> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
