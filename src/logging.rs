// src/logging.rs
// =============================================================================
// Sets up `tracing` for the whole program.
//
// Logs go to stderr so stdout stays clean for the `--json` output.
// The level comes from RUST_LOG and falls back to "info":
//   RUST_LOG=debug                  -> every skipped link and failed fetch
//   RUST_LOG=site_crawler=trace     -> also permits and duplicate hits
// =============================================================================

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
