// src/logging.rs
// =============================================================================
// Sets up tracing output.
//
// Logs go to stderr so stdout only carries the link listings and can be
// piped into other tools. RUST_LOG overrides the default filter, e.g.
// RUST_LOG=link_scan=debug shows every probe and every skipped link.
// =============================================================================

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,link_scan=info";

pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
