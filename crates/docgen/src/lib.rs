//! Shared setup for the `docgen` command-line tools.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Sends log output to stderr. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Whether output to stdout should be highlighted for a `--color` setting.
pub fn should_highlight(color: &str) -> bool {
    match color {
        "always" => true,
        "never" => false,
        _ => io::stdout().is_terminal(),
    }
}
