//! Tracing setup shared by the wattcast binaries

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with an env filter.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects debug, default info.
/// Diagnostics go to stderr so stdout stays reserved for scored output.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
