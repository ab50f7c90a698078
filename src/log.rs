use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging is silent unless `--verbose` is passed; `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "economia=debug" } else { "off" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(filter)
        .init();
}
