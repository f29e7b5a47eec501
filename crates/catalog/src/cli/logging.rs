//! tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for cards and JSON. The filter comes from
//! `RUST_LOG` when set, otherwise from the configured `log_level`; `--verbose` forces
//! `debug`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_logging(config_level: &str, verbose: bool) {
    let filter = build_filter(config_level, verbose, std::env::var("RUST_LOG").ok());

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_ansi(console::colors_enabled_stderr())
                .with_target(false),
        )
        .with(filter);

    // A subscriber may already be installed (tests); keep it.
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return;
    }

    tracing::debug!(verbose, "Tracing initialized");
}

fn build_filter(config_level: &str, verbose: bool, rust_log: Option<String>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    match rust_log.filter(|s| !s.trim().is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new(config_level),
    }
}
