//! Logging setup.
//!
//! Events are written to stderr in the compact format so stdout only carries
//! demo output. The filter comes from the `RENDEZVOUS_LOG` environment
//! variable (e.g. `RENDEZVOUS_LOG=rendezvous=trace`), falling back to the
//! configured default level.

use std::sync::Once;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// ENV used to set the log filter
const FILTER_ENV: &str = "RENDEZVOUS_LOG";

/// Once instance to ensure the logger is only initialized once
static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init(default_level: &str) {
    INIT.call_once(|| setup_logging(default_level));
}

fn setup_logging(default_level: &str) {
    let l = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(filters(default_level));

    if let Err(e) = tracing_subscriber::registry().with(l).try_init() {
        eprintln!("Failed to install log subscriber: {e}");
    }
}

fn filters(default_level: &str) -> EnvFilter {
    let env_filter = std::env::var(FILTER_ENV).unwrap_or_default();
    filter_from(default_level, &env_filter)
}

fn filter_from(default_level: &str, directives: &str) -> EnvFilter {
    let default_level = default_level.parse::<LevelFilter>().unwrap_or_else(|e| {
        eprintln!("Failed parsing log level '{default_level}': {e}");
        LevelFilter::WARN
    });

    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(directives)
}
