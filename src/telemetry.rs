//! Telemetry initialization: tracing subscriber writing to stderr.
//!
//! The host captures the plugin's stderr, so the fmt layer targets it
//! directly. `RUST_LOG` overrides the default filter when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Safe to call once per process; the transport layer calls this before the
/// provider is configured.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "nexus_provider=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
