// Tracing initialization with a configurable and reloadable log level.
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

pub fn init_tracing_with_level(level: &str) {
    let (reload_layer, handle) = reload::Layer::new(log_filter(rust_log().as_deref(), level));
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Apply a new logging level at runtime if the reload handle is configured.
///
/// A valid `RUST_LOG` still takes precedence over `level`.
pub fn apply_logging_level(level: &str) {
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let filter = log_filter(rust_log().as_deref(), level);
        let _ = handle.modify(|f| {
            *f = filter;
        });
    }
}

fn rust_log() -> Option<String> {
    std::env::var(EnvFilter::DEFAULT_ENV).ok()
}

// Prefer the RUST_LOG directives, otherwise use the provided level string.
fn log_filter(env_directives: Option<&str>, level: &str) -> EnvFilter {
    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}
