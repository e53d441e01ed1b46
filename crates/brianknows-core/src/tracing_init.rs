//! Tracing/logging initialization for the relay binary.
//!
//! Installs a `tracing_subscriber` registry with an env-filter and either
//! human-readable or JSON formatted output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Filter used when `RUST_LOG` is not set.
///
/// `TraceLayer` emits its request spans and response events at DEBUG.
pub const DEFAULT_FILTER: &str = "brianknows_relay=info,tower_http=debug";

/// Resolve the effective filter directive.
///
/// A non-blank `RUST_LOG` wins over `default_filter`.
pub fn resolve_filter(rust_log: Option<&str>, default_filter: &str) -> String {
    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => default_filter.to_string(),
    }
}

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- directive applied when `RUST_LOG` is unset
///   (usually [`DEFAULT_FILTER`]).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
///
/// Fails if the directive does not parse or a global subscriber is already set.
pub fn init_tracing(default_filter: &str, log_json: bool) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = resolve_filter(rust_log.as_deref(), default_filter);
    let env_filter = EnvFilter::try_new(&directive)
        .map_err(|e| Error::Config(format!("invalid log filter {directive:?}: {e}")))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))
}
