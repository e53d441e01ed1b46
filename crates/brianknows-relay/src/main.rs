//! BrianKnows Relay Server
//!
//! Forwards agent and knowledge base requests to the BrianKnows API.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use brianknows_core::UpstreamConfig;
use brianknows_core::config::{
    DEFAULT_BASE_URL, DEFAULT_LISTEN_ADDR, DEFAULT_TIMEOUT_SECS, load_env_file,
};
use brianknows_core::tracing_init::{DEFAULT_FILTER, init_tracing};
use brianknows_relay::{AppState, UpstreamClient, build_router};

#[derive(Parser)]
#[command(name = "brianknows-relay")]
#[command(version, about = "HTTP relay for the BrianKnows agents and knowledge bases API")]
struct Args {
    /// Bearer token for the BrianKnows API.
    #[arg(long, env = "BRIANKNOWS_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Upstream API base URL.
    #[arg(long, env = "BRIANKNOWS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Address to listen on.
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    addr: SocketAddr,

    /// Upstream request timeout in seconds (0 disables the timeout).
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    upstream_timeout: u64,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so the clap `env` fallbacks see values from `.env`.
    let env_file = load_env_file(None)?;
    let args = Args::parse();
    init_tracing(DEFAULT_FILTER, args.log_json)?;
    if let Some(path) = &env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    let timeout = (args.upstream_timeout > 0).then(|| Duration::from_secs(args.upstream_timeout));
    let config = UpstreamConfig::new(args.base_url, args.api_key).with_timeout(timeout);
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        upstream = %config.base_url,
        timeout_secs = args.upstream_timeout,
        "Starting brianknows-relay"
    );
    if timeout.is_none() {
        warn!("Upstream timeout disabled; slow upstream calls will hold requests open");
    }

    let upstream = UpstreamClient::new(&config)?;
    let app = build_router(AppState::new(upstream));

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %listener.local_addr()?, "Relay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Received shutdown signal");
}
