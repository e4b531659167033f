use std::sync::Arc;

use route_metrics::{config::Config, server, AppState};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 1. Configuration ─────────────────────────────────────────
    let config = Config::from_env()?;
    let addr = config.bind_addr;

    // ── 2. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Bind & serve ──────────────────────────────────────────
    tracing::info!(%addr, "route-metrics starting");
    tracing::info!("metrics JSON  → http://{addr}/metrics");
    tracing::info!("metrics prom  → http://{addr}/metrics/prom");
    tracing::info!("metrics SSE   → http://{addr}/metrics/stream");

    server::run(state).await?;
    Ok(())
}
