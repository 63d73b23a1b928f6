use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use ledger::MemoryLedger;
use server_api::ApiContext;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod routes;

use app_state::AppState;
use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ledger = if settings.seed_demo {
        MemoryLedger::with_demo_records().await
    } else {
        MemoryLedger::new()
    };
    info!(records = ledger.len().await, "ledger ready");

    let state = AppState {
        api: ApiContext::new(Arc::new(ledger)),
    };
    let app = routes::build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
