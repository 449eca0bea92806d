//! Dashboard Module
//!
//! JSON API over the snapshot service. Only compiled when the `dashboard`
//! feature is enabled.

mod api;
mod types;

pub use api::create_router;
pub use types::*;

use std::sync::Arc;

use crate::oracle::SnapshotService;

/// Start the dashboard server
pub async fn start_server(service: Arc<SnapshotService>, bind_addr: &str) -> anyhow::Result<()> {
    let app = create_router(service);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!(addr = %bind_addr, "Dashboard API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
