//! noderisk -- predictive health scoring for monitored nodes.
//!
//! This crate turns a node's recent operational samples into a risk
//! assessment: status, failure probability, projected time-to-failure,
//! ranked issues and a recommendation. The engine itself is pure and
//! synchronous; the HTTP layer keeps per-node histories in memory.

pub mod analysis;
pub mod api;
pub mod config;
pub mod metrics;

use anyhow::Result;

use crate::analysis::HealthPredictor;
use crate::config::AppConfig;

/// Build the predictor described by `config`.
pub fn predictor(config: &AppConfig) -> HealthPredictor {
    HealthPredictor::new(config.engine, config.rule_set())
}

/// Start the noderisk daemon: in-memory node histories behind the HTTP API.
pub async fn serve(config: &AppConfig, bind: &str) -> Result<()> {
    let state = api::state::AppState::new(
        predictor(config),
        config.server.history_capacity,
        config.server.max_nodes,
    );
    let app = api::router(state);

    let addr: std::net::SocketAddr = bind.parse()?;
    tracing::info!(
        %addr,
        window = config.engine.window_size,
        horizon_hours = config.engine.horizon_hours,
        "noderisk listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
