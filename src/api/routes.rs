//! API route definitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::state::AppState;
use crate::metrics::{History, Sample};

type ApiError = (StatusCode, Json<Value>);

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/nodes", get(list_nodes))
        .route("/nodes/{node}/samples", post(ingest_samples))
        .route("/nodes/{node}/prediction", get(node_prediction))
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    samples: Vec<Sample>,
}

/// Either a single sample or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SampleBatch {
    Many(Vec<Sample>),
    One(Sample),
}

impl SampleBatch {
    fn into_vec(self) -> Vec<Sample> {
        match self {
            SampleBatch::Many(v) => v,
            SampleBatch::One(s) => vec![s],
        }
    }
}

fn meta() -> Value {
    json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": meta()
    }))
}

async fn predict(State(state): State<AppState>, Json(req): Json<PredictRequest>) -> Json<Value> {
    let prediction = state.predictor.predict(&req.samples);
    debug!(samples = req.samples.len(), status = %prediction.status, "ad-hoc prediction");
    Json(json!({ "data": prediction, "meta": meta() }))
}

async fn list_nodes(State(state): State<AppState>) -> Json<Value> {
    let nodes = state.nodes.read().await;
    let mut list: Vec<Value> = nodes
        .iter()
        .map(|(id, h)| json!({ "node": id, "samples": h.len() }))
        .collect();
    list.sort_by(|a, b| a["node"].as_str().cmp(&b["node"].as_str()));

    Json(json!({ "data": list, "meta": { "total": list.len() } }))
}

async fn ingest_samples(
    State(state): State<AppState>,
    Path(node): Path<String>,
    Json(batch): Json<SampleBatch>,
) -> Result<Json<Value>, ApiError> {
    let samples = batch.into_vec();
    let received = samples.len();

    let mut nodes = state.nodes.write().await;
    let buffered = if let Some(history) = nodes.get_mut(&node) {
        history.extend(samples);
        history.len()
    } else if samples.is_empty() {
        0
    } else if nodes.len() >= state.max_nodes {
        warn!(%node, max_nodes = state.max_nodes, "node limit reached, batch refused");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "node limit reached" })),
        ));
    } else {
        let mut history = History::with_capacity(state.history_capacity);
        history.extend(samples);
        let len = history.len();
        nodes.insert(node.clone(), history);
        len
    };
    drop(nodes);

    info!(%node, received, buffered, "samples ingested");
    Ok(Json(json!({
        "data": { "node": node, "received": received, "buffered": buffered },
        "meta": meta()
    })))
}

async fn node_prediction(
    State(state): State<AppState>,
    Path(node): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut nodes = state.nodes.write().await;
    let Some(history) = nodes.get_mut(&node) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown node: {}", node) })),
        ));
    };

    let prediction = state.predictor.predict(history.samples());
    Ok(Json(json!({
        "data": prediction,
        "meta": { "node": node, "samples": history.len() }
    })))
}
