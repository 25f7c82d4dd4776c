use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::analysis::HealthPredictor;
use crate::metrics::History;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<HealthPredictor>,
    pub nodes: Arc<RwLock<HashMap<String, History>>>,
    pub history_capacity: usize,
    pub max_nodes: usize,
}

impl AppState {
    pub fn new(predictor: HealthPredictor, history_capacity: usize, max_nodes: usize) -> Self {
        Self {
            predictor: Arc::new(predictor),
            nodes: Arc::new(RwLock::new(HashMap::new())),
            history_capacity,
            max_nodes,
        }
    }
}
