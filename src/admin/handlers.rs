use std::time::UNIX_EPOCH;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::routing::tree::RouteSummary;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    /// Policy generation, starts at 1 and grows with each reload.
    pub generation: u64,
    pub routes: usize,
    /// Seconds since epoch when the live policy was compiled.
    pub loaded_at: u64,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let policy = state.policy();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        generation: policy.generation,
        routes: policy.root.route_count(),
        loaded_at: policy
            .loaded_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    })
}

/// The normalized policy tree currently in effect.
pub async fn get_policy(State(state): State<AppState>) -> Json<RouteSummary> {
    Json(state.policy().root.summary())
}
