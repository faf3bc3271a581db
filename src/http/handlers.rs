//! Policy preview handlers.

use std::time::Instant;

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{AlertGroup, GroupsMap, Labels, ResultsMap};

/// Body of `POST /api/v1/routes/groups`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupsRequest {
    #[serde(default)]
    pub groups: Vec<AlertGroup>,
}

/// Body of `POST /api/v1/routes/match`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub instances: Vec<Labels>,
}

pub async fn health() -> &'static str {
    "ok"
}

/// Every route of the live policy, each with an empty group list.
pub async fn get_routes(State(state): State<AppState>) -> Json<GroupsMap> {
    let start = Instant::now();
    let policy = state.policy();
    let map = policy.matcher.get_route_groups_map(&policy.root, &[]);
    metrics::record_request("routes", true, start);
    Json(map)
}

/// Attach alert groups to the routes they reach.
pub async fn post_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GroupsRequest>,
) -> Result<Json<GroupsMap>, ApiError> {
    let start = Instant::now();
    let policy = state.policy();

    tracing::debug!(
        request_id = %request_id(&headers),
        groups = body.groups.len(),
        generation = policy.generation,
        "Assigning alert groups"
    );

    let result = policy.matcher.assign_groups(&policy.root, &body.groups);
    metrics::record_request("groups", result.is_ok(), start);
    Ok(Json(result?))
}

/// Preview which routes each alert instance lands on.
pub async fn post_match(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MatchRequest>,
) -> Result<Json<ResultsMap>, ApiError> {
    let start = Instant::now();
    let policy = state.policy();

    let results = match policy.matcher.match_instances(&policy.root, &body.instances) {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(request_id = %request_id(&headers), error = %e, "Instance matching failed");
            metrics::record_request("match", false, start);
            return Err(e.into());
        }
    };

    let hits: usize = results.values().map(Vec::len).sum();
    tracing::debug!(
        request_id = %request_id(&headers),
        instances = body.instances.len(),
        routes = results.len(),
        hits,
        "Matched instances"
    );

    metrics::record_matches(body.instances.len(), hits);
    metrics::record_request("match", true, start);
    Ok(Json(results))
}
