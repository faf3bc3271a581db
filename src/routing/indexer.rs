//! Route indexing and alert group assignment.
//!
//! # Responsibilities
//! - Build a map with one (empty) group list per route in the tree
//! - Attach Alertmanager alert groups to the routes their labels reach

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::routing::error::RoutingResult;
use crate::routing::finder::RouteFinder;
use crate::routing::tree::{Label, Labels, Route};

/// Receiver reference inside an alert group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GroupReceiver {
    pub name: String,
}

/// A single alert inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GroupedAlert {
    pub labels: Labels,
    pub annotations: Labels,
    pub fingerprint: Option<String>,
}

/// An Alertmanager alert group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertGroup {
    pub labels: Labels,
    pub receiver: GroupReceiver,
    pub alerts: Vec<GroupedAlert>,
}

/// Route id -> alert groups routed there.
pub type GroupsMap = HashMap<String, Vec<AlertGroup>>;

/// One empty entry per route, visited depth-first pre-order.
pub fn route_groups_map(root: &Route) -> GroupsMap {
    let mut groups = GroupsMap::new();
    for route in root.iter() {
        groups.entry(route.id.clone()).or_default();
    }
    groups
}

/// Index the tree, then push every group onto each route its labels match.
pub fn assign_groups<F>(root: &Route, finder: &F, groups: &[AlertGroup]) -> RoutingResult<GroupsMap>
where
    F: RouteFinder + ?Sized,
{
    let mut map = route_groups_map(root);

    for group in groups {
        let labels: Vec<Label> = group
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for matched in finder.find_matching_routes(root, &labels)? {
            if let Some(entry) = map.get_mut(&matched.route.id) {
                entry.push(group.clone());
            }
        }
    }

    tracing::debug!(
        routes = map.len(),
        groups = groups.len(),
        "Assigned alert groups to routes"
    );
    Ok(map)
}
