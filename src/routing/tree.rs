//! Normalized notification policy tree.
//!
//! A [`Route`] owns its children, so the tree cannot contain cycles.
//! Traversal is iterative to keep stack usage flat on deep trees.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::routing::matcher::{Matcher, MatcherSet};

/// A single `(name, value)` label pair.
pub type Label = (String, String);

/// An alert instance: an unordered label set, kept sorted for determinism.
pub type Labels = BTreeMap<String, String>;

/// A normalized routing node.
#[derive(Debug, Clone)]
pub struct Route {
    /// Identifier, unique within the tree.
    pub id: String,
    /// Effective receiver (inherited from the parent when unset).
    pub receiver: Option<String>,
    /// Effective grouping labels (inherited from the parent when empty).
    pub group_by: Vec<String>,
    /// Keep evaluating siblings after this route matched.
    pub continue_matching: bool,
    /// All matchers of this node, AND-combined.
    pub matchers: MatcherSet,
    /// Ordered child routes.
    pub routes: Vec<Route>,
}

impl Route {
    /// True if the label set satisfies every matcher of this node.
    pub fn matches(&self, labels: &Labels) -> bool {
        self.matchers.matches(labels)
    }

    /// Depth-first pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Find a node by id.
    pub fn find(&self, id: &str) -> Option<&Route> {
        self.iter().find(|r| r.id == id)
    }

    /// Total number of nodes in the tree.
    pub fn route_count(&self) -> usize {
        self.iter().count()
    }

    /// Serializable view of this node and its children.
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            id: self.id.clone(),
            receiver: self.receiver.clone(),
            group_by: self.group_by.clone(),
            continue_matching: self.continue_matching,
            object_matchers: self.matchers.iter().map(|m| m.object().to_string()).collect(),
            routes: self.routes.iter().map(Route::summary).collect(),
        }
    }
}

impl Drop for Route {
    // Flatten the subtree so freeing a deep tree does not recurse.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.routes);
        while let Some(mut route) = pending.pop() {
            pending.append(&mut route.routes);
        }
    }
}

/// Pre-order traversal backed by an explicit stack.
pub struct PreOrder<'a> {
    stack: Vec<&'a Route>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Route;

    fn next(&mut self) -> Option<Self::Item> {
        let route = self.stack.pop()?;
        // Reverse so the first child is visited first
        self.stack.extend(route.routes.iter().rev());
        Some(route)
    }
}

/// JSON shape of a normalized route, used by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub id: String,
    pub receiver: Option<String>,
    pub group_by: Vec<String>,
    #[serde(rename = "continue")]
    pub continue_matching: bool,
    pub object_matchers: Vec<String>,
    pub routes: Vec<RouteSummary>,
}
