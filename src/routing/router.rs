//! Route groups matcher.
//!
//! # Responsibilities
//! - Expose the two policy preview operations behind one handle
//! - Hold the injected [`RouteFinder`] strategy
//!
//! # Design Decisions
//! - Stateless apart from the finder; every call builds fresh maps
//! - Generic over the finder so tests can swap in their own policy

use crate::config::schema::RouteConfig;
use crate::routing::error::RoutingResult;
use crate::routing::finder::{PolicyTreeFinder, RouteFinder};
use crate::routing::indexer::{assign_groups, route_groups_map, AlertGroup, GroupsMap};
use crate::routing::instances::{match_instances, ResultsMap};
use crate::routing::normalize::normalize_route;
use crate::routing::tree::{Labels, Route};

/// Matches alert groups and instances against notification policy trees.
#[derive(Debug, Clone, Default)]
pub struct RouteGroupsMatcher<F = PolicyTreeFinder> {
    finder: F,
}

impl RouteGroupsMatcher<PolicyTreeFinder> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: RouteFinder> RouteGroupsMatcher<F> {
    /// Use a custom route finding strategy.
    pub fn with_finder(finder: F) -> Self {
        Self { finder }
    }

    pub fn finder(&self) -> &F {
        &self.finder
    }

    /// One empty entry per route. The groups are not inspected.
    pub fn get_route_groups_map(&self, root: &Route, _groups: &[AlertGroup]) -> GroupsMap {
        route_groups_map(root)
    }

    /// Route map with each group attached to the routes it reaches.
    pub fn assign_groups(&self, root: &Route, groups: &[AlertGroup]) -> RoutingResult<GroupsMap> {
        assign_groups(root, &self.finder, groups)
    }

    /// Normalize a raw tree, then match instances against it.
    pub fn match_instances_to_route(
        &self,
        root: &RouteConfig,
        instances: &[Labels],
    ) -> RoutingResult<ResultsMap> {
        let normalized = normalize_route(root)?;
        self.match_instances(&normalized, instances)
    }

    /// Match instances against an already normalized tree.
    pub fn match_instances(&self, root: &Route, instances: &[Labels]) -> RoutingResult<ResultsMap> {
        match_instances(root, &self.finder, instances)
    }
}
