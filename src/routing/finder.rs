//! Route finding strategies.
//!
//! # Responsibilities
//! - Decide which nodes of a normalized tree an instance lands on
//! - Report, per matcher, which labels satisfied it
//!
//! # Design Decisions
//! - Injected via the [`RouteFinder`] trait so accumulation logic stays pure
//! - Default policy follows Alertmanager: deepest match wins, `continue`
//!   lets later siblings match too
//! - Iterative walk; tree depth does not grow the call stack

use serde::Serialize;

use crate::routing::error::RoutingResult;
use crate::routing::matcher::{LabelMatcher, ObjectMatcher};
use crate::routing::tree::{Label, Labels, Route};

/// Labels that satisfied one matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatcherDetail {
    pub matcher: ObjectMatcher,
    pub labels: Vec<Label>,
}

/// Per-matcher detail for one matched route, in matcher order.
pub type MatchDetails = Vec<MatcherDetail>;

/// A route an instance matched, with the reason.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    pub route: &'r Route,
    pub details: MatchDetails,
}

/// Strategy that evaluates a normalized tree against a label list.
pub trait RouteFinder: Send + Sync {
    /// Return matching nodes, typically in tree pre-order.
    fn find_matching_routes<'r>(
        &self,
        root: &'r Route,
        labels: &[Label],
    ) -> RoutingResult<Vec<RouteMatch<'r>>>;
}

/// Alertmanager routing semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyTreeFinder;

impl PolicyTreeFinder {
    pub fn new() -> Self {
        Self
    }
}

struct Frame<'r> {
    route: &'r Route,
    details: MatchDetails,
    next_child: usize,
    /// Output length when this node was entered.
    start: usize,
    /// A non-continue child matched; skip remaining siblings.
    halted: bool,
}

impl RouteFinder for PolicyTreeFinder {
    fn find_matching_routes<'r>(
        &self,
        root: &'r Route,
        labels: &[Label],
    ) -> RoutingResult<Vec<RouteMatch<'r>>> {
        let label_set: Labels = labels.iter().cloned().collect();
        let mut matches = Vec::new();

        let Some(details) = evaluate(root, &label_set, labels) else {
            return Ok(matches);
        };

        let mut stack = vec![Frame {
            route: root,
            details,
            next_child: 0,
            start: 0,
            halted: false,
        }];

        while let Some(frame) = stack.last_mut() {
            if !frame.halted && frame.next_child < frame.route.routes.len() {
                let child = &frame.route.routes[frame.next_child];
                frame.next_child += 1;
                if let Some(details) = evaluate(child, &label_set, labels) {
                    stack.push(Frame {
                        route: child,
                        details,
                        next_child: 0,
                        start: matches.len(),
                        halted: false,
                    });
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };

            // No descendant claimed the instance: this node is the match
            if matches.len() == done.start {
                matches.push(RouteMatch {
                    route: done.route,
                    details: done.details,
                });
            }

            if !done.route.continue_matching {
                if let Some(parent) = stack.last_mut() {
                    parent.halted = true;
                }
            }
        }

        Ok(matches)
    }
}

/// Match a single node; `None` if any matcher fails.
fn evaluate(route: &Route, label_set: &Labels, labels: &[Label]) -> Option<MatchDetails> {
    if !route.matches(label_set) {
        return None;
    }
    Some(route.matchers.iter().map(|m| detail(m, labels)).collect())
}

fn detail(matcher: &LabelMatcher, labels: &[Label]) -> MatcherDetail {
    MatcherDetail {
        matcher: matcher.object().clone(),
        labels: labels
            .iter()
            .filter(|label| matcher.matches_label(label))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;
    use crate::routing::matcher::MatchOperator;
    use crate::routing::normalize::normalize_route;
    use crate::routing::normalize::tests::deep_chain;

    fn route(id: &str, matchers: &[&str], continue_matching: bool, routes: Vec<RouteConfig>) -> RouteConfig {
        RouteConfig::default()
            .with_id(id)
            .with_matchers(matchers.iter().copied())
            .with_continue(continue_matching)
            .with_routes(routes)
    }

    fn labels(pairs: &[(&str, &str)]) -> Vec<Label> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn matched_ids(root: &Route, pairs: &[(&str, &str)]) -> Vec<String> {
        PolicyTreeFinder::new()
            .find_matching_routes(root, &labels(pairs))
            .unwrap()
            .into_iter()
            .map(|m| m.route.id.clone())
            .collect()
    }

    #[test]
    fn test_root_catches_unmatched() {
        let tree = normalize_route(&route(
            "root",
            &[],
            false,
            vec![route("a", &["severity=critical"], false, vec![])],
        ))
        .unwrap();

        assert_eq!(matched_ids(&tree, &[("severity", "info")]), vec!["root"]);
        assert_eq!(matched_ids(&tree, &[("severity", "critical")]), vec!["a"]);
    }

    #[test]
    fn test_first_match_stops_siblings() {
        let tree = normalize_route(&route(
            "root",
            &[],
            false,
            vec![
                route("a", &["team=ops"], false, vec![]),
                route("b", &["team=~ops|sre"], false, vec![]),
            ],
        ))
        .unwrap();

        assert_eq!(matched_ids(&tree, &[("team", "ops")]), vec!["a"]);
        assert_eq!(matched_ids(&tree, &[("team", "sre")]), vec!["b"]);
    }

    #[test]
    fn test_continue_allows_later_siblings() {
        let tree = normalize_route(&route(
            "root",
            &[],
            false,
            vec![
                route("a", &["team=ops"], true, vec![]),
                route("b", &["team=~ops|sre"], false, vec![]),
                route("c", &["team=~.+"], false, vec![]),
            ],
        ))
        .unwrap();

        assert_eq!(matched_ids(&tree, &[("team", "ops")]), vec!["a", "b"]);
    }

    #[test]
    fn test_deepest_match_in_pre_order() {
        let tree = normalize_route(&route(
            "root",
            &[],
            false,
            vec![route(
                "team",
                &["team=ops"],
                false,
                vec![
                    route("crit", &["severity=critical"], true, vec![]),
                    route("prod", &["env=prod"], false, vec![]),
                ],
            )],
        ))
        .unwrap();

        let both = [("team", "ops"), ("severity", "critical"), ("env", "prod")];
        assert_eq!(matched_ids(&tree, &both), vec!["crit", "prod"]);

        // Parent matches but no child does: the parent is the result
        assert_eq!(matched_ids(&tree, &[("team", "ops")]), vec!["team"]);
    }

    #[test]
    fn test_non_matching_root_yields_nothing() {
        let tree = normalize_route(&route("root", &["env=prod"], false, vec![])).unwrap();
        assert!(matched_ids(&tree, &[("env", "dev")]).is_empty());
    }

    #[test]
    fn test_details_list_satisfying_labels() {
        let tree = normalize_route(&route(
            "root",
            &[],
            false,
            vec![route("a", &["severity=critical", "team!=db"], false, vec![])],
        ))
        .unwrap();

        let input = labels(&[("severity", "critical"), ("team", "ops")]);
        let found = PolicyTreeFinder::new().find_matching_routes(&tree, &input).unwrap();
        assert_eq!(found.len(), 1);

        let details = &found[0].details;
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].matcher, ObjectMatcher::new("severity", MatchOperator::Equal, "critical"));
        assert_eq!(details[0].labels, labels(&[("severity", "critical")]));
        assert_eq!(details[1].labels, labels(&[("team", "ops")]));
    }

    #[test]
    fn test_deep_chain_reaches_bottom() {
        let tree = normalize_route(&deep_chain(100_000, "team=ops")).unwrap();

        assert_eq!(matched_ids(&tree, &[("team", "ops")]), vec!["n-100000"]);
        // First level fails, so the root keeps the instance
        assert_eq!(matched_ids(&tree, &[("team", "web")]), vec!["root"]);

        let found = PolicyTreeFinder::new()
            .find_matching_routes(&tree, &labels(&[("team", "ops")]))
            .unwrap();
        assert_eq!(found[0].details[0].labels, labels(&[("team", "ops")]));
    }
}
