//! Policy normalization.
//!
//! Turns a raw [`RouteConfig`] tree into a [`Route`] tree ready for matching:
//! merges every matcher form into one compiled list, assigns missing ids
//! (`<parent id>.<position>`, root `0`), rejects duplicate ids and applies
//! receiver/group_by inheritance.
//!
//! Both passes use explicit stacks; no recursion on tree depth.

use std::collections::HashSet;

use crate::config::schema::RouteConfig;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::matcher::{parse_matcher, LabelMatcher, MatchOperator, MatcherSet, ObjectMatcher};
use crate::routing::tree::Route;

/// Id given to a root route without an explicit id.
pub const ROOT_ROUTE_ID: &str = "0";

/// Node with everything resolved except its children.
struct PendingRoute {
    parent: usize,
    id: String,
    receiver: Option<String>,
    group_by: Vec<String>,
    continue_matching: bool,
    matchers: MatcherSet,
}

impl PendingRoute {
    fn into_route(self, routes: Vec<Route>) -> Route {
        Route {
            id: self.id,
            receiver: self.receiver,
            group_by: self.group_by,
            continue_matching: self.continue_matching,
            matchers: self.matchers,
            routes,
        }
    }
}

struct Visit<'a> {
    config: &'a RouteConfig,
    parent: usize,
    path: String,
    receiver: Option<String>,
    group_by: Vec<String>,
}

/// Normalize a raw policy tree.
pub fn normalize_route(root: &RouteConfig) -> RoutingResult<Route> {
    let mut seen = HashSet::new();

    let root_pending = resolve(
        Visit {
            config: root,
            parent: 0,
            path: ROOT_ROUTE_ID.to_string(),
            receiver: None,
            group_by: Vec::new(),
        },
        &mut seen,
    )?;

    // Index 0 is the root; descendants are stored pre-order from index 1.
    let mut descendants: Vec<PendingRoute> = Vec::new();
    let mut stack: Vec<Visit<'_>> = child_visits(root, 0, &root_pending);

    while let Some(visit) = stack.pop() {
        let config = visit.config;
        let pending = resolve(visit, &mut seen)?;
        let index = descendants.len() + 1;
        stack.extend(child_visits(config, index, &pending));
        descendants.push(pending);
    }

    // Pre-order puts every child after its parent, so assembling in reverse
    // completes each subtree before its parent is built.
    let mut children: Vec<Vec<Route>> = vec![Vec::new(); descendants.len() + 1];
    for (offset, pending) in descendants.into_iter().enumerate().rev() {
        let routes = take_children(&mut children, offset + 1);
        let parent = pending.parent;
        children[parent].push(pending.into_route(routes));
    }

    Ok(root_pending.into_route(take_children(&mut children, 0)))
}

fn take_children(children: &mut [Vec<Route>], index: usize) -> Vec<Route> {
    let mut routes = std::mem::take(&mut children[index]);
    routes.reverse();
    routes
}

/// Child visits, pushed in reverse so the first child pops first.
fn child_visits<'a>(config: &'a RouteConfig, index: usize, parent: &PendingRoute) -> Vec<Visit<'a>> {
    config
        .routes
        .iter()
        .enumerate()
        .rev()
        .map(|(position, child)| Visit {
            config: child,
            parent: index,
            path: format!("{}.{}", parent.id, position),
            receiver: parent.receiver.clone(),
            group_by: parent.group_by.clone(),
        })
        .collect()
}

fn resolve(visit: Visit<'_>, seen: &mut HashSet<String>) -> RoutingResult<PendingRoute> {
    let config = visit.config;
    let id = config.id.clone().unwrap_or(visit.path);
    if !seen.insert(id.clone()) {
        return Err(RoutingError::DuplicateRouteId(id));
    }

    let group_by = if config.group_by.is_empty() {
        visit.group_by
    } else {
        config.group_by.clone()
    };

    Ok(PendingRoute {
        parent: visit.parent,
        id,
        receiver: config.receiver.clone().or(visit.receiver),
        group_by,
        continue_matching: config.continue_matching,
        matchers: collect_matchers(config)?,
    })
}

/// Merge all matcher forms: structured, legacy strings, `match`, `match_re`.
fn collect_matchers(config: &RouteConfig) -> RoutingResult<MatcherSet> {
    let mut objects: Vec<ObjectMatcher> = config.object_matchers.clone();

    for raw in &config.matchers {
        objects.push(parse_matcher(raw)?);
    }
    for (name, value) in &config.match_equal {
        objects.push(ObjectMatcher::new(name.as_str(), MatchOperator::Equal, value.as_str()));
    }
    for (name, value) in &config.match_re {
        objects.push(ObjectMatcher::new(name.as_str(), MatchOperator::Regex, value.as_str()));
    }

    let compiled = objects
        .into_iter()
        .map(LabelMatcher::compile)
        .collect::<RoutingResult<Vec<_>>>()?;
    Ok(MatcherSet::new(compiled))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn child(id: Option<&str>) -> RouteConfig {
        let mut config = RouteConfig::default();
        config.id = id.map(str::to_string);
        config
    }

    /// Single-branch policy `depth` levels below the root. Every node
    /// carries `matcher`; ids are `root`, `n-1` .. `n-<depth>`.
    pub(crate) fn deep_chain(depth: usize, matcher: &str) -> RouteConfig {
        let mut node = RouteConfig::default()
            .with_id(format!("n-{depth}"))
            .with_matchers([matcher]);
        for level in (1..depth).rev() {
            node = RouteConfig::default()
                .with_id(format!("n-{level}"))
                .with_matchers([matcher])
                .with_routes(vec![node]);
        }
        RouteConfig::catch_all("default")
            .with_id("root")
            .with_routes(vec![node])
    }

    #[test]
    fn test_generated_ids_follow_position() {
        let mut a = child(None);
        a.routes = vec![child(None), child(Some("named"))];
        let mut root = RouteConfig::catch_all("default");
        root.routes = vec![a, child(None)];

        let route = normalize_route(&root).unwrap();
        let ids: Vec<_> = route.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "0.0", "0.0.0", "named", "0.1"]);
    }

    #[test]
    fn test_generated_ids_extend_explicit_parent() {
        let mut a = child(Some("team"));
        a.routes = vec![child(None)];
        let mut root = child(Some("root"));
        root.routes = vec![a];

        let route = normalize_route(&root).unwrap();
        let ids: Vec<_> = route.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "team", "team.0"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut root = child(Some("root"));
        root.routes = vec![child(Some("x")), child(Some("x"))];

        let err = normalize_route(&root).unwrap_err();
        assert!(matches!(err, RoutingError::DuplicateRouteId(id) if id == "x"));
    }

    #[test]
    fn test_matcher_forms_are_merged_in_order() {
        let mut config = child(None);
        config.object_matchers = vec![ObjectMatcher::new("a", MatchOperator::Equal, "1")];
        config.matchers = vec!["b!=2".to_string()];
        config.match_equal.insert("c".to_string(), "3".to_string());
        config.match_re.insert("d".to_string(), "4.*".to_string());

        let route = normalize_route(&config).unwrap();
        let rendered: Vec<_> = route.matchers.iter().map(|m| m.object().clone()).collect();
        assert_eq!(
            rendered,
            vec![
                ObjectMatcher::new("a", MatchOperator::Equal, "1"),
                ObjectMatcher::new("b", MatchOperator::NotEqual, "2"),
                ObjectMatcher::new("c", MatchOperator::Equal, "3"),
                ObjectMatcher::new("d", MatchOperator::Regex, "4.*"),
            ]
        );
    }

    #[test]
    fn test_invalid_matchers_propagate() {
        let mut config = child(None);
        config.matchers = vec!["nonsense".to_string()];
        assert!(matches!(
            normalize_route(&config),
            Err(RoutingError::InvalidMatcher { .. })
        ));

        let mut config = child(None);
        config.match_re.insert("team".to_string(), "[".to_string());
        assert!(matches!(
            normalize_route(&config),
            Err(RoutingError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_receiver_and_group_by_inheritance() {
        let mut grandchild = child(Some("gc"));
        grandchild.group_by = vec!["cluster".to_string()];
        let mut mid = child(Some("mid"));
        mid.receiver = Some("team".to_string());
        mid.routes = vec![grandchild];
        let mut root = RouteConfig::catch_all("default");
        root.group_by = vec!["alertname".to_string()];
        root.routes = vec![mid, child(Some("plain"))];

        let route = normalize_route(&root).unwrap();
        let mid = route.find("mid").unwrap();
        assert_eq!(mid.receiver.as_deref(), Some("team"));
        assert_eq!(mid.group_by, vec!["alertname"]);

        let gc = route.find("gc").unwrap();
        assert_eq!(gc.receiver.as_deref(), Some("team"));
        assert_eq!(gc.group_by, vec!["cluster"]);

        let plain = route.find("plain").unwrap();
        assert_eq!(plain.receiver.as_deref(), Some("default"));
    }

    #[test]
    fn test_deep_policy() {
        let config = deep_chain(100_000, "team=ops");
        let route = normalize_route(&config).unwrap();

        assert_eq!(route.route_count(), 100_001);
        let bottom = route.find("n-100000").unwrap();
        assert_eq!(bottom.receiver.as_deref(), Some("default"));
        assert_eq!(bottom.matchers.len(), 1);
    }
}
