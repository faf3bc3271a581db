//! Instance matching.
//!
//! Runs every alert instance through a [`RouteFinder`] and groups the
//! results by route id. Within one route, results keep input order.

use std::collections::HashMap;

use serde::Serialize;

use crate::routing::error::RoutingResult;
use crate::routing::finder::{MatchDetails, RouteFinder};
use crate::routing::tree::{Label, Labels, Route};

/// One instance that landed on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInstanceMatch {
    pub route_id: String,
    pub receiver: Option<String>,
    pub labels: Labels,
    pub match_details: MatchDetails,
}

/// Route id -> instances that matched it.
pub type ResultsMap = HashMap<String, Vec<RouteInstanceMatch>>;

/// Match instances against a normalized tree.
///
/// Finder errors are returned as-is; a partial map is never produced.
pub fn match_instances<F>(root: &Route, finder: &F, instances: &[Labels]) -> RoutingResult<ResultsMap>
where
    F: RouteFinder + ?Sized,
{
    let mut results = ResultsMap::new();

    for instance in instances {
        let labels: Vec<Label> = instance
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for matched in finder.find_matching_routes(root, &labels)? {
            results
                .entry(matched.route.id.clone())
                .or_default()
                .push(RouteInstanceMatch {
                    route_id: matched.route.id.clone(),
                    receiver: matched.route.receiver.clone(),
                    labels: instance.clone(),
                    match_details: matched.details,
                });
        }
    }

    tracing::debug!(
        instances = instances.len(),
        matched_routes = results.len(),
        "Matched instances to routes"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::error::RoutingError;
    use crate::routing::finder::{MatcherDetail, RouteMatch};
    use crate::routing::matcher::{MatchOperator, ObjectMatcher};
    use crate::routing::tree::tests::leaf;

    /// Finder that claims every node whose id is a label name on the instance.
    struct LabelNamedRoutes;

    impl RouteFinder for LabelNamedRoutes {
        fn find_matching_routes<'r>(
            &self,
            root: &'r Route,
            labels: &[Label],
        ) -> RoutingResult<Vec<RouteMatch<'r>>> {
            Ok(root
                .iter()
                .filter(|r| labels.iter().any(|(k, _)| *k == r.id))
                .map(|route| RouteMatch {
                    route,
                    details: vec![MatcherDetail {
                        matcher: ObjectMatcher::new(route.id.as_str(), MatchOperator::Regex, ".*"),
                        labels: labels.iter().filter(|(k, _)| *k == route.id).cloned().collect(),
                    }],
                })
                .collect())
        }
    }

    struct Failing;

    impl RouteFinder for Failing {
        fn find_matching_routes<'r>(&self, _: &'r Route, _: &[Label]) -> RoutingResult<Vec<RouteMatch<'r>>> {
            Err(RoutingError::DuplicateRouteId("boom".into()))
        }
    }

    fn instance(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn tree() -> Route {
        let mut root = leaf("r");
        root.routes = vec![leaf("a"), leaf("b")];
        root
    }

    #[test]
    fn test_empty_instances() {
        let results = match_instances(&tree(), &LabelNamedRoutes, &[]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_multi_match_creates_each_key() {
        let results = match_instances(&tree(), &LabelNamedRoutes, &[instance(&[("r", "1"), ("a", "2")])]).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results["r"].len(), 1);
        assert_eq!(results["a"].len(), 1);
        assert_eq!(results["a"][0].match_details[0].labels, vec![("a".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_input_order_preserved() {
        let instances: Vec<_> = (0..5).map(|i| instance(&[("b", i.to_string().as_str())])).collect();
        let results = match_instances(&tree(), &LabelNamedRoutes, &instances).unwrap();

        let seen: Vec<_> = results["b"].iter().map(|m| m.labels["b"].clone()).collect();
        assert_eq!(seen, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_finder_error_propagates() {
        let err = match_instances(&tree(), &Failing, &[instance(&[])]).unwrap_err();
        assert!(matches!(err, RoutingError::DuplicateRouteId(_)));
    }
}
