//! Notification policy routing subsystem.
//!
//! # Data Flow
//! ```text
//! Policy compilation (at load/reload):
//!     RouteConfig tree (config file)
//!     → normalize.rs (merge matchers, compile regexes, assign ids)
//!     → Route tree (immutable, shared via Arc)
//!
//! Preview request:
//!     alert instances / alert groups
//!     → router.rs (RouteGroupsMatcher)
//!     → finder.rs (which routes does each label set reach?)
//!     → instances.rs / indexer.rs (accumulate per route id)
//!     → ResultsMap / GroupsMap
//! ```
//!
//! # Design Decisions
//! - Trees compiled once, immutable afterwards
//! - Route finding is an injected strategy (`RouteFinder`)
//! - Deterministic: same tree and labels always give the same result
//! - Every traversal uses an explicit stack

pub mod error;
pub mod finder;
pub mod indexer;
pub mod instances;
pub mod matcher;
pub mod normalize;
pub mod router;
pub mod tree;

pub use error::{RoutingError, RoutingResult};
pub use finder::{MatchDetails, MatcherDetail, PolicyTreeFinder, RouteFinder, RouteMatch};
pub use indexer::{assign_groups, route_groups_map, AlertGroup, GroupsMap};
pub use instances::{match_instances, ResultsMap, RouteInstanceMatch};
pub use matcher::{parse_matcher, LabelMatcher, MatchOperator, Matcher, ObjectMatcher};
pub use normalize::normalize_route;
pub use router::RouteGroupsMatcher;
pub use tree::{Label, Labels, Route};
