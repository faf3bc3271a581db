//! Notification policy routing: which alert instances and groups reach which
//! routes of an Alertmanager-style policy tree.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteFinder, RouteGroupsMatcher};
