//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::matcher::ObjectMatcher;

/// Root configuration for the alert router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Root of the notification policy tree.
    pub policy: RouteConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
            policy: RouteConfig::catch_all("default"),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Raw notification policy node, as written in the config file.
///
/// Matchers may be spread across `object_matchers`, legacy `matchers`
/// strings and the deprecated `match` / `match_re` maps; normalization
/// merges them into one list.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RouteConfig {
    /// Route identifier. Generated from the tree position when absent.
    #[serde(default)]
    pub id: Option<String>,

    /// Receiver that gets notifications for this route.
    #[serde(default)]
    pub receiver: Option<String>,

    /// Labels used to group alerts.
    #[serde(default)]
    pub group_by: Vec<String>,

    /// Keep matching sibling routes after this one matched.
    #[serde(default, rename = "continue")]
    pub continue_matching: bool,

    /// Structured matchers, e.g. `["severity", "=", "critical"]`.
    #[serde(default)]
    pub object_matchers: Vec<ObjectMatcher>,

    /// Legacy matcher strings, e.g. `team=~"ops|sre"`.
    #[serde(default)]
    pub matchers: Vec<String>,

    /// Equality matchers (deprecated form).
    #[serde(default, rename = "match")]
    pub match_equal: BTreeMap<String, String>,

    /// Regex matchers (deprecated form).
    #[serde(default)]
    pub match_re: BTreeMap<String, String>,

    /// Child routes, evaluated in order.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl RouteConfig {
    /// Catch-all root that sends everything to `receiver`.
    pub fn catch_all(receiver: impl Into<String>) -> Self {
        Self::default().with_receiver(receiver)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Append legacy matcher strings.
    pub fn with_matchers<I, S>(mut self, matchers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matchers.extend(matchers.into_iter().map(Into::into));
        self
    }

    pub fn with_continue(mut self, continue_matching: bool) -> Self {
        self.continue_matching = continue_matching;
        self
    }

    pub fn with_routes(mut self, routes: Vec<RouteConfig>) -> Self {
        self.routes = routes;
        self
    }
}

impl Drop for RouteConfig {
    // Flatten the subtree so freeing a deep policy does not recurse.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.routes);
        while let Some(mut route) = pending.pop() {
            pending.append(&mut route.routes);
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin endpoints.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::MatchOperator;

    #[test]
    fn test_parse_policy_tree() {
        let raw = r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [policy]
            receiver = "default"
            group_by = ["alertname"]

            [[policy.routes]]
            id = "critical"
            receiver = "pager"
            continue = true
            object_matchers = [["severity", "=", "critical"]]

            [[policy.routes]]
            matchers = ['team=~"ops|sre"']

            [policy.routes.match]
            env = "prod"
        "#;

        let config: RouterConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_body_bytes, 1024 * 1024);
        assert_eq!(config.policy.receiver.as_deref(), Some("default"));
        assert_eq!(config.policy.routes.len(), 2);

        let critical = &config.policy.routes[0];
        assert_eq!(critical.id.as_deref(), Some("critical"));
        assert!(critical.continue_matching);
        assert_eq!(critical.object_matchers[0].operator, MatchOperator::Equal);

        let team = &config.policy.routes[1];
        assert_eq!(team.matchers, vec![r#"team=~"ops|sre""#.to_string()]);
        assert_eq!(team.match_equal.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn test_drop_deep_policy() {
        let mut node = RouteConfig::default().with_id("leaf");
        for depth in 0..200_000 {
            node = RouteConfig::default()
                .with_id(format!("n-{depth}"))
                .with_routes(vec![node]);
        }
        drop(node);
    }

    #[test]
    fn test_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(!config.admin.enabled);
        assert!(config.policy.routes.is_empty());
        assert_eq!(config.policy.receiver.as_deref(), Some("default"));
    }
}
