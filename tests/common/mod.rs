//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use alert_router::config::{RouteConfig, RouterConfig};
use alert_router::routing::Labels;
use alert_router::{HttpServer, Shutdown};

/// A server running on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<RouterConfig>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server for `config` on 127.0.0.1 with a random port.
#[allow(dead_code)]
pub async fn start_server(mut config: RouterConfig) -> TestServer {
    config.observability.metrics_enabled = false;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).expect("valid policy");
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    // Wait until the server answers
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client.get(format!("http://{}/health", addr)).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestServer { addr, shutdown, updates }
}

/// Root `root` (receiver "default") with children:
/// - `critical`: severity=critical → pager, continue
/// - `ops`: team=~ops|sre → ops-team, with child `ops-db`: service=db
#[allow(dead_code)]
pub fn sample_policy() -> RouteConfig {
    let mut ops = RouteConfig::default()
        .with_id("ops")
        .with_receiver("ops-team")
        .with_routes(vec![RouteConfig::default().with_id("ops-db").with_matchers(["service=db"])]);
    ops.match_re.insert("team".to_string(), "ops|sre".to_string());

    let mut root = RouteConfig::catch_all("default").with_id("root").with_routes(vec![
        RouteConfig::default()
            .with_id("critical")
            .with_receiver("pager")
            .with_continue(true)
            .with_matchers([r#"severity="critical""#]),
        ops,
    ]);
    root.group_by = vec!["alertname".into()];
    root
}

#[allow(dead_code)]
pub fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
