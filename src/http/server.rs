//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with preview and admin handlers
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Hold the live policy and swap it on config reload
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use arc_swap::ArcSwap;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::RouterConfig;
use crate::http::handlers::{get_routes, health, post_groups, post_match};
use crate::http::request::UuidRequestId;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::routing::{normalize_route, Route, RouteGroupsMatcher, RoutingResult};

/// A compiled policy together with the config it came from.
#[derive(Debug)]
pub struct PolicyState {
    pub config: RouterConfig,
    pub root: Route,
    pub matcher: RouteGroupsMatcher,
    /// Bumped on every successful reload.
    pub generation: u64,
    pub loaded_at: SystemTime,
}

impl PolicyState {
    /// Compile the policy tree of `config`.
    pub fn from_config(config: RouterConfig, generation: u64) -> RoutingResult<Self> {
        let root = normalize_route(&config.policy)?;
        Ok(Self {
            config,
            root,
            matcher: RouteGroupsMatcher::new(),
            generation,
            loaded_at: SystemTime::now(),
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<PolicyState>>,
}

impl AppState {
    pub fn new(policy: PolicyState) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(policy)),
        }
    }

    /// Snapshot of the live policy.
    pub fn policy(&self) -> Arc<PolicyState> {
        self.inner.load_full()
    }

    /// Compile `config` and make it the live policy.
    ///
    /// On error the current policy is kept.
    pub fn apply_config(&self, config: RouterConfig) -> RoutingResult<u64> {
        let generation = self.inner.load().generation + 1;
        let next = PolicyState::from_config(config, generation)?;
        let routes = next.root.route_count();
        self.inner.store(Arc::new(next));

        metrics::record_policy_reload(true);
        metrics::record_policy_routes(routes);
        tracing::info!(generation, routes, "Policy reloaded");
        Ok(generation)
    }
}

/// HTTP server for the policy preview API.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig) -> RoutingResult<Self> {
        let policy = PolicyState::from_config(config.clone(), 1)?;
        metrics::record_policy_routes(policy.root.route_count());

        let state = AppState::new(policy);
        let router = Self::build_router(&config, state.clone());
        Ok(Self { router, config, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        // Admin routes are always mounted; the live config decides access
        let router = Router::new()
            .route("/health", get(health))
            .route("/api/v1/routes", get(get_routes))
            .route("/api/v1/routes/groups", post(post_groups))
            .route("/api/v1/routes/match", post(post_match))
            .with_state(state.clone())
            .merge(setup_admin_router(state));

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Shared state, e.g. to apply a config outside the reload channel.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Configs received on `config_updates` replace the live policy;
    /// listener and timeout changes need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => {
                        let Some(config) = update else { break };
                        if let Err(e) = state.apply_config(config) {
                            metrics::record_policy_reload(false);
                            tracing::error!(error = %e, "Rejected policy update. Keeping current policy.");
                        }
                    }
                    _ = reload_shutdown.recv() => break,
                }
            }
            tracing::debug!("Policy reload loop stopped");
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
