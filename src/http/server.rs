//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the routing handler
//! - Wire up middleware (request ID, tracing, panic capture)
//! - Bind server to listener
//! - Dispatch requests to the routing engine
//! - Forward matched requests to their destination unmodified, within the request timeout

use axum::{
    body::Body,
    extract::State,
    http::{uri::InvalidUriParts, Request, Version},
    response::Response,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::validation::{lint_rules, validate_config};
use crate::config::{ConfigError, RouterConfig};
use crate::destination::{Destination, DestinationPool};
use crate::http::request::{extract_target, propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{MatchResult, Router as RuleRouter};

/// Error forwarding a request to its destination.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream URI: {0}")]
    Uri(#[from] InvalidUriParts),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
}

impl ForwardError {
    /// Short diagnostic returned to the client.
    fn client_message(&self) -> &'static str {
        match self {
            ForwardError::Timeout(_) => "upstream request timed out",
            _ => "upstream request failed",
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: RuleRouter,
    pub destinations: Arc<DestinationPool>,
    pub client: Client<HttpConnector, Body>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        router: RuleRouter,
        destinations: DestinationPool,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            router,
            destinations: Arc::new(destinations),
            client,
            request_timeout,
        }
    }
}

/// HTTP server for the request router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Validates the configuration, then compiles the rule set and destination
    /// pool once; both stay immutable for the lifetime of the server.
    pub fn new(config: RouterConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        for lint in lint_rules(&config) {
            tracing::warn!(%lint, "Suspicious routing configuration");
        }

        let rules = RuleRouter::from_config(&config.rules).map_err(ConfigError::Validation)?;
        let destinations =
            DestinationPool::new(&config.destinations).map_err(|e| ConfigError::Validation(vec![e]))?;

        tracing::info!(
            rules = rules.rules().len(),
            destinations = destinations.len(),
            "Routing table built"
        );

        let state = AppState::new(
            rules,
            destinations,
            Duration::from_secs(config.timeouts.connect_secs),
            Duration::from_secs(config.timeouts.request_secs),
        );
        Ok(Self::with_state(config, state))
    }

    /// Create a server around prebuilt state.
    pub fn with_state(config: RouterConfig, state: AppState) -> Self {
        let router = with_middleware(Router::new().fallback(route_handler).with_state(state));
        Self { router, config }
    }

    /// The fully layered application, for in-process use.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Wrap a router in the request ID, trace and panic-capture layers.
fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(CatchPanicLayer::custom(response::panic_response)),
    )
}

/// Main routing handler.
/// Matches the request against the rule set and forwards it.
async fn route_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let target = match extract_target(&request) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!(uri = %request.uri(), error = %e, "Unroutable request URL");
            metrics::record_request(metrics::NO_ROUTE, metrics::NO_ROUTE, 500, start_time);
            return response::routing_error("invalid request URL");
        }
    };

    tracing::debug!(
        hostname = %target.hostname,
        pathname = %target.pathname,
        "Routing request"
    );

    let (rule_name, destination) = match state.router.dispatch(&target.as_target(), &*state.destinations) {
        MatchResult::Matched(resolved) => (resolved.rule_name().to_string(), resolved.handle.clone()),
        MatchResult::NoMatch => {
            tracing::warn!(
                hostname = %target.hostname,
                pathname = %target.pathname,
                "No route matched"
            );
            metrics::record_request(metrics::NO_ROUTE, metrics::NO_ROUTE, 404, start_time);
            return response::not_found();
        }
    };

    tracing::debug!(rule = %rule_name, destination = %destination.name(), "Forwarding");

    match forward(&state.client, &destination, request, state.request_timeout).await {
        Ok(response) => {
            metrics::record_request(&rule_name, destination.name(), response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                rule = %rule_name,
                destination = %destination.name(),
                error = %e,
                "Forwarding failed"
            );
            metrics::record_request(&rule_name, destination.name(), 500, start_time);
            response::routing_error(e.client_message())
        }
    }
}

/// Send the request to `destination` as received, pointing only its URI at the upstream.
async fn forward(
    client: &Client<HttpConnector, Body>,
    destination: &Destination,
    request: Request<Body>,
    timeout: Duration,
) -> Result<Response, ForwardError> {
    let (mut parts, body) = request.into_parts();
    parts.uri = destination.rewrite_uri(&parts.uri)?;
    // Upstream connections are HTTP/1.1.
    parts.version = Version::HTTP_11;

    let upstream: hyper::Response<hyper::body::Incoming> =
        tokio::time::timeout(timeout, client.request(Request::from_parts(parts, body)))
            .await
            .map_err(|_| ForwardError::Timeout(timeout))??;

    let (parts, body) = upstream.into_parts();
    Ok(Response::from_parts(parts, Body::new(body)))
}
