//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: health endpoint plus catch-all proxy handler
//! - Wire up middleware (request ID, tracing, security headers)
//! - Dispatch each request through match → rewrite → forward → relay
//! - Own the serve loop: graceful shutdown and the server state machine

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::request::{self, RequestIdLayer};
use crate::http::response;
use crate::lifecycle::state::{ServerState, StateHandle};
use crate::observability::metrics;
use crate::routing::{RouteError, RouteTable};
use crate::security::headers as security_headers;
use crate::upstream::{ForwardError, Forwarder, UpstreamPool};

/// Body of the never-proxied health response.
const STATUS_MESSAGE: &str = "API Gateway is running smoothly!";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub forwarder: Forwarder,
}

/// HTTP server for the API gateway.
pub struct HttpServer {
    router: Router,
    state: Arc<StateHandle>,
}

impl HttpServer {
    /// Compile routes, build upstream pools, and assemble the router.
    ///
    /// Fails when the route configuration is invalid; startup errors are
    /// fatal by design.
    pub fn new(config: GatewayConfig) -> Result<Self, RouteError> {
        let table = Arc::new(RouteTable::from_config(&config.routes)?);
        let pool = Arc::new(UpstreamPool::from_routes(table.routes(), &config.upstream)?);

        tracing::info!(
            routes = table.len(),
            targets = pool.len(),
            "Route table compiled"
        );

        let state = AppState {
            table,
            forwarder: Forwarder::new(pool),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            state: Arc::new(StateHandle::new()),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", any(health_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(RequestIdLayer);

        if config.security.enable_headers {
            security_headers::with_security_headers(router)
        } else {
            router
        }
    }

    /// Watch the server lifecycle state.
    pub fn state_watch(&self) -> tokio::sync::watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        self.state.set(ServerState::Starting);

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        tracing::info!(address = %addr, "Gateway server listening");
        self.state.set(ServerState::Listening);

        let drain_state = Arc::clone(&self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining in-flight requests");
                drain_state.set(ServerState::Draining);
            })
            .await?;

        self.state.set(ServerState::Stopped);
        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

/// Health check: always 200, never proxied, works with every backend down.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": STATUS_MESSAGE }))
}

/// Main proxy handler: match the route, forward, relay.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request::request_id(&request).to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let route = match state.table.matched(&path) {
        Some(route) => route,
        None => {
            // Expected traffic shape, not an error.
            tracing::debug!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request(&method, 404, "none", start);
            return (StatusCode::NOT_FOUND, "No matching route").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route.name,
        target = %route.target,
        "Proxying request"
    );

    match state.forwarder.forward(route, request, client_addr).await {
        Ok((upstream_response, guard)) => {
            let status = upstream_response.status();
            metrics::record_request(&method, status.as_u16(), route.target.as_str(), start);
            response::relay(upstream_response, guard)
        }
        Err(error) => {
            let status = response::status_for(&error);
            log_forward_error(&error, &request_id, start);
            metrics::record_request(&method, status.as_u16(), route.target.as_str(), start);
            response::error_response(&error)
        }
    }
}

fn log_forward_error(error: &ForwardError, request_id: &str, start: Instant) {
    match error {
        ForwardError::Timeout { target, budget_ms } => {
            tracing::warn!(
                request_id = %request_id,
                target = %target,
                budget_ms = budget_ms,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Upstream exceeded its request budget"
            );
        }
        ForwardError::Exhausted { target } => {
            tracing::warn!(
                request_id = %request_id,
                target = %target,
                "Upstream connection limit reached"
            );
        }
        _ => {
            tracing::error!(
                request_id = %request_id,
                error = %error,
                "Upstream request failed"
            );
        }
    }
}
