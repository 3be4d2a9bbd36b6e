//! Upstream target pool management.
//!
//! # Responsibilities
//! - Build one pooled HTTP client per distinct backend target
//! - Enforce per-target concurrent connection limits (backpressure)
//! - Provide RAII guards that release capacity on drop
//!
//! # Design Decisions
//! - Pool keyed by target URL; routes sharing a target share the pool
//! - Connect timeout is a property of the target's connector
//! - CAS loop instead of a lock for the connection count

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::HeaderValue;
use axum::http::uri::{Authority, Scheme};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::UpstreamConfig;
use crate::routing::{Route, RouteError};

/// A single backend target with its pooled client and capacity bound.
pub struct Upstream {
    /// Target base URL, for logging.
    pub target: Url,
    /// URI scheme used for upstream requests.
    pub scheme: Scheme,
    /// Authority (host:port) used for upstream requests.
    pub authority: Authority,
    /// Pre-built Host header value for the target.
    pub host_header: HeaderValue,
    /// Pooled HTTP client for this target.
    pub client: Client<HttpConnector, Body>,
    /// Maximum concurrent connections allowed.
    max_connections: usize,
    /// Number of currently active connections.
    active_connections: AtomicUsize,
}

impl std::fmt::Debug for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upstream")
            .field("target", &self.target.as_str())
            .field("max_connections", &self.max_connections)
            .field("active_connections", &self.active_connections())
            .finish()
    }
}

impl Upstream {
    fn new(route: &Route, connect_timeout: Duration, config: &UpstreamConfig) -> Result<Self, RouteError> {
        let target = &route.target;
        let invalid_authority = || RouteError::InvalidAuthority {
            name: route.name.clone(),
            target: target.to_string(),
        };

        let scheme = Scheme::try_from(target.scheme()).map_err(|_| invalid_authority())?;

        let host = target.host_str().ok_or_else(invalid_authority)?;
        let authority_str = match target.port_or_known_default() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority =
            Authority::try_from(authority_str.as_str()).map_err(|_| invalid_authority())?;
        let host_header =
            HeaderValue::from_str(authority.as_str()).map_err(|_| invalid_authority())?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .build(connector);

        Ok(Self {
            target: target.clone(),
            scheme,
            authority,
            host_header,
            client,
            max_connections: config.max_connections_per_target,
            active_connections: AtomicUsize::new(0),
        })
    }

    /// Current number of in-flight requests against this target.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Try to reserve a connection slot. `None` when the target is saturated.
    pub fn try_acquire(self: &Arc<Self>) -> Option<UpstreamGuard> {
        let mut prev = self.active_connections.load(Ordering::Relaxed);
        loop {
            if prev >= self.max_connections {
                return None;
            }
            match self.active_connections.compare_exchange_weak(
                prev,
                prev + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => prev = observed,
            }
        }
        Some(UpstreamGuard {
            upstream: Arc::clone(self),
        })
    }
}

/// RAII guard for one reserved upstream connection slot.
///
/// Held for the full relay, headers through last body byte, so the per-target
/// bound covers streaming responses too.
#[derive(Debug)]
pub struct UpstreamGuard {
    upstream: Arc<Upstream>,
}

impl Deref for UpstreamGuard {
    type Target = Upstream;

    fn deref(&self) -> &Self::Target {
        &self.upstream
    }
}

impl Drop for UpstreamGuard {
    fn drop(&mut self) {
        self.upstream
            .active_connections
            .fetch_sub(1, Ordering::Relaxed);
    }
}

/// Pool of upstream targets, keyed by target URL.
#[derive(Debug, Default)]
pub struct UpstreamPool {
    targets: HashMap<String, Arc<Upstream>>,
}

impl UpstreamPool {
    /// Build the pool from the compiled routes.
    ///
    /// When several routes point at the same target, the first route's
    /// connect timeout configures the shared connector.
    pub fn from_routes(routes: &[Route], config: &UpstreamConfig) -> Result<Self, RouteError> {
        let default_connect = Duration::from_millis(config.connect_timeout_ms);
        let mut targets = HashMap::new();

        for route in routes {
            let key = route.target.to_string();
            if targets.contains_key(&key) {
                continue;
            }
            let connect_timeout = route.connect_timeout.unwrap_or(default_connect);
            let upstream = Upstream::new(route, connect_timeout, config)?;
            targets.insert(key, Arc::new(upstream));
        }

        Ok(Self { targets })
    }

    /// Look up the upstream for a route's target.
    pub fn get(&self, target: &Url) -> Option<Arc<Upstream>> {
        self.targets.get(target.as_str()).cloned()
    }

    /// Number of distinct targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True when no targets are registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
