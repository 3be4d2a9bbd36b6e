//! Request forwarding to backend targets.
//!
//! # Responsibilities
//! - Reserve a connection slot on the route's upstream
//! - Assemble the upstream request: rewritten path, preserved query,
//!   hop-by-hop stripping, Host rewrite, forwarded headers
//! - Enforce the per-route request budget
//! - Translate transport failures into the ForwardError taxonomy
//!
//! # Design Decisions
//! - `tokio::time::timeout` wraps the whole upstream call; dropping the
//!   timed-out future cancels the underlying I/O rather than leaking it
//! - Client disconnects drop the handler future, which cancels the
//!   in-flight call the same way
//! - The capacity guard is returned with the response so the relay can hold
//!   it until the last body byte

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, Uri};
use hyper::body::Incoming;
use tokio::time;

use crate::routing::{rewrite, Route};
use crate::security::headers as security_headers;
use crate::upstream::pool::{Upstream, UpstreamGuard, UpstreamPool};
use crate::upstream::ForwardError;

/// Forwards inbound requests to the upstream selected by routing.
#[derive(Clone)]
pub struct Forwarder {
    pool: Arc<UpstreamPool>,
}

impl Forwarder {
    /// Create a forwarder over a built upstream pool.
    pub fn new(pool: Arc<UpstreamPool>) -> Self {
        Self { pool }
    }

    /// Forward `request` to `route`'s target.
    ///
    /// On success, returns the upstream response together with the capacity
    /// guard; the caller must keep the guard alive while the body streams.
    pub async fn forward(
        &self,
        route: &Route,
        request: Request<Body>,
        client_addr: SocketAddr,
    ) -> Result<(Response<Incoming>, UpstreamGuard), ForwardError> {
        let upstream = self
            .pool
            .get(&route.target)
            .ok_or_else(|| ForwardError::Unregistered(route.target.to_string()))?;

        let guard = upstream.try_acquire().ok_or_else(|| ForwardError::Exhausted {
            target: route.target.to_string(),
        })?;

        let request = build_upstream_request(route, &upstream, request, client_addr)?;

        let call = upstream.client.request(request);
        let result = match route.request_timeout {
            Some(budget) => match time::timeout(budget, call).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ForwardError::Timeout {
                        target: route.target.to_string(),
                        budget_ms: budget.as_millis() as u64,
                    });
                }
            },
            None => call.await,
        };

        let response = result.map_err(|source| {
            if source.is_connect() {
                ForwardError::Connect {
                    target: route.target.to_string(),
                    source,
                }
            } else {
                ForwardError::Protocol {
                    target: route.target.to_string(),
                    source,
                }
            }
        })?;

        Ok((response, guard))
    }
}

/// Derive the upstream request from the inbound one.
fn build_upstream_request(
    route: &Route,
    upstream: &Upstream,
    request: Request<Body>,
    client_addr: SocketAddr,
) -> Result<Request<Body>, ForwardError> {
    let (mut parts, body) = request.into_parts();

    let path = rewrite::rewrite_path(parts.uri.path(), &route.prefix, &route.rewrite);
    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };

    let uri = Uri::builder()
        .scheme(upstream.scheme.clone())
        .authority(upstream.authority.clone())
        .path_and_query(path_and_query.as_str())
        .build()
        .map_err(|_| ForwardError::InvalidRequest(route.target.to_string()))?;

    let original_host = parts.headers.get(header::HOST).cloned();

    security_headers::strip_hop_by_hop(&mut parts.headers);
    if !route.preserve_host {
        parts
            .headers
            .insert(header::HOST, upstream.host_header.clone());
    }
    security_headers::set_forwarded_headers(&mut parts.headers, client_addr.ip(), original_host);

    parts.uri = uri;
    Ok(Request::from_parts(parts, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RouteConfig, UpstreamConfig};
    use crate::routing::RouteTable;

    fn route_and_upstream() -> (Route, Arc<Upstream>) {
        let table = RouteTable::from_config(&[RouteConfig {
            name: "users".to_string(),
            prefix: "/userservices".to_string(),
            target: "http://127.0.0.1:4001".to_string(),
            target_env: None,
            rewrite: String::new(),
            request_timeout_ms: Some(30_000),
            connect_timeout_ms: None,
            preserve_host: false,
        }])
        .unwrap();
        let route = table.routes()[0].clone();
        let pool = UpstreamPool::from_routes(table.routes(), &UpstreamConfig::default()).unwrap();
        let upstream = pool.get(&route.target).unwrap();
        (route, upstream)
    }

    #[tokio::test]
    async fn upstream_request_rewrites_uri_and_host() {
        let (route, upstream) = route_and_upstream();
        let request = Request::builder()
            .uri("http://gateway.local/userservices/profile?id=7")
            .header("host", "gateway.local")
            .header("x-tag", "abc")
            .body(Body::empty())
            .unwrap();

        let upstream_request =
            build_upstream_request(&route, &upstream, request, "10.9.8.7:55000".parse().unwrap())
                .unwrap();

        assert_eq!(
            upstream_request.uri().to_string(),
            "http://127.0.0.1:4001/profile?id=7"
        );
        assert_eq!(
            upstream_request.headers().get("host").unwrap(),
            "127.0.0.1:4001"
        );
        assert_eq!(upstream_request.headers().get("x-tag").unwrap(), "abc");
        assert_eq!(
            upstream_request.headers().get("x-forwarded-for").unwrap(),
            "10.9.8.7"
        );
        assert_eq!(
            upstream_request.headers().get("x-forwarded-host").unwrap(),
            "gateway.local"
        );
    }

    #[tokio::test]
    async fn upstream_request_drops_hop_by_hop_headers() {
        let (route, upstream) = route_and_upstream();
        let request = Request::builder()
            .uri("/userservices")
            .header("proxy-authorization", "secret")
            .header("te", "trailers")
            .body(Body::empty())
            .unwrap();

        let upstream_request =
            build_upstream_request(&route, &upstream, request, "10.9.8.7:55000".parse().unwrap())
                .unwrap();

        assert_eq!(upstream_request.uri().path(), "/");
        assert!(upstream_request.headers().get("proxy-authorization").is_none());
        assert!(upstream_request.headers().get("te").is_none());
    }

    #[tokio::test]
    async fn preserve_host_keeps_client_host() {
        let (mut route, upstream) = route_and_upstream();
        route.preserve_host = true;
        let request = Request::builder()
            .uri("/userservices/x")
            .header("host", "gateway.local")
            .body(Body::empty())
            .unwrap();

        let upstream_request =
            build_upstream_request(&route, &upstream, request, "10.9.8.7:55000".parse().unwrap())
                .unwrap();

        assert_eq!(
            upstream_request.headers().get("host").unwrap(),
            "gateway.local"
        );
    }
}
