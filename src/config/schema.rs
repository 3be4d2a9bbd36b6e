//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every section has a `Default` so a minimal (or empty) config is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to backend targets.
    pub routes: Vec<RouteConfig>,

    /// Upstream HTTP client settings shared by all routes.
    pub upstream: UpstreamConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routes: default_routes(),
            upstream: UpstreamConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to a backend target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match (must start with "/").
    pub prefix: String,

    /// Backend base URL (scheme + host + port).
    pub target: String,

    /// Environment variable that overrides `target` at load time.
    #[serde(default)]
    pub target_env: Option<String>,

    /// Replacement for the matched prefix ("" strips it).
    #[serde(default)]
    pub rewrite: String,

    /// Request budget in milliseconds; absent means no timeout.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Connect budget in milliseconds; absent uses the global default.
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,

    /// Forward the client's Host header instead of the target's.
    #[serde(default)]
    pub preserve_host: bool,
}

/// The observed gateway configuration: user service and order service.
fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            name: "users".to_string(),
            prefix: "/userservices".to_string(),
            target: "http://localhost:4001".to_string(),
            target_env: Some("USER_SERVICE_URL".to_string()),
            rewrite: String::new(),
            request_timeout_ms: Some(30_000),
            connect_timeout_ms: None,
            preserve_host: false,
        },
        RouteConfig {
            name: "orders".to_string(),
            prefix: "/order".to_string(),
            target: "http://localhost:4002".to_string(),
            target_env: Some("ORDER_SERVICE_URL".to_string()),
            rewrite: String::new(),
            request_timeout_ms: None,
            connect_timeout_ms: None,
            preserve_host: false,
        },
    ]
}

/// Upstream HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Default connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_timeout_secs: u64,

    /// Maximum concurrent connections per backend target (backpressure).
    pub max_connections_per_target: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            idle_timeout_secs: 60,
            max_connections_per_target: 100,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add security headers to every response.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
