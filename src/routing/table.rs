//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Validate route configuration (prefixes, targets)
//! - Store compiled routes, immutable after construction
//! - Look up the matching route for a request path
//!
//! # Design Decisions
//! - Path matching is case-sensitive and never consults the query string
//! - Longest prefix wins; ties resolved by registration order
//! - Explicit no-match (`None`) rather than a silent default route
//! - No regex in the hot path, prefix matching only

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::RouteConfig;

/// Errors detected while compiling the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Route prefix is empty or does not start with "/".
    #[error("route '{name}' has invalid prefix '{prefix}': must start with '/'")]
    InvalidPrefix { name: String, prefix: String },

    /// Two routes share the same prefix.
    #[error("duplicate route prefix '{prefix}'")]
    DuplicatePrefix { prefix: String },

    /// Target is not a parsable absolute URL.
    #[error("route '{name}' has invalid target '{target}': {source}")]
    InvalidTarget {
        name: String,
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// Target scheme is not http or https.
    #[error("route '{name}' has unsupported target scheme '{scheme}'")]
    UnsupportedScheme { name: String, scheme: String },

    /// Target URL has no host.
    #[error("route '{name}' target '{target}' has no host")]
    MissingHost { name: String, target: String },

    /// Target URL cannot be expressed as an HTTP authority.
    #[error("route '{name}' target '{target}' cannot be used as an HTTP authority")]
    InvalidAuthority { name: String, target: String },
}

/// A compiled route: validated prefix, target, and per-route budgets.
#[derive(Debug, Clone)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub name: String,
    /// Path prefix this route matches.
    pub prefix: String,
    /// Backend base URL.
    pub target: Url,
    /// Replacement for the matched prefix.
    pub rewrite: String,
    /// Overall request budget; `None` means no timeout.
    pub request_timeout: Option<Duration>,
    /// Connect budget; `None` uses the global default.
    pub connect_timeout: Option<Duration>,
    /// Forward the client's Host header instead of the target's.
    pub preserve_host: bool,
}

impl Route {
    fn from_config(config: &RouteConfig) -> Result<Self, RouteError> {
        if config.prefix.is_empty() || !config.prefix.starts_with('/') {
            return Err(RouteError::InvalidPrefix {
                name: config.name.clone(),
                prefix: config.prefix.clone(),
            });
        }

        let target = Url::parse(&config.target).map_err(|source| RouteError::InvalidTarget {
            name: config.name.clone(),
            target: config.target.clone(),
            source,
        })?;

        if !matches!(target.scheme(), "http" | "https") {
            return Err(RouteError::UnsupportedScheme {
                name: config.name.clone(),
                scheme: target.scheme().to_string(),
            });
        }
        if target.host_str().is_none() {
            return Err(RouteError::MissingHost {
                name: config.name.clone(),
                target: config.target.clone(),
            });
        }

        Ok(Self {
            name: config.name.clone(),
            prefix: config.prefix.clone(),
            target,
            rewrite: config.rewrite.clone(),
            request_timeout: config.request_timeout_ms.map(Duration::from_millis),
            connect_timeout: config.connect_timeout_ms.map(Duration::from_millis),
            preserve_host: config.preserve_host,
        })
    }
}

/// Ordered set of routes, built once at startup and immutable afterwards.
///
/// Routes are stored longest-prefix-first; the stable sort keeps registration
/// order for equal-length prefixes, so the first `starts_with` hit during
/// lookup is the winning route.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile the route table from configuration.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut seen = HashSet::new();
        let mut routes = Vec::with_capacity(configs.len());

        for config in configs {
            let route = Route::from_config(config)?;
            if !seen.insert(route.prefix.clone()) {
                return Err(RouteError::DuplicatePrefix {
                    prefix: route.prefix,
                });
            }
            routes.push(route);
        }

        routes.sort_by_key(|r| std::cmp::Reverse(r.prefix.len()));

        Ok(Self { routes })
    }

    /// Find the route matching `path`, or `None`.
    ///
    /// `path` must be the raw request path without the query string.
    pub fn matched(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| path.starts_with(&r.prefix))
    }

    /// All compiled routes, longest prefix first.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of configured routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no routes are configured.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
