//! Configuration loading from the environment and from disk.
//!
//! This is the only module that reads process environment state; everything
//! downstream works with the typed [`GatewayConfig`] it produces.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file.
pub fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    Ok(config)
}

/// Load configuration from the environment.
///
/// Starts from the file named by `GATEWAY_CONFIG` when set, otherwise from
/// built-in defaults, then applies environment overrides (`PORT` plus each
/// route's `target_env` variable).
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = match std::env::var("GATEWAY_CONFIG") {
        Ok(path) => load_file(Path::new(&path))?,
        Err(_) => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply environment-style overrides through a lookup function.
///
/// An unparsable `PORT` keeps the configured bind address (default port 5000)
/// rather than failing startup.
pub fn apply_env_overrides(
    config: &mut GatewayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(port) = lookup("PORT") {
        match port.parse::<u16>() {
            Ok(port) => config.listener.bind_address = format!("0.0.0.0:{}", port),
            Err(_) => {
                tracing::warn!(value = %port, "Ignoring invalid PORT value");
            }
        }
    }

    for route in &mut config.routes {
        if let Some(var) = &route.target_env {
            if let Some(target) = lookup(var) {
                route.target = target;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_override_applies() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "PORT").then(|| "8123".to_string())
        });
        assert_eq!(config.listener.bind_address, "0.0.0.0:8123");
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
    }

    #[test]
    fn route_target_env_override_applies() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "USER_SERVICE_URL").then(|| "http://10.0.0.7:9000".to_string())
        });
        assert_eq!(config.routes[0].target, "http://10.0.0.7:9000");
        assert_eq!(config.routes[1].target, "http://localhost:4002");
    }

    #[test]
    fn toml_round_trip() {
        let toml_src = r#"
            [listener]
            bind_address = "127.0.0.1:7000"

            [[routes]]
            name = "api"
            prefix = "/api"
            target = "http://127.0.0.1:4100"
            request_timeout_ms = 1500
        "#;
        let config: GatewayConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:7000");
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].request_timeout_ms, Some(1500));
        assert_eq!(config.routes[0].rewrite, "");
    }
}
