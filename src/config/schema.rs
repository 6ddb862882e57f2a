//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! dispatcher host. All types derive Serde traits for deserialization from
//! config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Error handler and diagnostic settings.
    pub dispatch: DispatchConfig,

    /// Extra namespace chains, as raw paths (e.g. "admin/reports").
    pub namespaces: Vec<String>,

    /// Static route table entries.
    pub routes: Vec<RouteConfig>,

    /// Templates keyed by template identifier.
    pub templates: BTreeMap<String, String>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on a whole dispatch, enforced by the HTTP layer.
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
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Error handler location and diagnostic scrubbing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Namespace of the error handler, as raw segments.
    pub error_namespace: Vec<String>,

    /// Controller segment of the error handler.
    pub error_controller: String,

    /// Absolute path prefixes removed from diagnostic text.
    pub strip_paths: Vec<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            error_namespace: Vec::new(),
            error_controller: "error".to_string(),
            strip_paths: Vec::new(),
        }
    }
}

/// A static route: a path pattern and the handler it maps to.
///
/// `controller` and `action` are raw segments; they go through the same
/// naming transform as dynamically resolved paths.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Literal path or pattern (`{name}`, trailing `{*rest}`).
    pub path: String,

    /// Namespace chain, outermost first.
    #[serde(default)]
    pub namespace: Vec<String>,

    /// Controller segment.
    pub controller: String,

    /// Action segment.
    pub action: String,

    /// Default positional parameters.
    #[serde(default)]
    pub parameters: Vec<String>,

    /// Default named parameters; non-string values are kept as-is.
    #[serde(default)]
    pub named_parameters: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.dispatch.error_controller, "error");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_route_entries() {
        let config: AppConfig = toml::from_str(
            r#"
            namespaces = ["admin"]

            [[routes]]
            path = "/about"
            namespace = ["pages"]
            controller = "page"
            action = "show"
            parameters = ["about"]

            [routes.named_parameters]
            layout = "wide"
            cache_secs = 60

            [[routes]]
            path = "/posts/{slug}"
            controller = "post"
            action = "show"
            "#,
        )
        .unwrap();

        assert_eq!(config.namespaces, vec!["admin"]);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].namespace, vec!["pages"]);
        assert_eq!(config.routes[0].named_parameters["cache_secs"], serde_json::json!(60));
        assert!(config.routes[1].parameters.is_empty());
    }
}
