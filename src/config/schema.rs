//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.
//! Rule keys use the camelCase spelling of `routes.json` documents.

use serde::{Deserialize, Serialize};

/// Root configuration for the request router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Timeout configuration.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Routing policy settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Named destinations requests can be forwarded to.
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,

    /// Ordered routing rules. Declaration order is the only tie-break.
    pub rules: Vec<RuleConfig>,
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

/// Timeout configuration for the forwarding layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (trace, debug, info, warn, error, or an EnvFilter string).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Routing policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Reject rules whose destination is not declared under `[[destinations]]`.
    ///
    /// When false, such rules load and are skipped at request time.
    pub strict_destinations: bool,
}

/// A named destination requests can be forwarded to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DestinationConfig {
    /// Name rules refer to.
    pub name: String,

    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

/// A single routing rule as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    /// Rule identifier for logging/metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Catch-all rule; all other conditions are ignored.
    #[serde(default, rename = "default")]
    pub is_default: bool,

    /// Destination name to forward to.
    #[serde(default, alias = "worker", skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Hostname to match (exact match).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_starts_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_ends_with: Option<String>,

    /// Pathname to match (exact match).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname_starts_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname_ends_with: Option<String>,
}

impl RuleConfig {
    /// True when no hostname or pathname condition is declared.
    pub fn is_unconditional(&self) -> bool {
        self.hostname.is_none()
            && self.hostname_starts_with.is_none()
            && self.hostname_ends_with.is_none()
            && self.pathname.is_none()
            && self.pathname_starts_with.is_none()
            && self.pathname_ends_with.is_none()
    }

    /// Name used in diagnostics, falling back to the rule's position.
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("rule-{}", index),
        }
    }
}
