//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the signed proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, serving origin).
    pub listener: ListenerConfig,

    /// Trusted issuer key.
    pub trusted_key: TrustedKeyConfig,

    /// Client identification header handling.
    pub client_header: ClientHeaderConfig,

    /// Stylesheet inlining.
    pub inliner: InlinerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Origin that origin-relative targets resolve against
    /// (e.g., "https://example.com"). When unset only absolute targets are
    /// accepted.
    pub origin: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            origin: None,
        }
    }
}

/// Trusted issuer public key.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrustedKeyConfig {
    /// Base64 SubjectPublicKeyInfo encoded Ed25519 key.
    pub public_key: Option<String>,
}

/// Client identification header forwarded upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientHeaderConfig {
    /// Header name (case-insensitive).
    pub name: String,

    /// Reject requests without the header (403).
    pub required: bool,
}

impl Default for ClientHeaderConfig {
    fn default() -> Self {
        Self {
            name: "user-agent".to_string(),
            required: true,
        }
    }
}

/// Stylesheet inlining configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InlinerConfig {
    /// Rewrite `text/css` responses into self-contained documents.
    pub enabled: bool,

    /// Stylesheet nesting depth that may be inlined. 1 refuses any stylesheet
    /// that references another stylesheet.
    pub max_depth: usize,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: 1,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
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
