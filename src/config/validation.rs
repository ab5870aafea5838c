//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, depth >= 1)
//! - Check the trusted key imports as an Ed25519 key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::security::TrustedKey;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }

    if let Some(origin) = &config.listener.origin {
        match Url::parse(origin) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "listener.origin",
                format!("unsupported scheme: {}", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("listener.origin", e.to_string())),
        }
    }

    match &config.trusted_key.public_key {
        None => errors.push(ValidationError::new(
            "trusted_key.public_key",
            "missing (set it in the config file or PUBLIC_KEY)",
        )),
        Some(key) => {
            if let Err(e) = TrustedKey::from_spki_base64(key) {
                errors.push(ValidationError::new("trusted_key.public_key", e.to_string()));
            }
        }
    }

    if HeaderName::from_bytes(config.client_header.name.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "client_header.name",
            format!("invalid header name: {}", config.client_header.name),
        ));
    }

    if config.inliner.max_depth == 0 {
        errors.push(ValidationError::new("inliner.max_depth", "must be at least 1"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
