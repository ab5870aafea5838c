//! Header manipulation and security headers.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from upstream responses
//! - Add the fixed security response headers
//!
//! # Design Decisions
//! - Security headers overwrite whatever the upstream sent
//! - The refusal notice for nested stylesheets never passes through here

use axum::http::header::{self, HeaderMap, HeaderValue};

/// Restrict resource loading to the response's own origin.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'";

/// Disable content-type sniffing.
pub const NOSNIFF: &str = "nosniff";

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove headers that only apply to a single connection.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Set `Content-Security-Policy` and `X-Content-Type-Options`.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static(NOSNIFF));
}
