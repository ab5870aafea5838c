//! Response assembly.
//!
//! # Responsibilities
//! - Relay upstream status and headers to the client
//! - Stream passthrough bodies; send rewritten stylesheets as text
//! - Add security headers on every assembled response
//!
//! # Design Decisions
//! - Hop-by-hop headers stripped automatically
//! - Rewritten bodies drop the upstream Content-Length
//! - Rewritten bodies are UTF-8; a declared charset is relabelled to match
//! - The nested-stylesheet refusal is a plain 200 without security headers

use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::security::headers::{apply_security_headers, strip_hop_by_hop};

/// Body of the refusal notice.
pub const REFUSAL_NOTICE: &str =
    "Gave up: this stylesheet references another stylesheet, which will not be inlined.";

/// Relay an upstream response, streaming its body.
pub fn passthrough(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = upstream.headers().clone();
    assemble(status, headers, Body::from_stream(upstream.bytes_stream()))
}

/// Relay upstream status and headers with a rewritten stylesheet body.
pub fn rewritten(status: StatusCode, mut headers: HeaderMap, css: String) -> Response {
    headers.remove(CONTENT_LENGTH);
    declare_utf8(&mut headers);
    assemble(status, headers, Body::from(css))
}

/// Replace a non-UTF-8 `charset` parameter on Content-Type with `utf-8`.
fn declare_utf8(headers: &mut HeaderMap) {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return;
    };

    let mut relabelled = false;
    let parts: Vec<String> = content_type
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((name, value))
                if name.trim().eq_ignore_ascii_case("charset")
                    && !is_utf8_label(value) =>
            {
                relabelled = true;
                " charset=utf-8".to_string()
            }
            _ => part.to_string(),
        })
        .collect();

    if relabelled {
        if let Ok(value) = HeaderValue::from_str(&parts.join(";")) {
            headers.insert(CONTENT_TYPE, value);
        }
    }
}

fn is_utf8_label(value: &str) -> bool {
    let label = value.trim().trim_matches('"');
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}

/// Policy refusal for nested stylesheets.
pub fn refusal() -> Response {
    (StatusCode::OK, REFUSAL_NOTICE).into_response()
}

fn assemble(status: StatusCode, mut headers: HeaderMap, body: Body) -> Response {
    strip_hop_by_hop(&mut headers);
    apply_security_headers(&mut headers);

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
