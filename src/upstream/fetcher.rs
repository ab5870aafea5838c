//! Upstream retrieval.
//!
//! # Responsibilities
//! - Resolve targets against the serving origin
//! - Issue a single GET per resource, forwarding the client header
//!
//! # Design Decisions
//! - No retries; redirects follow the HTTP client's default policy
//! - Responses are returned unmodified; callers decide whether to stream
//!   or buffer the body

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use crate::error::ProxyError;
use crate::observability::metrics;

/// Client identification header captured from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHeader {
    pub name: HeaderName,
    pub value: HeaderValue,
}

/// Which stage issued a fetch, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// The signed target itself.
    Target,
    /// A resource referenced from a stylesheet.
    Reference,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::Target => "target",
            FetchKind::Reference => "reference",
        }
    }
}

/// HTTP client used for every upstream request.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// GET `url`, forwarding the client header when present.
    pub async fn fetch(
        &self,
        url: Url,
        client_header: Option<&ClientHeader>,
        kind: FetchKind,
    ) -> Result<reqwest::Response, ProxyError> {
        let mut request = self.client.get(url.clone());
        if let Some(header) = client_header {
            request = request.header(header.name.clone(), header.value.clone());
        }

        metrics::record_upstream_fetch(kind.as_str());
        let response = request.send().await.map_err(|e| {
            tracing::error!(url = %url, kind = kind.as_str(), error = %e, "Upstream error");
            ProxyError::Upstream(e)
        })?;

        tracing::debug!(
            url = %url,
            kind = kind.as_str(),
            status = %response.status(),
            "Upstream responded"
        );
        Ok(response)
    }
}

/// Resolve the signed target into an absolute http(s) URL.
///
/// Relative targets need an origin; absolute targets ignore it.
pub fn resolve_target(origin: Option<&Url>, target: &str) -> Result<Url, ProxyError> {
    let url = match origin {
        Some(origin) => origin.join(target),
        None => Url::parse(target),
    }
    .map_err(|e| ProxyError::InvalidTarget(format!("{target}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::InvalidTarget(format!(
            "{target}: unsupported scheme {}",
            url.scheme()
        )));
    }
    Ok(url)
}
