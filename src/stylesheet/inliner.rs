//! Stylesheet resource inlining.
//!
//! # Responsibilities
//! - Discover the distinct references in a stylesheet
//! - Fetch each referenced resource exactly once, concurrently
//! - Encode each resource as a `data:` URI and substitute every occurrence
//! - Refuse stylesheets that reference stylesheets beyond the depth limit
//!
//! # Design Decisions
//! - Fetches are de-duplicated on the resolved absolute URL; substitution is
//!   keyed by the raw reference text
//! - A refusal anywhere discards the whole rewrite (no partial output)
//! - A stylesheet that references itself or an ancestor is always refused

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::header::{HeaderMap, CONTENT_TYPE};
use futures_util::future::{try_join_all, BoxFuture};
use url::Url;

use crate::codec::encode_base64;
use crate::error::ProxyError;
use crate::stylesheet::scanner;
use crate::upstream::{ClientHeader, FetchKind, UpstreamClient};

/// Media type that triggers inlining.
pub const STYLESHEET_MEDIA_TYPE: &str = "text/css";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw reference text → inline `data:` representation.
pub type ReferenceMap = HashMap<String, String>;

/// Result of inlining a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineOutcome {
    /// All references replaced (or there were none).
    Rewritten(String),
    /// A referenced stylesheet exceeded the nesting limit.
    Refused,
}

/// True when the media type (before any `;` parameter) is `text/css`.
pub fn is_stylesheet(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case(STYLESHEET_MEDIA_TYPE))
        .unwrap_or(false)
}

/// Content type as used inside a `data:` URI: parameters kept, whitespace
/// around them removed.
pub fn data_content_type(content_type: Option<&str>) -> String {
    match content_type.map(str::trim).filter(|ct| !ct.is_empty()) {
        Some(ct) => ct
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(";"),
        None => FALLBACK_CONTENT_TYPE.to_string(),
    }
}

/// `data:<content-type>;base64,<payload>`
pub fn data_uri(content_type: &str, body: &[u8]) -> String {
    format!("data:{content_type};base64,{}", encode_base64(body))
}

fn content_type_of(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

/// Resolve a reference against the stylesheet URL. References that stay
/// in the document (fragments) or are not fetchable over http(s) are skipped.
fn resolve_reference(base: &Url, reference: &str) -> Option<Url> {
    if reference.starts_with('#') {
        return None;
    }
    let url = base.join(reference).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// A fetched secondary resource.
enum Fetched {
    Resource { content_type: String, body: Bytes },
    Stylesheet { content_type: String, text: String },
    Refused,
}

/// Rewrites stylesheets into self-contained documents.
pub struct StylesheetInliner<'a> {
    fetcher: &'a UpstreamClient,
    client_header: Option<&'a ClientHeader>,
    max_depth: usize,
}

impl<'a> StylesheetInliner<'a> {
    pub fn new(
        fetcher: &'a UpstreamClient,
        client_header: Option<&'a ClientHeader>,
        max_depth: usize,
    ) -> Self {
        Self {
            fetcher,
            client_header,
            max_depth: max_depth.max(1),
        }
    }

    /// Inline every resource referenced by `css`, resolving references
    /// against `base` (the URL the stylesheet was fetched from).
    pub async fn inline(&self, css: &str, base: &Url) -> Result<InlineOutcome, ProxyError> {
        self.inline_at(css, base, 1, &[]).await
    }

    fn inline_at<'s>(
        &'s self,
        css: &'s str,
        base: &'s Url,
        depth: usize,
        ancestors: &'s [Url],
    ) -> BoxFuture<'s, Result<InlineOutcome, ProxyError>> {
        Box::pin(async move {
            let mut resolved: Vec<(String, Url)> = Vec::new();
            let mut targets: Vec<Url> = Vec::new();
            for reference in scanner::references(css) {
                let Some(url) = resolve_reference(base, &reference) else {
                    continue;
                };
                if !targets.contains(&url) {
                    targets.push(url.clone());
                }
                resolved.push((reference, url));
            }

            if targets.is_empty() {
                return Ok(InlineOutcome::Rewritten(css.to_string()));
            }

            if targets.iter().any(|url| url == base || ancestors.contains(url)) {
                tracing::warn!(stylesheet = %base, "Stylesheet references itself or an ancestor");
                return Ok(InlineOutcome::Refused);
            }

            tracing::debug!(
                stylesheet = %base,
                depth,
                references = resolved.len(),
                fetches = targets.len(),
                "Inlining stylesheet references"
            );

            let fetched =
                try_join_all(targets.iter().map(|url| self.fetch_reference(url, depth))).await?;

            if fetched.iter().any(|f| matches!(f, Fetched::Refused)) {
                tracing::info!(stylesheet = %base, depth, "Refusing nested stylesheet");
                return Ok(InlineOutcome::Refused);
            }

            let mut chain = ancestors.to_vec();
            chain.push(base.clone());

            let mut inline_by_url: HashMap<&Url, String> = HashMap::with_capacity(targets.len());
            for (url, fetched) in targets.iter().zip(fetched) {
                let inline = match fetched {
                    Fetched::Resource { content_type, body } => data_uri(&content_type, &body),
                    Fetched::Stylesheet { content_type, text } => {
                        match self.inline_at(&text, url, depth + 1, &chain).await? {
                            InlineOutcome::Rewritten(nested) => {
                                data_uri(&content_type, nested.as_bytes())
                            }
                            InlineOutcome::Refused => return Ok(InlineOutcome::Refused),
                        }
                    }
                    Fetched::Refused => return Ok(InlineOutcome::Refused),
                };
                inline_by_url.insert(url, inline);
            }

            let map: ReferenceMap = resolved
                .into_iter()
                .filter_map(|(reference, url)| {
                    inline_by_url.get(&url).map(|inline| (reference, inline.clone()))
                })
                .collect();

            let rewritten = scanner::scan(css, |reference| {
                map.get(reference)
                    .cloned()
                    .unwrap_or_else(|| reference.to_string())
            });
            Ok(InlineOutcome::Rewritten(rewritten))
        })
    }

    async fn fetch_reference(&self, url: &Url, depth: usize) -> Result<Fetched, ProxyError> {
        let response = self
            .fetcher
            .fetch(url.clone(), self.client_header, FetchKind::Reference)
            .await?;
        let content_type = content_type_of(response.headers());

        if is_stylesheet(content_type) {
            if depth >= self.max_depth {
                return Ok(Fetched::Refused);
            }
            let content_type = data_content_type(content_type);
            let text = response.text().await?;
            return Ok(Fetched::Stylesheet { content_type, text });
        }

        let content_type = data_content_type(content_type);
        let body = response.bytes().await?;
        Ok(Fetched::Resource { content_type, body })
    }
}
