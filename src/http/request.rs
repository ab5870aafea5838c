//! Request handling and validation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract `url`, `botId` and `signed` from the query string
//! - Capture the client identification header
//! - Reject malformed requests before any expensive work
//!
//! # Design Decisions
//! - Checks run in a fixed order and stop at the first failure
//! - The first occurrence of a repeated query parameter wins
//! - An undecodable `signed` value is not rejected here; it becomes an empty
//!   signature and fails verification like any other bad signature

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::codec::decode_hex;
use crate::error::ProxyError;
use crate::upstream::ClientHeader;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID for every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// What a deployment requires of incoming requests.
#[derive(Debug, Clone)]
pub struct RequestPolicy {
    pub client_header: HeaderName,
    pub require_client_header: bool,
}

/// A request that passed parameter checks but is not yet verified.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Target exactly as sent; this is what the signature covers.
    pub target: String,
    pub bot_id: i128,
    pub signature: Vec<u8>,
    pub client_header: Option<ClientHeader>,
}

impl SignedRequest {
    /// Run the parameter checks:
    /// 1. `url` present and non-empty (400)
    /// 2. client header present when required (403)
    /// 3. `botId` present, non-empty and an integer (401)
    /// 4. `signed` present and non-empty (401)
    pub fn extract(
        uri: &Uri,
        headers: &HeaderMap,
        policy: &RequestPolicy,
    ) -> Result<Self, ProxyError> {
        let query = uri.query().unwrap_or_default();

        let target = query_param(query, "url").ok_or(ProxyError::MissingUrl)?;

        let client_header = headers
            .get(&policy.client_header)
            .filter(|value| !value.is_empty())
            .map(|value| ClientHeader {
                name: policy.client_header.clone(),
                value: value.clone(),
            });
        if policy.require_client_header && client_header.is_none() {
            return Err(ProxyError::MissingClientHeader);
        }

        let bot_id = query_param(query, "botId")
            .and_then(|raw| raw.parse::<i128>().ok())
            .ok_or(ProxyError::MissingSigningParams)?;

        let signed = query_param(query, "signed").ok_or(ProxyError::MissingSigningParams)?;

        Ok(Self {
            target,
            bot_id,
            signature: decode_hex(&signed),
            client_header,
        })
    }
}

/// First non-empty value of `key` in a urlencoded query string.
fn query_param(query: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}
