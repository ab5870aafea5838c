//! Request-path error type.
//!
//! Every variant is terminal for the request. Signature problems of any kind
//! collapse into [`ProxyError::SignatureRejected`] so callers cannot tell a
//! malformed signature from a forged one.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that short-circuit request handling.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// `url` query parameter missing or empty.
    #[error("`url` expected as a query parameter.")]
    MissingUrl,

    /// Client identification header required by the deployment but absent.
    #[error("Missing client identification header.")]
    MissingClientHeader,

    /// `botId` or `signed` missing, empty, or `botId` not an integer.
    #[error("Need signing parameters (`botId` and `signed`).")]
    MissingSigningParams,

    /// Signature did not verify.
    #[error("Failed signature check.")]
    SignatureRejected,

    /// Target could not be resolved into an absolute URL.
    #[error("Invalid target url: {0}")]
    InvalidTarget(String),

    /// Upstream fetch or body read failed.
    #[error("Upstream request failed")]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl | ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::MissingClientHeader | ProxyError::SignatureRejected => {
                StatusCode::FORBIDDEN
            }
            ProxyError::MissingSigningParams => StatusCode::UNAUTHORIZED,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::MissingUrl
            | ProxyError::MissingClientHeader
            | ProxyError::MissingSigningParams
            | ProxyError::InvalidTarget(_) => "bad_request",
            ProxyError::SignatureRejected => "signature_rejected",
            ProxyError::Upstream(_) => "upstream_error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
