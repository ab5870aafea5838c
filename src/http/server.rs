//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the signed proxy handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener with graceful shutdown
//! - Run the request pipeline:
//!   validate → verify → fetch → inline (stylesheets only) → assemble

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::{MakeRequestUuid, RequestPolicy, SignedRequest, X_REQUEST_ID};
use crate::http::response;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::security::{SignatureVerifier, TrustedKey};
use crate::stylesheet::{is_stylesheet, InlineOutcome, StylesheetInliner};
use crate::upstream::{resolve_target, FetchKind, UpstreamClient};

/// Errors building the server from a validated configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid client header name: {0}")]
    HeaderName(#[from] axum::http::header::InvalidHeaderName),

    #[error("invalid origin: {0}")]
    Origin(#[from] url::ParseError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub fetcher: UpstreamClient,
    pub policy: Arc<RequestPolicy>,
    /// Serving origin for origin-relative targets; `None` accepts only
    /// absolute targets.
    pub origin: Option<Url>,
    /// Maximum stylesheet nesting depth; `None` disables inlining.
    pub inline_depth: Option<usize>,
}

/// HTTP server for the signed proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server. The trusted key is loaded once by the
    /// caller and never changes afterwards.
    pub fn new(config: ProxyConfig, trusted_key: TrustedKey) -> Result<Self, ServerError> {
        let policy = RequestPolicy {
            client_header: HeaderName::from_bytes(config.client_header.name.as_bytes())?,
            require_client_header: config.client_header.required,
        };
        let origin = config
            .listener
            .origin
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        let state = AppState {
            verifier: Arc::new(SignatureVerifier::new(trusted_key)),
            fetcher: UpstreamClient::new()?,
            policy: Arc::new(policy),
            origin,
            inline_depth: config.inliner.enabled.then_some(config.inliner.max_depth),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/", get(proxy_handler))
            .route("/{*path}", get(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(x_request_id))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        Duration::from_secs(config.timeouts.request_secs),
                    )),
            )
    }

    /// Run the server until a shutdown signal or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            inlining = self.config.inliner.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let start_time = Instant::now();
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (outcome, response) = match handle(&state, &request_id, &uri, &headers).await {
        Ok(handled) => handled,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                status = e.status().as_u16(),
                error = %e,
                "Request rejected"
            );
            (e.outcome(), e.into_response())
        }
    };

    metrics::record_request(outcome, response.status().as_u16(), start_time);
    response
}

/// Request pipeline. Each stage may short-circuit with an error; nothing is
/// fetched before the signature verifies.
async fn handle(
    state: &AppState,
    request_id: &str,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<(&'static str, Response), ProxyError> {
    // 1. Validate parameters
    let signed = SignedRequest::extract(uri, headers, &state.policy)?;

    // 2. Verify signature
    if !state
        .verifier
        .verify_request(signed.bot_id, &signed.target, &signed.signature)
    {
        return Err(ProxyError::SignatureRejected);
    }

    // 3. Fetch target
    let target = resolve_target(state.origin.as_ref(), &signed.target)?;

    tracing::debug!(
        request_id = %request_id,
        bot_id = %signed.bot_id,
        target = %target,
        "Proxying signed request"
    );

    let upstream = state
        .fetcher
        .fetch(target.clone(), signed.client_header.as_ref(), FetchKind::Target)
        .await?;

    let stylesheet = is_stylesheet(
        upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );

    // 4. Inline stylesheet resources
    let Some(max_depth) = state.inline_depth.filter(|_| stylesheet) else {
        return Ok(("proxied", response::passthrough(upstream)));
    };

    let status = upstream.status();
    let upstream_headers = upstream.headers().clone();
    let css = upstream.text().await?;

    let inliner = StylesheetInliner::new(&state.fetcher, signed.client_header.as_ref(), max_depth);
    match inliner.inline(&css, &target).await? {
        InlineOutcome::Rewritten(css) => {
            metrics::record_stylesheet("rewritten");
            // 5. Assemble
            Ok(("rewritten", response::rewritten(status, upstream_headers, css)))
        }
        InlineOutcome::Refused => {
            metrics::record_stylesheet("refused");
            tracing::info!(request_id = %request_id, target = %target, "Nested stylesheet refused");
            Ok(("refused", response::refusal()))
        }
    }
}
