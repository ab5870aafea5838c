//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use ed25519_dalek::SigningKey;
use tokio::net::TcpListener;
use url::form_urlencoded;

use signed_proxy::security::sign_request;
use signed_proxy::{HttpServer, ProxyConfig, Shutdown, TrustedKey};

pub const USER_AGENT: &str = "test-bot/1.0";

/// A 1x1 transparent PNG.
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89,
];

struct Resource {
    content_type: &'static str,
    body: Vec<u8>,
}

#[derive(Default)]
struct Recorded {
    hits: HashMap<String, usize>,
    user_agents: Vec<String>,
}

struct UpstreamInner {
    resources: HashMap<String, Resource>,
    delay: Duration,
    recorded: Mutex<Recorded>,
}

/// Mock upstream serving fixed resources and counting hits per path.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    inner: Arc<UpstreamInner>,
}

impl MockUpstream {
    /// Start a mock upstream serving `(path, content type, body)` triples.
    pub async fn start(resources: Vec<(&str, &'static str, Vec<u8>)>) -> Self {
        Self::start_with_delay(resources, Duration::ZERO).await
    }

    /// Like [`MockUpstream::start`], but every response waits `delay` first.
    pub async fn start_with_delay(
        resources: Vec<(&str, &'static str, Vec<u8>)>,
        delay: Duration,
    ) -> Self {
        let resources = resources
            .into_iter()
            .map(|(path, content_type, body)| (path.to_string(), Resource { content_type, body }))
            .collect();
        let inner = Arc::new(UpstreamInner {
            resources,
            delay,
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new().fallback(serve_resource).with_state(inner.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, inner }
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        let recorded = self.inner.recorded.lock().unwrap();
        recorded.hits.get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        let recorded = self.inner.recorded.lock().unwrap();
        recorded.hits.values().sum()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.inner.recorded.lock().unwrap().user_agents.clone()
    }
}

async fn serve_resource(
    State(inner): State<Arc<UpstreamInner>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri.path().to_string();
    {
        let mut recorded = inner.recorded.lock().unwrap();
        *recorded.hits.entry(path.clone()).or_insert(0) += 1;
        if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
            recorded.user_agents.push(agent.to_string());
        }
    }

    if !inner.delay.is_zero() {
        tokio::time::sleep(inner.delay).await;
    }

    match inner.resources.get(&path) {
        Some(resource) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, resource.content_type)],
            resource.body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// A running proxy plus the issuer key it trusts.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub signing_key: SigningKey,
    shutdown: Shutdown,
}

impl TestProxy {
    /// Start a proxy whose serving origin is `origin`, after applying `configure`.
    pub async fn start<F>(origin: &str, configure: F) -> Self
    where
        F: FnOnce(&mut ProxyConfig),
    {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let trusted_key = TrustedKey::from(signing_key.verifying_key());

        let mut config = ProxyConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.listener.origin = Some(origin.to_string());
        config.trusted_key.public_key = Some(trusted_key.to_spki_base64().unwrap());
        configure(&mut config);

        let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HttpServer::new(config, trusted_key).unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            signing_key,
            shutdown,
        }
    }

    /// Proxy URL with a valid signature for `bot_id` and `target`.
    pub fn signed_url(&self, bot_id: i128, target: &str) -> String {
        let signed = sign_request(&self.signing_key, bot_id, target);
        self.url_with(target, &bot_id.to_string(), &signed)
    }

    /// Proxy URL with arbitrary parameters.
    pub fn url_with(&self, target: &str, bot_id: &str, signed: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("url", target)
            .append_pair("botId", bot_id)
            .append_pair("signed", signed)
            .finish();
        format!("http://{}/?{}", self.addr, query)
    }

    pub fn raw_url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub async fn get(url: &str) -> reqwest::Response {
    client()
        .get(url)
        .header(header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .expect("Proxy unreachable")
}

pub fn data_uri(content_type: &str, body: &[u8]) -> String {
    use base64::Engine;
    format!(
        "data:{};base64,{}",
        content_type,
        base64::engine::general_purpose::STANDARD.encode(body)
    )
}
