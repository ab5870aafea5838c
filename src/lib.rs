//! Signed-URL verifying reverse proxy library.
//!
//! Callers present a target URL plus an Ed25519 signature from a trusted
//! issuer; verified requests are fetched upstream, and stylesheet responses
//! are rewritten with every referenced resource inlined as a `data:` URI.

pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod stylesheet;
pub mod upstream;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{SignatureVerifier, TrustedKey};
