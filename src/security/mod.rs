//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → http::request (extract and sanity-check parameters)
//!     → signature.rs (Ed25519 check against the trusted key)
//!     → proxying
//!
//! Outgoing response:
//!     → headers.rs (strip hop-by-hop, add CSP + nosniff)
//! ```
//!
//! # Design Decisions
//! - Fail closed: nothing is fetched before the signature verifies
//! - Uniform rejection: malformed and forged signatures look the same

pub mod headers;
pub mod signature;

pub use signature::{sign_request, signed_message, KeyError, SignatureVerifier, TrustedKey};
