//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, pipeline)
//!     → request.rs (request ID, parameter checks)
//!     → security::signature (verify)
//!     → upstream (fetch) → stylesheet (inline, text/css only)
//!     → response.rs (relay, security headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestPolicy, SignedRequest, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
