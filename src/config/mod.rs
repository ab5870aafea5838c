//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, PUBLIC_KEY / BIND_ADDRESS overrides)
//!     → validation.rs (semantic checks, including key import)
//!     → ProxyConfig (validated, immutable)
//!     → shared with the HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the trusted key is never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClientHeaderConfig, InlinerConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
    TimeoutConfig, TrustedKeyConfig,
};
