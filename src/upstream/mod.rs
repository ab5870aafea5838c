//! Upstream fetch subsystem.

pub mod fetcher;

pub use fetcher::{resolve_target, ClientHeader, FetchKind, UpstreamClient};
