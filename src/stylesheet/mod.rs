//! Stylesheet inlining subsystem.
//!
//! # Data Flow
//! ```text
//! text/css upstream response (fully buffered)
//!     → scanner.rs (enumerate distinct references, identity pass)
//!     → inliner.rs (resolve, fetch concurrently, encode as data: URIs)
//!     → scanner.rs (substitution pass using the ReferenceMap)
//!     → rewritten stylesheet, or a refusal when a nested stylesheet is hit
//! ```

pub mod inliner;
pub mod scanner;

pub use inliner::{is_stylesheet, InlineOutcome, ReferenceMap, StylesheetInliner};
