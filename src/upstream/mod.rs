//! Upstream origin access.
//!
//! # Data Flow
//! ```text
//! inbound path (verbatim, query included)
//!     → fetcher.rs (origin + path, bounded GET)
//!     → Content-Type contains "text/html"?
//!         yes → Payload::Html (decoded text)
//!         no  → Payload::Binary (raw bytes)
//!     → UpstreamResponse handed to the dispatcher
//! ```
//!
//! # Design Decisions
//! - No retries; a timeout or transport error ends the request
//! - Upstream status codes are carried, never interpreted
//! - One shared `reqwest::Client` pool for all requests

pub mod fetcher;
pub mod types;

pub use fetcher::{is_html_content_type, Fetcher};
pub use types::{FetchError, FetchResult, Payload, UpstreamResponse};
