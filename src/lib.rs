//! HTML rewriting forward proxy library.
//!
//! Every request is forwarded to a single configured origin. HTML responses
//! are parsed, have origin links made relative and fixed-length words
//! marked, then go back to the client pretty-printed. Everything else is
//! passed through byte for byte.

// Core subsystems
pub mod config;
pub mod http;
pub mod transform;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
