//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → dispatch.rs (fetch upstream, transform HTML or pass bytes through)
//!     → response.rs (assemble response, map errors to 5xx)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::Dispatcher;
pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::{ProxyError, ProxyResponse, ResponseKind, HTML_CONTENT_TYPE};
pub use server::HttpServer;
