//! HTML transform subsystem.
//!
//! # Data Flow
//! ```text
//! HTML text
//!     → parser.rs (html5ever via scraper → DocumentTree arena)
//!     → links.rs (strip origin prefix from <a href>)
//!     → text.rs (mark fixed-length words in eligible text)
//!     → serialize.rs (indented HTML)
//! ```
//!
//! # Design Decisions
//! - The tree is an arena indexed by `NodeId`; parents are indices, not pointers
//! - Node kinds and ignored tags are closed enums
//! - Components are built once from config and shared read-only

pub mod links;
pub mod parser;
pub mod pipeline;
pub mod serialize;
pub mod text;
pub mod tree;

use thiserror::Error;

pub use links::LinkRewriter;
pub use pipeline::{DocumentPipeline, RenderedDocument};
pub use text::TextTagger;
pub use tree::{DocumentTree, NodeId, NodeKind};

/// Errors raised while transforming a document.
#[derive(Debug, Error)]
pub enum TransformError {
    /// No usable tree could be built from the input.
    #[error("HTML parse failed: {0}")]
    ParseFailed(String),

    /// The blocking task running the pipeline panicked or was cancelled.
    #[error("transform task aborted: {0}")]
    Aborted(String),
}
