//! Anchor href rewriting.
//!
//! Links pointing at the origin are made origin-relative so that following
//! them stays on the proxy. The comparison is a literal string prefix: scheme,
//! host case and trailing slashes must match the configured origin exactly.

use crate::transform::tree::{DocumentTree, NodeKind};

/// Strips the origin prefix from `<a href>` values.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    origin: String,
}

impl LinkRewriter {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    /// The rewritten href, or `None` when `href` does not start with the origin.
    pub fn rewrite<'a>(&self, href: &'a str) -> Option<&'a str> {
        href.strip_prefix(self.origin.as_str())
    }

    /// Rewrite every matching anchor in document order.
    ///
    /// Returns the number of hrefs changed.
    pub fn apply(&self, tree: &mut DocumentTree) -> usize {
        let mut rewritten = 0;
        for id in tree.elements_named("a") {
            let NodeKind::Element(anchor) = tree.kind_mut(id) else {
                continue;
            };
            let Some(attr) = anchor.attrs.iter_mut().find(|a| a.name == "href") else {
                continue;
            };
            if attr.value.is_empty() {
                continue;
            }
            if let Some(relative) = self.rewrite(&attr.value) {
                attr.value = relative.to_string();
                rewritten += 1;
            }
        }
        rewritten
    }
}
