//! HTML5 parsing into a [`DocumentTree`].
//!
//! Parsing is delegated to html5ever through `scraper`'s tree sink, which
//! follows the WHATWG algorithm and recovers from malformed markup the way
//! browsers do. The resulting tree is copied into the arena so the rewriters
//! never touch parser-owned nodes.
//!
//! Scripting is disabled while parsing: `<noscript>` content becomes real
//! elements and text instead of one opaque raw-text node.

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, QualName};
use scraper::{Html, HtmlTreeSink, Node as ScraperNode};

use crate::transform::tree::{Attribute, Doctype, DocumentTree, Element, NodeId, NodeKind};
use crate::transform::TransformError;

/// Parse an HTML document into an arena tree.
///
/// # Errors
///
/// `TransformError::ParseFailed` when no root element came out of the parser,
/// or when element nesting goes deeper than `max_depth`.
pub fn parse_document(html: &str, max_depth: usize) -> Result<DocumentTree, TransformError> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let parsed = html5ever::parse_document(HtmlTreeSink::new(Html::new_document()), opts).one(html);
    if !parsed.errors.is_empty() {
        tracing::trace!(errors = parsed.errors.len(), "Recovered from HTML parse errors");
    }

    let mut tree = DocumentTree::new();
    let root = tree.root();

    let mut stack: Vec<_> = parsed
        .tree
        .root()
        .children()
        .map(|child| (child, root, 0usize))
        .collect();
    stack.reverse();

    while let Some((source, parent, depth)) = stack.pop() {
        let kind = match source.value() {
            ScraperNode::Doctype(doctype) => NodeKind::Doctype(Doctype {
                name: doctype.name().to_string(),
                public_id: doctype.public_id().to_string(),
                system_id: doctype.system_id().to_string(),
            }),
            ScraperNode::Comment(comment) => NodeKind::Comment(comment.to_string()),
            ScraperNode::Text(text) => NodeKind::Text(text.to_string()),
            ScraperNode::Element(element) => {
                if depth >= max_depth {
                    return Err(TransformError::ParseFailed(format!(
                        "element nesting exceeds maximum depth {}",
                        max_depth
                    )));
                }
                NodeKind::Element(Element {
                    name: element.name().to_string(),
                    attrs: element
                        .attrs
                        .iter()
                        .map(|(name, value)| Attribute {
                            name: attribute_name(name),
                            value: value.to_string(),
                        })
                        .collect(),
                })
            }
            // Document, fragment and processing-instruction nodes are not
            // produced below the root by the HTML document parser.
            _ => continue,
        };

        let child_depth = match kind {
            NodeKind::Element(_) => depth + 1,
            _ => depth,
        };
        let id = tree.append(parent, kind);

        let mut children: Vec<_> = source.children().map(|c| (c, id, child_depth)).collect();
        children.reverse();
        stack.extend(children);
    }

    if !has_root_element(&tree) {
        return Err(TransformError::ParseFailed(
            "parser produced no root element".to_string(),
        ));
    }

    Ok(tree)
}

// Foreign content keeps its prefix (`xlink:href`, `xmlns:xlink`).
fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

fn has_root_element(tree: &DocumentTree) -> bool {
    tree.children(tree.root())
        .iter()
        .any(|&id: &NodeId| tree.node(id).as_element().is_some())
}
