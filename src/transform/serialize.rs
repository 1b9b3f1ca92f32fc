//! Pretty-printing serializer.
//!
//! Output puts one node per line and indents one space per nesting level.
//! Text is trimmed and whitespace-only text is dropped. The content of
//! whitespace-sensitive and raw-text elements is written inline and
//! unmodified.

use std::fmt::Write as _;

use crate::transform::tree::{Doctype, DocumentTree, Element, NodeId, NodeKind};

const INDENT: &str = " ";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are emitted without escaping. `noscript`
/// is absent because documents are parsed with scripting disabled.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "plaintext", "script", "style", "xmp",
];

/// Elements whose whitespace is significant.
const PREFORMATTED_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

fn is_inline_only(name: &str) -> bool {
    is_raw_text(name) || PREFORMATTED_ELEMENTS.contains(&name)
}

/// Serialize `tree` as indented HTML.
pub fn to_pretty_html(tree: &DocumentTree) -> String {
    let mut out = String::new();
    for &child in tree.children(tree.root()) {
        write_pretty(tree, child, 0, &mut out);
    }
    out
}

fn write_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_pretty(tree: &DocumentTree, id: NodeId, depth: usize, out: &mut String) {
    match tree.node(id).kind() {
        NodeKind::Document => {
            for &child in tree.children(id) {
                write_pretty(tree, child, depth, out);
            }
        }
        NodeKind::Doctype(doctype) => {
            write_indent(depth, out);
            write_doctype(doctype, out);
            out.push('\n');
        }
        NodeKind::Comment(comment) => {
            write_indent(depth, out);
            write_comment(comment, out);
            out.push('\n');
        }
        NodeKind::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return;
            }
            write_indent(depth, out);
            escape_text(text, out);
            out.push('\n');
        }
        NodeKind::Element(element) => {
            write_indent(depth, out);
            write_start_tag(element, out);
            if is_void(&element.name) {
                out.push('\n');
                return;
            }

            let children = tree.children(id);
            if is_inline_only(&element.name) {
                write_inline_children(tree, id, element, out);
            } else if !children.is_empty() {
                out.push('\n');
                for &child in children {
                    write_pretty(tree, child, depth + 1, out);
                }
                write_indent(depth, out);
            }
            write_end_tag(element, out);
            out.push('\n');
        }
    }
}

fn write_inline_children(tree: &DocumentTree, id: NodeId, element: &Element, out: &mut String) {
    let children = tree.children(id);
    // The parser drops one newline right after these start tags.
    if PREFORMATTED_ELEMENTS.contains(&element.name.as_str()) {
        let leading_newline = children
            .first()
            .and_then(|&first| tree.node(first).as_text())
            .is_some_and(|text| text.starts_with('\n'));
        if leading_newline {
            out.push('\n');
        }
    }

    let raw = is_raw_text(&element.name);
    for &child in children {
        write_inline(tree, child, raw, out);
    }
}

fn write_inline(tree: &DocumentTree, id: NodeId, raw: bool, out: &mut String) {
    match tree.node(id).kind() {
        NodeKind::Document => {
            for &child in tree.children(id) {
                write_inline(tree, child, raw, out);
            }
        }
        NodeKind::Doctype(doctype) => write_doctype(doctype, out),
        NodeKind::Comment(comment) => write_comment(comment, out),
        NodeKind::Text(text) if raw => out.push_str(text),
        NodeKind::Text(text) => escape_text(text, out),
        NodeKind::Element(element) => {
            write_start_tag(element, out);
            if is_void(&element.name) {
                return;
            }
            write_inline_children(tree, id, element, out);
            write_end_tag(element, out);
        }
    }
}

fn write_doctype(doctype: &Doctype, out: &mut String) {
    out.push_str("<!DOCTYPE ");
    out.push_str(&doctype.name);
    if !doctype.public_id.is_empty() {
        let _ = write!(out, " PUBLIC \"{}\"", doctype.public_id);
        if !doctype.system_id.is_empty() {
            let _ = write!(out, " \"{}\"", doctype.system_id);
        }
    } else if !doctype.system_id.is_empty() {
        let _ = write!(out, " SYSTEM \"{}\"", doctype.system_id);
    }
    out.push('>');
}

fn write_comment(comment: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(comment);
    out.push_str("-->");
}

fn write_start_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_attribute(&attr.value, out);
        out.push('"');
    }
    if is_void(&element.name) {
        out.push('/');
    }
    out.push('>');
}

fn write_end_tag(element: &Element, out: &mut String) {
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
