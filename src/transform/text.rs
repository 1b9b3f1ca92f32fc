//! Word marking for visible text.
//!
//! # Responsibilities
//! - Decide whether a text node is eligible for marking
//! - Append the mark after every word run of exactly `word_length` chars
//!
//! # Design Decisions
//! - Eligibility looks only at the direct parent element
//! - Unparsed markup held as text by `iframe`, `noembed` and `noframes` is
//!   never rewritten
//! - Word characters and boundaries are Unicode-aware (`regex` defaults)
//! - Whitespace and punctuation around marked words are never touched

use std::borrow::Cow;
use std::collections::HashSet;

use regex::Regex;

use crate::config::{IgnoredTag, TransformConfig};
use crate::transform::tree::{DocumentTree, NodeId, NodeKind};

/// Raw-text containers whose content is markup the browser never shows as
/// text. Marking words there would corrupt tags and attribute values.
const UNPARSED_MARKUP_ELEMENTS: &[&str] = &["iframe", "noembed", "noframes"];

/// Marks fixed-length words inside eligible text nodes.
#[derive(Debug, Clone)]
pub struct TextTagger {
    pattern: Regex,
    mark: String,
    ignored: HashSet<IgnoredTag>,
}

impl TextTagger {
    pub fn new(config: &TransformConfig) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"\b\w{{{}}}\b", config.word_length))?;
        Ok(Self {
            pattern,
            mark: config.mark.clone(),
            ignored: config.ignore_tags.iter().copied().collect(),
        })
    }

    /// Whether the node at `id` may be rewritten.
    ///
    /// Only text nodes qualify, and only when their parent element is not in
    /// the ignore set and does not hold unparsed markup. Comments and
    /// doctypes are distinct node kinds and are therefore never eligible.
    pub fn is_eligible(&self, tree: &DocumentTree, id: NodeId) -> bool {
        match tree.node(id).kind() {
            NodeKind::Text(_) => match tree.parent_element(id) {
                Some(parent) => {
                    !UNPARSED_MARKUP_ELEMENTS.contains(&parent.name.as_str())
                        && !IgnoredTag::from_tag_name(&parent.name)
                            .is_some_and(|tag| self.ignored.contains(&tag))
                }
                None => true,
            },
            NodeKind::Document
            | NodeKind::Doctype(_)
            | NodeKind::Comment(_)
            | NodeKind::Element(_) => false,
        }
    }

    /// Mark every matching word in `text`.
    ///
    /// Returns the rewritten text (borrowed when nothing changed) and the
    /// number of words marked. Whitespace-only input is returned as is.
    pub fn mark_words<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        if text.trim().is_empty() {
            return (Cow::Borrowed(text), 0);
        }

        let mut marked = 0;
        let rewritten = self.pattern.replace_all(text, |caps: &regex::Captures<'_>| {
            marked += 1;
            format!("{}{}", &caps[0], self.mark)
        });
        (rewritten, marked)
    }

    /// Rewrite every eligible text node of `tree` in document order.
    ///
    /// Returns the total number of words marked.
    pub fn apply(&self, tree: &mut DocumentTree) -> usize {
        let mut total = 0;
        for id in tree.text_nodes() {
            if !self.is_eligible(tree, id) {
                continue;
            }
            if let NodeKind::Text(text) = tree.kind_mut(id) {
                let replacement = match self.mark_words(text) {
                    (Cow::Owned(rewritten), marked) => Some((rewritten, marked)),
                    (Cow::Borrowed(_), _) => None,
                };
                if let Some((rewritten, marked)) = replacement {
                    *text = rewritten;
                    total += marked;
                }
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tree::Element;

    fn tagger() -> TextTagger {
        TextTagger::new(&TransformConfig::default()).unwrap()
    }

    fn mark(text: &str) -> String {
        tagger().mark_words(text).0.into_owned()
    }

    #[test]
    fn test_marks_only_six_letter_words() {
        assert_eq!(mark("banana orange kiwi"), "banana™ orange™ kiwi");
    }

    #[test]
    fn test_length_must_be_exact() {
        assert_eq!(mark("bananas kiwi apple"), "bananas kiwi apple");
        assert_eq!(mark("abcde abcdef abcdefg"), "abcde abcdef™ abcdefg");
    }

    #[test]
    fn test_surrounding_text_is_preserved() {
        assert_eq!(
            mark("  \n\tHello, (banana)! 123456\n  "),
            "  \n\tHello, (banana™)! 123456™\n  "
        );
    }

    #[test]
    fn test_word_runs_include_underscore_and_digits() {
        assert_eq!(mark("foo_bar foo_barbaz a1b2c3"), "foo_bar foo_barbaz a1b2c3™");
    }

    #[test]
    fn test_hyphen_and_apostrophe_split_words() {
        assert_eq!(mark("single-barrel doesn't"), "single™-barrel™ doesn't");
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(mark("привет мир"), "привет™ мир");
        assert_eq!(mark("Straße café"), "Straße™ café");
    }

    #[test]
    fn test_whitespace_only_is_noop() {
        let (text, count) = tagger().mark_words(" \n\t ");
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_no_match_borrows() {
        let (text, count) = tagger().mark_words("kiwi and figs");
        assert!(matches!(text, Cow::Borrowed("kiwi and figs")));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_counts_every_match() {
        let (_, count) = tagger().mark_words("orange banana cherry");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_custom_length_and_mark() {
        let config = TransformConfig {
            word_length: 4,
            mark: "*".into(),
            ..TransformConfig::default()
        };
        let tagger = TextTagger::new(&config).unwrap();
        assert_eq!(tagger.mark_words("kiwi banana").0, "kiwi* banana");
    }

    fn tree_with(parent: &str, text: &str) -> (DocumentTree, NodeId) {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let element = tree.append(root, NodeKind::Element(Element::new(parent)));
        let id = tree.append(element, NodeKind::Text(text.into()));
        (tree, id)
    }

    #[test]
    fn test_ignored_parents() {
        let tagger = tagger();
        for parent in ["pre", "code", "script", "style", "head", "title", "meta"] {
            let (mut tree, id) = tree_with(parent, "banana");
            assert!(!tagger.is_eligible(&tree, id), "{} should be ignored", parent);
            assert_eq!(tagger.apply(&mut tree), 0);
            assert_eq!(tree.node(id).as_text(), Some("banana"));
        }
    }

    #[test]
    fn test_unparsed_markup_is_never_eligible() {
        let tagger = tagger();
        for parent in ["iframe", "noembed", "noframes"] {
            let (tree, id) = tree_with(parent, r#"<img src="https://yandex.ru/x">"#);
            assert!(!tagger.is_eligible(&tree, id), "{} holds markup", parent);
        }
        let (tree, id) = tree_with("xmp", "banana");
        assert!(tagger.is_eligible(&tree, id));
    }

    #[test]
    fn test_only_direct_parent_counts() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let pre = tree.append(root, NodeKind::Element(Element::new("pre")));
        let span = tree.append(pre, NodeKind::Element(Element::new("span")));
        let text = tree.append(span, NodeKind::Text("banana".into()));

        assert!(tagger().is_eligible(&tree, text));
    }

    #[test]
    fn test_comments_and_doctypes_are_never_eligible() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let p = tree.append(root, NodeKind::Element(Element::new("p")));
        let comment = tree.append(p, NodeKind::Comment("banana".into()));
        let doctype = tree.append(root, NodeKind::Doctype(Default::default()));

        let tagger = tagger();
        assert!(!tagger.is_eligible(&tree, comment));
        assert!(!tagger.is_eligible(&tree, doctype));
        assert!(!tagger.is_eligible(&tree, p));

        tagger.apply(&mut tree);
        assert_eq!(tree.node(comment).kind(), &NodeKind::Comment("banana".into()));
    }

    #[test]
    fn test_apply_rewrites_in_place() {
        let (mut tree, id) = tree_with("p", "banana orange kiwi");
        let parent = tree.parent(id).unwrap();

        assert_eq!(tagger().apply(&mut tree), 2);
        assert_eq!(tree.node(id).as_text(), Some("banana™ orange™ kiwi"));
        assert_eq!(tree.children(parent), &[id]);
    }

    #[test]
    fn test_configured_ignore_set() {
        let config = TransformConfig {
            ignore_tags: vec![IgnoredTag::Script],
            ..TransformConfig::default()
        };
        let tagger = TextTagger::new(&config).unwrap();

        let (tree, id) = tree_with("code", "banana");
        assert!(tagger.is_eligible(&tree, id));
        let (tree, id) = tree_with("script", "banana");
        assert!(!tagger.is_eligible(&tree, id));
    }
}
