//! Parse → rewrite links → mark words → pretty-print.

use crate::config::TransformConfig;
use crate::transform::links::LinkRewriter;
use crate::transform::parser::parse_document;
use crate::transform::serialize::to_pretty_html;
use crate::transform::text::TextTagger;
use crate::transform::TransformError;

/// Result of running the pipeline over one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
    pub links_rewritten: usize,
    pub words_marked: usize,
}

/// The full HTML rewrite applied to every HTML response.
///
/// Built once at startup and shared read-only between requests; each call
/// to [`DocumentPipeline::run`] owns its own tree.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    links: LinkRewriter,
    tagger: TextTagger,
    max_depth: usize,
}

impl DocumentPipeline {
    pub fn new(origin: &str, config: &TransformConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            links: LinkRewriter::new(origin),
            tagger: TextTagger::new(config)?,
            max_depth: config.max_nesting_depth,
        })
    }

    pub fn run(&self, html: &str) -> Result<RenderedDocument, TransformError> {
        let mut tree = parse_document(html, self.max_depth)?;
        let links_rewritten = self.links.apply(&mut tree);
        let words_marked = self.tagger.apply(&mut tree);

        tracing::debug!(
            nodes = tree.node_count(),
            links_rewritten,
            words_marked,
            "Document transformed"
        );

        Ok(RenderedDocument {
            html: to_pretty_html(&tree),
            links_rewritten,
            words_marked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> DocumentPipeline {
        DocumentPipeline::new("https://habrahabr.ru", &TransformConfig::default()).unwrap()
    }

    #[test]
    fn test_paragraph_scenario() {
        let out = pipeline()
            .run("<html><body><p>banana orange kiwi</p></body></html>")
            .unwrap();
        assert!(out.html.contains("banana™ orange™ kiwi"));
        assert_eq!(out.words_marked, 2);
    }

    #[test]
    fn test_links_and_text_together() {
        let out = pipeline()
            .run(
                r#"<body>
                <a href="https://habrahabr.ru/post/123">Follow</a>
                <a href="https://other.site/x">Leaves</a>
                </body>"#,
            )
            .unwrap();
        assert!(out.html.contains(r#"<a href="/post/123">"#));
        assert!(out.html.contains(r#"<a href="https://other.site/x">"#));
        assert!(out.html.contains("Follow™"));
        assert!(out.html.contains("Leaves™"));
        assert_eq!(out.links_rewritten, 1);
        assert_eq!(out.words_marked, 2);
    }

    #[test]
    fn test_ignored_content_is_untouched() {
        let out = pipeline()
            .run(
                "<html><head><title>Header</title><style>.banana{}</style></head>\
                 <body><pre>result</pre><code>values</code>\
                 <script>var banana = 1;</script><!-- banana --></body></html>",
            )
            .unwrap();
        assert_eq!(out.words_marked, 0);
        assert!(!out.html.contains('™'));
        assert!(out.html.contains("<script>var banana = 1;</script>"));
        assert!(out.html.contains("<!-- banana -->"));
    }

    #[test]
    fn test_nothing_eligible_is_content_equivalent() {
        let source = r#"<html><head></head><body><p>one two</p><a href="/local">go</a></body></html>"#;
        let out = pipeline().run(source).unwrap();
        assert_eq!(out.links_rewritten, 0);
        assert_eq!(out.words_marked, 0);

        let reparsed = parse_document(&out.html, 100).unwrap();
        let texts: Vec<_> = reparsed
            .text_nodes()
            .into_iter()
            .filter_map(|id| reparsed.node(id).as_text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        assert_eq!(texts, vec!["one two", "go"]);
        let anchor = reparsed.elements_named("a")[0];
        assert_eq!(
            reparsed.node(anchor).as_element().unwrap().attr("href"),
            Some("/local")
        );
    }

    #[test]
    fn test_noscript_markup_is_not_corrupted() {
        let out = pipeline()
            .run(
                r#"<body><noscript><div><img src="https://mc.yandex.ru/watch/24049213"></div></noscript></body>"#,
            )
            .unwrap();
        assert!(!out.html.contains("yandex™"), "{}", out.html);
        assert!(out.html.contains(r#"<img src="https://mc.yandex.ru/watch/24049213"/>"#));
        assert!(out.html.contains("<noscript>\n"));
        assert_eq!(out.words_marked, 0);
    }

    #[test]
    fn test_noscript_text_is_visible_text() {
        let out = pipeline()
            .run("<body><noscript><p>Enable scripts</p></noscript></body>")
            .unwrap();
        assert!(out.html.contains("Enable™ scripts"));
        assert_eq!(out.words_marked, 1);
    }

    #[test]
    fn test_raw_text_containers() {
        let out = pipeline()
            .run(
                r#"<body><iframe><a href="https://yandex.ru/x">inside</a></iframe><noembed><b>yellow</b></noembed><xmp><b>banana</b></xmp></body>"#,
            )
            .unwrap();
        assert!(out.html.contains(r#"<iframe><a href="https://yandex.ru/x">inside</a></iframe>"#));
        assert!(out.html.contains("<noembed><b>yellow</b></noembed>"));
        assert!(out.html.contains("<xmp><b>banana™</b></xmp>"));
        assert_eq!(out.words_marked, 1);
        assert_eq!(out.links_rewritten, 0);
    }

    #[test]
    fn test_svg_round_trip_keeps_namespaced_attributes() {
        let source = r##"<html><head></head><body><svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#icon"></use></svg></body></html>"##;
        let out = pipeline().run(source).unwrap();
        assert!(out.html.contains(r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink">"#));
        assert!(out.html.contains(r##"<use xlink:href="#icon"></use>"##));

        let reparsed = parse_document(&out.html, 100).unwrap();
        let icon = reparsed.elements_named("use")[0];
        assert_eq!(
            reparsed.node(icon).as_element().unwrap().attr("xlink:href"),
            Some("#icon")
        );
    }

    #[test]
    fn test_mathml_text_is_marked() {
        let out = pipeline()
            .run("<body><math><mi>lambda</mi></math></body>")
            .unwrap();
        assert!(out.html.contains("lambda™"));
        assert!(out.html.contains("<math>"));
    }

    #[test]
    fn test_too_deep_document_fails() {
        let config = TransformConfig {
            max_nesting_depth: 10,
            ..TransformConfig::default()
        };
        let pipeline = DocumentPipeline::new("https://habrahabr.ru", &config).unwrap();
        let err = pipeline.run(&"<div>".repeat(20)).unwrap_err();
        assert!(matches!(err, TransformError::ParseFailed(_)));
    }
}
