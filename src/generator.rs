use crate::ast::{AmlDocument, ListMarker, Node, Placement};
use crate::colors::{self, UNKNOWN_CLASS, UNKNOWN_SIGIL};
use crate::config::RenderConfig;
use crate::serialization::flatten_text;
use crate::utils::{escape_attr, escape_html, percent_encode_href};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static YOUTUBE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.|m\.)?(?:youtube\.com/watch\?(?:\S*?&)?v=|youtube\.com/shorts/|youtu\.be/)([A-Za-z0-9_-]+)",
    )
    .unwrap()
});

const COLLAPSE_TOGGLE: &str = "<button type=\"button\" class=\"mlq-collapse\" aria-label=\"Toggle quote\"><span class=\"mlq-collapse-icon\">−</span></button>";

/// Pronunciation and gloss for one run of hanzi, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub pinyin: String,
    pub definition: String,
}

/// Annotation data keyed by the exact hanzi run.
pub type Annotations = HashMap<String, Annotation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteType {
    Reference,
}

impl QuoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteType::Reference => "reference",
        }
    }
}

/// A quotation found in a quote-bearing color block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub quote_type: QuoteType,
}

/// Receives every quote the generator encounters, in document order.
pub trait QuoteSink {
    fn quote(&mut self, quote: Quote);
}

impl<F: FnMut(Quote)> QuoteSink for F {
    fn quote(&mut self, quote: Quote) {
        self(quote)
    }
}

/// Renders an [`AmlDocument`] into an HTML fragment.
///
/// The document is only read. The quote sink, when present, is the single
/// side effect of rendering.
pub struct HtmlGenerator<'a> {
    config: RenderConfig,
    annotations: Option<&'a Annotations>,
    quote_sink: Option<&'a mut dyn QuoteSink>,
}

impl Default for HtmlGenerator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> HtmlGenerator<'a> {
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
            annotations: None,
            quote_sink: None,
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_annotations(mut self, annotations: &'a Annotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn with_quote_sink(mut self, sink: &'a mut dyn QuoteSink) -> Self {
        self.quote_sink = Some(sink);
        self
    }

    pub fn render(&mut self, document: &AmlDocument) -> String {
        self.render_blocks(&document.children)
    }

    /// Renders a slice of top-level nodes, e.g. the part of a document before its more-tag.
    pub fn render_nodes(&mut self, nodes: &[Node]) -> String {
        self.render_blocks(nodes)
    }

    // === Block level ===

    /// Groups inline runs into paragraphs and same-marker list items into
    /// lists. A single newline inside a paragraph is a line break; a blank
    /// or whitespace-only line, or a block node, ends the paragraph.
    fn render_blocks(&mut self, nodes: &[Node]) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut paragraph: Vec<&Node> = Vec::new();
        let mut i = 0;
        while i < nodes.len() {
            let node = &nodes[i];
            match node {
                Node::Newline => match blank_lines_end(nodes, i) {
                    Some(last) => {
                        self.flush_paragraph(&mut paragraph, &mut parts);
                        i = last;
                    }
                    None => paragraph.push(node),
                },
                Node::ListItem { marker, .. } => {
                    self.flush_paragraph(&mut paragraph, &mut parts);
                    let (list, next) = self.render_list(nodes, i, *marker);
                    parts.push(list);
                    i = next;
                    continue;
                }
                _ if node.is_block() => {
                    self.flush_paragraph(&mut paragraph, &mut parts);
                    parts.push(self.render_block(node));
                }
                _ => paragraph.push(node),
            }
            i += 1;
        }
        self.flush_paragraph(&mut paragraph, &mut parts);
        parts.join("\n")
    }

    fn flush_paragraph(&mut self, paragraph: &mut Vec<&Node>, parts: &mut Vec<String>) {
        let nodes = std::mem::take(paragraph);
        let start = nodes
            .iter()
            .position(|n| !matches!(n, Node::Newline))
            .unwrap_or(nodes.len());
        let end = nodes
            .iter()
            .rposition(|n| !matches!(n, Node::Newline))
            .map_or(start, |p| p + 1);
        let content = &nodes[start..end];
        if content
            .iter()
            .all(|n| matches!(n, Node::Newline) || n.is_blank_text())
        {
            return;
        }
        let mut html = String::from("<p>");
        for node in content {
            html.push_str(&self.render_inline_node(node));
        }
        html.push_str("</p>");
        parts.push(html);
    }

    /// Collects the run of `marker` items starting at `start`. Returns the
    /// list HTML and the index of the first node after the run.
    fn render_list(&mut self, nodes: &[Node], start: usize, marker: ListMarker) -> (String, usize) {
        let mut items = String::new();
        let mut i = start;
        loop {
            match nodes.get(i) {
                Some(Node::ListItem { marker: m, children }) if *m == marker => {
                    items.push_str(&format!(
                        "<li class=\"{}\">{}</li>",
                        marker.class(),
                        self.render_inline(children)
                    ));
                    i += 1;
                }
                Some(Node::Newline)
                    if matches!(
                        nodes.get(i + 1),
                        Some(Node::ListItem { marker: m, .. }) if *m == marker
                    ) =>
                {
                    i += 1;
                }
                _ => break,
            }
        }
        let html = format!(
            "<ul class=\"aml-list {}-list\">{}</ul>",
            marker.class(),
            items
        );
        (html, i)
    }

    fn render_block(&mut self, node: &Node) -> String {
        match node {
            Node::ColorBlock {
                color,
                placement,
                children,
            } => self.render_color(color, *placement, children, true),
            Node::MultiLineQuote { color, children } => {
                self.render_quote(color.as_deref(), children)
            }
            _ => self.render_inline_node(node),
        }
    }

    fn render_quote(&mut self, color: Option<&str>, children: &[Node]) -> String {
        let mut class = String::from("mlq");
        let mut sigil = String::new();
        if let Some(color) = color {
            let (sigil_char, color_class, description) = color_parts(color);
            class.push(' ');
            class.push_str(color_class);
            sigil = sigil_html(sigil_char, description);
        }
        let toggle = if self.config.collapsible_quotes {
            COLLAPSE_TOGGLE
        } else {
            ""
        };
        let body = self.render_blocks(children);
        format!("<div class=\"{class}\">{sigil}{toggle}<div class=\"mlq-content\">{body}</div></div>")
    }

    // === Inline level ===

    fn render_inline(&mut self, nodes: &[Node]) -> String {
        let mut html = String::new();
        for node in nodes {
            html.push_str(&self.render_inline_node(node));
        }
        html
    }

    fn render_inline_node(&mut self, node: &Node) -> String {
        match node {
            Node::Text { text } => escape_html(text),
            Node::ColorBlock {
                color,
                placement,
                children,
            } => self.render_color(color, *placement, children, false),
            Node::ListItem { children, .. } => self.render_inline(children),
            Node::MultiLineQuote { color, children } => {
                self.render_quote(color.as_deref(), children)
            }
            Node::Chinese { text } => self.render_chinese(text),
            Node::Url { url } => self.render_url(url),
            Node::Wikilink { children } => self.render_wikilink(children),
            Node::Literal { children } => {
                format!(
                    "<span class=\"literal-text\">{}</span>",
                    self.render_inline(children)
                )
            }
            Node::Emphasis { text } => format!("<em>{}</em>", escape_html(text)),
            Node::Title { children } => {
                format!(
                    "<span class=\"inline-title\">{}</span>",
                    self.render_inline(children)
                )
            }
            Node::Template { name, body } => {
                let name = escape_attr(name);
                format!(
                    "<span class=\"template template-{name}\" data-template=\"{name}\">{}</span>",
                    escape_html(body)
                )
            }
            Node::SectionBreak => "<hr>".to_string(),
            Node::MoreTag => "<div class=\"more-tag\"></div>".to_string(),
            Node::Newline => "<br>".to_string(),
        }
    }

    /// Line blocks at block level become a `div`, everything else a `span`.
    /// Parenthesized blocks are drawn inside literal parentheses.
    fn render_color(
        &mut self,
        color: &str,
        placement: Placement,
        children: &[Node],
        as_block: bool,
    ) -> String {
        if colors::is_quote_color(color) {
            self.emit_quote(children);
        }
        let (sigil, class, description) = color_parts(color);
        let sigil = sigil_html(sigil, description);
        let content = self.render_inline(children);
        match placement {
            Placement::Line => {
                let tag = if as_block { "div" } else { "span" };
                format!(
                    "<{tag} class=\"colorblock {class}\">{sigil}<span class=\"colortext-content\">{content}</span></{tag}>"
                )
            }
            Placement::Parenthesized => format!(
                "<span class=\"colorblock {class}\">({sigil}<span class=\"colortext-content\">{content}</span>)</span>"
            ),
        }
    }

    fn emit_quote(&mut self, children: &[Node]) {
        if let Some(sink) = self.quote_sink.as_mut() {
            sink.quote(Quote {
                text: flatten_text(children).trim().to_string(),
                quote_type: QuoteType::Reference,
            });
        }
    }

    fn render_chinese(&self, text: &str) -> String {
        match self.annotations.and_then(|a| a.get(text)) {
            Some(annotation) => format!(
                "<span class=\"annotated-chinese\" data-pinyin=\"{}\" data-definition=\"{}\">{}</span>",
                escape_attr(&annotation.pinyin),
                escape_attr(&annotation.definition),
                escape_html(text)
            ),
            None => format!("<span class=\"annotated-chinese\">{}</span>", escape_html(text)),
        }
    }

    fn render_url(&self, url: &str) -> String {
        let mut html = format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            percent_encode_href(url),
            escape_html(url)
        );
        if self.config.youtube_embeds {
            if let Some(id) = youtube_id(url) {
                html.push_str(&format!(
                    "<span class=\"youtube-embed\" data-video-id=\"{}\"></span>",
                    escape_attr(id)
                ));
            }
        }
        html
    }

    fn render_wikilink(&mut self, children: &[Node]) -> String {
        let target = flatten_text(children).trim().replace(' ', "_");
        format!(
            "<a href=\"{}{}\" class=\"wikilink\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            escape_attr(&self.config.wikipedia_base_url),
            percent_encode_href(&target),
            self.render_inline(children)
        )
    }
}

/// When the newline at `start` is followed by one or more lines holding only
/// whitespace, the index of the last newline of that run.
fn blank_lines_end(nodes: &[Node], start: usize) -> Option<usize> {
    let mut last = None;
    for (index, node) in nodes.iter().enumerate().skip(start + 1) {
        match node {
            Node::Newline => last = Some(index),
            _ if node.is_blank_text() => {}
            _ => break,
        }
    }
    last
}

/// Sigil, CSS class and description for `color`, falling back to a neutral
/// placeholder for names outside the registry.
fn color_parts(color: &str) -> (&'static str, &'static str, &'static str) {
    match colors::lookup(color) {
        Some(info) => (info.sigil, info.class, info.description),
        None => {
            warn!("color {:?} is not in the registry", color);
            (UNKNOWN_SIGIL, UNKNOWN_CLASS, "")
        }
    }
}

fn sigil_html(sigil: &str, description: &str) -> String {
    format!(
        "<span class=\"sigil\" title=\"{}\">{}</span>",
        escape_attr(description),
        sigil
    )
}

/// The video id of a YouTube watch, shorts or youtu.be URL.
pub fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_PATTERN
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Renders `document` with optional annotations and quote sink.
pub fn render<'a>(
    document: &AmlDocument,
    annotations: Option<&'a Annotations>,
    quote_sink: Option<&'a mut dyn QuoteSink>,
) -> String {
    let mut generator = HtmlGenerator {
        config: RenderConfig::default(),
        annotations,
        quote_sink,
    };
    generator.render(document)
}
