use serde::Serialize;

/// Root of a parsed AML document: a flat sequence of top-level blocks,
/// inline runs and the newlines between them.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct AmlDocument {
    pub children: Vec<Node>,
}

/// Where a color tag appeared, decided once at parse time.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Placement {
    /// `<red>...` runs to the end of the line and renders as its own block.
    Line,
    /// `(<red>...)` is bounded by the enclosing parenthesis and stays inline.
    Parenthesized,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum ListMarker {
    Bullet,
    Number,
    Arrow,
}

impl ListMarker {
    /// CSS class of the `<li>` and suffix of the list container class.
    pub fn class(self) -> &'static str {
        match self {
            ListMarker::Bullet => "bullet",
            ListMarker::Number => "number",
            ListMarker::Arrow => "arrow",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Text {
        text: String,
    },
    ColorBlock {
        color: String,
        placement: Placement,
        children: Vec<Node>,
    },
    /// A single list entry. Consecutive items with the same marker are
    /// grouped into one list when rendering.
    ListItem {
        marker: ListMarker,
        children: Vec<Node>,
    },
    MultiLineQuote {
        color: Option<String>,
        children: Vec<Node>,
    },
    Chinese {
        text: String,
    },
    Url {
        url: String,
    },
    Wikilink {
        children: Vec<Node>,
    },
    Literal {
        children: Vec<Node>,
    },
    Emphasis {
        text: String,
    },
    Title {
        children: Vec<Node>,
    },
    Template {
        name: String,
        body: String,
    },
    SectionBreak,
    MoreTag,
    Newline,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text { text: text.into() }
    }

    /// Nodes that render as their own block element rather than inside a paragraph.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Node::ColorBlock {
                placement: Placement::Line,
                ..
            } | Node::ListItem { .. }
                | Node::MultiLineQuote { .. }
                | Node::SectionBreak
                | Node::MoreTag
        )
    }

    /// True for text made only of whitespace, including the empty string.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text { text } if text.trim().is_empty())
    }
}

impl AmlDocument {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Every hanzi run in the document, in order of appearance, without duplicates.
    pub fn chinese_runs(&self) -> Vec<String> {
        let mut runs = Vec::new();
        collect_chinese(&self.children, &mut runs);
        runs
    }

    pub fn has_more_tag(&self) -> bool {
        self.children.iter().any(|n| matches!(n, Node::MoreTag))
    }

    /// The top-level blocks before the first `MoreTag`.
    pub fn before_more_tag(&self) -> &[Node] {
        let end = self
            .children
            .iter()
            .position(|n| matches!(n, Node::MoreTag))
            .unwrap_or(self.children.len());
        &self.children[..end]
    }
}

fn collect_chinese(nodes: &[Node], runs: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Chinese { text } => {
                if !runs.contains(text) {
                    runs.push(text.clone());
                }
            }
            Node::ColorBlock { children, .. }
            | Node::ListItem { children, .. }
            | Node::MultiLineQuote { children, .. }
            | Node::Wikilink { children }
            | Node::Literal { children }
            | Node::Title { children } => collect_chinese(children, runs),
            Node::Text { .. }
            | Node::Url { .. }
            | Node::Emphasis { .. }
            | Node::Template { .. }
            | Node::SectionBreak
            | Node::MoreTag
            | Node::Newline => {}
        }
    }
}
