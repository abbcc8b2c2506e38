use crate::ast::{AmlDocument, ListMarker, Node, Placement};
use crate::error::AmlError;
use crate::lexer::{Lexer, Token, TokenKind};
use log::{debug, trace};

/// Deepest nesting of bracketed constructs and color blocks. Openers past
/// this depth are kept as text, which bounds recursion on hostile input.
pub const MAX_NESTING: usize = 128;

/// A saved parser position, see [`Parser::attempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: usize,
    closers: usize,
}

/// A recursive descent parser for AML.
///
/// Parsing never fails. Constructs whose closing delimiter never arrives are
/// replaced by their opening delimiter as text followed by whatever was
/// parsed inside them, so no source text is dropped.
///
/// ```text
/// Document  ::= { Block }
/// Block     ::= SectionBreak | MoreTag | Newline
///             | [ ColorTag { Whitespace } ] Quote
///             | ListMarker Inline
///             | Inline
/// Quote     ::= "<<<" { Block } ">>>"
/// Inline    ::= { Text | ColorBlock | Paren | Wikilink | Title | Literal
///               | Chinese | Url | Emphasis | Template }
/// ```
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Closing delimiters of the constructs currently open, innermost last.
    closers: Vec<TokenKind>,
    /// Constructs currently open, including color blocks that have no closer.
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            closers: Vec::new(),
            depth: 0,
        }
    }

    /// Lexes `source_text` and prepares a parser over its tokens.
    pub fn from_source(source_text: &str) -> Result<Self, AmlError> {
        let tokens = Lexer::new(source_text).lex()?;
        Ok(Self::new(tokens))
    }

    // === Main Parsing Methods ===

    pub fn parse_document(&mut self) -> AmlDocument {
        let children = self.parse_blocks();
        AmlDocument::new(children)
    }

    /// Block ::= SectionBreak | MoreTag | Newline | ColoredQuote | Quote | ListItem | Inline
    ///
    /// Stops at the end of input or at the closer of an enclosing quote.
    fn parse_blocks(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        while let Some(kind) = self.current_kind() {
            if self.closes_enclosing(kind) {
                break;
            }
            let before = self.position;
            match kind {
                TokenKind::SectionBreak => {
                    self.advance();
                    nodes.push(Node::SectionBreak);
                }
                TokenKind::MoreTag => {
                    self.advance();
                    nodes.push(Node::MoreTag);
                }
                TokenKind::Newline => {
                    self.advance();
                    nodes.push(Node::Newline);
                }
                TokenKind::ColorTag if !self.at_nesting_limit() => match self
                    .attempt(|p| p.parse_colored_quote())
                {
                    Some(quote) => nodes.extend(quote),
                    None => nodes.extend(self.parse_inline()),
                },
                TokenKind::MlqStart if !self.at_nesting_limit() => {
                    nodes.extend(self.parse_quote(None, String::new()))
                }
                TokenKind::BulletMarker | TokenKind::NumberMarker | TokenKind::ArrowMarker => {
                    nodes.push(self.parse_list_item());
                }
                _ => nodes.extend(self.parse_inline()),
            }
            // No rule claimed the token: keep it as text so the loop always moves.
            if self.position == before {
                if let Some(token) = self.advance_token() {
                    trace!("unclaimed {:?} at {}:{}", token.kind, token.line, token.column);
                    nodes.push(Node::text(token.text));
                }
            }
        }
        nodes
    }

    /// ColoredQuote ::= ColorTag { WhitespaceText } Quote
    ///
    /// Returns `None` when no quote follows the tag; the caller rewinds.
    fn parse_colored_quote(&mut self) -> Option<Vec<Node>> {
        let tag = self.advance_token()?;
        let mut opener = tag.text.clone();
        while let Some(token) = self.current_token() {
            if token.kind != TokenKind::Text || !token.text.trim().is_empty() {
                break;
            }
            opener.push_str(&token.text);
            self.advance();
        }
        if !self.check(TokenKind::MlqStart) {
            return None;
        }
        Some(self.parse_quote(Some(tag.color_name().to_string()), opener))
    }

    /// Quote ::= "<<<" { Block } ">>>"
    fn parse_quote(&mut self, color: Option<String>, mut opener: String) -> Vec<Node> {
        if let Some(start) = self.advance_token() {
            opener.push_str(&start.text);
        }
        self.parse_bracketed(
            opener,
            TokenKind::MlqEnd,
            |p| p.parse_blocks(),
            |children| Node::MultiLineQuote { color, children },
        )
    }

    /// ListItem ::= ListMarker Inline
    fn parse_list_item(&mut self) -> Node {
        let marker = match self.advance_token().map(|t| t.kind) {
            Some(TokenKind::NumberMarker) => ListMarker::Number,
            Some(TokenKind::ArrowMarker) => ListMarker::Arrow,
            _ => ListMarker::Bullet,
        };
        let children = self.parse_inline();
        Node::ListItem { marker, children }
    }

    /// Inline content up to a newline, a block-level token, or the closer of
    /// any enclosing construct. None of those are consumed.
    fn parse_inline(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut buffer = String::new();
        while let Some(kind) = self.current_kind() {
            if self.stops_inline(kind) {
                break;
            }
            match kind {
                TokenKind::ColorTag
                | TokenKind::ParenStart
                | TokenKind::WikilinkStart
                | TokenKind::TitleStart
                | TokenKind::LiteralStart
                    if self.at_nesting_limit() =>
                {
                    if let Some(token) = self.advance_token() {
                        trace!("nesting limit reached at {}:{}", token.line, token.column);
                        buffer.push_str(&token.text);
                    }
                }
                TokenKind::ColorTag
                | TokenKind::ParenStart
                | TokenKind::WikilinkStart
                | TokenKind::TitleStart
                | TokenKind::LiteralStart
                | TokenKind::ChineseText
                | TokenKind::Url
                | TokenKind::Emphasis
                | TokenKind::Template => {
                    flush_text(&mut buffer, &mut nodes);
                    nodes.extend(self.parse_inline_construct(kind));
                }
                // Plain text, plus closers and markers that have no open
                // construct to close here.
                TokenKind::Text
                | TokenKind::ParenEnd
                | TokenKind::WikilinkEnd
                | TokenKind::TitleEnd
                | TokenKind::LiteralEnd
                | TokenKind::MlqEnd
                | TokenKind::MlqStart
                | TokenKind::BulletMarker
                | TokenKind::NumberMarker
                | TokenKind::ArrowMarker
                | TokenKind::Newline
                | TokenKind::SectionBreak
                | TokenKind::MoreTag => {
                    if let Some(token) = self.advance_token() {
                        buffer.push_str(&token.text);
                    }
                }
            }
        }
        flush_text(&mut buffer, &mut nodes);
        nodes
    }

    fn parse_inline_construct(&mut self, kind: TokenKind) -> Vec<Node> {
        match kind {
            TokenKind::ColorTag => self.parse_color_block(),
            TokenKind::ParenStart => self.parse_parenthesized(),
            TokenKind::WikilinkStart => self.parse_delimited(TokenKind::WikilinkEnd, |children| {
                Node::Wikilink { children }
            }),
            TokenKind::TitleStart => {
                self.parse_delimited(TokenKind::TitleEnd, |children| Node::Title { children })
            }
            TokenKind::LiteralStart => self.parse_literal(),
            _ => self.parse_leaf().into_iter().collect(),
        }
    }

    /// Single-token constructs.
    fn parse_leaf(&mut self) -> Option<Node> {
        let token = self.advance_token()?;
        let node = match token.kind {
            TokenKind::ChineseText => Node::Chinese { text: token.text },
            TokenKind::Url => Node::Url { url: token.text },
            TokenKind::Emphasis => Node::Emphasis {
                text: token.emphasis_text().to_string(),
            },
            TokenKind::Template => Node::Template {
                body: token.template_body().to_string(),
                name: token.template_name.unwrap_or_default(),
            },
            _ => Node::text(token.text),
        };
        Some(node)
    }

    /// ColorBlock ::= ColorTag Inline
    ///
    /// Inside an open parenthesis the block is bounded by the `)`; otherwise
    /// it takes the rest of the line. The line terminator closes the block.
    /// A block that runs into the end of input is unclosed and degrades,
    /// unless it already holds a nested color block.
    fn parse_color_block(&mut self) -> Vec<Node> {
        let Some(tag) = self.advance_token() else {
            return Vec::new();
        };
        let placement = if self.closers.contains(&TokenKind::ParenEnd) {
            Placement::Parenthesized
        } else {
            Placement::Line
        };
        let children = self.nested(|p| p.parse_inline());
        let nested = children
            .iter()
            .any(|n| matches!(n, Node::ColorBlock { .. }));
        if self.current_token().is_none() && !nested {
            debug!(
                "{} at {}:{} runs into end of input, keeping it as text",
                tag.text, tag.line, tag.column
            );
            return degrade(tag.text, children);
        }
        vec![Node::ColorBlock {
            color: tag.color_name().to_string(),
            placement,
            children,
        }]
    }

    /// Paren ::= "(" ColorTag Inline ")" | "(" Inline ")"
    ///
    /// A plain parenthesis stays text around its contents; one that opens
    /// with a color tag becomes a parenthesized color block.
    fn parse_parenthesized(&mut self) -> Vec<Node> {
        let Some(open) = self.advance_token() else {
            return Vec::new();
        };
        if self.check(TokenKind::ColorTag) {
            let Some(tag) = self.advance_token() else {
                return vec![Node::text(open.text)];
            };
            let color = tag.color_name().to_string();
            return self.parse_bracketed(
                format!("{}{}", open.text, tag.text),
                TokenKind::ParenEnd,
                |p| p.parse_inline(),
                |children| Node::ColorBlock {
                    color,
                    placement: Placement::Parenthesized,
                    children,
                },
            );
        }

        self.closers.push(TokenKind::ParenEnd);
        let children = self.nested(|p| p.parse_inline());
        self.closers.pop();
        match self.eat(TokenKind::ParenEnd) {
            Some(close) => {
                let mut nodes = Vec::with_capacity(children.len() + 2);
                nodes.push(Node::text(open.text));
                nodes.extend(children);
                nodes.push(Node::text(close.text));
                nodes
            }
            None => degrade(open.text, children),
        }
    }

    /// Wikilink ::= "[[" Inline "]]", Title ::= "[#" Inline "#]"
    fn parse_delimited(
        &mut self,
        closer: TokenKind,
        build: impl FnOnce(Vec<Node>) -> Node,
    ) -> Vec<Node> {
        let opener = self.advance_token().map(|t| t.text).unwrap_or_default();
        self.parse_bracketed(opener, closer, |p| p.parse_inline(), build)
    }

    /// Literal ::= "<<" Raw ">>"
    fn parse_literal(&mut self) -> Vec<Node> {
        let opener = self.advance_token().map(|t| t.text).unwrap_or_default();
        self.parse_bracketed(
            opener,
            TokenKind::LiteralEnd,
            |p| p.parse_literal_body(),
            |children| Node::Literal { children },
        )
    }

    /// Raw source text up to the matching `>>`. Nested `<< >>` pairs are
    /// counted and kept verbatim.
    fn parse_literal_body(&mut self) -> Vec<Node> {
        let mut raw = String::new();
        let mut depth = 0usize;
        while let Some(token) = self.current_token() {
            match token.kind {
                TokenKind::Newline | TokenKind::SectionBreak | TokenKind::MoreTag => break,
                TokenKind::LiteralEnd if depth == 0 => break,
                TokenKind::LiteralEnd => depth -= 1,
                TokenKind::LiteralStart => depth += 1,
                kind if self.closers.contains(&kind) => break,
                _ => {}
            }
            raw.push_str(&token.text);
            self.advance();
        }
        if raw.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(raw)]
        }
    }

    /// Shared shape of every bracketed construct: parse the body with
    /// `closer` registered, then either build the node or degrade to text.
    fn parse_bracketed(
        &mut self,
        opener: String,
        closer: TokenKind,
        body: impl FnOnce(&mut Self) -> Vec<Node>,
        build: impl FnOnce(Vec<Node>) -> Node,
    ) -> Vec<Node> {
        self.closers.push(closer);
        let children = self.nested(body);
        self.closers.pop();
        if self.match_token(closer) {
            vec![build(children)]
        } else {
            match self.current_token() {
                Some(t) => debug!(
                    "{:?} not closed before {:?} at {}:{}, keeping {:?} as text",
                    closer, t.kind, t.line, t.column, opener
                ),
                None => debug!(
                    "{:?} not closed before end of input, keeping {:?} as text",
                    closer, opener
                ),
            }
            degrade(opener, children)
        }
    }

    fn nested<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    fn at_nesting_limit(&self) -> bool {
        self.depth >= MAX_NESTING
    }

    fn stops_inline(&self, kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Newline | TokenKind::SectionBreak | TokenKind::MoreTag | TokenKind::MlqStart
        ) || self.closes_enclosing(kind)
    }

    fn closes_enclosing(&self, kind: TokenKind) -> bool {
        self.closers.contains(&kind)
    }

    // === Checkpoints ===

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            closers: self.closers.len(),
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.closers.truncate(checkpoint.closers);
    }

    /// Runs `rule`, keeping its progress if it returns `Some` and rewinding
    /// to where it started otherwise.
    pub fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let checkpoint = self.checkpoint();
        let result = rule(self);
        if result.is_none() {
            trace!(
                "rewinding from token {} to {}",
                self.position,
                checkpoint.position
            );
            self.restore(checkpoint);
        }
        result
    }

    // === Tokenizer Helper Methods ===

    pub fn position(&self) -> usize {
        self.position
    }

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current_token().map(|t| t.kind)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn advance_token(&mut self) -> Option<Token> {
        let token = self.current_token().cloned();
        self.advance();
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.advance_token()
        } else {
            None
        }
    }
}

fn flush_text(buffer: &mut String, nodes: &mut Vec<Node>) {
    if !buffer.is_empty() {
        nodes.push(Node::text(std::mem::take(buffer)));
    }
}

/// Replaces an unclosed construct with its opening delimiter as text,
/// followed by everything parsed inside it.
fn degrade(opener: String, children: Vec<Node>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(children.len() + 1);
    nodes.push(Node::text(opener));
    nodes.extend(children);
    nodes
}

/// Parses a token stream into a document. Never fails.
pub fn parse(tokens: Vec<Token>) -> AmlDocument {
    Parser::new(tokens).parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::serialization::flatten_text;

    fn parse_ok(source: &str) -> AmlDocument {
        parse(tokenize(source).unwrap())
    }

    fn text(s: &str) -> Node {
        Node::text(s)
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse_ok("").children, vec![]);
    }

    #[test]
    fn test_plain_lines() {
        let doc = parse_ok("one\ntwo");
        assert_eq!(doc.children, vec![text("one"), Node::Newline, text("two")]);
    }

    #[test]
    fn test_line_color_block() {
        let doc = parse_ok("<red>hot take\nnext");
        assert_eq!(
            doc.children,
            vec![
                Node::ColorBlock {
                    color: "red".into(),
                    placement: Placement::Line,
                    children: vec![text("hot take")],
                },
                Node::Newline,
                text("next"),
            ]
        );
    }

    #[test]
    fn test_line_color_block_at_end_of_input_degrades() {
        let doc = parse_ok("<red>Unclosed");
        assert_eq!(doc.children, vec![text("<red>"), text("Unclosed")]);

        let doc = parse_ok("<red>closed by its line\n");
        assert!(matches!(doc.children[0], Node::ColorBlock { .. }));
    }

    #[test]
    fn test_nested_parenthesized_color() {
        let doc = parse_ok("<red>Alert: (<blue>Critical update) required");
        assert_eq!(
            doc.children,
            vec![Node::ColorBlock {
                color: "red".into(),
                placement: Placement::Line,
                children: vec![
                    text("Alert: "),
                    Node::ColorBlock {
                        color: "blue".into(),
                        placement: Placement::Parenthesized,
                        children: vec![text("Critical update")],
                    },
                    text(" required"),
                ],
            }]
        );
    }

    #[test]
    fn test_plain_parens_stay_text() {
        let doc = parse_ok("a (b) c");
        assert_eq!(
            doc.children,
            vec![text("a "), text("("), text("b"), text(")"), text(" c")]
        );
    }

    #[test]
    fn test_unclosed_parenthesized_color_degrades() {
        let doc = parse_ok("(<red>Unclosed");
        assert_eq!(doc.children, vec![text("(<red>"), text("Unclosed")]);
    }

    #[test]
    fn test_color_inside_open_paren_is_parenthesized() {
        let doc = parse_ok("(see <gray>old)");
        assert_eq!(
            doc.children,
            vec![
                text("("),
                text("see "),
                Node::ColorBlock {
                    color: "gray".into(),
                    placement: Placement::Parenthesized,
                    children: vec![text("old")],
                },
                text(")"),
            ]
        );
    }

    #[test]
    fn test_list_items_are_individual() {
        let doc = parse_ok("* a\n* b\n# c");
        let markers: Vec<ListMarker> = doc
            .children
            .iter()
            .filter_map(|n| match n {
                Node::ListItem { marker, .. } => Some(*marker),
                _ => None,
            })
            .collect();
        assert_eq!(
            markers,
            vec![ListMarker::Bullet, ListMarker::Bullet, ListMarker::Number]
        );
        assert_eq!(doc.children.len(), 5);
    }

    #[test]
    fn test_quote_spans_lines() {
        let doc = parse_ok("<<<\nfirst\n\nsecond\n>>>");
        assert_eq!(
            doc.children,
            vec![Node::MultiLineQuote {
                color: None,
                children: vec![
                    Node::Newline,
                    text("first"),
                    Node::Newline,
                    Node::Newline,
                    text("second"),
                    Node::Newline,
                ],
            }]
        );
    }

    #[test]
    fn test_colored_quote() {
        let doc = parse_ok("<blue> <<<inside>>>");
        assert_eq!(
            doc.children,
            vec![Node::MultiLineQuote {
                color: Some("blue".into()),
                children: vec![text("inside")],
            }]
        );
    }

    #[test]
    fn test_color_without_quote_rewinds() {
        let doc = parse_ok("<blue> just a line\n");
        assert!(matches!(
            &doc.children[0],
            Node::ColorBlock { color, placement: Placement::Line, children }
                if color == "blue" && children == &vec![text(" just a line")]
        ));
    }

    #[test]
    fn test_unclosed_quote_degrades() {
        let doc = parse_ok("<<<never closed\n* item");
        assert_eq!(doc.children[0], text("<<<"));
        assert_eq!(doc.children[1], text("never closed"));
        assert_eq!(doc.children[2], Node::Newline);
        assert!(matches!(doc.children[3], Node::ListItem { .. }));
    }

    #[test]
    fn test_unclosed_colored_quote_keeps_tag_text() {
        let doc = parse_ok("<red> <<<open");
        assert_eq!(doc.children, vec![text("<red> <<<"), text("open")]);
    }

    #[test]
    fn test_nested_quotes() {
        let doc = parse_ok("<<<a <<<b>>> c>>>");
        match &doc.children[0] {
            Node::MultiLineQuote { children, .. } => {
                assert_eq!(children[0], text("a "));
                assert!(matches!(children[1], Node::MultiLineQuote { .. }));
                assert_eq!(children[2], text(" c"));
            }
            other => panic!("expected quote, got {other:?}"),
        }
    }

    #[test]
    fn test_wikilink_and_title() {
        let doc = parse_ok("[[Alan Turing]] and [#Part One#]");
        assert_eq!(
            doc.children,
            vec![
                Node::Wikilink {
                    children: vec![text("Alan Turing")]
                },
                text(" and "),
                Node::Title {
                    children: vec![text("Part One")]
                },
            ]
        );
    }

    #[test]
    fn test_unclosed_wikilink_stops_at_newline() {
        let doc = parse_ok("[[open\n]]");
        assert_eq!(
            doc.children,
            vec![text("[["), text("open"), Node::Newline, text("]]")]
        );
    }

    #[test]
    fn test_wikilink_closed_by_outer_paren_degrades() {
        let doc = parse_ok("(<red>see [[x)");
        assert_eq!(
            doc.children,
            vec![Node::ColorBlock {
                color: "red".into(),
                placement: Placement::Parenthesized,
                children: vec![text("see "), text("[["), text("x")],
            }]
        );
    }

    #[test]
    fn test_literal_is_verbatim() {
        let doc = parse_ok("<<<red> *not em* [[x]]>>");
        // `<<<` wins over `<<`, so this is an unclosed quote.
        assert_eq!(doc.children[0], text("<<<"));

        let doc = parse_ok("<< <red> *x* [[y]] >>");
        assert_eq!(
            doc.children,
            vec![Node::Literal {
                children: vec![text(" <red> *x* [[y]] ")]
            }]
        );
    }

    #[test]
    fn test_literal_nesting() {
        let doc = parse_ok("<<a <<b>> c>>");
        assert_eq!(
            doc.children,
            vec![Node::Literal {
                children: vec![text("a <<b>> c")]
            }]
        );
    }

    #[test]
    fn test_unclosed_literal_degrades() {
        let doc = parse_ok("<<raw");
        assert_eq!(doc.children, vec![text("<<"), text("raw")]);
    }

    #[test]
    fn test_leaves() {
        let doc = parse_ok("中文 https://x.org *em* {{isbn|123}}");
        assert_eq!(
            doc.children,
            vec![
                Node::Chinese {
                    text: "中文".into()
                },
                text(" "),
                Node::Url {
                    url: "https://x.org".into()
                },
                text(" "),
                Node::Emphasis { text: "em".into() },
                text(" "),
                Node::Template {
                    name: "isbn".into(),
                    body: "123".into()
                },
            ]
        );
    }

    #[test]
    fn test_stray_closers_are_text() {
        let doc = parse_ok("a ) b ]] c #] d >> e >>>");
        assert_eq!(doc.children, vec![text("a ) b ]] c #] d >> e >>>")]);
    }

    #[test]
    fn test_section_break_and_more_tag() {
        let doc = parse_ok("intro\n--MORE--\n----\nrest");
        assert_eq!(
            doc.children,
            vec![
                text("intro"),
                Node::Newline,
                Node::MoreTag,
                Node::Newline,
                Node::SectionBreak,
                Node::Newline,
                text("rest"),
            ]
        );
    }

    #[test]
    fn test_openers_past_nesting_limit_are_text() {
        for opener in ["(", "[[", "<red>", "<<<\n"] {
            let source = opener.repeat(MAX_NESTING + 10);
            let doc = parse_ok(&source);
            assert_eq!(flatten_text(&doc.children), source);
        }
    }

    #[test]
    fn test_nesting_below_limit_still_parses() {
        let source = format!("{}x{}", "[[".repeat(MAX_NESTING), "]]".repeat(MAX_NESTING));
        let mut node = &parse_ok(&source).children[0];
        let mut depth = 1;
        while let Node::Wikilink { children } = node {
            match children.first() {
                Some(inner @ Node::Wikilink { .. }) => {
                    node = inner;
                    depth += 1;
                }
                _ => break,
            }
        }
        assert_eq!(depth, MAX_NESTING);
    }

    #[test]
    fn test_attempt_rewinds_on_none() {
        let mut parser = Parser::from_source("<red> text").unwrap();
        let before = parser.checkpoint();
        let result: Option<()> = parser.attempt(|p| {
            p.advance();
            p.closers.push(TokenKind::ParenEnd);
            None
        });
        assert!(result.is_none());
        assert_eq!(parser.checkpoint(), before);

        let kept = parser.attempt(|p| {
            p.advance();
            Some(())
        });
        assert!(kept.is_some());
        assert_eq!(parser.position(), 1);
    }
}
