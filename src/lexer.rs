use crate::colors;
use crate::error::{AmlError, LexerError};
use crate::utils::is_hanzi;
use log::{debug, trace};
use miette::NamedSource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Longest emphasis interior, in characters, that still counts as `*emphasis*`.
pub const MAX_EMPHASIS_CHARS: usize = 40;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^https?://[^\s<>"'()\[\]{}]+"#).unwrap());

/// Represents the different kinds of tokens that the lexer can produce.
/// Each token is a meaningful unit of AML syntax; everything else is `Text`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum TokenKind {
    // == Block-level ==
    /// Exactly four dashes followed by whitespace or end of input: `----`
    SectionBreak,
    /// The preview cut marker: `--MORE--`
    MoreTag,
    /// A line ending, `\n` or `\r\n`.
    Newline,
    /// `*` at the start of a line, followed by whitespace.
    BulletMarker,
    /// `#` at the start of a line, followed by whitespace.
    NumberMarker,
    /// `>` at the start of a line, followed by whitespace.
    ArrowMarker,
    /// Multi-line quote opener: `<<<`
    MlqStart,
    /// Multi-line quote closer: `>>>`
    MlqEnd,

    // == Paired delimiters ==
    /// `(`
    ParenStart,
    /// `)`
    ParenEnd,
    /// `[[`
    WikilinkStart,
    /// `]]`
    WikilinkEnd,
    /// `[#`
    TitleStart,
    /// `#]`
    TitleEnd,
    /// `<<`
    LiteralStart,
    /// `>>`
    LiteralEnd,

    // == Self-contained constructs ==
    /// A registered color tag such as `<red>`.
    ColorTag,
    /// `*short text*` on a single line.
    Emphasis,
    /// `{{name|body}}`, with balanced inner braces.
    Template,
    /// A maximal run of CJK unified ideographs.
    ChineseText,
    /// An `http://` or `https://` URL.
    Url,

    /// Anything else.
    Text,
}

/// A token with its kind, source text and position.
///
/// `text` is always the exact source slice, so concatenating the text of
/// every token reproduces the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column (in characters) of the first character.
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, line: usize, column: usize, pos_start: usize) -> Token {
        Token {
            kind,
            text: text.to_string(),
            line,
            column,
            template_name: None,
            pos_start,
            pos_end: pos_start + text.len(),
        }
    }

    /// The color name of a `ColorTag` token (`<red>` -> `red`).
    pub fn color_name(&self) -> &str {
        self.text.trim_start_matches('<').trim_end_matches('>')
    }

    /// The interior of an `Emphasis` token, without the asterisks.
    pub fn emphasis_text(&self) -> &str {
        self.text
            .strip_prefix('*')
            .and_then(|t| t.strip_suffix('*'))
            .unwrap_or(&self.text)
    }

    /// The body of a `Template` token: everything between `name|` and the closing `}}`.
    pub fn template_body(&self) -> &str {
        let name_len = self.template_name.as_ref().map_or(0, String::len);
        let start = 2 + name_len + 1;
        let end = self.text.len().saturating_sub(2);
        self.text.get(start..end).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    position: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn start() -> Self {
        Cursor {
            position: 0,
            line: 1,
            column: 1,
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    name: String,
    cursor: Cursor,
    pending: String,
    pending_start: Cursor,
    tokens: Vec<Token>,
    /// Built on the first `{{`, see [`template_closers`].
    template_closers: Option<Vec<Option<usize>>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::new_with_name(input, "source.aml".to_string())
    }

    pub fn new_with_name(input: &'a str, name: String) -> Self {
        Self {
            input,
            name,
            cursor: Cursor::start(),
            pending: String::new(),
            pending_start: Cursor::start(),
            tokens: Vec::new(),
            template_closers: None,
        }
    }

    /// Tokenizes the whole input.
    ///
    /// Every character ends up in exactly one token. The only failure is the
    /// cursor not moving after a step, which means a matcher reported a
    /// zero-width construct.
    pub fn lex(&mut self) -> Result<Vec<Token>, AmlError> {
        while let Some(c) = self.peek() {
            let before = self.cursor;
            if self.may_start_construct(c) {
                if let Some(token) = self.next_construct() {
                    self.flush_text();
                    trace!(
                        "{:?} {:?} at {}:{}",
                        token.kind,
                        token.text,
                        token.line,
                        token.column
                    );
                    self.tokens.push(token);
                    self.ensure_progress(before)?;
                    continue;
                }
            }
            self.push_text_char();
            self.ensure_progress(before)?;
        }
        self.flush_text();
        Ok(std::mem::take(&mut self.tokens))
    }

    fn ensure_progress(&self, before: Cursor) -> Result<(), AmlError> {
        if self.cursor.position > before.position {
            return Ok(());
        }
        Err(LexerError::Stalled {
            src: NamedSource::new(self.name.clone(), self.input.to_string()),
            span: (before.position, 0).into(),
            line: before.line,
            column: before.column,
        }
        .into())
    }

    // === Cursor helpers ===

    fn rest(&self) -> &'a str {
        &self.input[self.cursor.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor.position += c.len_utf8();
        if c == '\n' {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        Some(c)
    }

    fn previous_char(&self) -> Option<char> {
        self.input[..self.cursor.position].chars().next_back()
    }

    /// Consumes `len` bytes as a single token of the given kind.
    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.cursor;
        let end = start.position + len;
        while self.cursor.position < end {
            if self.advance().is_none() {
                break;
            }
        }
        let text = &self.input[start.position..self.cursor.position];
        Token::new(kind, text, start.line, start.column, start.position)
    }

    fn push_text_char(&mut self) {
        if self.pending.is_empty() {
            self.pending_start = self.cursor;
        }
        if let Some(c) = self.advance() {
            self.pending.push(c);
        }
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let start = self.pending_start;
        self.tokens.push(Token::new(
            TokenKind::Text,
            &text,
            start.line,
            start.column,
            start.position,
        ));
    }

    /// Characters that end a running text buffer. Line starts are included so
    /// list markers get a chance before leading whitespace is buffered.
    fn may_start_construct(&self, c: char) -> bool {
        self.cursor.column == 1
            || matches!(
                c,
                '<' | '>' | '*' | '#' | '{' | '}' | '(' | ')' | '[' | ']' | '-' | '\n' | '\r'
            )
            || is_hanzi(c)
            || self.rest().starts_with("http")
    }

    // === Matchers ===

    /// Tries every matcher in priority order. Longer delimiters sharing a
    /// prefix with shorter ones are tried first.
    fn next_construct(&mut self) -> Option<Token> {
        self.match_newline()
            .or_else(|| self.match_more_tag())
            .or_else(|| self.match_section_break())
            .or_else(|| self.match_list_marker())
            .or_else(|| self.match_quote_delimiter())
            .or_else(|| self.match_literal_delimiter())
            .or_else(|| self.match_color_tag())
            .or_else(|| self.match_emphasis())
            .or_else(|| self.match_template())
            .or_else(|| self.match_bracket_pair())
            .or_else(|| self.match_paren())
            .or_else(|| self.match_chinese())
            .or_else(|| self.match_url())
    }

    fn match_newline(&mut self) -> Option<Token> {
        let rest = self.rest();
        if rest.starts_with("\r\n") {
            Some(self.take(TokenKind::Newline, 2))
        } else if rest.starts_with('\n') {
            Some(self.take(TokenKind::Newline, 1))
        } else {
            None
        }
    }

    fn match_more_tag(&mut self) -> Option<Token> {
        if self.rest().starts_with("--MORE--") {
            Some(self.take(TokenKind::MoreTag, 8))
        } else {
            None
        }
    }

    /// `----` exactly, after the start of input or whitespace. A longer dash
    /// run is text from its first dash onwards.
    fn match_section_break(&mut self) -> Option<Token> {
        let rest = self.rest();
        if !rest.starts_with("----") {
            return None;
        }
        if self.previous_char().is_some_and(|c| !c.is_whitespace()) {
            return None;
        }
        match rest[4..].chars().next() {
            None => Some(self.take(TokenKind::SectionBreak, 4)),
            Some(c) if c.is_whitespace() => Some(self.take(TokenKind::SectionBreak, 4)),
            _ => None,
        }
    }

    /// `*`, `#` or `>` at the start of a line (after optional indentation)
    /// and followed by whitespace. The token keeps the indentation and the
    /// whitespace after the marker.
    fn match_list_marker(&mut self) -> Option<Token> {
        if self.cursor.column != 1 {
            return None;
        }
        let rest = self.rest();
        let indent = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let after_indent = &rest[indent..];
        let kind = match after_indent.chars().next()? {
            '*' => TokenKind::BulletMarker,
            '#' => TokenKind::NumberMarker,
            '>' => TokenKind::ArrowMarker,
            _ => return None,
        };
        let after_marker = &after_indent[1..];
        let gap = after_marker.len() - after_marker.trim_start_matches([' ', '\t']).len();
        if gap == 0 {
            return None;
        }
        Some(self.take(kind, indent + 1 + gap))
    }

    fn match_quote_delimiter(&mut self) -> Option<Token> {
        let rest = self.rest();
        if rest.starts_with("<<<") {
            Some(self.take(TokenKind::MlqStart, 3))
        } else if rest.starts_with(">>>") {
            Some(self.take(TokenKind::MlqEnd, 3))
        } else {
            None
        }
    }

    fn match_literal_delimiter(&mut self) -> Option<Token> {
        let rest = self.rest();
        if rest.starts_with("<<") {
            Some(self.take(TokenKind::LiteralStart, 2))
        } else if rest.starts_with(">>") {
            Some(self.take(TokenKind::LiteralEnd, 2))
        } else {
            None
        }
    }

    fn match_color_tag(&mut self) -> Option<Token> {
        let inner = self.rest().strip_prefix('<')?;
        let name_len = inner
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(inner.len());
        if name_len == 0 || !inner[name_len..].starts_with('>') {
            return None;
        }
        let name = &inner[..name_len];
        if !colors::is_color(name) {
            debug!(
                "unknown color tag <{}> at {}:{}, keeping it as text",
                name, self.cursor.line, self.cursor.column
            );
            return None;
        }
        Some(self.take(TokenKind::ColorTag, name_len + 2))
    }

    fn match_emphasis(&mut self) -> Option<Token> {
        let inner = self.rest().strip_prefix('*')?;
        let mut chars = 0;
        for (offset, c) in inner.char_indices() {
            match c {
                '\n' => break,
                '*' if chars > 0 => {
                    let interior = &inner[..offset];
                    if interior.starts_with(char::is_whitespace)
                        || interior.ends_with(char::is_whitespace)
                    {
                        break;
                    }
                    return Some(self.take(TokenKind::Emphasis, offset + 2));
                }
                '*' => return None,
                _ => {
                    chars += 1;
                    if chars > MAX_EMPHASIS_CHARS {
                        break;
                    }
                }
            }
        }
        debug!(
            "'*' at {}:{} does not close within {} characters on its line",
            self.cursor.line, self.cursor.column, MAX_EMPHASIS_CHARS
        );
        None
    }

    /// `{{name|body}}` where `body` may contain nested, balanced `{{ }}` pairs.
    fn match_template(&mut self) -> Option<Token> {
        let inner = self.rest().strip_prefix("{{")?;
        let name_len = inner
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(inner.len());
        if name_len == 0 || !inner[name_len..].starts_with('|') {
            return None;
        }
        let body_start = self.cursor.position + 2 + name_len + 1;
        let input = self.input;
        let closers = self
            .template_closers
            .get_or_insert_with(|| template_closers(input));
        let closing = closers[body_start];
        if let Some(end) = closing {
            let name = inner[..name_len].to_string();
            let mut token = self.take(TokenKind::Template, end - self.cursor.position);
            token.template_name = Some(name);
            return Some(token);
        }
        debug!(
            "unterminated template at {}:{}, keeping it as text",
            self.cursor.line, self.cursor.column
        );
        None
    }

    fn match_bracket_pair(&mut self) -> Option<Token> {
        let rest = self.rest();
        let kind = if rest.starts_with("[[") {
            TokenKind::WikilinkStart
        } else if rest.starts_with("]]") {
            TokenKind::WikilinkEnd
        } else if rest.starts_with("[#") {
            TokenKind::TitleStart
        } else if rest.starts_with("#]") {
            TokenKind::TitleEnd
        } else {
            return None;
        };
        Some(self.take(kind, 2))
    }

    fn match_paren(&mut self) -> Option<Token> {
        match self.peek()? {
            '(' => Some(self.take(TokenKind::ParenStart, 1)),
            ')' => Some(self.take(TokenKind::ParenEnd, 1)),
            _ => None,
        }
    }

    fn match_chinese(&mut self) -> Option<Token> {
        let rest = self.rest();
        let len = rest.find(|c: char| !is_hanzi(c)).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        Some(self.take(TokenKind::ChineseText, len))
    }

    /// Trailing sentence punctuation is left out of the URL.
    fn match_url(&mut self) -> Option<Token> {
        let found = URL_PATTERN.find(self.rest())?;
        let url = found
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if url.ends_with("//") {
            return None;
        }
        Some(self.take(TokenKind::Url, url.len()))
    }
}

/// For every byte offset `i`, the offset just past the `}}` that closes a
/// template body starting at `i`, if there is one. Nested `{{ }}` pairs in
/// the body are skipped. Built right to left in one pass, so each template
/// opener is resolved by a lookup instead of a scan to the end of input.
fn template_closers(input: &str) -> Vec<Option<usize>> {
    let bytes = input.as_bytes();
    let mut closers = vec![None; bytes.len() + 1];
    for i in (0..bytes.len()).rev() {
        let pair = |c: u8| bytes[i] == c && bytes.get(i + 1) == Some(&c);
        closers[i] = if pair(b'}') {
            Some(i + 2)
        } else if pair(b'{') {
            closers[i + 2].and_then(|inner| closers[inner])
        } else {
            closers[i + 1]
        };
    }
    closers
}

/// Tokenizes an AML document. See [`Lexer::lex`].
pub fn tokenize(text: &str) -> Result<Vec<Token>, AmlError> {
    Lexer::new(text).lex()
}
