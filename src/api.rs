use crate::ast::AmlDocument;
use crate::config::RenderConfig;
use crate::error::AmlError;
use crate::generator::{Annotations, HtmlGenerator, Quote};
use crate::lexer::{Lexer, Token};
use crate::parser::Parser;
use crate::serialization::to_plain_text;

/// The result of running an AML source through the lexer and parser.
///
/// Holds both the token stream and the tree, and provides the renderings
/// callers usually want: full HTML, a preview cut at the more-tag, plain
/// text, and JSON/YAML dumps of the tree.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub tokens: Vec<Token>,
    pub document: AmlDocument,
}

impl ProcessedDocument {
    /// Renders the whole document with default options and no collaborators.
    #[must_use]
    pub fn to_html(&self) -> String {
        HtmlGenerator::new().render(&self.document)
    }

    /// Renders the whole document with the given options and optional
    /// annotation data.
    #[must_use]
    pub fn to_html_with(&self, config: &RenderConfig, annotations: Option<&Annotations>) -> String {
        let mut generator = HtmlGenerator::new().with_config(config.clone());
        if let Some(annotations) = annotations {
            generator = generator.with_annotations(annotations);
        }
        generator.render(&self.document)
    }

    /// Renders only the blocks before the first `--MORE--`.
    #[must_use]
    pub fn preview_html(&self) -> String {
        HtmlGenerator::new().render_nodes(self.document.before_more_tag())
    }

    #[must_use]
    pub fn has_more_tag(&self) -> bool {
        self.document.has_more_tag()
    }

    #[must_use]
    pub fn to_plain_text(&self) -> String {
        to_plain_text(&self.document)
    }

    /// The hanzi runs an annotation service should be asked about.
    #[must_use]
    pub fn chinese_runs(&self) -> Vec<String> {
        self.document.chinese_runs()
    }

    /// Quotes from quote-bearing color blocks, in document order.
    #[must_use]
    pub fn quotes(&self) -> Vec<Quote> {
        let mut quotes = Vec::new();
        let mut collect = |quote: Quote| quotes.push(quote);
        HtmlGenerator::new()
            .with_quote_sink(&mut collect)
            .render(&self.document);
        quotes
    }

    /// Serializes the tree into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.document)
    }

    /// Serializes the tree into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.document)
    }
}

/// Lexes and parses an AML source string.
///
/// `file_name` is only used to label diagnostics.
///
/// # Errors
///
/// Returns an `AmlError` only if the lexer's internal invariant breaks;
/// malformed markup is never an error.
pub fn process(source: &str, file_name: &str) -> Result<ProcessedDocument, AmlError> {
    let tokens = Lexer::new_with_name(source, file_name.to_string()).lex()?;
    let document = Parser::new(tokens.clone()).parse_document();
    Ok(ProcessedDocument { tokens, document })
}

/// Converts an AML source string straight to HTML.
///
/// # Errors
///
/// See [`process`].
pub fn to_html(source: &str) -> Result<String, AmlError> {
    process(source, "source.aml").map(|processed| processed.to_html())
}
