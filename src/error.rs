use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Top-level error for the AML pipeline.
///
/// Malformed markup is never reported here: unknown tags and unclosed
/// brackets degrade to text inside the parser. What remains are defects
/// in the lexer itself and configuration that failed to deserialize.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum AmlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexer(#[from] LexerError),

    #[error("Invalid render configuration: {message}")]
    #[diagnostic(
        code(config::invalid),
        help("Check the field names and value types of the render configuration.")
    )]
    Config { message: String },
}

#[derive(Error, Debug, Diagnostic, Clone)]
#[error("Lexer Error")]
pub enum LexerError {
    #[error("Lexer failed to advance at line {line}, column {column}")]
    #[diagnostic(
        code(lexer::stalled),
        help("No matcher consumed input at this position. This is a bug in the lexer's matcher table, not in the document.")
    )]
    Stalled {
        #[source_code]
        src: NamedSource<String>,
        #[label("Cursor stuck here")]
        span: SourceSpan,
        line: usize,
        column: usize,
    },
}
