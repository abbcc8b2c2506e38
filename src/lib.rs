pub mod api;
pub mod ast;
pub mod colors;
pub mod config;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod serialization;
pub mod utils;

pub use api::{process, to_html, ProcessedDocument};
pub use error::AmlError;
pub use generator::render;
pub use lexer::tokenize;
pub use parser::parse;
