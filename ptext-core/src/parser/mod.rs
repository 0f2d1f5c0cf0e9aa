//! Content stream parsing
//!
//! Turns the bytes of a content stream into operands and operator tokens, and
//! reads single PDF values back from their serialized form.

pub mod content;

pub use self::content::{parse_object, ContentItem, ContentParser, ContentTokenizer};

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Content parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Unexpected end of content")]
    UnexpectedEof,
}
