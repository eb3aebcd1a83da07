//! Front-end error types.

use thiserror::Error;

/// Errors produced while lexing or parsing C source.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A string or character literal, or a block comment, never closes.
    #[error("line {line}: unterminated {what}")]
    Unterminated { what: &'static str, line: usize },

    /// A token that cannot start or continue the construct being parsed.
    #[error("line {line}: expected {expected}, found '{found}'")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
    },

    /// Input ended in the middle of a construct.
    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEof { context: &'static str },

    /// Sanitizer patterns failed to compile.
    #[error("sanitizer pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl ParseError {
    /// Short reason reported as `Verdict: <reason>`.
    pub fn verdict_reason(&self) -> &'static str {
        "Parsing failed"
    }
}
