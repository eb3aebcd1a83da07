//! C front end for conwit.
//!
//! Reads the (preprocessed) program under validation into a tree the
//! instrumentation engine can rewrite, and prints it back as compilable C.
//!
//! # Modules
//!
//! - [`sanitize`] -- Length-preserving removal of GNU extensions
//! - [`lexer`] -- Tokens with byte spans and lines
//! - [`parser`] -- Structural parser producing [`TranslationUnit`]s
//! - [`ast`] -- Statement and expression tree
//! - [`render`] -- Tree back to C text
//! - [`error`] -- Parse failures

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod sanitize;

pub use ast::{Declaration, Expr, ExternalDecl, FunctionDef, Stmt, StmtKind, TranslationUnit};
pub use error::ParseError;
pub use parser::parse;
pub use render::{render, render_expr};
pub use sanitize::Sanitizer;

/// Sanitizes `src` and parses the result. Returns the sanitized text too,
/// since witness coordinates are resolved against it.
pub fn parse_sanitized(src: &str) -> Result<(String, TranslationUnit), ParseError> {
    let sanitized = Sanitizer::new()?.sanitize(src);
    let tu = parse(&sanitized)?;
    Ok((sanitized, tu))
}
