//! Structural C parser.
//!
//! Splits a translation unit into function definitions and opaque top-level
//! items, then parses function bodies into [`Stmt`] trees. Declaration versus
//! expression statements are told apart by leading type keywords, typedef
//! names seen so far, and the `T x` / `T *x` shapes.

use std::collections::HashSet;

use crate::ast::{Declaration, Expr, ExternalDecl, FunctionDef, Stmt, StmtKind, TranslationUnit};
use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};

const TYPE_WORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
    "_Complex", "struct", "union", "enum", "const", "volatile", "static", "extern", "register",
    "auto", "typedef", "inline", "restrict", "_Atomic", "_Thread_local", "__thread", "_Alignas",
    "_Noreturn", "__int128", "_Static_assert", "typeof", "__typeof__",
];

const KNOWN_TYPEDEFS: &[&str] = &[
    "size_t", "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t", "int8_t", "int16_t", "int32_t",
    "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "bool", "wchar_t", "va_list",
    "FILE", "off_t", "time_t", "pthread_t", "pthread_attr_t", "pthread_mutex_t",
    "pthread_mutexattr_t", "pthread_cond_t", "pthread_condattr_t", "pthread_rwlock_t",
    "pthread_spinlock_t", "pthread_barrier_t", "pthread_key_t", "pthread_once_t", "sem_t",
    "atomic_int", "atomic_bool", "atomic_long", "mtx_t", "cnd_t", "thrd_t",
];

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>="];

/// Parses sanitized C source into a [`TranslationUnit`].
pub fn parse(src: &str) -> Result<TranslationUnit, ParseError> {
    let mut parser = Parser {
        src,
        tokens: tokenize(src)?,
        pos: 0,
        typedefs: KNOWN_TYPEDEFS.iter().map(|s| s.to_string()).collect(),
    };
    parser.translation_unit()
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    typedefs: HashSet<String>,
}

fn opens(text: &str) -> bool {
    matches!(text, "(" | "[" | "{")
}

fn closes(text: &str) -> bool {
    matches!(text, ")" | "]" | "}")
}

impl<'a> Parser<'a> {
    // -----------------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------------

    fn text(&self, idx: usize) -> &'a str {
        self.tokens
            .get(idx)
            .map_or("", |t| &self.src[t.start..t.end])
    }

    fn kind(&self, idx: usize) -> Option<TokenKind> {
        self.tokens.get(idx).map(|t| t.kind)
    }

    fn line(&self, idx: usize) -> Option<usize> {
        self.tokens.get(idx).map(|t| t.line)
    }

    /// Source text from token `from` through token `to - 1`.
    fn slice(&self, from: usize, to: usize) -> String {
        if from >= to || to > self.tokens.len() {
            return String::new();
        }
        self.src[self.tokens[from].start..self.tokens[to - 1].end].to_string()
    }

    fn unexpected(&self, idx: usize, expected: &str) -> ParseError {
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: self.text(idx).to_string(),
            line: self.line(idx).unwrap_or(0),
        }
    }

    fn expect(&mut self, text: &str, context: &'static str) -> Result<usize, ParseError> {
        if self.pos >= self.tokens.len() {
            return Err(ParseError::UnexpectedEof { context });
        }
        if self.text(self.pos) != text {
            return Err(self.unexpected(self.pos, &format!("'{text}'")));
        }
        self.pos += 1;
        Ok(self.pos - 1)
    }

    /// Index of the bracket closing the one at `open`.
    fn matching(&self, open: usize) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        for idx in open..self.tokens.len() {
            let text = self.text(idx);
            if opens(text) {
                depth += 1;
            } else if closes(text) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(idx);
                }
            }
        }
        Err(ParseError::UnexpectedEof {
            context: "bracketed expression",
        })
    }

    /// First token in `[from, to)` outside any brackets satisfying `pred`.
    fn find_top_level(&self, from: usize, to: usize, pred: impl Fn(&str) -> bool) -> Option<usize> {
        let mut depth = 0i32;
        for idx in from..to {
            let text = self.text(idx);
            if opens(text) {
                depth += 1;
            } else if closes(text) {
                depth -= 1;
            } else if depth == 0 && self.kind(idx) == Some(TokenKind::Punct) && pred(text) {
                return Some(idx);
            }
        }
        None
    }

    /// Index of the `;` ending the statement that starts at `from`.
    fn statement_end(&self, from: usize) -> Result<usize, ParseError> {
        let mut depth = 0i32;
        for idx in from..self.tokens.len() {
            match self.text(idx) {
                t if opens(t) => depth += 1,
                t if closes(t) => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(self.unexpected(idx, "';'"));
                    }
                }
                ";" if depth == 0 => return Ok(idx),
                _ => {}
            }
        }
        Err(ParseError::UnexpectedEof {
            context: "statement",
        })
    }

    /// Index of the `:` ending a `case` label, skipping `?:` pairs.
    fn label_end(&self, from: usize) -> Result<usize, ParseError> {
        let mut pending_ternaries = 0usize;
        for idx in from..self.tokens.len() {
            match self.text(idx) {
                "?" => pending_ternaries += 1,
                ":" if pending_ternaries > 0 => pending_ternaries -= 1,
                ":" => return Ok(idx),
                ";" | "{" | "}" => return Err(self.unexpected(idx, "':'")),
                _ => {}
            }
        }
        Err(ParseError::UnexpectedEof { context: "label" })
    }

    // -----------------------------------------------------------------------
    // Top level
    // -----------------------------------------------------------------------

    fn translation_unit(&mut self) -> Result<TranslationUnit, ParseError> {
        let mut items = Vec::new();
        while self.pos < self.tokens.len() {
            let start = self.pos;
            if self.kind(start) == Some(TokenKind::Directive) {
                items.push(ExternalDecl::Opaque {
                    text: self.text(start).to_string(),
                    line: self.line(start),
                });
                self.pos += 1;
                continue;
            }

            let mut depth = 0i32;
            let mut idx = start;
            loop {
                if idx >= self.tokens.len() {
                    return Err(ParseError::UnexpectedEof {
                        context: "top-level declaration",
                    });
                }
                match self.text(idx) {
                    "{" if depth == 0 && idx > start && self.text(idx - 1) == ")" => {
                        items.push(self.function_definition(start, idx)?);
                        break;
                    }
                    t if opens(t) => depth += 1,
                    t if closes(t) => depth -= 1,
                    ";" if depth == 0 => {
                        if self.text(start) == "typedef" {
                            self.register_typedef(start, idx);
                        }
                        items.push(ExternalDecl::Opaque {
                            text: self.slice(start, idx + 1),
                            line: self.line(start),
                        });
                        self.pos = idx + 1;
                        break;
                    }
                    _ => {}
                }
                idx += 1;
            }
        }
        Ok(TranslationUnit { items })
    }

    fn function_definition(&mut self, start: usize, open: usize) -> Result<ExternalDecl, ParseError> {
        let name = self.function_name(start, open);
        self.pos = open;
        let body = self.block()?;
        Ok(ExternalDecl::Function(FunctionDef {
            header: self.slice(start, open),
            name,
            body,
            line: self.line(start),
        }))
    }

    /// The identifier before the parameter list that ends at `open - 1`.
    fn function_name(&self, start: usize, open: usize) -> String {
        let mut depth = 0usize;
        let mut idx = open;
        while idx > start {
            idx -= 1;
            match self.text(idx) {
                ")" => depth += 1,
                "(" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        if idx > start && self.kind(idx - 1) == Some(TokenKind::Ident) {
                            return self.text(idx - 1).to_string();
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
        (start..open)
            .find(|&i| self.kind(i) == Some(TokenKind::Ident) && self.text(i + 1) == "(")
            .map(|i| self.text(i).to_string())
            .unwrap_or_default()
    }

    /// Records the name introduced by `typedef ... name;` (or `(*name)`).
    fn register_typedef(&mut self, start: usize, end: usize) {
        let pointer_name = (start..end.saturating_sub(2)).find_map(|i| {
            (self.text(i) == "(" && self.text(i + 1) == "*" && self.kind(i + 2) == Some(TokenKind::Ident))
                .then(|| self.text(i + 2))
        });
        let last_ident = (start..end)
            .rev()
            .find(|&i| self.kind(i) == Some(TokenKind::Ident) && self.text(i) != "typedef")
            .map(|i| self.text(i));
        if let Some(name) = pointer_name.or(last_ident) {
            self.typedefs.insert(name.to_string());
        }
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn block(&mut self) -> Result<Stmt, ParseError> {
        let open = self.expect("{", "block")?;
        let mut items = Vec::new();
        loop {
            if self.pos >= self.tokens.len() {
                return Err(ParseError::UnexpectedEof { context: "block" });
            }
            if self.text(self.pos) == "}" {
                self.pos += 1;
                break;
            }
            items.push(self.statement()?);
        }
        Ok(Stmt::new(StmtKind::Block(items), self.line(open)))
    }

    fn paren_expr(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect("(", "condition")?;
        let close = self.matching(open)?;
        self.pos = close + 1;
        Ok(self.expr(open + 1, close))
    }

    fn boxed_statement(&mut self) -> Result<Box<Stmt>, ParseError> {
        Ok(Box::new(self.statement()?))
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        let idx = self.pos;
        let Some(token) = self.tokens.get(idx).copied() else {
            return Err(ParseError::UnexpectedEof {
                context: "statement",
            });
        };
        let line = Some(token.line);
        if token.kind == TokenKind::Directive {
            self.pos += 1;
            return Ok(Stmt::new(StmtKind::Directive(self.text(idx).to_string()), line));
        }

        let kind = match self.text(idx) {
            "{" => return self.block(),
            ";" => {
                self.pos += 1;
                StmtKind::Empty
            }
            "if" => {
                self.pos += 1;
                let cond = self.paren_expr()?;
                let then_branch = self.boxed_statement()?;
                let else_branch = if self.text(self.pos) == "else" {
                    self.pos += 1;
                    Some(self.boxed_statement()?)
                } else {
                    None
                };
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            "while" => {
                self.pos += 1;
                let cond = self.paren_expr()?;
                let body = self.boxed_statement()?;
                StmtKind::While { cond, body }
            }
            "do" => {
                self.pos += 1;
                let body = self.boxed_statement()?;
                self.expect("while", "do-while")?;
                let cond = self.paren_expr()?;
                self.expect(";", "do-while")?;
                StmtKind::DoWhile { body, cond }
            }
            "for" => {
                self.pos += 1;
                let open = self.expect("(", "for header")?;
                let close = self.matching(open)?;
                self.pos = close + 1;
                let header = self.slice(open + 1, close);
                let body = self.boxed_statement()?;
                StmtKind::For { header, body }
            }
            "switch" => {
                self.pos += 1;
                let cond = self.paren_expr()?;
                let body = self.boxed_statement()?;
                StmtKind::Switch { cond, body }
            }
            "case" => {
                let colon = self.label_end(idx + 1)?;
                self.pos = colon + 1;
                self.labeled(self.slice(idx, colon + 1), line)?
            }
            "default" if self.text(idx + 1) == ":" => {
                self.pos = idx + 2;
                self.labeled(self.slice(idx, idx + 2), line)?
            }
            "return" => {
                let end = self.statement_end(idx + 1)?;
                self.pos = end + 1;
                StmtKind::Return((end > idx + 1).then(|| self.expr(idx + 1, end)))
            }
            "break" | "continue" | "goto" => {
                let end = self.statement_end(idx)?;
                self.pos = end + 1;
                StmtKind::Jump(self.slice(idx, end))
            }
            _ if token.kind == TokenKind::Ident && self.text(idx + 1) == ":" => {
                self.pos = idx + 2;
                self.labeled(self.slice(idx, idx + 2), line)?
            }
            _ => {
                let end = self.statement_end(idx)?;
                self.pos = end + 1;
                if self.is_declaration(idx, end) {
                    StmtKind::Decl(self.declaration(idx, end))
                } else {
                    StmtKind::Expr(self.expr(idx, end))
                }
            }
        };
        Ok(Stmt::new(kind, line))
    }

    /// The statement following a label. A label closing its block labels an
    /// empty statement.
    fn labeled(&mut self, label: String, line: Option<usize>) -> Result<StmtKind, ParseError> {
        let body = if self.text(self.pos) == "}" {
            Stmt::new(StmtKind::Empty, line)
        } else {
            self.statement()?
        };
        Ok(StmtKind::Labeled {
            label,
            body: Box::new(body),
        })
    }

    fn is_declaration(&self, from: usize, end: usize) -> bool {
        let first = self.text(from);
        if TYPE_WORDS.contains(&first) || self.typedefs.contains(first) {
            return true;
        }
        if self.kind(from) != Some(TokenKind::Ident) || from + 1 >= end {
            return false;
        }
        if self.kind(from + 1) == Some(TokenKind::Ident) {
            return true;
        }
        let mut idx = from + 1;
        while idx < end && matches!(self.text(idx), "*" | "const" | "volatile") {
            idx += 1;
        }
        idx > from + 1
            && idx < end
            && self.kind(idx) == Some(TokenKind::Ident)
            && (idx + 1 == end || matches!(self.text(idx + 1), "=" | "[" | ","))
    }

    fn declaration(&self, from: usize, end: usize) -> Declaration {
        let eq = self.find_top_level(from, end, |t| t == "=");
        match eq {
            Some(k) if self.find_top_level(k + 1, end, |t| t == ",").is_none() => Declaration {
                text: self.slice(from, k),
                name: (k > from && self.kind(k - 1) == Some(TokenKind::Ident))
                    .then(|| self.text(k - 1).to_string()),
                init: Some(self.expr(k + 1, end)),
            },
            _ => Declaration {
                text: self.slice(from, end),
                name: None,
                init: None,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn expr(&self, from: usize, to: usize) -> Expr {
        if from >= to {
            return Expr::Raw(String::new());
        }
        if let Some(op) = self.find_top_level(from, to, |t| ASSIGN_OPS.contains(&t)) {
            if op > from {
                return Expr::Assign {
                    target: Box::new(self.expr(from, op)),
                    op: self.text(op).to_string(),
                    value: Box::new(self.expr(op + 1, to)),
                };
            }
        }
        if self.find_top_level(from, to, |t| t == ",").is_some() {
            return Expr::Raw(self.slice(from, to));
        }
        if to - from == 1 {
            return match self.kind(from) {
                Some(TokenKind::Ident) => Expr::Ident(self.text(from).to_string()),
                Some(TokenKind::Number) if is_integer_literal(self.text(from)) => {
                    Expr::int(self.text(from))
                }
                Some(TokenKind::Char) => Expr::int(self.text(from)),
                _ => Expr::Raw(self.slice(from, to)),
            };
        }
        if self.kind(from) == Some(TokenKind::Ident)
            && self.text(from + 1) == "("
            && self.matching(from + 1).ok() == Some(to - 1)
        {
            return Expr::Call {
                callee: self.text(from).to_string(),
                args: self.arguments(from + 2, to - 1),
            };
        }
        Expr::Raw(self.slice(from, to))
    }

    fn arguments(&self, from: usize, to: usize) -> Vec<Expr> {
        if from >= to {
            return Vec::new();
        }
        let mut args = Vec::new();
        let mut start = from;
        while let Some(comma) = self.find_top_level(start, to, |t| t == ",") {
            args.push(self.expr(start, comma));
            start = comma + 1;
        }
        args.push(self.expr(start, to));
        args
    }
}

fn is_integer_literal(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") {
        return !lower.contains('.') && !lower.contains('p');
    }
    !lower.contains('.') && !lower.contains('e')
}
