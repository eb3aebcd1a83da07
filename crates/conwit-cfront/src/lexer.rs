//! Tokenizer for (preprocessed) C source.
//!
//! Tokens only record their kind, byte span and starting line; the parser
//! slices the original text for anything it keeps verbatim. Comments are
//! skipped. A `#` that starts a line swallows the whole (possibly
//! backslash-continued) line as one [`TokenKind::Directive`].

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Char,
    Punct,
    Directive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

const PUNCTUATORS: &[&str] = &[
    "...", "<<=", ">>=", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "&=", "^=", "|=", "##", "[", "]", "(", ")", "{", "}", ".", "&", "*",
    "+", "-", "~", "!", "/", "%", "<", ">", "^", "|", "?", ":", ";", "=", ",", "#",
];

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    at_line_start: bool,
}

/// Splits `src` into tokens.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        line: 1,
        at_line_start: true,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

impl Lexer<'_> {
    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) {
        if self.bytes[self.pos] == b'\n' {
            self.line += 1;
            self.at_line_start = true;
        }
        self.pos += 1;
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        while let Some(b) = self.peek(0) {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => self.bump(),
                b'\\' if matches!(self.peek(1), Some(b'\n')) => {
                    self.bump();
                    self.bump();
                }
                b'/' if self.peek(1) == Some(b'/') => {
                    while self.peek(0).is_some_and(|c| c != b'\n') {
                        self.pos += 1;
                    }
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let line = self.line;
                    self.pos += 2;
                    loop {
                        match self.peek(0) {
                            None => {
                                return Err(ParseError::Unterminated {
                                    what: "comment",
                                    line,
                                })
                            }
                            Some(b'*') if self.peek(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.bump(),
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia()?;
        let Some(b) = self.peek(0) else {
            return Ok(None);
        };
        let start = self.pos;
        let line = self.line;
        let line_start = self.at_line_start;
        self.at_line_start = false;

        let kind = if b == b'#' && line_start {
            while let Some(c) = self.peek(0) {
                if c == b'\n' {
                    break;
                }
                if c == b'\\' && self.peek(1) == Some(b'\n') {
                    self.bump();
                }
                self.bump();
            }
            self.at_line_start = false;
            TokenKind::Directive
        } else if is_ident_start(b) {
            if matches!(b, b'L' | b'u' | b'U') && matches!(self.peek(1), Some(b'"' | b'\'')) {
                self.pos += 1;
                return self.quoted(start, line).map(Some);
            }
            while self.peek(0).is_some_and(is_ident_continue) {
                self.pos += 1;
            }
            TokenKind::Ident
        } else if b.is_ascii_digit() || (b == b'.' && self.peek(1).is_some_and(|c| c.is_ascii_digit())) {
            self.number();
            TokenKind::Number
        } else if b == b'"' || b == b'\'' {
            return self.quoted(start, line).map(Some);
        } else {
            let rest = &self.src[self.pos..];
            let len = PUNCTUATORS
                .iter()
                .find(|p| rest.starts_with(**p))
                .map_or(1, |p| p.len());
            self.pos += len;
            TokenKind::Punct
        };

        Ok(Some(Token {
            kind,
            start,
            end: self.pos,
            line,
        }))
    }

    fn number(&mut self) {
        while let Some(c) = self.peek(0) {
            let exponent_sign = matches!(c, b'+' | b'-')
                && self.pos > 0
                && matches!(self.bytes[self.pos - 1], b'e' | b'E' | b'p' | b'P');
            if is_ident_continue(c) || c == b'.' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn quoted(&mut self, start: usize, line: usize) -> Result<Token, ParseError> {
        let quote = self.bytes[self.pos];
        let (kind, what) = if quote == b'"' {
            (TokenKind::Str, "string literal")
        } else {
            (TokenKind::Char, "character literal")
        };
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some(b'\n') => return Err(ParseError::Unterminated { what, line }),
                Some(b'\\') => {
                    self.bump();
                    if self.peek(0).is_some() {
                        self.bump();
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(Token {
            kind,
            start,
            end: self.pos,
            line,
        })
    }
}
