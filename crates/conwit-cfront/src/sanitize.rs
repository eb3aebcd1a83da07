//! Length-preserving source rewrites applied before parsing.
//!
//! GNU extensions the structural parser does not understand are blanked out
//! or replaced by same-length text. Newlines are never touched, so every
//! line number and byte offset a witness refers to stays valid.

use regex::{Captures, Regex};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Action {
    /// Blank comments; string literals matched by the same pattern are kept.
    Comment,
    /// Blank the match up to its balancing `)`.
    Blank,
    /// Like `Blank`, but the first byte becomes `0`.
    ZeroPad,
    /// Replace with a fixed string of the same length.
    Literal(&'static str),
}

#[derive(Debug)]
struct Rewrite {
    pattern: Regex,
    action: Action,
}

/// The ordered rewrite table, run until the text stops changing.
#[derive(Debug)]
pub struct Sanitizer {
    rewrites: Vec<Rewrite>,
}

const STRING_LITERAL: &str = r#""(?:[^"\\\n]|\\.)*""#;

const REWRITES: &[(&str, Action)] = &[
    (r"//[^\n]*|(?s:/\*.*?\*/)", Action::Comment),
    (r"\b__attribute__[ \r\n]*\(.*\)", Action::Blank),
    (r"\b__asm__(?:[ \r\n]+__volatile__)?[ \r\n]*\(.*\)", Action::Blank),
    (r"\basm volatile[ \r\n]*\(.*\)", Action::Blank),
    (r"\basm[ \r\n]*\(.*\)", Action::Blank),
    (r"\b__extension__[ \r\n]*\(.*\)", Action::ZeroPad),
    (r"\b__extension__\b", Action::Blank),
    (r"\b__inline(?:__)?\b", Action::Blank),
    (r"\b__restrict(?:__)?\b", Action::Blank),
    (r"\b__builtin_va_list\b", Action::Literal("int              ")),
    (r"\b__signed__\b", Action::Literal("  signed  ")),
    (r"\([ \r\n]*\{.*\}[ \r\n]*\)", Action::ZeroPad),
];

impl Sanitizer {
    pub fn new() -> Result<Self, regex::Error> {
        let rewrites = REWRITES
            .iter()
            .map(|&(pattern, action)| {
                let pattern = match action {
                    Action::Comment => Regex::new(&format!("{STRING_LITERAL}|{pattern}"))?,
                    _ => Regex::new(pattern)?,
                };
                Ok(Rewrite { pattern, action })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Sanitizer { rewrites })
    }

    /// Applies every rewrite until a fixpoint. The result has exactly the
    /// byte length and line structure of `src`.
    pub fn sanitize(&self, src: &str) -> String {
        let mut current = src.to_string();
        let mut passes = 0usize;
        loop {
            passes += 1;
            let mut next = current.clone();
            for rewrite in &self.rewrites {
                next = rewrite
                    .pattern
                    .replace_all(&next, |caps: &Captures| apply(rewrite.action, &caps[0]))
                    .into_owned();
            }
            if next == current {
                break;
            }
            current = next;
        }
        debug!(passes, "source sanitized");
        current
    }
}

fn apply(action: Action, matched: &str) -> String {
    match action {
        Action::Comment if matched.starts_with('"') => matched.to_string(),
        Action::Comment => blank(matched),
        Action::Blank => blank_balanced(matched, 0),
        Action::ZeroPad => format!("0{}", blank_balanced(matched, 1)),
        Action::Literal(text) => text.to_string(),
    }
}

/// Spaces for every byte except newlines.
fn blank(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => "\n".to_string(),
            c => " ".repeat(c.len_utf8()),
        })
        .collect()
}

/// Blanks `matched` through the `)` balancing its first `(`, keeping the
/// rest; `skip` leading bytes are dropped from the blanked part.
fn blank_balanced(matched: &str, skip: usize) -> String {
    let mut depth = 0i32;
    let mut split = matched.len();
    for (idx, byte) in matched.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    split = idx;
                    break;
                }
                if depth == 0 {
                    split = idx + 1;
                    break;
                }
            }
            _ => {}
        }
    }
    let blanked = blank(&matched[..split]);
    format!("{}{}", blanked.get(skip..).unwrap_or(""), &matched[split..])
}
