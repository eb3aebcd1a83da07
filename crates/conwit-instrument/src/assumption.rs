//! Witness assumptions as `variable == literal` constraints.
//!
//! Grammar: `conjunct (';' conjunct)* ';'?` with `conjunct := ident '=='
//! literal`. Anything else (inequalities, negations, `\result`, `&&`) is
//! skipped, never approximated.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

/// A single pinned value. `value` is valid C literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub variable: String,
    pub value: String,
}

pub type Constraints = SmallVec<[Constraint; 4]>;

/// Parses an assumption string, keeping constraints in textual order.
pub fn parse_assumption(text: &str) -> Constraints {
    let mut out = Constraints::new();
    for conjunct in text.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        match parse_conjunct(conjunct) {
            Some(constraint) => out.push(constraint),
            None => debug!(conjunct, "skipping unsupported assumption"),
        }
    }
    out
}

fn parse_conjunct(conjunct: &str) -> Option<Constraint> {
    let (lhs, rhs) = conjunct.split_once("==")?;
    let variable = strip_parens(lhs.trim());
    if !is_identifier(variable) {
        return None;
    }
    Some(Constraint {
        variable: variable.to_string(),
        value: parse_literal(rhs)?,
    })
}

fn strip_parens(mut text: &str) -> &str {
    while let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        if !balanced(inner) {
            break;
        }
        text = inner.trim();
    }
    text
}

fn balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_literal(text: &str) -> Option<String> {
    let text = strip_parens(text.trim());
    match text {
        "true" => return Some("1".to_string()),
        "false" => return Some("0".to_string()),
        _ => {}
    }
    if is_char_literal(text) {
        return Some(text.to_string());
    }
    let (sign, body) = match text.chars().next()? {
        c @ ('-' | '+') => (c.to_string(), strip_parens(text[1..].trim())),
        _ => (String::new(), text),
    };
    is_number(body).then(|| format!("{sign}{body}"))
}

fn is_char_literal(text: &str) -> bool {
    text.len() >= 3 && text.starts_with('\'') && text.ends_with('\'')
}

fn is_number(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        let digits = hex.trim_end_matches(['u', 'l']);
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit());
    }
    let integer = lower.trim_end_matches(['u', 'l']);
    if !integer.is_empty() && integer.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let float = lower.strip_suffix(['f', 'l']).unwrap_or(&lower);
    is_float(float)
}

fn is_float(text: &str) -> bool {
    let (mantissa, exponent) = match text.split_once('e') {
        Some((m, e)) => (m, Some(e)),
        None => (text, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, frac)) => {
            (!whole.is_empty() || !frac.is_empty())
                && whole.chars().all(|c| c.is_ascii_digit())
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => !mantissa.is_empty() && mantissa.chars().all(|c| c.is_ascii_digit()),
    };
    let exponent_ok = exponent.map_or(text.contains('.'), |e| {
        let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    });
    mantissa_ok && exponent_ok
}
