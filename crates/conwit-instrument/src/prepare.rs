//! Link fixes applied to the instrumented tree before rendering.

use conwit_cfront::{ExternalDecl, TranslationUnit};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The function the runtime defines to report a reached error.
pub const ERROR_FUNCTION: &str = "reach_error";

/// Prototypes for the schedule barrier markers.
pub const MARKER_PROTOTYPES: &str = "void yield(int, int);\nvoid release(int, int);";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReport {
    pub error_function_relinked: bool,
    /// Functions switched to `extern inline`.
    pub extern_inline: Vec<String>,
}

/// Prepares `tu` for linking against the runtime stub:
///
/// - a program-defined `reach_error` becomes an `extern` declaration in
///   place, so the stub's definition is used;
/// - non-static `inline` definitions get `extern inline` linkage;
/// - prototypes for `yield` and `release` are added at the top.
pub fn prepare_for_linking(tu: &mut TranslationUnit) -> LinkReport {
    let mut report = LinkReport::default();
    for item in &mut tu.items {
        let ExternalDecl::Function(def) = item else {
            continue;
        };
        if def.name == ERROR_FUNCTION {
            let text = format!("extern {};", strip_words(&def.header, &["static", "inline", "extern"]));
            let line = def.line;
            *item = ExternalDecl::Opaque { text, line };
            report.error_function_relinked = true;
            continue;
        }
        let words: Vec<&str> = def.header.split_whitespace().collect();
        if words.contains(&"inline") && !words.contains(&"static") {
            def.header = format!("extern inline {}", strip_words(&def.header, &["inline", "extern"]));
            report.extern_inline.push(def.name.clone());
        }
    }
    tu.items.insert(
        0,
        ExternalDecl::Opaque {
            text: MARKER_PROTOTYPES.to_string(),
            line: None,
        },
    );
    debug!(?report, "prepared for linking");
    report
}

fn strip_words(header: &str, words: &[&str]) -> String {
    header
        .split_whitespace()
        .filter(|w| !words.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use conwit_cfront::{parse, render};

    #[test]
    fn reach_error_becomes_extern_in_place() {
        let mut tu = parse("int a;\nvoid reach_error() { abort(); }\nint main() { reach_error(); }").unwrap();
        let report = prepare_for_linking(&mut tu);
        assert!(report.error_function_relinked);
        assert!(tu.function(ERROR_FUNCTION).is_none());
        assert!(matches!(
            &tu.items[2],
            ExternalDecl::Opaque { text, line: Some(2) } if text == "extern void reach_error();"
        ));
    }

    #[test]
    fn inline_definitions_get_extern_linkage() {
        let mut tu = parse("inline int f(int x) { return x; }\nstatic inline int g(void) { return 1; }").unwrap();
        let report = prepare_for_linking(&mut tu);
        assert_eq!(report.extern_inline, vec!["f".to_string()]);
        let out = render(&tu);
        assert!(out.contains("extern inline int f(int x)\n"));
        assert!(out.contains("static inline int g(void)\n"));
    }

    #[test]
    fn marker_prototypes_come_first() {
        let mut tu = parse("int main() { return 0; }").unwrap();
        prepare_for_linking(&mut tu);
        assert!(render(&tu).starts_with("void yield(int, int);\nvoid release(int, int);\n"));
    }
}
