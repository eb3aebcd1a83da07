//! Pretty-printer from [`TranslationUnit`] back to C text.
//!
//! Output is valid C for any tree the parser produced, with the engine's
//! insertions applied. Layout is normalized (4-space indentation, one
//! statement per line); verbatim fragments are printed as they were read.

use std::fmt::Write;

use crate::ast::{Declaration, Expr, ExternalDecl, FunctionDef, Stmt, StmtKind, TranslationUnit};

const INDENT: &str = "    ";

/// Renders a whole translation unit.
pub fn render(tu: &TranslationUnit) -> String {
    let mut out = String::new();
    for item in &tu.items {
        match item {
            ExternalDecl::Function(def) => render_function(&mut out, def),
            ExternalDecl::Opaque { text, .. } => {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
    out
}

fn render_function(out: &mut String, def: &FunctionDef) {
    out.push_str(&def.header);
    out.push('\n');
    render_stmt(out, &def.body, 0);
}

/// Renders a single expression.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Assign { target, op, value } => {
            format!("{} {op} {}", render_expr(target), render_expr(value))
        }
        Expr::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(render_expr).collect();
            format!("{callee}({})", args.join(", "))
        }
        Expr::Ident(name) => name.clone(),
        Expr::Constant { ty, value } if ty == "int" => value.clone(),
        Expr::Constant { ty, value } => format!("(({ty}) {value})"),
        Expr::Raw(text) => text.clone(),
    }
}

fn render_decl(decl: &Declaration) -> String {
    match &decl.init {
        Some(init) => format!("{} = {}", decl.text, render_expr(init)),
        None => decl.text.clone(),
    }
}

fn pad(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Body of a compound statement: blocks stay at the header's depth, single
/// statements are indented one level.
fn render_body(out: &mut String, body: &Stmt, depth: usize) {
    if body.is_block() {
        render_stmt(out, body, depth);
    } else {
        render_stmt(out, body, depth + 1);
    }
}

fn render_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    // Directives must start their own line.
    if let StmtKind::Directive(text) = &stmt.kind {
        out.push_str(text);
        out.push('\n');
        return;
    }
    pad(out, depth);
    match &stmt.kind {
        StmtKind::Block(items) => {
            out.push_str("{\n");
            for item in items {
                render_stmt(out, item, depth + 1);
            }
            pad(out, depth);
            out.push_str("}\n");
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let _ = writeln!(out, "if ({})", render_expr(cond));
            render_body(out, then_branch, depth);
            if let Some(else_branch) = else_branch {
                pad(out, depth);
                out.push_str("else\n");
                render_body(out, else_branch, depth);
            }
        }
        StmtKind::While { cond, body } => {
            let _ = writeln!(out, "while ({})", render_expr(cond));
            render_body(out, body, depth);
        }
        StmtKind::DoWhile { body, cond } => {
            out.push_str("do\n");
            render_body(out, body, depth);
            pad(out, depth);
            let _ = writeln!(out, "while ({});", render_expr(cond));
        }
        StmtKind::For { header, body } => {
            let _ = writeln!(out, "for ({header})");
            render_body(out, body, depth);
        }
        StmtKind::Switch { cond, body } => {
            let _ = writeln!(out, "switch ({})", render_expr(cond));
            render_body(out, body, depth);
        }
        StmtKind::Labeled { label, body } => {
            let _ = writeln!(out, "{label}");
            render_stmt(out, body, depth);
        }
        StmtKind::Return(Some(value)) => {
            let _ = writeln!(out, "return {};", render_expr(value));
        }
        StmtKind::Return(None) => out.push_str("return;\n"),
        StmtKind::Jump(text) => {
            let _ = writeln!(out, "{text};");
        }
        StmtKind::Decl(decl) => {
            let _ = writeln!(out, "{};", render_decl(decl));
        }
        StmtKind::Expr(expr) => {
            let _ = writeln!(out, "{};", render_expr(expr));
        }
        StmtKind::Empty => out.push_str(";\n"),
        StmtKind::Directive(_) => {}
    }
}
