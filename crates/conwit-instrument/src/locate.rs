//! Finding statements by source line.
//!
//! A [`StmtPath`] addresses a statement as a top-level item index followed
//! by child indices (as numbered by [`Stmt::children`]) from the function
//! body down. Searches are pre-order in source order; statements inserted by
//! the engine carry no line and are never returned.

use conwit_cfront::{ExternalDecl, Expr, Stmt, StmtKind, TranslationUnit};

use crate::nondet::is_nondet_call;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtPath {
    /// Index into [`TranslationUnit::items`].
    pub function: usize,
    pub steps: Vec<usize>,
}

fn at_or_after(stmt: &Stmt, line: usize) -> bool {
    stmt.line.is_some_and(|l| l >= line)
}

fn search(
    tu: &TranslationUnit,
    mut found: impl FnMut(&Stmt, &Stmt) -> bool,
) -> Option<StmtPath> {
    fn walk(
        parent: &Stmt,
        steps: &mut Vec<usize>,
        found: &mut dyn FnMut(&Stmt, &Stmt) -> bool,
    ) -> bool {
        for (idx, child) in parent.children().into_iter().enumerate() {
            steps.push(idx);
            if found(parent, child) || walk(child, steps, found) {
                return true;
            }
            steps.pop();
        }
        false
    }

    tu.items.iter().enumerate().find_map(|(function, item)| {
        let ExternalDecl::Function(def) = item else {
            return None;
        };
        let mut steps = Vec::new();
        walk(&def.body, &mut steps, &mut found).then_some(StmtPath { function, steps })
    })
}

/// The first block item whose own line is at or after `line`. Statements on
/// earlier lines are searched inside, so a loop spanning `line` yields the
/// first statement of its body at or after it.
pub fn first_statement_at_or_after(tu: &TranslationUnit, line: usize) -> Option<StmtPath> {
    search(tu, |parent, child| parent.is_block() && at_or_after(child, line))
}

/// The first nondeterministic assignment or initialized declaration at or
/// after `line`, anywhere in the tree.
pub fn nondet_assignment_at_or_after(tu: &TranslationUnit, line: usize) -> Option<StmtPath> {
    search(tu, |_, child| at_or_after(child, line) && is_nondet_assignment(child))
}

/// `v = f(...)` or `T v = f(...)` with `f` nondeterministic.
pub fn is_nondet_assignment(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Expr(Expr::Assign { target, op, value }) => {
            op == "=" && target.as_ident().is_some() && is_nondet_call(value)
        }
        StmtKind::Decl(decl) => {
            decl.name.is_some() && decl.init.as_ref().is_some_and(is_nondet_call)
        }
        _ => false,
    }
}

/// Follows `steps` from the body of the function at `function`.
pub fn stmt_at_mut<'a>(
    tu: &'a mut TranslationUnit,
    function: usize,
    steps: &[usize],
) -> Option<&'a mut Stmt> {
    let ExternalDecl::Function(def) = tu.items.get_mut(function)? else {
        return None;
    };
    let mut stmt = &mut def.body;
    for &step in steps {
        stmt = stmt.child_mut(step)?;
    }
    Some(stmt)
}

/// The block item list holding the statement at `path`, and its index.
pub fn enclosing_list_mut<'a>(
    tu: &'a mut TranslationUnit,
    path: &StmtPath,
) -> Option<(&'a mut Vec<Stmt>, usize)> {
    let (&index, parent_steps) = path.steps.split_last()?;
    match &mut stmt_at_mut(tu, path.function, parent_steps)?.kind {
        StmtKind::Block(items) => Some((items, index)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conwit_cfront::parse;

    const SRC: &str = "int g;
void *worker(void *arg) {
    g = 1;
    return 0;
}
int main() {
    int x;
    while (x < 3) {
        x++;
    }
    if (x)
        g = 2;
    {
        x = __VERIFIER_nondet_int();
    }
    return x;
}
";

    fn line_at(tu: &mut TranslationUnit, path: &StmtPath) -> Option<usize> {
        stmt_at_mut(tu, path.function, &path.steps).and_then(|s| s.line)
    }

    #[test]
    fn finds_exact_line() {
        let mut tu = parse(SRC).unwrap();
        let path = first_statement_at_or_after(&tu, 3).unwrap();
        assert_eq!(path, StmtPath { function: 1, steps: vec![0] });
        assert_eq!(line_at(&mut tu, &path), Some(3));
    }

    #[test]
    fn descends_into_loop_bodies() {
        let mut tu = parse(SRC).unwrap();
        let path = first_statement_at_or_after(&tu, 9).unwrap();
        assert_eq!(path.steps, vec![1, 0, 0]);
        assert_eq!(line_at(&mut tu, &path), Some(9));
    }

    #[test]
    fn unbraced_branch_is_not_a_candidate() {
        let mut tu = parse(SRC).unwrap();
        // Line 12 holds `g = 2;`, the unbraced then-arm of the `if` on
        // line 11; the next block item is the bare block on line 13.
        let path = first_statement_at_or_after(&tu, 12).unwrap();
        assert_eq!(line_at(&mut tu, &path), Some(13));
    }

    #[test]
    fn past_the_end_is_none() {
        let tu = parse(SRC).unwrap();
        assert!(first_statement_at_or_after(&tu, 18).is_none());
    }

    #[test]
    fn nondet_search_looks_inside_nested_blocks() {
        let mut tu = parse(SRC).unwrap();
        let path = nondet_assignment_at_or_after(&tu, 6).unwrap();
        assert_eq!(line_at(&mut tu, &path), Some(14));
        assert!(nondet_assignment_at_or_after(&tu, 15).is_none());
    }

    #[test]
    fn enclosing_list_points_at_target() {
        let mut tu = parse(SRC).unwrap();
        let path = first_statement_at_or_after(&tu, 16).unwrap();
        let (items, index) = enclosing_list_mut(&mut tu, &path).unwrap();
        assert_eq!(index, 4);
        assert!(matches!(items[index].kind, StmtKind::Return(Some(_))));
    }
}
