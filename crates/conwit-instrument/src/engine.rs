//! Witness replay as AST rewrites.
//!
//! For each transition, in order:
//!
//! 1. **Value pinning** -- an `assumption` of the form `v == c` replaces the
//!    next nondeterministic call assigned to `v` (at or after the transition's
//!    line) with the constant `c` cast to the call's return type.
//! 2. **Schedule barriers** -- when the transition's thread differs from the
//!    active one, `yield(seq, t)` is inserted before the first statement at or
//!    after the line and `release(seq, t)` as the first thing executed once
//!    that statement is entered (or right after it, for flat statements).
//!
//! `seq` counts barriers from 0 within one [`Instrumenter`] run.

use conwit_cfront::{Expr, Stmt, StmtKind, TranslationUnit};
use conwit_witness::Transition;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assumption::parse_assumption;
use crate::error::InstrumentError;
use crate::locate::{
    enclosing_list_mut, first_statement_at_or_after, nondet_assignment_at_or_after, stmt_at_mut,
};
use crate::nondet::{is_nondet_call, nondet_type};

pub const YIELD_MARKER: &str = "yield";
pub const RELEASE_MARKER: &str = "release";

/// A `yield`/`release` pair placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barrier {
    pub seq: u32,
    pub thread_id: i64,
    /// Witness line the barrier was requested for.
    pub line: usize,
}

/// A nondeterministic call replaced by a constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedValue {
    pub variable: String,
    pub value: String,
    pub ty: String,
    pub line: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentReport {
    pub barriers: Vec<Barrier>,
    pub pinned: Vec<PinnedValue>,
}

/// Per-run engine state: the next barrier number and the active thread.
#[derive(Debug)]
pub struct Instrumenter {
    next_seq: u32,
    active_thread: i64,
}

impl Instrumenter {
    /// Starts with the first transition's thread as the active one (0 if it
    /// has none).
    pub fn new(transitions: &[Transition]) -> Self {
        Instrumenter {
            next_seq: 0,
            active_thread: transitions
                .first()
                .and_then(|t| t.metadata.thread_id)
                .unwrap_or(0),
        }
    }

    pub fn active_thread(&self) -> i64 {
        self.active_thread
    }

    /// Applies every transition to `tu`.
    pub fn run(
        &mut self,
        tu: &mut TranslationUnit,
        transitions: &[Transition],
    ) -> Result<InstrumentReport, InstrumentError> {
        let mut report = InstrumentReport::default();
        for transition in transitions {
            let Some(coords) = &transition.coords else {
                continue;
            };
            if let Some(assumption) = &transition.metadata.assumption {
                if let Some(pinned) = pin_value(tu, assumption, coords.startline) {
                    report.pinned.push(pinned);
                }
            }
            let thread = transition.metadata.thread_id.unwrap_or(self.active_thread);
            if thread != self.active_thread {
                report.barriers.push(self.insert_barrier(tu, coords.startline, thread)?);
                self.active_thread = thread;
            }
        }
        info!(
            barriers = report.barriers.len(),
            pinned = report.pinned.len(),
            "witness applied"
        );
        Ok(report)
    }

    fn insert_barrier(
        &mut self,
        tu: &mut TranslationUnit,
        line: usize,
        thread: i64,
    ) -> Result<Barrier, InstrumentError> {
        let missing = InstrumentError::NoTargetStatement { line };
        let path = first_statement_at_or_after(tu, line).ok_or_else(|| missing.clone())?;
        let (items, index) = enclosing_list_mut(tu, &path).ok_or(missing)?;

        let seq = self.next_seq;
        let marker = |name: &str| Stmt::call(name, vec![Expr::int(seq), Expr::int(thread)]);
        items.insert(index, marker(YIELD_MARKER));
        if !release_inside(&mut items[index + 1], &marker) {
            items.insert(index + 2, marker(RELEASE_MARKER));
        }
        self.next_seq += 1;

        debug!(seq, thread, line, stmt_line = ?items[index + 1].line, "inserted schedule barrier");
        Ok(Barrier {
            seq,
            thread_id: thread,
            line,
        })
    }
}

/// Places `release` at the head of whatever `target` executes first on
/// entry. Returns false for statements without a body.
fn release_inside(target: &mut Stmt, marker: &impl Fn(&str) -> Stmt) -> bool {
    match &mut target.kind {
        StmtKind::Block(items) => {
            items.insert(0, marker(RELEASE_MARKER));
            true
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } | StmtKind::For { body, .. } => {
            prepend(body, marker(RELEASE_MARKER));
            true
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            prepend(then_branch, marker(RELEASE_MARKER));
            if let Some(else_branch) = else_branch {
                prepend(else_branch, marker(RELEASE_MARKER));
            }
            true
        }
        _ => false,
    }
}

/// Makes `first` the first statement of `body`, wrapping it in a block if
/// needed.
fn prepend(body: &mut Box<Stmt>, first: Stmt) {
    if let StmtKind::Block(items) = &mut body.kind {
        items.insert(0, first);
        return;
    }
    let inner = std::mem::replace(body.as_mut(), Stmt::synthetic(StmtKind::Empty));
    **body = Stmt::synthetic(StmtKind::Block(vec![first, inner]));
}

/// The assigned variable and the call expression of a nondeterministic
/// assignment.
fn nondet_slot(stmt: &mut Stmt) -> Option<(String, &mut Expr)> {
    match &mut stmt.kind {
        StmtKind::Expr(Expr::Assign { target, op, value }) if op == "=" => {
            let variable = target.as_ident()?.to_string();
            is_nondet_call(value).then_some((variable, value.as_mut()))
        }
        StmtKind::Decl(decl) => {
            let variable = decl.name.clone()?;
            let init = decl.init.as_mut()?;
            is_nondet_call(init).then_some((variable, init))
        }
        _ => None,
    }
}

fn pin_value(tu: &mut TranslationUnit, assumption: &str, line: usize) -> Option<PinnedValue> {
    let constraints = parse_assumption(assumption);
    if constraints.is_empty() {
        return None;
    }
    let Some(path) = nondet_assignment_at_or_after(tu, line) else {
        debug!(line, assumption, "no nondeterministic assignment to pin");
        return None;
    };
    let stmt = stmt_at_mut(tu, path.function, &path.steps)?;
    let stmt_line = stmt.line;
    let (variable, call) = nondet_slot(stmt)?;
    let Some(constraint) = constraints.iter().find(|c| c.variable == variable) else {
        debug!(line, variable = %variable, "assumption does not constrain the assigned variable");
        return None;
    };
    let ty = match call {
        Expr::Call { callee, .. } => nondet_type(callee)?,
        _ => return None,
    };
    *call = Expr::Constant {
        ty: ty.to_string(),
        value: constraint.value.clone(),
    };
    debug!(variable = %variable, value = %constraint.value, ty, "pinned nondeterministic value");
    Some(PinnedValue {
        variable,
        value: constraint.value.clone(),
        ty: ty.to_string(),
        line: stmt_line,
    })
}

/// Applies `transitions` to `tu` with a fresh [`Instrumenter`].
pub fn instrument(
    tu: &mut TranslationUnit,
    transitions: &[Transition],
) -> Result<InstrumentReport, InstrumentError> {
    Instrumenter::new(transitions).run(tu, transitions)
}
