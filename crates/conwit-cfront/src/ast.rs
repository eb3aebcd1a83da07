//! Syntax tree for C translation units.
//!
//! The tree is structural: statements that matter for instrumentation
//! (blocks, conditionals, loops, assignments, calls, declarations with an
//! initializer) are typed; everything else is kept as verbatim source text.
//! Every statement read from source carries its 1-based line; nodes built by
//! the instrumentation engine carry none.

use serde::{Deserialize, Serialize};

/// A whole C file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub items: Vec<ExternalDecl>,
}

impl TranslationUnit {
    /// Iterates over the function definitions in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.items.iter().filter_map(|item| match item {
            ExternalDecl::Function(def) => Some(def),
            ExternalDecl::Opaque { .. } => None,
        })
    }

    /// Finds a function definition by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions().find(|def| def.name == name)
    }
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExternalDecl {
    Function(FunctionDef),
    /// Declarations, type definitions and directives, kept verbatim.
    Opaque { text: String, line: Option<usize> },
}

/// A function definition: everything before the body is kept as `header`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub header: String,
    pub name: String,
    /// Always a [`StmtKind::Block`].
    pub body: Stmt,
    pub line: Option<usize>,
}

/// A statement and the source line it starts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub line: Option<usize>,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        /// Text between the parentheses, e.g. `int i = 0; i < n; i++`.
        header: String,
        body: Box<Stmt>,
    },
    Switch {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// A statement prefixed by `case X:`, `default:` or `name:` (colon
    /// included in `label`).
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    /// `break`, `continue` or `goto name`, without the semicolon.
    Jump(String),
    Decl(Declaration),
    Expr(Expr),
    Directive(String),
    Empty,
}

/// A local declaration. Only single-declarator initializers are split out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Specifiers and declarator, e.g. `unsigned int x`.
    pub text: String,
    /// Declared name when the declarator directly precedes `=`.
    pub name: Option<String>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Assign {
        target: Box<Expr>,
        op: String,
        value: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Ident(String),
    /// A literal with its C type.
    Constant {
        ty: String,
        value: String,
    },
    Raw(String),
}

impl Expr {
    /// An `int` literal.
    pub fn int(value: impl ToString) -> Self {
        Expr::Constant {
            ty: "int".to_string(),
            value: value.to_string(),
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, line: Option<usize>) -> Self {
        Stmt { line, kind }
    }

    /// A statement with no source position.
    pub fn synthetic(kind: StmtKind) -> Self {
        Stmt { line: None, kind }
    }

    /// A synthetic `callee(args...);` statement.
    pub fn call(callee: &str, args: Vec<Expr>) -> Self {
        Stmt::synthetic(StmtKind::Expr(Expr::Call {
            callee: callee.to_string(),
            args,
        }))
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, StmtKind::Block(_))
    }

    /// Nested statements in source order. For a block these are its items;
    /// for an `if`, the then arm followed by the else arm; for a labeled
    /// statement, the statement it labels.
    pub fn children(&self) -> Vec<&Stmt> {
        match &self.kind {
            StmtKind::Block(items) => items.iter().collect(),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                let mut out = vec![then_branch.as_ref()];
                if let Some(else_branch) = else_branch {
                    out.push(else_branch.as_ref());
                }
                out
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::For { body, .. }
            | StmtKind::Switch { body, .. }
            | StmtKind::Labeled { body, .. } => vec![body.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Mutable access to the `index`-th entry of [`Stmt::children`].
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Stmt> {
        match &mut self.kind {
            StmtKind::Block(items) => items.get_mut(index),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => match index {
                0 => Some(then_branch.as_mut()),
                1 => else_branch.as_deref_mut(),
                _ => None,
            },
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::For { body, .. }
            | StmtKind::Switch { body, .. }
            | StmtKind::Labeled { body, .. } => (index == 0).then_some(body.as_mut()),
            _ => None,
        }
    }
}
