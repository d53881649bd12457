//! The statement pattern functor (spec.md §3 "Statements (pattern)").
//!
//! Two statement variants named only in spec.md §4.5.6's prose —
//! `Tilde` (the `~` sampling statement) and `FunDef` (a function
//! definition) — are included here as first-class `StmtKind` variants:
//! the checking rules spec.md gives them only make sense if they are
//! statements in the tree, so the §3 variant list is read as
//! illustrative rather than exhaustive on this point.

use super::expr::{Expr, FunKind};
use super::meta::Decoration;
use crate::types::{AdLevel, SizedType, UnsizedType};

/// An assignment operator, resolved through the catalog under the name
/// returned by [`AssignOp::catalog_name`] (spec.md §4.5.6: "the
/// operator-form (`+=`, `*=`, etc.) is resolved through the catalog").
///
/// Only `Assign` itself maps to a name without an `assign_` prefix, so it
/// is the only form `same_type_mod_conv` (spec.md §4.1) widens `int` into
/// `real` for; the compound forms demand exact type equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    EltMulAssign,
    EltDivAssign,
}

impl AssignOp {
    #[must_use]
    pub const fn catalog_name(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::AddAssign => "assign_add",
            Self::SubAssign => "assign_subtract",
            Self::MulAssign => "assign_multiply",
            Self::DivAssign => "assign_divide",
            Self::EltMulAssign => "assign_elt_times",
            Self::EltDivAssign => "assign_elt_divide",
        }
    }
}

/// The assignment target: a name plus zero or more indices (empty for a
/// bare-variable assignment).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LValue<D: Decoration> {
    pub name: String,
    pub indices: Vec<super::expr::Index<D>>,
    pub meta: D::ExprMeta,
}

/// A `~` statement's optional truncation bounds (spec.md §4.5.6 "Tilde").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Truncation<D: Decoration> {
    None,
    Upper(Box<Expr<D>>),
    Lower(Box<Expr<D>>),
    Both(Box<Expr<D>>, Box<Expr<D>>),
}

/// One function parameter (spec.md §4.5.6 "FunDef").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunParam {
    pub ad: AdLevel,
    pub name: String,
    pub ty: UnsizedType,
}

/// The statement pattern functor, parametric in the same `Decoration` as
/// [`super::expr::Expr`] (spec.md §4.4).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StmtKind<D: Decoration> {
    Assign(LValue<D>, AssignOp, Box<Expr<D>>),
    TargetPlusEq(Box<Expr<D>>),
    NRFunApp(FunKind, String, Vec<Expr<D>>),
    Tilde {
        arg: Box<Expr<D>>,
        distribution: String,
        args: Vec<Expr<D>>,
        truncation: Truncation<D>,
    },
    Break,
    Continue,
    Return(Option<Box<Expr<D>>>),
    Skip,
    /// A fatal-error statement, e.g. the `reject(...)` family: contributes
    /// `AnyReturn` to the return-status algebra (spec.md §4.5.7).
    Reject(Vec<Expr<D>>),
    IfElse(Box<Expr<D>>, Box<Stmt<D>>, Option<Box<Stmt<D>>>),
    While(Box<Expr<D>>, Box<Stmt<D>>),
    For {
        loopvar: String,
        lower: Box<Expr<D>>,
        upper: Box<Expr<D>>,
        body: Box<Stmt<D>>,
    },
    /// Scoped sequence: pushes/pops a symbol table frame around its
    /// children (spec.md §4.5.6 "Block").
    Block(Vec<Stmt<D>>),
    /// Flat sequence with no scope of its own (spec.md §3).
    SList(Vec<Stmt<D>>),
    Decl {
        ad: AdLevel,
        name: String,
        ty: SizedType<D>,
    },
    FunDef {
        returns: crate::types::ReturnType,
        name: String,
        params: Vec<FunParam>,
        body: Box<Stmt<D>>,
    },
}

/// One node of the statement tree: its pattern plus its decoration's
/// metadata.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stmt<D: Decoration> {
    pub kind: StmtKind<D>,
    pub meta: D::StmtMeta,
}

impl<D: Decoration> Stmt<D> {
    #[must_use]
    pub const fn new(kind: StmtKind<D>, meta: D::StmtMeta) -> Self {
        Self { kind, meta }
    }

    /// Every direct child expression, pre-order (spec.md §4.4: "condition
    /// before branches, lower before upper, head before tail").
    pub fn child_exprs(&self) -> Vec<&Expr<D>> {
        match &self.kind {
            StmtKind::Assign(lvalue, _, rhs) => {
                let mut out: Vec<&Expr<D>> = lvalue.indices.iter().flat_map(super::expr::Index::children).collect();
                out.push(rhs.as_ref());
                out
            }
            StmtKind::TargetPlusEq(e) => vec![e.as_ref()],
            StmtKind::NRFunApp(_, _, args) | StmtKind::Reject(args) => args.iter().collect(),
            StmtKind::Tilde {
                arg,
                args,
                truncation,
                ..
            } => {
                let mut out = vec![arg.as_ref()];
                out.extend(args.iter());
                match truncation {
                    Truncation::None => {}
                    Truncation::Upper(e) | Truncation::Lower(e) => out.push(e.as_ref()),
                    Truncation::Both(lo, hi) => {
                        out.push(lo.as_ref());
                        out.push(hi.as_ref());
                    }
                }
                out
            }
            StmtKind::Return(Some(e)) => vec![e.as_ref()],
            StmtKind::IfElse(c, _, _) => vec![c.as_ref()],
            StmtKind::While(c, _) => vec![c.as_ref()],
            StmtKind::For { lower, upper, .. } => vec![lower.as_ref(), upper.as_ref()],
            StmtKind::Decl { ty, .. } => ty.size_exprs(),
            StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Return(None)
            | StmtKind::Skip
            | StmtKind::Block(_)
            | StmtKind::SList(_)
            | StmtKind::FunDef { .. } => vec![],
        }
    }

    /// Every direct child statement, pre-order.
    pub fn child_stmts(&self) -> Vec<&Self> {
        match &self.kind {
            StmtKind::IfElse(_, then, opt_else) => {
                let mut out = vec![then.as_ref()];
                if let Some(e) = opt_else {
                    out.push(e.as_ref());
                }
                out
            }
            StmtKind::While(_, body) | StmtKind::For { body, .. } | StmtKind::FunDef { body, .. } => vec![body.as_ref()],
            StmtKind::Block(stmts) | StmtKind::SList(stmts) => stmts.iter().collect(),
            _ => vec![],
        }
    }
}
