//! The intermediate representation: a single pattern-functor shape
//! (spec.md §3) parameterized by a [`meta::Decoration`] (spec.md §4.4,
//! §9), plus the generic operations defined over it.

pub mod display;
pub mod equality;
pub mod expr;
pub mod meta;
pub mod stmt;
pub mod traverse;

pub use equality::expr_eq_modulo_meta;
pub use expr::{Expr, ExprKind, FunKind, Index, LitKind};
pub use meta::{Decoration, ExprTypeLoc, Label, Labeled, LabeledMeta, LabeledTyped, Located, NoMeta, StmtLoc, TypedLocated};
pub use stmt::{AssignOp, FunParam, LValue, Stmt, StmtKind, Truncation};
pub use traverse::{associate, fold_expr, fold_stmt, label_stmt, map_expr, map_stmt, traverse_expr_with_state, traverse_stmt_with_state};
