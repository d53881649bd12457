//! Generic traversal utilities shared by every metadata specialization
//! (spec.md §4.4 "IR framework"). Two traversal orders are provided,
//! matching the two consumers that need them:
//!
//! - [`map_expr`]/[`map_stmt`]: same-decoration, **bottom-up** (children
//!   rewritten first, then the node itself) — what the partial evaluator
//!   needs (spec.md §4.6: "Children are evaluated first; then the
//!   current node is considered for rewriting").
//! - [`traverse_expr_with_state`]/[`traverse_stmt_with_state`]:
//!   decoration-changing, **pre-order**, threading caller state —
//!   what label assignment needs (spec.md §4.4 `traverse_with_state`,
//!   §5 "label assignment is a strict pre-order traversal").
//!
//! [`fold_expr`]/[`fold_stmt`] are left folds built on the same
//! child-order logic as [`super::expr::Expr::children`] and
//! [`super::stmt::Stmt::child_exprs`]/`child_stmts`, so traversal order
//! is defined in exactly one place per node kind.

use ahash::AHashMap;

use super::expr::{Expr, ExprKind, Index};
use super::meta::{Decoration, Label, LabeledMeta};
use super::stmt::{LValue, Stmt, StmtKind, Truncation};
use crate::types::SizedType;

// ---------------------------------------------------------------------
// fold
// ---------------------------------------------------------------------

/// Left-folds `f` over `e` and every subexpression, pre-order.
pub fn fold_expr<D: Decoration, S>(init: S, e: &Expr<D>, f: &mut impl FnMut(S, &Expr<D>) -> S) -> S {
    let acc = f(init, e);
    e.children().into_iter().fold(acc, |acc, child| fold_expr(acc, child, f))
}

/// Left-folds `f_stmt`/`f_expr` over `s` and every substatement/subexpression,
/// pre-order (spec.md §4.4 `fold`).
pub fn fold_stmt<D: Decoration, S>(
    init: S,
    s: &Stmt<D>,
    f_stmt: &mut impl FnMut(S, &Stmt<D>) -> S,
    f_expr: &mut impl FnMut(S, &Expr<D>) -> S,
) -> S {
    let acc = f_stmt(init, s);
    let acc = s.child_exprs().into_iter().fold(acc, |acc, e| fold_expr(acc, e, f_expr));
    s.child_stmts().into_iter().fold(acc, |acc, child| fold_stmt(acc, child, f_stmt, f_expr))
}

// ---------------------------------------------------------------------
// map (same decoration, bottom-up — the optimizer's rewrite order)
// ---------------------------------------------------------------------

/// Rebuilds `e` bottom-up: every child is rewritten by `f` first, then the
/// rebuilt node itself is passed to `f`.
pub fn map_expr<D: Decoration>(e: Expr<D>, f: &mut impl FnMut(Expr<D>) -> Expr<D>) -> Expr<D> {
    let kind = match e.kind {
        ExprKind::Var(_) | ExprKind::Lit(_, _) => e.kind,
        ExprKind::FunApp(kind, name, args) => {
            ExprKind::FunApp(kind, name, args.into_iter().map(|a| map_expr(a, f)).collect())
        }
        ExprKind::CondDistApp(kind, name, args) => {
            ExprKind::CondDistApp(kind, name, args.into_iter().map(|a| map_expr(a, f)).collect())
        }
        ExprKind::TernaryIf(c, t, e2) => {
            ExprKind::TernaryIf(Box::new(map_expr(*c, f)), Box::new(map_expr(*t, f)), Box::new(map_expr(*e2, f)))
        }
        ExprKind::EAnd(a, b) => ExprKind::EAnd(Box::new(map_expr(*a, f)), Box::new(map_expr(*b, f))),
        ExprKind::EOr(a, b) => ExprKind::EOr(Box::new(map_expr(*a, f)), Box::new(map_expr(*b, f))),
        ExprKind::Indexed(base, idxs) => {
            ExprKind::Indexed(Box::new(map_expr(*base, f)), idxs.into_iter().map(|i| map_index(i, f)).collect())
        }
    };
    f(Expr::new(kind, e.meta))
}

fn map_index<D: Decoration>(idx: Index<D>, f: &mut impl FnMut(Expr<D>) -> Expr<D>) -> Index<D> {
    match idx {
        Index::All => Index::All,
        Index::Single(e) => Index::Single(Box::new(map_expr(*e, f))),
        Index::Multi(e) => Index::Multi(Box::new(map_expr(*e, f))),
        Index::Upfrom(e) => Index::Upfrom(Box::new(map_expr(*e, f))),
        Index::Downfrom(e) => Index::Downfrom(Box::new(map_expr(*e, f))),
        Index::Between(lo, hi) => Index::Between(Box::new(map_expr(*lo, f)), Box::new(map_expr(*hi, f))),
    }
}

fn map_sized_type<D: Decoration>(ty: SizedType<D>, f: &mut impl FnMut(Expr<D>) -> Expr<D>) -> SizedType<D> {
    match ty {
        SizedType::SInt => SizedType::SInt,
        SizedType::SReal => SizedType::SReal,
        SizedType::SVector(e) => SizedType::SVector(Box::new(map_expr(*e, f))),
        SizedType::SRowVector(e) => SizedType::SRowVector(Box::new(map_expr(*e, f))),
        SizedType::SMatrix(rows, cols) => SizedType::SMatrix(Box::new(map_expr(*rows, f)), Box::new(map_expr(*cols, f))),
        SizedType::SArray(inner, len) => {
            SizedType::SArray(Box::new(map_sized_type(*inner, f)), Box::new(map_expr(*len, f)))
        }
    }
}

/// Rebuilds `s` bottom-up: every contained expression is rewritten by
/// `f_expr`, every substatement by `f_stmt` (innermost first), then the
/// rebuilt statement itself is passed to `f_stmt`.
pub fn map_stmt<D: Decoration>(
    s: Stmt<D>,
    f_stmt: &mut impl FnMut(Stmt<D>) -> Stmt<D>,
    f_expr: &mut impl FnMut(Expr<D>) -> Expr<D>,
) -> Stmt<D> {
    let kind = match s.kind {
        StmtKind::Assign(lvalue, op, rhs) => {
            let lvalue = LValue {
                name: lvalue.name,
                indices: lvalue.indices.into_iter().map(|i| map_index(i, f_expr)).collect(),
                meta: lvalue.meta,
            };
            StmtKind::Assign(lvalue, op, Box::new(map_expr(*rhs, f_expr)))
        }
        StmtKind::TargetPlusEq(e) => StmtKind::TargetPlusEq(Box::new(map_expr(*e, f_expr))),
        StmtKind::NRFunApp(kind, name, args) => {
            StmtKind::NRFunApp(kind, name, args.into_iter().map(|a| map_expr(a, f_expr)).collect())
        }
        StmtKind::Tilde {
            arg,
            distribution,
            args,
            truncation,
        } => StmtKind::Tilde {
            arg: Box::new(map_expr(*arg, f_expr)),
            distribution,
            args: args.into_iter().map(|a| map_expr(a, f_expr)).collect(),
            truncation: map_truncation(truncation, f_expr),
        },
        StmtKind::Break => StmtKind::Break,
        StmtKind::Continue => StmtKind::Continue,
        StmtKind::Return(opt) => StmtKind::Return(opt.map(|e| Box::new(map_expr(*e, f_expr)))),
        StmtKind::Skip => StmtKind::Skip,
        StmtKind::Reject(args) => StmtKind::Reject(args.into_iter().map(|a| map_expr(a, f_expr)).collect()),
        StmtKind::IfElse(c, then, opt_else) => StmtKind::IfElse(
            Box::new(map_expr(*c, f_expr)),
            Box::new(map_stmt(*then, f_stmt, f_expr)),
            opt_else.map(|e| Box::new(map_stmt(*e, f_stmt, f_expr))),
        ),
        StmtKind::While(c, body) => {
            StmtKind::While(Box::new(map_expr(*c, f_expr)), Box::new(map_stmt(*body, f_stmt, f_expr)))
        }
        StmtKind::For { loopvar, lower, upper, body } => StmtKind::For {
            loopvar,
            lower: Box::new(map_expr(*lower, f_expr)),
            upper: Box::new(map_expr(*upper, f_expr)),
            body: Box::new(map_stmt(*body, f_stmt, f_expr)),
        },
        StmtKind::Block(stmts) => StmtKind::Block(stmts.into_iter().map(|s2| map_stmt(s2, f_stmt, f_expr)).collect()),
        StmtKind::SList(stmts) => StmtKind::SList(stmts.into_iter().map(|s2| map_stmt(s2, f_stmt, f_expr)).collect()),
        StmtKind::Decl { ad, name, ty } => StmtKind::Decl {
            ad,
            name,
            ty: map_sized_type(ty, f_expr),
        },
        StmtKind::FunDef { returns, name, params, body } => StmtKind::FunDef {
            returns,
            name,
            params,
            body: Box::new(map_stmt(*body, f_stmt, f_expr)),
        },
    };
    f_stmt(Stmt::new(kind, s.meta))
}

fn map_truncation<D: Decoration>(t: Truncation<D>, f: &mut impl FnMut(Expr<D>) -> Expr<D>) -> Truncation<D> {
    match t {
        Truncation::None => Truncation::None,
        Truncation::Upper(e) => Truncation::Upper(Box::new(map_expr(*e, f))),
        Truncation::Lower(e) => Truncation::Lower(Box::new(map_expr(*e, f))),
        Truncation::Both(lo, hi) => Truncation::Both(Box::new(map_expr(*lo, f)), Box::new(map_expr(*hi, f))),
    }
}

// ---------------------------------------------------------------------
// traverse_with_state (decoration-changing, pre-order)
// ---------------------------------------------------------------------

/// Rebuilds `e` under a new decoration `D2`, visiting each node pre-order:
/// `f_expr` computes this node's new metadata *before* its children are
/// visited, so a monotonic counter threaded through `state` yields
/// strictly pre-order labels.
pub fn traverse_expr_with_state<D: Decoration, D2: Decoration, S>(
    e: &Expr<D>,
    state: &mut S,
    f_expr: &mut impl FnMut(&mut S, &D::ExprMeta) -> D2::ExprMeta,
) -> Expr<D2> {
    let meta = f_expr(state, &e.meta);
    let kind = match &e.kind {
        ExprKind::Var(n) => ExprKind::Var(n.clone()),
        ExprKind::Lit(k, t) => ExprKind::Lit(*k, t.clone()),
        ExprKind::FunApp(k, n, args) => {
            ExprKind::FunApp(*k, n.clone(), args.iter().map(|a| traverse_expr_with_state(a, state, f_expr)).collect())
        }
        ExprKind::CondDistApp(k, n, args) => ExprKind::CondDistApp(
            *k,
            n.clone(),
            args.iter().map(|a| traverse_expr_with_state(a, state, f_expr)).collect(),
        ),
        ExprKind::TernaryIf(c, t, el) => ExprKind::TernaryIf(
            Box::new(traverse_expr_with_state(c, state, f_expr)),
            Box::new(traverse_expr_with_state(t, state, f_expr)),
            Box::new(traverse_expr_with_state(el, state, f_expr)),
        ),
        ExprKind::EAnd(a, b) => ExprKind::EAnd(
            Box::new(traverse_expr_with_state(a, state, f_expr)),
            Box::new(traverse_expr_with_state(b, state, f_expr)),
        ),
        ExprKind::EOr(a, b) => ExprKind::EOr(
            Box::new(traverse_expr_with_state(a, state, f_expr)),
            Box::new(traverse_expr_with_state(b, state, f_expr)),
        ),
        ExprKind::Indexed(base, idxs) => ExprKind::Indexed(
            Box::new(traverse_expr_with_state(base, state, f_expr)),
            idxs.iter().map(|i| traverse_index_with_state(i, state, f_expr)).collect(),
        ),
    };
    Expr::new(kind, meta)
}

fn traverse_index_with_state<D: Decoration, D2: Decoration, S>(
    idx: &Index<D>,
    state: &mut S,
    f_expr: &mut impl FnMut(&mut S, &D::ExprMeta) -> D2::ExprMeta,
) -> Index<D2> {
    match idx {
        Index::All => Index::All,
        Index::Single(e) => Index::Single(Box::new(traverse_expr_with_state(e, state, f_expr))),
        Index::Multi(e) => Index::Multi(Box::new(traverse_expr_with_state(e, state, f_expr))),
        Index::Upfrom(e) => Index::Upfrom(Box::new(traverse_expr_with_state(e, state, f_expr))),
        Index::Downfrom(e) => Index::Downfrom(Box::new(traverse_expr_with_state(e, state, f_expr))),
        Index::Between(lo, hi) => Index::Between(
            Box::new(traverse_expr_with_state(lo, state, f_expr)),
            Box::new(traverse_expr_with_state(hi, state, f_expr)),
        ),
    }
}

fn traverse_sized_type_with_state<D: Decoration, D2: Decoration, S>(
    ty: &SizedType<D>,
    state: &mut S,
    f_expr: &mut impl FnMut(&mut S, &D::ExprMeta) -> D2::ExprMeta,
) -> SizedType<D2> {
    match ty {
        SizedType::SInt => SizedType::SInt,
        SizedType::SReal => SizedType::SReal,
        SizedType::SVector(e) => SizedType::SVector(Box::new(traverse_expr_with_state(e, state, f_expr))),
        SizedType::SRowVector(e) => SizedType::SRowVector(Box::new(traverse_expr_with_state(e, state, f_expr))),
        SizedType::SMatrix(rows, cols) => SizedType::SMatrix(
            Box::new(traverse_expr_with_state(rows, state, f_expr)),
            Box::new(traverse_expr_with_state(cols, state, f_expr)),
        ),
        SizedType::SArray(inner, len) => SizedType::SArray(
            Box::new(traverse_sized_type_with_state(inner, state, f_expr)),
            Box::new(traverse_expr_with_state(len, state, f_expr)),
        ),
    }
}

/// Rebuilds `s` under a new decoration `D2`, pre-order, in the exact child
/// order spec.md §4.4 mandates ("condition before branches, lower before
/// upper, head before tail").
pub fn traverse_stmt_with_state<D: Decoration, D2: Decoration, S>(
    s: &Stmt<D>,
    state: &mut S,
    f_stmt: &mut impl FnMut(&mut S, &D::StmtMeta) -> D2::StmtMeta,
    f_expr: &mut impl FnMut(&mut S, &D::ExprMeta) -> D2::ExprMeta,
) -> Stmt<D2> {
    let meta = f_stmt(state, &s.meta);
    let kind = match &s.kind {
        StmtKind::Assign(lvalue, op, rhs) => {
            let lvalue2 = LValue {
                name: lvalue.name.clone(),
                indices: lvalue.indices.iter().map(|i| traverse_index_with_state(i, state, f_expr)).collect(),
                meta: f_expr(state, &lvalue.meta),
            };
            StmtKind::Assign(lvalue2, *op, Box::new(traverse_expr_with_state(rhs, state, f_expr)))
        }
        StmtKind::TargetPlusEq(e) => StmtKind::TargetPlusEq(Box::new(traverse_expr_with_state(e, state, f_expr))),
        StmtKind::NRFunApp(k, n, args) => StmtKind::NRFunApp(
            *k,
            n.clone(),
            args.iter().map(|a| traverse_expr_with_state(a, state, f_expr)).collect(),
        ),
        StmtKind::Tilde {
            arg,
            distribution,
            args,
            truncation,
        } => StmtKind::Tilde {
            arg: Box::new(traverse_expr_with_state(arg, state, f_expr)),
            distribution: distribution.clone(),
            args: args.iter().map(|a| traverse_expr_with_state(a, state, f_expr)).collect(),
            truncation: traverse_truncation_with_state(truncation, state, f_expr),
        },
        StmtKind::Break => StmtKind::Break,
        StmtKind::Continue => StmtKind::Continue,
        StmtKind::Return(opt) => StmtKind::Return(opt.as_ref().map(|e| Box::new(traverse_expr_with_state(e, state, f_expr)))),
        StmtKind::Skip => StmtKind::Skip,
        StmtKind::Reject(args) => {
            StmtKind::Reject(args.iter().map(|a| traverse_expr_with_state(a, state, f_expr)).collect())
        }
        StmtKind::IfElse(c, then, opt_else) => StmtKind::IfElse(
            Box::new(traverse_expr_with_state(c, state, f_expr)),
            Box::new(traverse_stmt_with_state(then, state, f_stmt, f_expr)),
            opt_else.as_ref().map(|e| Box::new(traverse_stmt_with_state(e, state, f_stmt, f_expr))),
        ),
        StmtKind::While(c, body) => StmtKind::While(
            Box::new(traverse_expr_with_state(c, state, f_expr)),
            Box::new(traverse_stmt_with_state(body, state, f_stmt, f_expr)),
        ),
        StmtKind::For { loopvar, lower, upper, body } => StmtKind::For {
            loopvar: loopvar.clone(),
            lower: Box::new(traverse_expr_with_state(lower, state, f_expr)),
            upper: Box::new(traverse_expr_with_state(upper, state, f_expr)),
            body: Box::new(traverse_stmt_with_state(body, state, f_stmt, f_expr)),
        },
        StmtKind::Block(stmts) => {
            StmtKind::Block(stmts.iter().map(|s2| traverse_stmt_with_state(s2, state, f_stmt, f_expr)).collect())
        }
        StmtKind::SList(stmts) => {
            StmtKind::SList(stmts.iter().map(|s2| traverse_stmt_with_state(s2, state, f_stmt, f_expr)).collect())
        }
        StmtKind::Decl { ad, name, ty } => StmtKind::Decl {
            ad: *ad,
            name: name.clone(),
            ty: traverse_sized_type_with_state(ty, state, f_expr),
        },
        StmtKind::FunDef { returns, name, params, body } => StmtKind::FunDef {
            returns: returns.clone(),
            name: name.clone(),
            params: params.clone(),
            body: Box::new(traverse_stmt_with_state(body, state, f_stmt, f_expr)),
        },
    };
    Stmt::new(kind, meta)
}

fn traverse_truncation_with_state<D: Decoration, D2: Decoration, S>(
    t: &Truncation<D>,
    state: &mut S,
    f_expr: &mut impl FnMut(&mut S, &D::ExprMeta) -> D2::ExprMeta,
) -> Truncation<D2> {
    match t {
        Truncation::None => Truncation::None,
        Truncation::Upper(e) => Truncation::Upper(Box::new(traverse_expr_with_state(e, state, f_expr))),
        Truncation::Lower(e) => Truncation::Lower(Box::new(traverse_expr_with_state(e, state, f_expr))),
        Truncation::Both(lo, hi) => Truncation::Both(
            Box::new(traverse_expr_with_state(lo, state, f_expr)),
            Box::new(traverse_expr_with_state(hi, state, f_expr)),
        ),
    }
}

/// Assigns unique, pre-order-monotonic labels to every node of `s`,
/// producing the labeled decoration (spec.md §4.4; §3 invariant "Labels
/// assigned by the labeling pass are unique within a program").
pub fn label_stmt<D: Decoration>(s: &Stmt<D>) -> Stmt<super::meta::Labeled<D>> {
    let mut next = 0u32;
    traverse_stmt_with_state(
        s,
        &mut next,
        &mut |n, meta| {
            let label = Label(*n);
            *n += 1;
            LabeledMeta {
                label,
                inner: meta.clone(),
            }
        },
        &mut |n, meta| {
            let label = Label(*n);
            *n += 1;
            LabeledMeta {
                label,
                inner: meta.clone(),
            }
        },
    )
}

// ---------------------------------------------------------------------
// associate
// ---------------------------------------------------------------------

/// Indexes every labeled subtree of `s` by its label (spec.md §4.4
/// `associate`).
#[must_use]
pub fn associate<D: Decoration>(
    s: &Stmt<super::meta::Labeled<D>>,
) -> (AHashMap<Label, Expr<super::meta::Labeled<D>>>, AHashMap<Label, Stmt<super::meta::Labeled<D>>>) {
    let mut exprs = AHashMap::default();
    let mut stmts = AHashMap::default();
    associate_stmt(s, &mut exprs, &mut stmts);
    (exprs, stmts)
}

fn associate_stmt<D: Decoration>(
    s: &Stmt<super::meta::Labeled<D>>,
    exprs: &mut AHashMap<Label, Expr<super::meta::Labeled<D>>>,
    stmts: &mut AHashMap<Label, Stmt<super::meta::Labeled<D>>>,
) {
    stmts.insert(s.meta.label, s.clone());
    // `Assign`'s `child_exprs` surfaces the lvalue's indices and the rhs,
    // but not the bare `LValue.meta` the labeling pass also assigns a
    // label to; reconstruct a `Var` node for it here so every label
    // `label_stmt` hands out ends up associated (spec.md §4.4 "indexes
    // every labeled subtree").
    if let StmtKind::Assign(lvalue, _, _) = &s.kind {
        let lvalue_var = Expr::new(ExprKind::Var(lvalue.name.clone()), lvalue.meta.clone());
        associate_expr(&lvalue_var, exprs);
    }
    for e in s.child_exprs() {
        associate_expr(e, exprs);
    }
    for c in s.child_stmts() {
        associate_stmt(c, exprs, stmts);
    }
}

fn associate_expr<D: Decoration>(e: &Expr<super::meta::Labeled<D>>, exprs: &mut AHashMap<Label, Expr<super::meta::Labeled<D>>>) {
    exprs.insert(e.meta.label, e.clone());
    for c in e.children() {
        associate_expr(c, exprs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{Expr, ExprKind, LitKind};
    use crate::ir::meta::NoMeta;
    use crate::ir::stmt::{AssignOp, LValue, Stmt, StmtKind};

    fn lit(n: &str) -> Box<Expr<NoMeta>> {
        Box::new(Expr::new(ExprKind::Lit(LitKind::Int, n.to_owned()), ()))
    }

    #[test]
    fn labels_are_unique_and_preorder() {
        // `x = 1 + 2;` as a Block containing one Assign.
        let rhs = Expr::new(
            ExprKind::FunApp(crate::ir::expr::FunKind::StanLib, "Plus__".to_owned(), vec![*lit("1"), *lit("2")]),
            (),
        );
        let assign = Stmt::new(
            StmtKind::Assign(
                LValue {
                    name: "x".to_owned(),
                    indices: vec![],
                    meta: (),
                },
                AssignOp::Assign,
                Box::new(rhs),
            ),
            (),
        );
        let block = Stmt::new(StmtKind::Block(vec![assign]), ());

        let labeled = label_stmt(&block);
        let (exprs, stmts) = associate(&labeled);

        // block(0) -> assign(1) -> [lvalue? none has own meta? ] rhs FunApp(2) -> 1(3), 2(4)
        let mut labels: Vec<u32> = stmts.keys().map(|l| l.0).chain(exprs.keys().map(|l| l.0)).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels, (0..labels.len() as u32).collect::<Vec<_>>());
    }
}
