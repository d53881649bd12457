//! Deep equality that ignores the metadata slot (spec.md §9 design notes;
//! used by the partial evaluator's `x == y` rewrites in §4.6.2, and by
//! invariant 4 in spec.md §8, "the partial evaluator is idempotent").

use super::expr::{Expr, ExprKind, Index};
use super::meta::Decoration;

/// Structural equality of two expressions under the same decoration,
/// comparing only `kind` (recursively) and never `meta`.
#[must_use]
pub fn expr_eq_modulo_meta<D: Decoration>(a: &Expr<D>, b: &Expr<D>) -> bool {
    match (&a.kind, &b.kind) {
        (ExprKind::Var(n1), ExprKind::Var(n2)) => n1 == n2,
        (ExprKind::Lit(k1, t1), ExprKind::Lit(k2, t2)) => k1 == k2 && t1 == t2,
        (ExprKind::FunApp(k1, n1, args1), ExprKind::FunApp(k2, n2, args2))
        | (ExprKind::CondDistApp(k1, n1, args1), ExprKind::CondDistApp(k2, n2, args2)) => {
            k1 == k2 && n1 == n2 && args_eq_modulo_meta(args1, args2)
        }
        (ExprKind::TernaryIf(c1, t1, e1), ExprKind::TernaryIf(c2, t2, e2)) => {
            expr_eq_modulo_meta(c1, c2) && expr_eq_modulo_meta(t1, t2) && expr_eq_modulo_meta(e1, e2)
        }
        (ExprKind::EAnd(a1, b1), ExprKind::EAnd(a2, b2)) | (ExprKind::EOr(a1, b1), ExprKind::EOr(a2, b2)) => {
            expr_eq_modulo_meta(a1, a2) && expr_eq_modulo_meta(b1, b2)
        }
        (ExprKind::Indexed(base1, idx1), ExprKind::Indexed(base2, idx2)) => {
            expr_eq_modulo_meta(base1, base2)
                && idx1.len() == idx2.len()
                && idx1.iter().zip(idx2).all(|(i1, i2)| index_eq_modulo_meta(i1, i2))
        }
        _ => false,
    }
}

fn args_eq_modulo_meta<D: Decoration>(a: &[Expr<D>], b: &[Expr<D>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| expr_eq_modulo_meta(x, y))
}

fn index_eq_modulo_meta<D: Decoration>(a: &Index<D>, b: &Index<D>) -> bool {
    match (a, b) {
        (Index::All, Index::All) => true,
        (Index::Single(x), Index::Single(y))
        | (Index::Multi(x), Index::Multi(y))
        | (Index::Upfrom(x), Index::Upfrom(y))
        | (Index::Downfrom(x), Index::Downfrom(y)) => expr_eq_modulo_meta(x, y),
        (Index::Between(l1, h1), Index::Between(l2, h2)) => expr_eq_modulo_meta(l1, l2) && expr_eq_modulo_meta(h1, h2),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::meta::{ExprTypeLoc, TypedLocated};
    use crate::span::SourceSpan;
    use crate::types::{AdLevel, UnsizedType};

    fn var(name: &str, span_col: u32) -> Expr<TypedLocated> {
        Expr::new(
            ExprKind::Var(name.to_owned()),
            ExprTypeLoc {
                ty: UnsizedType::Real,
                ad: AdLevel::AutoDiffable,
                span: SourceSpan::new("f", crate::span::CodeLoc::new(0, span_col), crate::span::CodeLoc::new(0, span_col)),
            },
        )
    }

    #[test]
    fn same_name_different_span_is_equal() {
        assert!(expr_eq_modulo_meta(&var("x", 0), &var("x", 10)));
    }

    #[test]
    fn different_name_is_not_equal() {
        assert!(!expr_eq_modulo_meta(&var("x", 0), &var("y", 0)));
    }
}
