//! Constant folding on literal operands (spec.md §4.6.1).
//!
//! Runs before the specialized-function rewrites at every node of the
//! single bottom-up pass ([`super::optimize`]): folding a literal subtree
//! can expose a new opportunity for a specialized rewrite one level up
//! (e.g. `pow(x, 1/2)` only becomes `sqrt(x)`-shaped once `1/2` has folded
//! to `0.5`), so this module is tried first at every node.

use crate::ir::meta::{ExprTypeLoc, TypedLocated};
use crate::ir::{Expr, ExprKind, LitKind};
use crate::types::{AdLevel, UnsizedType};

fn as_i64(e: &Expr<TypedLocated>) -> Option<i64> {
    match &e.kind {
        ExprKind::Lit(LitKind::Int, text) => text.parse().ok(),
        _ => None,
    }
}

fn as_f64(e: &Expr<TypedLocated>) -> Option<f64> {
    match &e.kind {
        ExprKind::Lit(LitKind::Int, text) => text.parse::<i64>().ok().map(|v| v as f64),
        ExprKind::Lit(LitKind::Real, text) => text.parse().ok(),
        _ => None,
    }
}

fn is_int_lit(e: &Expr<TypedLocated>) -> bool {
    matches!(&e.kind, ExprKind::Lit(LitKind::Int, _))
}

/// Formats a folded real so it round-trips as a `Real` literal (an integral
/// value like `3` would otherwise re-parse as `Int` on a later pass).
fn format_real(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

fn int_lit(n: i64, span: crate::span::SourceSpan) -> Expr<TypedLocated> {
    Expr::new(ExprKind::Lit(LitKind::Int, n.to_string()), ExprTypeLoc { ty: UnsizedType::Int, ad: AdLevel::DataOnly, span })
}

fn real_lit(v: f64, span: crate::span::SourceSpan) -> Expr<TypedLocated> {
    Expr::new(
        ExprKind::Lit(LitKind::Real, format_real(v)),
        ExprTypeLoc { ty: UnsizedType::Real, ad: AdLevel::DataOnly, span },
    )
}

/// Folds `e` if it is a prefix/binary/logical/ternary operator applied to
/// literal operands; otherwise returns it unchanged. Only ever narrows a
/// tree (never introduces a node the analyzer wouldn't already have
/// accepted), so it never needs the catalog applicability guard that the
/// specialized rewrites in [`super::rewrites`] do.
#[must_use]
pub fn fold_constants(e: Expr<TypedLocated>) -> Expr<TypedLocated> {
    match &e.kind {
        ExprKind::FunApp(_, name, args) if args.len() == 1 => fold_prefix(name, &args[0], &e).unwrap_or(e),
        ExprKind::FunApp(_, name, args) if args.len() == 2 => fold_binary(name, &args[0], &args[1], &e).unwrap_or(e),
        ExprKind::EAnd(a, b) => fold_logical(true, a, b, &e).unwrap_or(e),
        ExprKind::EOr(a, b) => fold_logical(false, a, b, &e).unwrap_or(e),
        ExprKind::TernaryIf(c, t, f) => fold_ternary(c, t, f).unwrap_or(e),
        _ => e,
    }
}

fn fold_prefix(name: &str, a: &Expr<TypedLocated>, whole: &Expr<TypedLocated>) -> Option<Expr<TypedLocated>> {
    let span = whole.meta.span.clone();
    match name {
        "PPlus__" if is_int_lit(a) => Some(int_lit(as_i64(a)?, span)),
        "PPlus__" => Some(real_lit(as_f64(a)?, span)),
        "PMinus__" if is_int_lit(a) => Some(int_lit(-as_i64(a)?, span)),
        "PMinus__" => Some(real_lit(-as_f64(a)?, span)),
        "PNot__" => Some(int_lit(i64::from(as_i64(a)? == 0), span)),
        _ => None,
    }
}

fn fold_binary(name: &str, a: &Expr<TypedLocated>, b: &Expr<TypedLocated>, whole: &Expr<TypedLocated>) -> Option<Expr<TypedLocated>> {
    let span = whole.meta.span.clone();
    if is_int_lit(a) && is_int_lit(b) {
        let (x, y) = (as_i64(a)?, as_i64(b)?);
        let v = match name {
            "Plus__" => Some(x + y),
            "Minus__" => Some(x - y),
            "Times__" => Some(x * y),
            "Divide__" if y != 0 => Some(x / y),
            "Modulo__" if y != 0 => Some(x % y),
            _ => None,
        };
        if let Some(v) = v {
            return Some(int_lit(v, span));
        }
        let cmp = match name {
            "Equals__" => Some(x == y),
            "NEquals__" => Some(x != y),
            "Less__" => Some(x < y),
            "Leq__" => Some(x <= y),
            "Greater__" => Some(x > y),
            "Geq__" => Some(x >= y),
            _ => None,
        };
        return cmp.map(|c| int_lit(i64::from(c), span));
    }
    let (x, y) = (as_f64(a)?, as_f64(b)?);
    let arith = match name {
        "Plus__" => Some(x + y),
        "Minus__" => Some(x - y),
        "Times__" => Some(x * y),
        "Divide__" if y != 0.0 => Some(x / y),
        _ => None,
    };
    if let Some(v) = arith {
        return Some(real_lit(v, span));
    }
    let cmp = match name {
        "Equals__" => Some(x == y),
        "NEquals__" => Some(x != y),
        "Less__" => Some(x < y),
        "Leq__" => Some(x <= y),
        "Greater__" => Some(x > y),
        "Geq__" => Some(x >= y),
        _ => None,
    };
    cmp.map(|c| int_lit(i64::from(c), span))
}

fn fold_logical(is_and: bool, a: &Expr<TypedLocated>, b: &Expr<TypedLocated>, whole: &Expr<TypedLocated>) -> Option<Expr<TypedLocated>> {
    let span = whole.meta.span.clone();
    let (x, y) = (as_f64(a)?, as_f64(b)?);
    let truthy = |v: f64| v != 0.0;
    let result = if is_and { truthy(x) && truthy(y) } else { truthy(x) || truthy(y) };
    Some(int_lit(i64::from(result), span))
}

/// `TernaryIf(Lit(Int,"0"), _, e) -> e`; `TernaryIf(Lit(Int,k≠0), t, _) -> t`
/// (spec.md §4.6.1). Only fires when the condition itself is a literal;
/// `t`/`f` need not be.
fn fold_ternary(c: &Expr<TypedLocated>, t: &Expr<TypedLocated>, f: &Expr<TypedLocated>) -> Option<Expr<TypedLocated>> {
    let k = as_i64(c)?;
    Some(if k == 0 { f.clone() } else { t.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{CodeLoc, SourceSpan};

    fn span() -> SourceSpan {
        SourceSpan::new("f", CodeLoc::new(0, 0), CodeLoc::new(0, 1))
    }

    fn int(n: &str) -> Expr<TypedLocated> {
        Expr::new(ExprKind::Lit(LitKind::Int, n.to_owned()), ExprTypeLoc { ty: UnsizedType::Int, ad: AdLevel::DataOnly, span: span() })
    }

    fn real(n: &str) -> Expr<TypedLocated> {
        Expr::new(ExprKind::Lit(LitKind::Real, n.to_owned()), ExprTypeLoc { ty: UnsizedType::Real, ad: AdLevel::DataOnly, span: span() })
    }

    fn call(name: &str, args: Vec<Expr<TypedLocated>>, ty: UnsizedType) -> Expr<TypedLocated> {
        Expr::new(
            ExprKind::FunApp(crate::ir::FunKind::StanLib, name.to_owned(), args),
            ExprTypeLoc { ty, ad: AdLevel::DataOnly, span: span() },
        )
    }

    #[test]
    fn folds_integer_addition() {
        let e = call("Plus__", vec![int("2"), int("3")], UnsizedType::Int);
        let folded = fold_constants(e);
        assert_eq!(folded.kind, ExprKind::Lit(LitKind::Int, "5".to_owned()));
    }

    #[test]
    fn folds_mixed_division_to_real() {
        let e = call("Divide__", vec![int("1"), real("2.0")], UnsizedType::Real);
        let folded = fold_constants(e);
        assert_eq!(folded.kind, ExprKind::Lit(LitKind::Real, "0.5".to_owned()));
    }

    #[test]
    fn folds_prefix_negation_of_int_literal() {
        let e = call("PMinus__", vec![int("4")], UnsizedType::Int);
        let folded = fold_constants(e);
        assert_eq!(folded.kind, ExprKind::Lit(LitKind::Int, "-4".to_owned()));
    }

    #[test]
    fn ternary_on_zero_literal_picks_else_branch() {
        let e = Expr::new(
            ExprKind::TernaryIf(Box::new(int("0")), Box::new(int("1")), Box::new(int("2"))),
            ExprTypeLoc { ty: UnsizedType::Int, ad: AdLevel::DataOnly, span: span() },
        );
        let folded = fold_constants(e);
        assert_eq!(folded.kind, ExprKind::Lit(LitKind::Int, "2".to_owned()));
    }
}
