//! Expression typing (spec.md §4.5.4 "Expression typing").

use super::indexing::index_result_type;
use super::Context;
use crate::catalog::ResolveError;
use crate::errors::{CompileError, ErrorKind};
use crate::ir::meta::{ExprTypeLoc, Located, TypedLocated};
use crate::ir::{Expr, ExprKind, FunKind, Index, LitKind};
use crate::span::SourceSpan;
use crate::types::{AdLevel, ReturnType, UnsizedType};

fn ill_typed_call(name: &str, arg_types: &[(AdLevel, UnsizedType)], span: &SourceSpan) -> CompileError {
    CompileError::new(
        ErrorKind::IllTypedFunctionApp {
            name: name.to_owned(),
            arg_types: arg_types.iter().map(|(_, t)| t.clone()).collect(),
        },
        span.clone(),
        format!("no overload of '{name}' matches the supplied argument types"),
    )
}

/// spec.md §4.5.4. Recursively types `e`, producing the typed-located
/// decoration.
pub fn type_expr(ctx: &mut Context<'_>, e: &Expr<Located>) -> Result<Expr<TypedLocated>, CompileError> {
    let span = e.meta.clone();
    match &e.kind {
        ExprKind::Lit(kind, text) => {
            let ty = match kind {
                LitKind::Int => UnsizedType::Int,
                LitKind::Real => UnsizedType::Real,
                LitKind::Str => UnsizedType::Int, // strings have no first-class UnsizedType; treated as opaque data.
            };
            Ok(Expr::new(
                ExprKind::Lit(*kind, text.clone()),
                ExprTypeLoc { ty, ad: AdLevel::DataOnly, span },
            ))
        }
        ExprKind::Var(name) => {
            if let Some(info) = ctx.symbols.look(name) {
                return Ok(Expr::new(
                    ExprKind::Var(name.clone()),
                    ExprTypeLoc { ty: info.ty.clone(), ad: info.ad, span },
                ));
            }
            if ctx.catalog.contains(name) {
                return Ok(Expr::new(
                    ExprKind::Var(name.clone()),
                    ExprTypeLoc {
                        ty: UnsizedType::MathLibraryFunction,
                        ad: AdLevel::DataOnly,
                        span,
                    },
                ));
            }
            Err(CompileError::new(
                ErrorKind::IdentifierNotInScope,
                span,
                format!("'{name}' is not declared"),
            ))
        }
        ExprKind::FunApp(kind, name, args) | ExprKind::CondDistApp(kind, name, args) => {
            let is_cond_dist = matches!(e.kind, ExprKind::CondDistApp(..));
            if is_cond_dist && !has_distribution_suffix(name) {
                return Err(CompileError::new(
                    ErrorKind::IllTypedNotAFunction { name: name.clone() },
                    span,
                    format!("'{name}' is used as a conditional-distribution application but is not a distribution"),
                ));
            }
            if name.ends_with("_rng") && !ctx.in_rng_context {
                return Err(CompileError::new(
                    ErrorKind::FnRng,
                    span,
                    format!("'{name}' may only be called from transformed data, generated quantities, or an _rng function"),
                ));
            }
            if name.ends_with("_lp") && !ctx.in_model_or_lp_context {
                return Err(CompileError::new(
                    ErrorKind::FnTargetPlusEquals,
                    span,
                    format!("'{name}' may only be called from the model block or an _lp function"),
                ));
            }
            let typed_args: Vec<Expr<TypedLocated>> = args.iter().map(|a| type_expr(ctx, a)).collect::<Result<_, _>>()?;
            let actuals: Vec<(AdLevel, UnsizedType)> = typed_args.iter().map(|a| (a.meta.ad, a.meta.ty.clone())).collect();

            match ctx.catalog.resolve(name, &actuals) {
                Ok(ReturnType::Void) => Err(CompileError::new(
                    ErrorKind::IllTypedNRFunction { name: name.clone() },
                    span,
                    format!("'{name}' returns void and cannot be used as an expression"),
                )),
                Ok(ReturnType::Returning(ty)) => {
                    let ad = typed_args.iter().fold(AdLevel::DataOnly, |acc, a| acc.lub(a.meta.ad));
                    Ok(Expr::new(
                        if is_cond_dist {
                            ExprKind::CondDistApp(*kind, name.clone(), typed_args)
                        } else {
                            ExprKind::FunApp(*kind, name.clone(), typed_args)
                        },
                        ExprTypeLoc { ty: ty.clone(), ad, span },
                    ))
                }
                Err(ResolveError::UnknownName) => Err(CompileError::new(
                    ErrorKind::IllTypedNoSuchFunction { name: name.clone() },
                    span,
                    format!("no function named '{name}'"),
                )),
                Err(ResolveError::NoMatchingOverload) => Err(ill_typed_call(name, &actuals, &span)),
            }
        }
        ExprKind::TernaryIf(c, t, f) => {
            let c = type_expr(ctx, c)?;
            let t = type_expr(ctx, t)?;
            let f = type_expr(ctx, f)?;
            if !c.meta.ty.is_int_or_real() {
                return Err(CompileError::new(
                    ErrorKind::IllTypedTernaryIf {
                        t1: c.meta.ty.clone(),
                        t2: t.meta.ty.clone(),
                        t3: f.meta.ty.clone(),
                    },
                    span,
                    "ternary condition must be int or real",
                ));
            }
            let ty = unify_widening(&t.meta.ty, &f.meta.ty).ok_or_else(|| {
                CompileError::new(
                    ErrorKind::IllTypedTernaryIf {
                        t1: c.meta.ty.clone(),
                        t2: t.meta.ty.clone(),
                        t3: f.meta.ty.clone(),
                    },
                    span.clone(),
                    "ternary branches do not unify",
                )
            })?;
            let ad = c.meta.ad.lub(t.meta.ad).lub(f.meta.ad);
            Ok(Expr::new(
                ExprKind::TernaryIf(Box::new(c), Box::new(t), Box::new(f)),
                ExprTypeLoc { ty, ad, span },
            ))
        }
        ExprKind::EAnd(a, b) | ExprKind::EOr(a, b) => {
            let a = type_expr(ctx, a)?;
            let b = type_expr(ctx, b)?;
            if !a.meta.ty.is_int_or_real() || !b.meta.ty.is_int_or_real() {
                return Err(CompileError::new(
                    ErrorKind::IllTypedBinOp {
                        op: if matches!(e.kind, ExprKind::EAnd(..)) { "&&".to_owned() } else { "||".to_owned() },
                        lhs: a.meta.ty.clone(),
                        rhs: b.meta.ty.clone(),
                    },
                    span,
                    "logical operator requires int-or-real operands",
                ));
            }
            let ad = a.meta.ad.lub(b.meta.ad);
            let kind = if matches!(e.kind, ExprKind::EAnd(..)) {
                ExprKind::EAnd(Box::new(a), Box::new(b))
            } else {
                ExprKind::EOr(Box::new(a), Box::new(b))
            };
            Ok(Expr::new(kind, ExprTypeLoc { ty: UnsizedType::Int, ad, span }))
        }
        ExprKind::Indexed(base, idxs) => {
            let base = type_expr(ctx, base)?;
            let typed_idxs: Vec<Index<TypedLocated>> = idxs.iter().map(|i| type_index(ctx, i)).collect::<Result<_, _>>()?;
            let ty = index_result_type(&base.meta.ty, &typed_idxs).ok_or_else(|| {
                CompileError::new(
                    ErrorKind::InvalidIndex { base_type: base.meta.ty.clone() },
                    span.clone(),
                    "type cannot be indexed this way",
                )
            })?;
            let ad = base.meta.ad;
            Ok(Expr::new(
                ExprKind::Indexed(Box::new(base), typed_idxs),
                ExprTypeLoc { ty, ad, span },
            ))
        }
    }
}

pub(crate) fn type_index(ctx: &mut Context<'_>, idx: &Index<Located>) -> Result<Index<TypedLocated>, CompileError> {
    Ok(match idx {
        Index::All => Index::All,
        Index::Single(e) => Index::Single(Box::new(type_expr(ctx, e)?)),
        Index::Multi(e) => Index::Multi(Box::new(type_expr(ctx, e)?)),
        Index::Upfrom(e) => Index::Upfrom(Box::new(type_expr(ctx, e)?)),
        Index::Downfrom(e) => Index::Downfrom(Box::new(type_expr(ctx, e)?)),
        Index::Between(lo, hi) => Index::Between(Box::new(type_expr(ctx, lo)?), Box::new(type_expr(ctx, hi)?)),
    })
}

/// int/real widening used by ternary unification (spec.md §4.5.4: "branches
/// must unify via the type lattice (int<->real widening)").
fn unify_widening(a: &UnsizedType, b: &UnsizedType) -> Option<UnsizedType> {
    if a == b {
        return Some(a.clone());
    }
    match (a, b) {
        (UnsizedType::Int, UnsizedType::Real) | (UnsizedType::Real, UnsizedType::Int) => Some(UnsizedType::Real),
        _ => None,
    }
}

const DISTRIBUTION_SUFFIXES: &[&str] = &["_lpmf", "_lpdf", "_lcdf", "_lccdf", "_cdf_log", "_ccdf_log", "_log"];

fn has_distribution_suffix(name: &str) -> bool {
    DISTRIBUTION_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// The catalog name a bare distribution-suffixed call to `distribution`
/// resolves to for a `~` statement's own argument (spec.md §4.5.6 `Tilde`):
/// `normal` sampling resolves against `normal_lpdf`.
#[must_use]
pub fn lpdf_name(distribution: &str) -> String {
    format!("{distribution}_lpdf")
}

#[must_use]
pub fn lpmf_name(distribution: &str) -> String {
    format!("{distribution}_lpmf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::context::AnalyzerOptions;
    use crate::span::CodeLoc;

    fn ctx(catalog: &Catalog, options: &AnalyzerOptions) -> Context<'_> {
        Context::new(catalog, options, "m")
    }

    fn span() -> SourceSpan {
        SourceSpan::new("f", CodeLoc::new(0, 0), CodeLoc::new(0, 1))
    }

    #[test]
    fn unbound_var_is_identifier_not_in_scope() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let e = Expr::new(ExprKind::Var("missing".to_owned()), span());
        let err = type_expr(&mut c, &e).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IdentifierNotInScope);
    }

    #[test]
    fn funapp_with_no_matching_overload_reports_supplied_types() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let e = Expr::new(
            ExprKind::FunApp(
                FunKind::StanLib,
                "log".to_owned(),
                vec![
                    Expr::new(ExprKind::Lit(LitKind::Int, "1".to_owned()), span()),
                    Expr::new(ExprKind::Lit(LitKind::Int, "2".to_owned()), span()),
                ],
            ),
            span(),
        );
        let err = type_expr(&mut c, &e).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IllTypedFunctionApp { .. }));
    }

    #[test]
    fn rng_suffixed_call_outside_rng_context_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let e = Expr::new(ExprKind::FunApp(FunKind::StanLib, "normal_rng".to_owned(), vec![]), span());
        let err = type_expr(&mut c, &e).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FnRng);
    }

    #[test]
    fn lp_suffixed_call_outside_model_or_lp_context_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let e = Expr::new(ExprKind::FunApp(FunKind::UserDefined, "foo_lp".to_owned(), vec![]), span());
        let err = type_expr(&mut c, &e).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FnTargetPlusEquals);
    }

    #[test]
    fn ternary_widens_int_and_real_branches() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let e = Expr::new(
            ExprKind::TernaryIf(
                Box::new(Expr::new(ExprKind::Lit(LitKind::Int, "1".to_owned()), span())),
                Box::new(Expr::new(ExprKind::Lit(LitKind::Int, "2".to_owned()), span())),
                Box::new(Expr::new(ExprKind::Lit(LitKind::Real, "3.0".to_owned()), span())),
            ),
            span(),
        );
        let typed = type_expr(&mut c, &e).unwrap();
        assert_eq!(typed.meta.ty, UnsizedType::Real);
    }
}
