//! Specialized-function rewrites (spec.md §4.6.2) and the applicability
//! guard that reverts them (spec.md §4.6.3).
//!
//! Every rewrite here is a pure tree-shape match: given a bottom-up node
//! whose children have already been folded/rewritten, try each pattern in
//! the order listed in spec.md §4.6.2 and return the first that applies
//! (spec.md §5: "within a single node, alternative rewrites are tried in
//! the order listed ... and the first applicable one wins"). Matrix-heavy
//! multi-term fusions the spec also names (`quad_form` family,
//! `diag_matrix` products, `matrix_exp` fusions, `trace_gen_quad_form`)
//! are matched only for the exact associativities spec.md §4.6.2 spells
//! out: spec.md §9 Open Question 3 says to "match only the exact shapes
//! listed here and leave other shapes unrewritten" where the source
//! itself has incomplete associativity coverage, so no speculative
//! generalization to other parenthesizations is attempted here either.

use crate::catalog::Catalog;
use crate::ir::meta::{ExprTypeLoc, TypedLocated};
use crate::ir::{expr_eq_modulo_meta, Expr, ExprKind, FunKind, LitKind};
use crate::types::AdLevel;

fn is_real_literal(e: &Expr<TypedLocated>, text: &str) -> bool {
    matches!(&e.kind, ExprKind::Lit(LitKind::Real, t) if t == text) || matches!(&e.kind, ExprKind::Lit(LitKind::Int, t) if t == text)
}

fn call_named<'a>(e: &'a Expr<TypedLocated>, name: &str) -> Option<&'a [Expr<TypedLocated>]> {
    match &e.kind {
        ExprKind::FunApp(_, n, args) if n == name => Some(args),
        _ => None,
    }
}

fn single_arg_call<'a>(e: &'a Expr<TypedLocated>, name: &str) -> Option<&'a Expr<TypedLocated>> {
    call_named(e, name).filter(|a| a.len() == 1).map(|a| &a[0])
}

/// Builds a replacement call, keeping `whole`'s decoration (type/ad/span
/// do not change across a rewrite — only the call tree does) but letting
/// the applicability guard in [`apply`] discard it if the catalog
/// disagrees.
fn make_call(name: &str, args: Vec<Expr<TypedLocated>>, whole: &Expr<TypedLocated>) -> Expr<TypedLocated> {
    Expr::new(ExprKind::FunApp(FunKind::StanLib, name.to_owned(), args), whole.meta.clone())
}

/// Tries every pattern in spec.md §4.6.2 order against `e`, returning the
/// rewritten call on the first match (before the applicability guard has
/// run), or `None` if nothing matches.
#[allow(clippy::too_many_lines)]
fn try_rewrite(e: &Expr<TypedLocated>) -> Option<Expr<TypedLocated>> {
    // log(1 - exp(x)) -> log1m_exp(x)
    if let Some(inner) = single_arg_call(e, "log") {
        if let Some(args) = call_named(inner, "Minus__") {
            if is_real_literal(&args[0], "1") {
                if let Some(exp_args) = call_named(&args[1], "exp") {
                    return Some(make_call("log1m_exp", exp_args.to_vec(), e));
                }
                if let Some(inv_logit_args) = call_named(&args[1], "inv_logit") {
                    return Some(make_call("log1m_inv_logit", inv_logit_args.to_vec(), e));
                }
                // log(1 - x) -> log1m(x), tried last: more specific patterns above win first.
                return Some(make_call("log1m", vec![args[1].clone()], e));
            }
        }
        if let Some(args) = call_named(inner, "Plus__") {
            if is_real_literal(&args[0], "1") {
                if let Some(exp_args) = call_named(&args[1], "exp") {
                    return Some(make_call("log1p_exp", exp_args.to_vec(), e));
                }
                return Some(make_call("log1p", vec![args[1].clone()], e));
            }
            if is_real_literal(&args[1], "1") {
                if let Some(exp_args) = call_named(&args[0], "exp") {
                    return Some(make_call("log1p_exp", exp_args.to_vec(), e));
                }
                return Some(make_call("log1p", vec![args[0].clone()], e));
            }
        }
        // log(exp(x) - exp(y)) -> log_diff_exp(x,y); log(exp(x) + exp(y)) -> log_sum_exp(x,y)
        if let Some(args) = call_named(inner, "Minus__") {
            if let (Some(xa), Some(ya)) = (call_named(&args[0], "exp"), call_named(&args[1], "exp")) {
                return Some(make_call("log_diff_exp", vec![xa[0].clone(), ya[0].clone()], e));
            }
        }
        if let Some(args) = call_named(inner, "Plus__") {
            if let (Some(xa), Some(ya)) = (call_named(&args[0], "exp"), call_named(&args[1], "exp")) {
                return Some(make_call("log_sum_exp", vec![xa[0].clone(), ya[0].clone()], e));
            }
        }
        // log(|det(x)|) -> log_determinant(x)
        if let Some(det_args) = single_arg_call(inner, "abs").and_then(|a| call_named(a, "determinant")) {
            return Some(make_call("log_determinant", det_args.to_vec(), e));
        }
        // log(falling_factorial(...)), log(rising_factorial(...)), log(inv_logit(...)), log(softmax(...))
        if let Some(args) = call_named(inner, "falling_factorial") {
            return Some(make_call("log_falling_factorial", args.to_vec(), e));
        }
        if let Some(args) = call_named(inner, "rising_factorial") {
            return Some(make_call("log_rising_factorial", args.to_vec(), e));
        }
        if let Some(arg) = single_arg_call(inner, "inv_logit") {
            return Some(make_call("log_inv_logit", vec![arg.clone()], e));
        }
        if let Some(arg) = single_arg_call(inner, "softmax") {
            return Some(make_call("log_softmax", vec![arg.clone()], e));
        }
        // log(sum(exp(l))) -> log_sum_exp(l), the reduce-over-container form.
        if let Some(sum_arg) = single_arg_call(inner, "sum") {
            if let Some(l) = single_arg_call(sum_arg, "exp") {
                return Some(make_call("log_sum_exp", vec![l.clone()], e));
            }
        }
    }

    // exp(x) - 1 -> expm1(x) (and the symmetric 1 - exp(x) handled above as log1m_exp's inner).
    if let Some(args) = call_named(e, "Minus__") {
        if let Some(exp_args) = call_named(&args[0], "exp") {
            if is_real_literal(&args[1], "1") {
                return Some(make_call("expm1", exp_args.to_vec(), e));
            }
        }
    }

    // 1 - erf(x) -> erfc(x); 1 - erfc(x) -> erf(x)
    // 1 - gamma_p(x,y) -> gamma_q(x,y); 1 - gamma_q(x,y) -> gamma_p(x,y)
    if let Some(args) = call_named(e, "Minus__") {
        if is_real_literal(&args[0], "1") {
            if let Some(a) = call_named(&args[1], "erf") {
                return Some(make_call("erfc", a.to_vec(), e));
            }
            if let Some(a) = call_named(&args[1], "erfc") {
                return Some(make_call("erf", a.to_vec(), e));
            }
            if let Some(a) = call_named(&args[1], "gamma_p") {
                return Some(make_call("gamma_q", a.to_vec(), e));
            }
            if let Some(a) = call_named(&args[1], "gamma_q") {
                return Some(make_call("gamma_p", a.to_vec(), e));
            }
        }
    }

    // x*y + z and z + x*y -> fma(x,y,z)
    if let Some(args) = call_named(e, "Plus__") {
        if let Some(prod) = call_named(&args[0], "Times__") {
            return Some(make_call("fma", vec![prod[0].clone(), prod[1].clone(), args[1].clone()], e));
        }
        if let Some(prod) = call_named(&args[1], "Times__") {
            return Some(make_call("fma", vec![prod[0].clone(), prod[1].clone(), args[0].clone()], e));
        }
    }

    // pow(2, x) -> exp2(x); pow(x, 2) -> square(x); pow(x, 0.5)/pow(x, 1/2) -> sqrt(x)
    if let Some(args) = call_named(e, "pow") {
        if is_real_literal(&args[0], "2") {
            return Some(make_call("exp2", vec![args[1].clone()], e));
        }
        if is_real_literal(&args[1], "2") {
            return Some(make_call("square", vec![args[0].clone()], e));
        }
        if is_real_literal(&args[1], "0.5") {
            return Some(make_call("sqrt", vec![args[0].clone()], e));
        }
    }

    // square(sd(x)) -> variance(x)
    if let Some(a) = single_arg_call(e, "square") {
        if let Some(inner) = single_arg_call(a, "sd") {
            return Some(make_call("variance", vec![inner.clone()], e));
        }
    }

    // sqrt(2) -> sqrt2()
    if let Some(args) = call_named(e, "sqrt") {
        if is_real_literal(&args[0], "2") {
            return Some(make_call("sqrt2", vec![], e));
        }
    }

    // sum(square(x - y)) -> squared_distance(x,y); sum(diagonal(m)) -> trace(m)
    if let Some(a) = single_arg_call(e, "sum") {
        if let Some(sq) = single_arg_call(a, "square") {
            if let Some(diff) = call_named(sq, "Minus__") {
                return Some(make_call("squared_distance", vec![diff[0].clone(), diff[1].clone()], e));
            }
        }
        if let Some(diag) = single_arg_call(a, "diagonal") {
            return Some(make_call("trace", vec![diag.clone()], e));
        }
    }

    // trace(quad_form(a,b)) -> trace_quad_form(a,b)
    // trace(d * transpose(b) * a * c) with b == c -> trace_gen_quad_form(d,a,b)
    if let Some(a) = single_arg_call(e, "trace") {
        if let Some(qf_args) = call_named(a, "quad_form") {
            return Some(make_call("trace_quad_form", qf_args.to_vec(), e));
        }
        if let Some(outer) = call_named(a, "Times__") {
            if let Some(inner) = call_named(&outer[0], "Times__") {
                if let Some(innermost) = call_named(&inner[0], "Times__") {
                    let (d, transposed_b, matrix_a, c) = (&innermost[0], &innermost[1], &inner[1], &outer[1]);
                    if let Some(b) = single_arg_call(transposed_b, "transpose") {
                        if expr_eq_modulo_meta(b, c) {
                            return Some(make_call("trace_gen_quad_form", vec![d.clone(), matrix_a.clone(), b.clone()], e));
                        }
                    }
                }
            }
        }
    }

    // transpose(diag_matrix(v)) * a * diag_matrix(v) -> quad_form_diag(a,v)
    // transpose(b) * a * b -> quad_form(a,b)
    if let Some(outer) = call_named(e, "Times__") {
        if let Some(inner) = call_named(&outer[0], "Times__") {
            let (lhs, matrix_a, rhs) = (&inner[0], &inner[1], &outer[1]);
            if let Some(v) = single_arg_call(lhs, "transpose").and_then(|t| single_arg_call(t, "diag_matrix")) {
                if let Some(v2) = single_arg_call(rhs, "diag_matrix") {
                    if expr_eq_modulo_meta(v, v2) {
                        return Some(make_call("quad_form_diag", vec![matrix_a.clone(), v.clone()], e));
                    }
                }
            }
            if let Some(b) = single_arg_call(lhs, "transpose") {
                if expr_eq_modulo_meta(b, rhs) {
                    return Some(make_call("quad_form", vec![matrix_a.clone(), b.clone()], e));
                }
            }
        }
    }

    // m * diag_matrix(v) -> diag_post_multiply(m,v); diag_matrix(v) * m -> diag_pre_multiply(v,m)
    if let Some(args) = call_named(e, "Times__") {
        if let Some(v) = single_arg_call(&args[1], "diag_matrix") {
            return Some(make_call("diag_post_multiply", vec![args[0].clone(), v.clone()], e));
        }
        if let Some(v) = single_arg_call(&args[0], "diag_matrix") {
            return Some(make_call("diag_pre_multiply", vec![v.clone(), args[1].clone()], e));
        }
    }

    // matrix_exp(t*a) * b with scalar t -> scale_matrix_exp_multiply(t,a,b)
    // matrix_exp(a) * b -> matrix_exp_multiply(a,b)
    if let Some(args) = call_named(e, "Times__") {
        if let Some(exp_arg) = single_arg_call(&args[0], "matrix_exp") {
            if let Some(prod) = call_named(exp_arg, "Times__") {
                if prod[0].meta.ty.is_int_or_real() {
                    return Some(make_call(
                        "scale_matrix_exp_multiply",
                        vec![prod[0].clone(), prod[1].clone(), args[1].clone()],
                        e,
                    ));
                }
            }
            return Some(make_call("matrix_exp_multiply", vec![exp_arg.clone(), args[1].clone()], e));
        }
    }

    // inv(sqrt(x)) -> inv_sqrt(x); inv(square(x)) -> inv_square(x)
    if let Some(a) = single_arg_call(e, "inv") {
        if let Some(inner) = single_arg_call(a, "sqrt") {
            return Some(make_call("inv_sqrt", vec![inner.clone()], e));
        }
        if let Some(inner) = single_arg_call(a, "square") {
            return Some(make_call("inv_square", vec![inner.clone()], e));
        }
    }

    // x * log(y) -> multiply_log(x,y)
    if let Some(args) = call_named(e, "Times__") {
        if let Some(log_args) = call_named(&args[1], "log") {
            return Some(make_call("multiply_log", vec![args[0].clone(), log_args[0].clone()], e));
        }
    }

    // columns_dot_product(x,x)/rows_dot_product(x,x)/dot_product(x,x) -> *_self(x)
    for (name, self_name) in [
        ("columns_dot_product", "columns_dot_self"),
        ("rows_dot_product", "rows_dot_self"),
        ("dot_product", "dot_self"),
    ] {
        if let Some(args) = call_named(e, name) {
            if expr_eq_modulo_meta(&args[0], &args[1]) {
                return Some(make_call(self_name, vec![args[0].clone()], e));
            }
        }
    }

    // bernoulli_lpmf(y, inv_logit(a + x*beta)) -> bernoulli_logit_glm_lpmf(y, x, a, beta)
    // (and the compact bernoulli_lpmf(y, inv_logit(a)) -> bernoulli_logit_lpmf(y, a) case).
    if let Some(args) = call_named(e, "bernoulli_lpmf") {
        if let Some(link_arg) = single_arg_call(&args[1], "inv_logit") {
            if let Some(glm) = glm_linear_predictor(link_arg) {
                return Some(make_call("bernoulli_logit_glm_lpmf", vec![args[0].clone(), glm.x, glm.alpha, glm.beta], e));
            }
            return Some(make_call("bernoulli_logit_lpmf", vec![args[0].clone(), link_arg.clone()], e));
        }
    }
    // bernoulli_rng(inv_logit(a)) -> bernoulli_logit_rng(a)
    if let Some(args) = call_named(e, "bernoulli_rng") {
        if let Some(link_arg) = single_arg_call(&args[0], "inv_logit") {
            return Some(make_call("bernoulli_logit_rng", vec![link_arg.clone()], e));
        }
    }

    // normal_lpdf(y, a + x*beta, sigma) -> normal_id_glm_lpdf(y, x, a, beta, sigma)
    if let Some(args) = call_named(e, "normal_lpdf") {
        if let Some(glm) = glm_linear_predictor(&args[1]) {
            return Some(make_call(
                "normal_id_glm_lpdf",
                vec![args[0].clone(), glm.x, glm.alpha, glm.beta, args[2].clone()],
                e,
            ));
        }
    }

    // poisson_lpmf(y, exp(a + x*beta)) -> poisson_log_glm_lpmf(y, x, a, beta)
    // (and the compact poisson_lpmf(y, exp(a)) -> poisson_log_lpmf(y, a) case).
    if let Some(args) = call_named(e, "poisson_lpmf") {
        if let Some(link_arg) = single_arg_call(&args[1], "exp") {
            if let Some(glm) = glm_linear_predictor(link_arg) {
                return Some(make_call("poisson_log_glm_lpmf", vec![args[0].clone(), glm.x, glm.alpha, glm.beta], e));
            }
            return Some(make_call("poisson_log_lpmf", vec![args[0].clone(), link_arg.clone()], e));
        }
    }
    if let Some(args) = call_named(e, "poisson_rng") {
        if let Some(link_arg) = single_arg_call(&args[0], "exp") {
            return Some(make_call("poisson_log_rng", vec![link_arg.clone()], e));
        }
    }

    // neg_binomial_2_lpmf(y, exp(a + x*beta), phi) -> neg_binomial_2_log_glm_lpmf(y, x, a, beta, phi)
    // (and the compact neg_binomial_2_lpmf(y, exp(a), phi) -> neg_binomial_2_log_lpmf(y, a, phi) case).
    if let Some(args) = call_named(e, "neg_binomial_2_lpmf") {
        if let Some(link_arg) = single_arg_call(&args[1], "exp") {
            if let Some(glm) = glm_linear_predictor(link_arg) {
                return Some(make_call(
                    "neg_binomial_2_log_glm_lpmf",
                    vec![args[0].clone(), glm.x, glm.alpha, glm.beta, args[2].clone()],
                    e,
                ));
            }
            return Some(make_call("neg_binomial_2_log_lpmf", vec![args[0].clone(), link_arg.clone(), args[2].clone()], e));
        }
    }

    // categorical_lpmf(y, softmax(a)) -> categorical_logit_lpmf(y, a)
    if let Some(args) = call_named(e, "categorical_lpmf") {
        if let Some(link_arg) = single_arg_call(&args[1], "softmax") {
            return Some(make_call("categorical_logit_lpmf", vec![args[0].clone(), link_arg.clone()], e));
        }
    }

    // binomial_lpmf(y, n, inv_logit(a)) -> binomial_logit_lpmf(y, n, a)
    if let Some(args) = call_named(e, "binomial_lpmf") {
        if let Some(link_arg) = single_arg_call(&args[2], "inv_logit") {
            return Some(make_call("binomial_logit_lpmf", vec![args[0].clone(), args[1].clone(), link_arg.clone()], e));
        }
    }

    // Indexed(make_array(e1,...,en), [Single(k)]) -> e_k, for a positive integer literal k in [1,n].
    if let ExprKind::Indexed(base, idxs) = &e.kind {
        if idxs.len() == 1 {
            if let (Some(elems), crate::ir::Index::Single(i)) = (call_named(base, "make_array"), &idxs[0]) {
                if let ExprKind::Lit(LitKind::Int, text) = &i.kind {
                    if let Ok(k) = text.parse::<usize>() {
                        if k >= 1 && k <= elems.len() {
                            return Some(elems[k - 1].clone());
                        }
                    }
                }
            }
        }
    }

    None
}

struct GlmLinearPredictor {
    x: Expr<TypedLocated>,
    alpha: Expr<TypedLocated>,
    beta: Expr<TypedLocated>,
}

/// A scalar `0` at `like`'s span/ad-level, for the zero-alpha GLM case
/// (spec.md §4.6.2 GLM fusions: "the zero-alpha case") — the catalog seeds
/// the zero-alpha overload with a `Real` alpha regardless of `beta`'s type.
fn zero_like(like: &Expr<TypedLocated>) -> Expr<TypedLocated> {
    Expr::new(
        ExprKind::Lit(LitKind::Int, "0".to_owned()),
        ExprTypeLoc { ty: crate::types::UnsizedType::Real, ad: like.meta.ad, span: like.meta.span.clone() },
    )
}

/// Recognizes `alpha + x*beta`, `x*beta + alpha`, or the bare `x*beta`
/// zero-alpha case, where `x` is a `Matrix` (spec.md §4.6.2 GLM fusions:
/// "accepting both operand orderings ... and the zero-alpha case").
fn glm_linear_predictor(e: &Expr<TypedLocated>) -> Option<GlmLinearPredictor> {
    if let Some(prod_args) = call_named(e, "Times__") {
        if matches!(prod_args[0].meta.ty, crate::types::UnsizedType::Matrix) {
            return Some(GlmLinearPredictor { x: prod_args[0].clone(), alpha: zero_like(&prod_args[1]), beta: prod_args[1].clone() });
        }
    }
    let args = call_named(e, "Plus__")?;
    let (alpha, product) = if call_named(&args[1], "Times__").is_some() {
        (&args[0], &args[1])
    } else if call_named(&args[0], "Times__").is_some() {
        (&args[1], &args[0])
    } else {
        return None;
    };
    let prod_args = call_named(product, "Times__")?;
    let (x, beta) = if matches!(prod_args[0].meta.ty, crate::types::UnsizedType::Matrix) {
        (&prod_args[0], &prod_args[1])
    } else {
        return None;
    };
    Some(GlmLinearPredictor { x: x.clone(), alpha: alpha.clone(), beta: beta.clone() })
}

/// Applies [`try_rewrite`] and guards the result through the catalog
/// (spec.md §4.6.3): if the rewritten call's inferred argument types do
/// not resolve against any overload of the specialized name, the rewrite
/// is reverted to `e` unchanged.
#[must_use]
pub fn apply(e: Expr<TypedLocated>, catalog: &Catalog) -> Expr<TypedLocated> {
    let Some(rewritten) = try_rewrite(&e) else { return e };
    let ExprKind::FunApp(_, name, args) = &rewritten.kind else {
        return rewritten;
    };
    let actuals: Vec<(AdLevel, _)> = args.iter().map(|a| (a.meta.ad, a.meta.ty.clone())).collect();
    if catalog.resolve(name, &actuals).is_ok() {
        rewritten
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::span::{CodeLoc, SourceSpan};
    use crate::types::UnsizedType;

    fn span() -> SourceSpan {
        SourceSpan::new("f", CodeLoc::new(0, 0), CodeLoc::new(0, 1))
    }

    fn meta(ty: UnsizedType) -> ExprTypeLoc {
        ExprTypeLoc { ty, ad: AdLevel::DataOnly, span: span() }
    }

    fn var(name: &str, ty: UnsizedType) -> Expr<TypedLocated> {
        Expr::new(ExprKind::Var(name.to_owned()), meta(ty))
    }

    fn real_lit(text: &str) -> Expr<TypedLocated> {
        Expr::new(ExprKind::Lit(LitKind::Real, text.to_owned()), meta(UnsizedType::Real))
    }

    fn call(name: &str, args: Vec<Expr<TypedLocated>>, ty: UnsizedType) -> Expr<TypedLocated> {
        Expr::new(ExprKind::FunApp(FunKind::StanLib, name.to_owned(), args), meta(ty))
    }

    #[test]
    fn log_one_minus_exp_rewrites_to_log1m_exp() {
        let catalog = Catalog::builtin();
        let x = var("x", UnsizedType::Real);
        let e = call(
            "log",
            vec![call(
                "Minus__",
                vec![real_lit("1"), call("exp", vec![x.clone()], UnsizedType::Real)],
                UnsizedType::Real,
            )],
            UnsizedType::Real,
        );
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, args) if name == "log1m_exp" && args.len() == 1));
    }

    #[test]
    fn pow_two_x_rewrites_to_exp2() {
        let catalog = Catalog::builtin();
        let x = var("x", UnsizedType::Real);
        let e = call("pow", vec![real_lit("2"), x], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, _) if name == "exp2"));
    }

    #[test]
    fn pow_x_two_rewrites_to_square() {
        let catalog = Catalog::builtin();
        let x = var("x", UnsizedType::Real);
        let e = call("pow", vec![x, real_lit("2")], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, _) if name == "square"));
    }

    #[test]
    fn bernoulli_glm_fusion_matches_either_operand_order() {
        let catalog = Catalog::builtin();
        let y = var("y", UnsizedType::Int.array_of());
        let x = var("x", UnsizedType::Matrix);
        let a = var("a", UnsizedType::Vector);
        let b = var("b", UnsizedType::Vector);

        let product = call("Times__", vec![x.clone(), b.clone()], UnsizedType::Vector);
        let sum = call("Plus__", vec![a.clone(), product], UnsizedType::Vector);
        let link = call("inv_logit", vec![sum], UnsizedType::Vector);
        let e = call("bernoulli_lpmf", vec![y.clone(), link], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, _) if name == "bernoulli_logit_glm_lpmf"));

        let product2 = call("Times__", vec![x, b], UnsizedType::Vector);
        let sum2 = call("Plus__", vec![product2, a], UnsizedType::Vector);
        let link2 = call("inv_logit", vec![sum2], UnsizedType::Vector);
        let e2 = call("bernoulli_lpmf", vec![y, link2], UnsizedType::Real);
        let rewritten2 = apply(e2, &catalog);
        assert!(matches!(&rewritten2.kind, ExprKind::FunApp(_, name, _) if name == "bernoulli_logit_glm_lpmf"));
    }

    #[test]
    fn bernoulli_glm_fusion_zero_alpha_synthesizes_a_real_zero() {
        let catalog = Catalog::builtin();
        let y = var("y", UnsizedType::Int.array_of());
        let x = var("x", UnsizedType::Matrix);
        let b = var("b", UnsizedType::Vector);

        let product = call("Times__", vec![x, b], UnsizedType::Vector);
        let link = call("inv_logit", vec![product], UnsizedType::Vector);
        let e = call("bernoulli_lpmf", vec![y, link], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, args)
            if name == "bernoulli_logit_glm_lpmf" && matches!(&args[2].kind, ExprKind::Lit(LitKind::Int, n) if n == "0")));
    }

    #[test]
    fn poisson_lpmf_of_exp_rewrites_to_poisson_log_lpmf() {
        let catalog = Catalog::builtin();
        let y = var("y", UnsizedType::Int.array_of());
        let a = var("a", UnsizedType::Vector);
        let link = call("exp", vec![a], UnsizedType::Vector);
        let e = call("poisson_lpmf", vec![y, link], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, _) if name == "poisson_log_lpmf"));
    }

    #[test]
    fn log_sum_exp_reduce_form_matches_sum_of_exp() {
        let catalog = Catalog::builtin();
        let l = var("l", UnsizedType::Vector);
        let inner = call("exp", vec![l], UnsizedType::Vector);
        let summed = call("sum", vec![inner], UnsizedType::Real);
        let e = call("log", vec![summed], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, args) if name == "log_sum_exp" && args.len() == 1));
    }

    #[test]
    fn log_abs_determinant_rewrites_to_log_determinant() {
        let catalog = Catalog::builtin();
        let m = var("m", UnsizedType::Matrix);
        let det = call("determinant", vec![m], UnsizedType::Real);
        let abs = call("abs", vec![det], UnsizedType::Real);
        let e = call("log", vec![abs], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, _) if name == "log_determinant"));
    }

    #[test]
    fn quad_form_matches_transpose_b_times_a_times_b() {
        let catalog = Catalog::builtin();
        let a = var("a", UnsizedType::Matrix);
        let b = var("b", UnsizedType::Vector);
        let bt = call("transpose", vec![b.clone()], UnsizedType::Vector);
        let lhs = call("Times__", vec![bt, a], UnsizedType::Vector);
        let e = call("Times__", vec![lhs, b], UnsizedType::Real);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, args) if name == "quad_form" && args.len() == 2));
    }

    #[test]
    fn diag_post_multiply_matches_matrix_times_diag_matrix() {
        let catalog = Catalog::builtin();
        let m = var("m", UnsizedType::Matrix);
        let v = var("v", UnsizedType::Vector);
        let diag = call("diag_matrix", vec![v], UnsizedType::Matrix);
        let e = call("Times__", vec![m, diag], UnsizedType::Matrix);
        let rewritten = apply(e, &catalog);
        assert!(matches!(&rewritten.kind, ExprKind::FunApp(_, name, _) if name == "diag_post_multiply"));
    }

    #[test]
    fn no_match_returns_input_unchanged() {
        let catalog = Catalog::builtin();
        let x = var("x", UnsizedType::Real);
        let e = call("log", vec![x.clone()], UnsizedType::Real);
        let rewritten = apply(e.clone(), &catalog);
        assert_eq!(rewritten, e);
    }

    #[test]
    fn applicability_guard_reverts_when_catalog_has_no_match() {
        // square(sd(x)) -> variance(x); variance is only seeded for Vector,
        // so a Real-typed `x` must not rewrite (no `variance(real)` overload).
        let catalog = Catalog::builtin();
        let x = var("x", UnsizedType::Real);
        let sd_call = call("sd", vec![x], UnsizedType::Real);
        let e = call("square", vec![sd_call], UnsizedType::Real);
        let rewritten = apply(e.clone(), &catalog);
        assert_eq!(rewritten, e);
    }
}
