//! The built-in signature catalog (spec.md §4.2 "Built-in signature
//! catalog") and the overload-resolution algorithm that consults it.
//!
//! Each built-in name maps to one or more overloads. Lookup is keyed by
//! name in an [`IndexMap`] so that when several overloads are
//! simultaneously applicable after promotion, the tie is broken by
//! declaration order, exactly as the catalog is seeded in
//! [`Catalog::builtin`].

use indexmap::IndexMap;

use crate::types::{compatible_arguments_mod_conv, AdLevel, ReturnType, UnsizedType};

/// One signature of a built-in: its formal parameters and its return type.
#[derive(Debug, Clone, PartialEq)]
pub struct Overload {
    pub params: Vec<(AdLevel, UnsizedType)>,
    pub returns: ReturnType,
}

impl Overload {
    #[must_use]
    pub fn new(params: Vec<(AdLevel, UnsizedType)>, returns: ReturnType) -> Self {
        Self { params, returns }
    }
}

/// The set of every built-in name and its overload list (spec.md §4.2).
///
/// `name -> overloads` rather than a flat `(name, signature) -> return`
/// map: most call sites need "find the best-matching overload of this
/// name", not a single exact-signature probe.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, Vec<Overload>>,
}

/// Why [`Catalog::resolve`] failed, distinguishing "no such name" from
/// "name exists but no overload matches these arguments" (spec.md §4.5.4:
/// both produce distinct diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    UnknownName,
    NoMatchingOverload,
}

/// Counts the formal/actual pairs that require a non-trivial conversion
/// (int-to-real widening) — the "element promotion" spec.md §4.2 tie-breaks
/// overload resolution on.
fn promotion_cost(params: &[(AdLevel, UnsizedType)], actuals: &[(AdLevel, UnsizedType)]) -> usize {
    params.iter().zip(actuals).filter(|((_, formal_ty), (_, actual_ty))| formal_ty != actual_ty).count()
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more overload for `name`, appended after any existing
    /// overloads of the same name (so later `add` calls lose declaration-order
    /// ties to earlier ones).
    pub fn add(&mut self, name: impl Into<String>, overload: Overload) {
        self.entries.entry(name.into()).or_default().push(overload);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn overloads(&self, name: &str) -> Option<&[Overload]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Resolves a call to `name` with the given actual argument types against
    /// the registered overloads (spec.md §4.2 "Overload resolution"): the
    /// first overload (in declaration order) whose parameter types match
    /// `actuals` exactly wins; failing that, among every overload for which
    /// `compatible_arguments_mod_conv` holds (i.e. accepting int-to-real
    /// widening), the one needing the fewest element promotions wins, ties
    /// broken by declaration order (spec.md §4.2: "pick the one with the
    /// narrowest element promotion ... ties ... resolved by declaration
    /// order").
    ///
    /// # Errors
    /// [`ResolveError::UnknownName`] if `name` has no entry at all;
    /// [`ResolveError::NoMatchingOverload`] if it does but none of its
    /// overloads accept `actuals`.
    pub fn resolve(&self, name: &str, actuals: &[(AdLevel, UnsizedType)]) -> Result<&ReturnType, ResolveError> {
        let overloads = self.entries.get(name).ok_or(ResolveError::UnknownName)?;

        let exact = overloads.iter().find(|o| {
            o.params.len() == actuals.len()
                && o.params
                    .iter()
                    .zip(actuals)
                    .all(|((formal_ad, formal_ty), (actual_ad, actual_ty))| formal_ty == actual_ty && actual_ad.can_convert_to(*formal_ad))
        });
        if let Some(o) = exact {
            return Ok(&o.returns);
        }

        let mut best: Option<(usize, &Overload)> = None;
        for o in overloads.iter().filter(|o| compatible_arguments_mod_conv(name, &o.params, actuals)) {
            let cost = promotion_cost(&o.params, actuals);
            if best.is_none_or(|(best_cost, _)| cost < best_cost) {
                best = Some((cost, o));
            }
        }
        best.map(|(_, o)| &o.returns).ok_or(ResolveError::NoMatchingOverload)
    }

    /// The catalog seeded with the built-ins spec.md's examples (§8) and
    /// optimizer rewrites (§4.6.2) exercise: arithmetic operators, `log`,
    /// `exp`, `pow`, and the `_lpdf`/`_lpmf`/`_glm_lpdf` family needed by
    /// the GLM fusion rewrite.
    #[must_use]
    pub fn builtin() -> Self {
        // Builtins are seeded with `DataOnly` formals: `can_convert_to`
        // (spec.md §4.1) lets both `DataOnly` and `AutoDiffable` actuals
        // flow into a `DataOnly` formal, so a single overload per arity
        // covers every caller; the call's own ad-level is the LUB of its
        // actual arguments regardless of what the formal declares (spec.md
        // §4.5.4), not the signature itself.
        use AdLevel::DataOnly as AD;
        use ReturnType::Returning;
        use UnsizedType::{Int, Matrix, Real, RowVector, Vector};

        let mut c = Self::new();

        let real_binop = |name: &str, c: &mut Self| {
            c.add(name, Overload::new(vec![(AD, Real), (AD, Real)], Returning(Real)));
            c.add(name, Overload::new(vec![(AD, Int), (AD, Int)], Returning(Int)));
        };
        real_binop("Plus__", &mut c);
        real_binop("Minus__", &mut c);
        real_binop("Times__", &mut c);
        real_binop("Divide__", &mut c);
        c.add("Modulo__", Overload::new(vec![(AD, Int), (AD, Int)], Returning(Int)));
        // the GLM fusions (§4.6.2) need the vectorized forms of `+`/`*`.
        c.add("Plus__", Overload::new(vec![(AD, Vector), (AD, Vector)], Returning(Vector)));
        c.add("Times__", Overload::new(vec![(AD, Matrix), (AD, Vector)], Returning(Vector)));

        let cmp = |name: &str, c: &mut Self| {
            c.add(name, Overload::new(vec![(AD, Real), (AD, Real)], Returning(Int)));
            c.add(name, Overload::new(vec![(AD, Int), (AD, Int)], Returning(Int)));
        };
        cmp("Equals__", &mut c);
        cmp("NEquals__", &mut c);
        cmp("Less__", &mut c);
        cmp("Leq__", &mut c);
        cmp("Greater__", &mut c);
        cmp("Geq__", &mut c);

        c.add("PMinus__", Overload::new(vec![(AD, Real)], Returning(Real)));
        c.add("PMinus__", Overload::new(vec![(AD, Int)], Returning(Int)));
        c.add("PPlus__", Overload::new(vec![(AD, Real)], Returning(Real)));
        c.add("PPlus__", Overload::new(vec![(AD, Int)], Returning(Int)));
        c.add("PNot__", Overload::new(vec![(AD, Int)], Returning(Int)));

        c.add("assign", Overload::new(vec![(AD, Real), (AD, Real)], ReturnType::Void));
        c.add("assign_add", Overload::new(vec![(AD, Real), (AD, Real)], ReturnType::Void));

        let real_unary = |name: &str, c: &mut Self| c.add(name, Overload::new(vec![(AD, Real)], Returning(Real)));
        let real_binary = |name: &str, c: &mut Self| c.add(name, Overload::new(vec![(AD, Real), (AD, Real)], Returning(Real)));

        real_unary("log", &mut c);
        real_unary("exp", &mut c);
        real_unary("log1m", &mut c);
        real_unary("expm1", &mut c);
        real_unary("log1p", &mut c);
        real_unary("log1m_exp", &mut c);
        real_unary("log1m_inv_logit", &mut c);
        real_unary("log1p_exp", &mut c);
        real_unary("inv_logit", &mut c);
        real_unary("erf", &mut c);
        real_unary("erfc", &mut c);
        real_unary("exp2", &mut c);
        real_unary("inv", &mut c);
        real_unary("inv_sqrt", &mut c);
        real_unary("inv_square", &mut c);
        c.add("inv_logit", Overload::new(vec![(AD, Vector)], Returning(Vector)));

        real_binary("log_sum_exp", &mut c);
        real_binary("log_diff_exp", &mut c);
        real_binary("gamma_p", &mut c);
        real_binary("gamma_q", &mut c);
        real_binary("multiply_log", &mut c);
        c.add("fma", Overload::new(vec![(AD, Real), (AD, Real), (AD, Real)], Returning(Real)));

        c.add("pow", Overload::new(vec![(AD, Real), (AD, Real)], Returning(Real)));
        c.add("square", Overload::new(vec![(AD, Real)], Returning(Real)));
        c.add("sqrt", Overload::new(vec![(AD, Real)], Returning(Real)));
        c.add("sqrt2", Overload::new(vec![], Returning(Real)));

        c.add("dot_product", Overload::new(vec![(AD, Vector), (AD, Vector)], Returning(Real)));
        c.add("dot_self", Overload::new(vec![(AD, Vector)], Returning(Real)));
        c.add("columns_dot_product", Overload::new(vec![(AD, Matrix), (AD, Matrix)], Returning(RowVector)));
        c.add("columns_dot_self", Overload::new(vec![(AD, Matrix)], Returning(RowVector)));
        c.add("trace", Overload::new(vec![(AD, Matrix)], Returning(Real)));
        c.add("squared_distance", Overload::new(vec![(AD, Vector), (AD, Vector)], Returning(Real)));
        c.add("variance", Overload::new(vec![(AD, Vector)], Returning(Real)));
        c.add("sd", Overload::new(vec![(AD, Vector)], Returning(Real)));

        c.add(
            "normal_lpdf",
            Overload::new(vec![(AD, Real), (AD, Real), (AD, Real)], Returning(Real)),
        );
        c.add(
            "normal_id_glm_lpdf",
            Overload::new(
                vec![(AD, Real.array_of()), (AD, Matrix), (AD, Vector), (AD, Vector), (AD, Real)],
                Returning(Real),
            ),
        );
        c.add(
            "bernoulli_lpmf",
            Overload::new(vec![(AD, Int.array_of()), (AD, Vector)], Returning(Real)),
        );
        c.add(
            "bernoulli_logit_lpmf",
            Overload::new(vec![(AD, Int.array_of()), (AD, Vector)], Returning(Real)),
        );
        c.add(
            "bernoulli_logit_glm_lpmf",
            Overload::new(
                vec![(AD, Int.array_of()), (AD, Matrix), (AD, Vector), (AD, Vector)],
                Returning(Real),
            ),
        );
        // the zero-alpha/scalar-alpha case (spec.md §4.6.2 GLM fusions: "the zero-alpha case").
        c.add(
            "bernoulli_logit_glm_lpmf",
            Overload::new(
                vec![(AD, Int.array_of()), (AD, Matrix), (AD, Real), (AD, Vector)],
                Returning(Real),
            ),
        );
        c.add("bernoulli_logit_rng", Overload::new(vec![(AD, Real)], Returning(Int)));

        c.add("log_determinant", Overload::new(vec![(AD, Matrix)], Returning(Real)));
        real_binary("log_falling_factorial", &mut c);
        real_binary("log_rising_factorial", &mut c);
        real_unary("log_inv_logit", &mut c);
        c.add("log_inv_logit", Overload::new(vec![(AD, Vector)], Returning(Vector)));
        c.add("log_softmax", Overload::new(vec![(AD, Vector)], Returning(Vector)));
        c.add("log_sum_exp", Overload::new(vec![(AD, Vector)], Returning(Real)));
        c.add("log_sum_exp", Overload::new(vec![(AD, Real.array_of())], Returning(Real)));

        c.add("quad_form", Overload::new(vec![(AD, Matrix), (AD, Vector)], Returning(Real)));
        c.add("quad_form", Overload::new(vec![(AD, Matrix), (AD, Matrix)], Returning(Matrix)));
        c.add("quad_form_diag", Overload::new(vec![(AD, Matrix), (AD, Vector)], Returning(Matrix)));
        c.add(
            "trace_quad_form",
            Overload::new(vec![(AD, Matrix), (AD, Matrix)], Returning(Real)),
        );
        c.add(
            "trace_gen_quad_form",
            Overload::new(vec![(AD, Matrix), (AD, Matrix), (AD, Matrix)], Returning(Real)),
        );
        c.add(
            "diag_post_multiply",
            Overload::new(vec![(AD, Matrix), (AD, Vector)], Returning(Matrix)),
        );
        c.add(
            "diag_pre_multiply",
            Overload::new(vec![(AD, Vector), (AD, Matrix)], Returning(Matrix)),
        );
        c.add(
            "scale_matrix_exp_multiply",
            Overload::new(vec![(AD, Real), (AD, Matrix), (AD, Matrix)], Returning(Matrix)),
        );
        c.add(
            "matrix_exp_multiply",
            Overload::new(vec![(AD, Matrix), (AD, Matrix)], Returning(Matrix)),
        );

        c.add("poisson_lpmf", Overload::new(vec![(AD, Int.array_of()), (AD, Vector)], Returning(Real)));
        c.add("poisson_log_lpmf", Overload::new(vec![(AD, Int.array_of()), (AD, Vector)], Returning(Real)));
        c.add(
            "poisson_log_glm_lpmf",
            Overload::new(vec![(AD, Int.array_of()), (AD, Matrix), (AD, Vector), (AD, Vector)], Returning(Real)),
        );
        c.add(
            "poisson_log_glm_lpmf",
            Overload::new(vec![(AD, Int.array_of()), (AD, Matrix), (AD, Real), (AD, Vector)], Returning(Real)),
        );
        c.add("poisson_rng", Overload::new(vec![(AD, Real)], Returning(Int)));
        c.add("poisson_log_rng", Overload::new(vec![(AD, Real)], Returning(Int)));

        c.add(
            "neg_binomial_2_lpmf",
            Overload::new(vec![(AD, Int.array_of()), (AD, Vector), (AD, Real)], Returning(Real)),
        );
        c.add(
            "neg_binomial_2_log_lpmf",
            Overload::new(vec![(AD, Int.array_of()), (AD, Vector), (AD, Real)], Returning(Real)),
        );
        c.add(
            "neg_binomial_2_log_glm_lpmf",
            Overload::new(
                vec![(AD, Int.array_of()), (AD, Matrix), (AD, Vector), (AD, Vector), (AD, Real)],
                Returning(Real),
            ),
        );
        c.add(
            "neg_binomial_2_log_glm_lpmf",
            Overload::new(
                vec![(AD, Int.array_of()), (AD, Matrix), (AD, Real), (AD, Vector), (AD, Real)],
                Returning(Real),
            ),
        );

        c.add("categorical_lpmf", Overload::new(vec![(AD, Int), (AD, Vector)], Returning(Real)));
        c.add("categorical_logit_lpmf", Overload::new(vec![(AD, Int), (AD, Vector)], Returning(Real)));

        c.add("binomial_lpmf", Overload::new(vec![(AD, Int), (AD, Int), (AD, Real)], Returning(Real)));
        c.add("binomial_logit_lpmf", Overload::new(vec![(AD, Int), (AD, Int), (AD, Real)], Returning(Real)));

        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_is_distinct_from_no_matching_overload() {
        let c = Catalog::builtin();
        assert_eq!(c.resolve("not_a_function", &[]), Err(ResolveError::UnknownName));
        assert_eq!(
            c.resolve("log", &[(AdLevel::AutoDiffable, UnsizedType::Int), (AdLevel::AutoDiffable, UnsizedType::Int)]),
            Err(ResolveError::NoMatchingOverload)
        );
    }

    #[test]
    fn resolves_first_compatible_overload_in_declaration_order() {
        let c = Catalog::builtin();
        assert_eq!(
            c.resolve("Plus__", &[(AdLevel::AutoDiffable, UnsizedType::Int), (AdLevel::AutoDiffable, UnsizedType::Int)]),
            Ok(&ReturnType::Returning(UnsizedType::Int))
        );
        assert_eq!(
            c.resolve("Plus__", &[(AdLevel::AutoDiffable, UnsizedType::Real), (AdLevel::AutoDiffable, UnsizedType::Int)]),
            Ok(&ReturnType::Returning(UnsizedType::Real))
        );
    }

    #[test]
    fn plain_assign_still_widens_int_to_real() {
        let c = Catalog::builtin();
        assert_eq!(
            c.resolve("assign", &[(AdLevel::AutoDiffable, UnsizedType::Real), (AdLevel::AutoDiffable, UnsizedType::Int)]),
            Ok(&ReturnType::Void)
        );
    }

    #[test]
    fn widening_resolution_prefers_the_overload_needing_fewer_promotions() {
        let mut c = Catalog::new();
        // Declared in the "wrong" order: the costlier (both-widened) overload
        // first, the cheaper (one-widened) overload second. Neither matches
        // (Int, Int) exactly; resolution must still pick the cheaper one
        // regardless of declaration order.
        c.add(
            "mix",
            Overload::new(
                vec![(AdLevel::DataOnly, UnsizedType::Real), (AdLevel::DataOnly, UnsizedType::Real)],
                ReturnType::Returning(UnsizedType::Real),
            ),
        );
        c.add(
            "mix",
            Overload::new(
                vec![(AdLevel::DataOnly, UnsizedType::Int), (AdLevel::DataOnly, UnsizedType::Real)],
                ReturnType::Returning(UnsizedType::Int),
            ),
        );
        let actuals = [(AdLevel::DataOnly, UnsizedType::Int), (AdLevel::DataOnly, UnsizedType::Int)];
        assert_eq!(c.resolve("mix", &actuals), Ok(&ReturnType::Returning(UnsizedType::Int)));
    }

    #[test]
    fn assign_add_rejects_widening() {
        let c = Catalog::builtin();
        assert_eq!(
            c.resolve(
                "assign_add",
                &[(AdLevel::AutoDiffable, UnsizedType::Real), (AdLevel::AutoDiffable, UnsizedType::Int)]
            ),
            Err(ResolveError::NoMatchingOverload)
        );
    }
}
