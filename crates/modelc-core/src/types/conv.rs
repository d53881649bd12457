//! Type-lattice conversion and compatibility predicates (spec.md §4.1).

use super::{
    ad_level::AdLevel,
    unsized_type::{ReturnType, UnsizedType},
};

/// spec.md §4.1 `same_type_mod_conv`.
///
/// `name` gates the rule because assignment (`assign_*` operator names in
/// the catalog, spec.md §4.2) must not silently promote `int` into `real`
/// on the left-hand side — every other consumer (ordinary function/operator
/// overload resolution) may.
#[must_use]
pub fn same_type_mod_conv(name: &str, formal: &UnsizedType, actual: &UnsizedType) -> bool {
    if name.starts_with("assign_") {
        return formal == actual;
    }
    match (formal, actual) {
        (UnsizedType::Real, UnsizedType::Int) => true,
        (UnsizedType::Fun(f1), UnsizedType::Fun(f2)) => {
            f1.returns == f2.returns
                && f1.params.len() == f2.params.len()
                && f1
                    .params
                    .iter()
                    .zip(&f2.params)
                    .all(|((ad1, ty1), (ad2, ty2))| ad2.can_convert_to(*ad1) && same_type_mod_conv(name, ty1, ty2))
        }
        _ => formal == actual,
    }
}

/// spec.md §4.1 `same_type_mod_array_conv`: as `same_type_mod_conv`, but
/// recurses element-wise through matching `Array` nesting depth first.
#[must_use]
pub fn same_type_mod_array_conv(name: &str, formal: &UnsizedType, actual: &UnsizedType) -> bool {
    match (formal, actual) {
        (UnsizedType::Array(f), UnsizedType::Array(a)) => same_type_mod_array_conv(name, f, a),
        _ => same_type_mod_conv(name, formal, actual),
    }
}

/// spec.md §4.1 `compatible_arguments_mod_conv`: equal arity, pairwise
/// `same_type_mod_conv` on the unsized parts, and `can_convert_ad` on the
/// ad-levels (actual must be convertible into formal).
#[must_use]
pub fn compatible_arguments_mod_conv(
    name: &str,
    signature: &[(AdLevel, UnsizedType)],
    actuals: &[(AdLevel, UnsizedType)],
) -> bool {
    signature.len() == actuals.len()
        && signature.iter().zip(actuals).all(|((formal_ad, formal_ty), (actual_ad, actual_ty))| {
            actual_ad.can_convert_to(*formal_ad) && same_type_mod_conv(name, formal_ty, actual_ty)
        })
}

/// Whether `ty` is `Int` or an array of something that contains `Int`
/// (spec.md §4.1 `contains_int`). Delegates to the inherent method so both
/// call styles documented in the spec (`contains_int(t)` and `t.contains_int()`)
/// are available.
#[must_use]
pub fn contains_int(ty: &UnsizedType) -> bool {
    ty.contains_int()
}

/// Whether a return type produced by one overload can be returned to a
/// caller expecting `expected` — used by return-status joining (spec.md
/// §4.5.7) and by `Return` statement checking (spec.md §4.5.6). `Int`
/// widens to `Real`; `Void` only matches `Void`.
#[must_use]
pub fn return_type_assignable(expected: &ReturnType, actual: &ReturnType) -> bool {
    match (expected, actual) {
        (ReturnType::Void, ReturnType::Void) => true,
        (ReturnType::Returning(e), ReturnType::Returning(a)) => e == a || (*e == UnsizedType::Real && *a == UnsizedType::Int),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_to_real_outside_assignment() {
        assert!(same_type_mod_conv("foo", &UnsizedType::Real, &UnsizedType::Int));
        assert!(!same_type_mod_conv("foo", &UnsizedType::Int, &UnsizedType::Real));
    }

    #[test]
    fn assign_names_demand_exact_equality() {
        assert!(!same_type_mod_conv("assign_add", &UnsizedType::Real, &UnsizedType::Int));
        assert!(same_type_mod_conv("assign_add", &UnsizedType::Real, &UnsizedType::Real));
    }

    #[test]
    fn array_conv_recurses_through_matching_depth() {
        let arr_real = UnsizedType::Real.array_of();
        let arr_int = UnsizedType::Int.array_of();
        assert!(same_type_mod_array_conv("foo", &arr_real, &arr_int));
        assert!(!same_type_mod_array_conv(
            "foo",
            &arr_real,
            &UnsizedType::Int.array_of().array_of()
        ));
    }

    #[test]
    fn compatible_arguments_checks_arity_and_ad_level() {
        let sig = vec![(AdLevel::AutoDiffable, UnsizedType::Real)];
        let ok = vec![(AdLevel::DataOnly, UnsizedType::Int)];
        assert!(compatible_arguments_mod_conv("foo", &sig, &ok));

        let bad_ad = vec![(AdLevel::AutoDiffable, UnsizedType::Int)];
        let sig_data_only = vec![(AdLevel::DataOnly, UnsizedType::Real)];
        assert!(!compatible_arguments_mod_conv("foo", &sig_data_only, &bad_ad));

        let wrong_arity = vec![(AdLevel::DataOnly, UnsizedType::Int), (AdLevel::DataOnly, UnsizedType::Int)];
        assert!(!compatible_arguments_mod_conv("foo", &sig, &wrong_arity));
    }

    #[test]
    fn return_type_int_widens_to_real() {
        assert!(return_type_assignable(
            &ReturnType::Returning(UnsizedType::Real),
            &ReturnType::Returning(UnsizedType::Int)
        ));
        assert!(!return_type_assignable(
            &ReturnType::Returning(UnsizedType::Int),
            &ReturnType::Returning(UnsizedType::Real)
        ));
        assert!(return_type_assignable(&ReturnType::Void, &ReturnType::Void));
        assert!(!return_type_assignable(&ReturnType::Void, &ReturnType::Returning(UnsizedType::Int)));
    }
}
