//! Indexing rank reduction (spec.md §4.5.5 "Indexing rank reduction").

use crate::ir::Index;
use crate::ir::meta::Decoration;
use crate::types::UnsizedType;

/// Applies one index's rank-reduction rule to `base`.
fn step<D: Decoration>(base: &UnsizedType, idx: &Index<D>) -> Option<UnsizedType> {
    let single = idx.is_single();
    match base {
        UnsizedType::Array(inner) => Some(if single { (**inner).clone() } else { base.clone() }),
        UnsizedType::Vector | UnsizedType::RowVector => Some(if single { UnsizedType::Real } else { base.clone() }),
        UnsizedType::Matrix => Some(if single { UnsizedType::RowVector } else { UnsizedType::Matrix }),
        _ => None,
    }
}

/// spec.md §4.5.5: given a base type and an index list, computes the
/// resulting type, applying the `Matrix`-with-two-indices special case
/// first ("first non-`Single` followed by `Single` → `Vector`") before
/// falling back to the per-index rules.
#[must_use]
pub fn index_result_type<D: Decoration>(base: &UnsizedType, idxs: &[Index<D>]) -> Option<UnsizedType> {
    if *base == UnsizedType::Matrix && idxs.len() == 2 && !idxs[0].is_single() && idxs[1].is_single() {
        return Some(UnsizedType::Vector);
    }
    idxs.iter().try_fold(base.clone(), |ty, idx| step(&ty, idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::meta::NoMeta;
    use crate::ir::expr::{Expr, ExprKind, LitKind};

    fn single() -> Index<NoMeta> {
        Index::Single(Box::new(Expr::new(ExprKind::Lit(LitKind::Int, "1".into()), ())))
    }

    fn all() -> Index<NoMeta> {
        Index::All
    }

    #[test]
    fn matrix_two_index_special_case_yields_vector() {
        assert_eq!(index_result_type(&UnsizedType::Matrix, &[all(), single()]), Some(UnsizedType::Vector));
    }

    #[test]
    fn matrix_single_index_yields_row_vector() {
        assert_eq!(index_result_type(&UnsizedType::Matrix, &[single()]), Some(UnsizedType::RowVector));
    }

    #[test]
    fn array_single_index_reduces_dimension() {
        let ty = UnsizedType::Real.array_of().array_of();
        assert_eq!(index_result_type(&ty, &[single()]), Some(UnsizedType::Real.array_of()));
    }

    #[test]
    fn non_container_with_index_is_none() {
        assert_eq!(index_result_type(&UnsizedType::Real, &[single()]), None);
    }

    #[test]
    fn vector_all_index_preserves_type() {
        assert_eq!(index_result_type(&UnsizedType::Vector, &[all()]), Some(UnsizedType::Vector));
    }
}
