//! Sized types: the unsized type family plus the size expressions that
//! dimension containers (spec.md §3 "SizedType").

use super::unsized_type::UnsizedType;
use crate::ir::expr::Expr;
use crate::ir::meta::Decoration;

/// A type carrying size expressions, parametric in the same `Decoration`
/// as the surrounding tree so a declaration's bounds can be arbitrary
/// (possibly still-untyped, possibly fully analyzed) expressions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SizedType<D: Decoration> {
    SInt,
    SReal,
    SVector(Box<Expr<D>>),
    SRowVector(Box<Expr<D>>),
    SMatrix(Box<Expr<D>>, Box<Expr<D>>),
    SArray(Box<SizedType<D>>, Box<Expr<D>>),
}

impl<D: Decoration> SizedType<D> {
    /// Drops size expressions, recovering the `UnsizedType` spec.md §4.5.6
    /// refers to when it says a declaration's "sized-or-unsized type"
    /// participates in ordinary type checking.
    #[must_use]
    pub fn to_unsized(&self) -> UnsizedType {
        match self {
            Self::SInt => UnsizedType::Int,
            Self::SReal => UnsizedType::Real,
            Self::SVector(_) => UnsizedType::Vector,
            Self::SRowVector(_) => UnsizedType::RowVector,
            Self::SMatrix(_, _) => UnsizedType::Matrix,
            Self::SArray(inner, _) => inner.to_unsized().array_of(),
        }
    }

    /// Every size expression mentioned anywhere in this type, in reading
    /// order (e.g. `array[SMatrix(rows, cols), len]` yields `[rows, cols,
    /// len]`). Used by the analyzer to check that size expressions evaluate
    /// under a sufficiently low block origin (spec.md §3 "Invariants":
    /// "Variable sizes in top-level declarations must evaluate under a
    /// block origin of at most Data/TData").
    pub fn size_exprs(&self) -> Vec<&Expr<D>> {
        match self {
            Self::SInt | Self::SReal => vec![],
            Self::SVector(e) | Self::SRowVector(e) => vec![e.as_ref()],
            Self::SMatrix(rows, cols) => vec![rows.as_ref(), cols.as_ref()],
            Self::SArray(inner, len) => {
                let mut out = inner.size_exprs();
                out.push(len.as_ref());
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{Expr, ExprKind, LitKind};
    use crate::ir::meta::NoMeta;

    fn int_lit(text: &str) -> Box<Expr<NoMeta>> {
        Box::new(Expr::new(ExprKind::Lit(LitKind::Int, text.to_owned()), ()))
    }

    #[test]
    fn to_unsized_strips_sizes() {
        let ty: SizedType<NoMeta> = SizedType::SArray(Box::new(SizedType::SVector(int_lit("3"))), int_lit("5"));
        assert_eq!(ty.to_unsized(), UnsizedType::Vector.array_of());
    }

    #[test]
    fn size_exprs_collects_in_reading_order() {
        let ty: SizedType<NoMeta> = SizedType::SMatrix(int_lit("2"), int_lit("3"));
        assert_eq!(ty.size_exprs().len(), 2);
    }
}
