use std::fmt;

use super::ad_level::AdLevel;

/// The unsized (element/container shape only, no dimensions) type of an
/// expression (spec.md §3 "UnsizedType").
///
/// `Array` and `Fun` are boxed/`Vec`-backed since they recurse; everything
/// else is a plain nullary tag, matching the "tag + payload" framing in
/// the spec.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum UnsizedType {
    Int,
    Real,
    Vector,
    RowVector,
    Matrix,
    Array(Box<UnsizedType>),
    Fun(FunType),
    /// A reference to the signature catalog itself, used as the type of
    /// a bare built-in name used as a value (spec.md §3).
    MathLibraryFunction,
}

/// The parameter/return shape of a `Fun` type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunType {
    pub params: Vec<(AdLevel, UnsizedType)>,
    pub returns: Box<ReturnType>,
}

/// A function's declared/inferred return shape (spec.md §3 "ReturnType").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ReturnType {
    Void,
    Returning(UnsizedType),
}

impl UnsizedType {
    #[must_use]
    pub fn array_of(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// spec.md §4.1 `contains_int`: true for `Int` itself or an array
    /// nest bottoming out in `Int`.
    #[must_use]
    pub fn contains_int(&self) -> bool {
        match self {
            Self::Int => true,
            Self::Array(inner) => inner.contains_int(),
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Vector | Self::RowVector | Self::Matrix | Self::Array(_))
    }

    #[must_use]
    pub const fn is_int_or_real(&self) -> bool {
        matches!(self, Self::Int | Self::Real)
    }
}

impl fmt::Display for UnsizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Real => write!(f, "real"),
            Self::Vector => write!(f, "vector"),
            Self::RowVector => write!(f, "row_vector"),
            Self::Matrix => write!(f, "matrix"),
            Self::Array(inner) => write!(f, "array[{inner}]"),
            Self::Fun(fun) => write!(f, "{fun}"),
            Self::MathLibraryFunction => write!(f, "<math-library-function>"),
        }
    }
}

impl fmt::Display for FunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (ad, ty)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ad} {ty}")?;
        }
        write!(f, ") => {}", self.returns)
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Returning(ty) => write!(f, "{ty}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_int_recurses_through_arrays() {
        assert!(UnsizedType::Int.contains_int());
        assert!(UnsizedType::Int.array_of().array_of().contains_int());
        assert!(!UnsizedType::Real.array_of().contains_int());
    }

    #[test]
    fn display_nests_arrays() {
        assert_eq!(UnsizedType::Int.array_of().to_string(), "array[int]");
    }
}
