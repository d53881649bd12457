use std::fmt;

/// The program section (or meta-origin) a name or expression is associated
/// with (spec.md §3 "BlockOrigin", GLOSSARY "Block / block origin").
///
/// Declaration order below **is** the partial order: `Functions <
/// MathLibrary < Data < TData < Param < TParam < Model < GQuant`. Deriving
/// `PartialOrd`/`Ord` from variant declaration order is exactly this
/// ordering, so `BlockOrigin::lub` is just `Ord::max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, serde::Serialize, serde::Deserialize)]
pub enum BlockOrigin {
    Functions,
    MathLibrary,
    Data,
    TData,
    Param,
    TParam,
    Model,
    GQuant,
}

impl BlockOrigin {
    /// Least upper bound used to assign the origin of compound expressions
    /// from their operands (GLOSSARY "LUB").
    #[must_use]
    pub fn lub(self, other: Self) -> Self {
        self.max(other)
    }

    /// The named top-level program blocks, in the fixed order the analyzer
    /// walks them (spec.md §4.5, "functions, data, transformed_data,
    /// parameters, transformed_parameters, model, generated_quantities").
    /// `MathLibrary` is a meta-origin with no corresponding program block
    /// and is excluded.
    #[must_use]
    pub fn program_blocks() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter().filter(|o| !matches!(o, Self::MathLibrary))
    }
}

impl BlockOrigin {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Functions => "functions",
            Self::MathLibrary => "<math-library>",
            Self::Data => "data",
            Self::TData => "transformed data",
            Self::Param => "parameters",
            Self::TParam => "transformed parameters",
            Self::Model => "model",
            Self::GQuant => "generated quantities",
        }
    }
}

impl fmt::Display for BlockOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_spec_chain() {
        assert!(BlockOrigin::Functions < BlockOrigin::MathLibrary);
        assert!(BlockOrigin::MathLibrary < BlockOrigin::Data);
        assert!(BlockOrigin::Data < BlockOrigin::TData);
        assert!(BlockOrigin::TData < BlockOrigin::Param);
        assert!(BlockOrigin::Param < BlockOrigin::TParam);
        assert!(BlockOrigin::TParam < BlockOrigin::Model);
        assert!(BlockOrigin::Model < BlockOrigin::GQuant);
    }

    #[test]
    fn lub_picks_higher_origin() {
        assert_eq!(BlockOrigin::Data.lub(BlockOrigin::Param), BlockOrigin::Param);
        assert_eq!(BlockOrigin::Model.lub(BlockOrigin::Data), BlockOrigin::Model);
    }

    #[test]
    fn display_uses_block_keyword() {
        assert_eq!(BlockOrigin::TData.to_string(), "transformed data");
    }
}
