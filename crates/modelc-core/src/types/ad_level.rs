use std::fmt;

/// Whether a value participates in automatic differentiation.
///
/// `DataOnly` values are known at compile time to never carry a gradient;
/// `AutoDiffable` values may. Widening `DataOnly -> AutoDiffable` is
/// disallowed in general (spec.md §4.1) because it would require
/// rederiving a value that was never instrumented for autodiff; the
/// reverse (treating an autodiffable value as data) is always fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum AdLevel {
    DataOnly,
    AutoDiffable,
}

impl AdLevel {
    /// spec.md §4.1: true unless `self = DataOnly && to = AutoDiffable`.
    #[must_use]
    pub const fn can_convert_to(self, to: Self) -> bool {
        !(matches!(self, Self::DataOnly) && matches!(to, Self::AutoDiffable))
    }

    /// Least upper bound under `DataOnly < AutoDiffable`: the result is
    /// autodiffable if either operand is.
    #[must_use]
    pub fn lub(self, other: Self) -> Self {
        self.max(other)
    }
}

impl fmt::Display for AdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataOnly => write!(f, "data"),
            Self::AutoDiffable => write!(f, "autodiff"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_cannot_widen_to_autodiff() {
        assert!(!AdLevel::DataOnly.can_convert_to(AdLevel::AutoDiffable));
    }

    #[test]
    fn autodiff_narrows_to_data_freely() {
        assert!(AdLevel::AutoDiffable.can_convert_to(AdLevel::DataOnly));
        assert!(AdLevel::DataOnly.can_convert_to(AdLevel::DataOnly));
        assert!(AdLevel::AutoDiffable.can_convert_to(AdLevel::AutoDiffable));
    }

    #[test]
    fn lub_prefers_autodiffable() {
        assert_eq!(AdLevel::DataOnly.lub(AdLevel::AutoDiffable), AdLevel::AutoDiffable);
        assert_eq!(AdLevel::DataOnly.lub(AdLevel::DataOnly), AdLevel::DataOnly);
    }
}
