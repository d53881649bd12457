//! Analyzer configuration (spec.md §3 "Lifecycle").

/// Options controlling one run of [`crate::analyzer::analyze`].
///
/// Kept as a plain struct of flags rather than a builder: every field is a
/// simple on/off switch and the whole struct derives `Default`, matching
/// the teacher's repl-option records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Allow `target +=` / `~` statements inside `generated quantities`
    /// (spec.md §4.5.6 is silent on this; Stan itself permits it for
    /// posterior-predictive simulation, so it defaults to allowed).
    pub allow_sampling_in_generated_quantities: bool,
    /// Require every declared variable to be assigned before the end of
    /// its declaring block (spec.md §4.5.7 "incomplete"). Disabled by
    /// default since `data`/`parameters` declarations are never assigned
    /// by user code.
    pub require_definite_assignment: bool,
    /// Run the MIR partial evaluator (spec.md §4.6) after a successful
    /// analysis pass.
    pub optimize: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            allow_sampling_in_generated_quantities: true,
            require_definite_assignment: false,
            optimize: true,
        }
    }
}

impl AnalyzerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_optimize_and_permit_gq_sampling() {
        let opts = AnalyzerOptions::default();
        assert!(opts.optimize);
        assert!(opts.allow_sampling_in_generated_quantities);
        assert!(!opts.require_definite_assignment);
    }
}
