//! The lowering boundary (spec.md §4.7 "Lowering interface").
//!
//! `to_mir` itself is explicitly out of scope (spec.md §4.7: "implementation
//! out of scope"); what belongs to this crate is the *contract* a real
//! lowering pass must uphold so [`crate::optimizer`] can assume it. This
//! module re-exports the typed-located decoration under the MIR name the
//! rest of the crate uses and documents the invariants.

use crate::ir::{Expr, Stmt, TypedLocated};
use crate::program::Program;

/// The typed-located decoration, renamed at this boundary to match how the
/// rest of the pipeline refers to it (spec.md §4.7: "program_mir").
pub type Mir = TypedLocated;

pub type MirProgram = Program<Mir>;
pub type MirExpr = Expr<Mir>;
pub type MirStmt = Stmt<Mir>;

/// Placeholder for the external lowering pass. Returns the typed program
/// unchanged: since this crate's `Decoration` already gives MIR and the
/// typed AST the same shape (`TypedLocated`), a real `to_mir` would only
/// need to rewrite a handful of node kinds the parser's AST still has that
/// MIR canonicalizes away (e.g. desugaring `ForEach` into `For` over an
/// index array) — none of which this crate's AST produces, so identity is
/// already a faithful `to_mir` for every program representable here.
///
/// # Panics
/// Never panics; provided as the obvious no-op boundary implementation
/// spec.md §4.7 leaves unspecified.
#[must_use]
pub fn to_mir(program_typed: Program<TypedLocated>) -> MirProgram {
    program_typed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;

    #[test]
    fn to_mir_is_identity_on_the_shared_decoration() {
        let program: Program<TypedLocated> = Program::new("m");
        let mir = to_mir(program.clone());
        assert_eq!(program, mir);
    }
}
