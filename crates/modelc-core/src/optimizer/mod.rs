//! The MIR partial evaluator/optimizer (spec.md §4.6).
//!
//! A single bottom-up pass over typed MIR: at each node, constants are
//! folded first ([`fold::fold_constants`]), then the (possibly now more
//! literal) result is tried against the specialized-function rewrites
//! ([`rewrites::apply`]), guarded by the catalog. Folding a literal
//! subtree can expose a rewrite one level up (`pow(x, 1/2)` only becomes
//! `sqrt(x)`-shaped once `1/2` has folded to `0.5`), so folding always
//! runs before rewriting at a given node.

pub mod fold;
pub mod rewrites;

use crate::catalog::Catalog;
use crate::ir::meta::TypedLocated;
use crate::ir::traverse::{map_expr, map_stmt};
use crate::ir::{Expr, Stmt};
use crate::program::Program;

/// Folds, then rewrites, a single node — the per-node step [`map_expr`]
/// applies bottom-up.
fn optimize_node(e: Expr<TypedLocated>, catalog: &Catalog) -> Expr<TypedLocated> {
    let folded = fold::fold_constants(e);
    rewrites::apply(folded, catalog)
}

/// Runs the partial evaluator over a single expression (spec.md §4.6
/// "Children are evaluated first; then the current node is considered for
/// rewriting").
#[must_use]
pub fn optimize(e: Expr<TypedLocated>, catalog: &Catalog) -> Expr<TypedLocated> {
    map_expr(e, &mut |node| optimize_node(node, catalog))
}

/// Runs the partial evaluator over every expression in a statement,
/// leaving the statement tree shape itself untouched.
#[must_use]
pub fn optimize_stmt(s: Stmt<TypedLocated>, catalog: &Catalog) -> Stmt<TypedLocated> {
    map_stmt(s, &mut |s| s, &mut |node| optimize_node(node, catalog))
}

/// Runs the partial evaluator over every block of a whole program, in
/// place of each block's statement list.
#[must_use]
pub fn optimize_program(program: Program<TypedLocated>, catalog: &Catalog) -> Program<TypedLocated> {
    let map_block = |block: Option<Vec<Stmt<TypedLocated>>>| {
        block.map(|stmts| stmts.into_iter().map(|s| optimize_stmt(s, catalog)).collect())
    };
    Program {
        name: program.name,
        functions: map_block(program.functions),
        data: map_block(program.data),
        transformed_data: map_block(program.transformed_data),
        parameters: map_block(program.parameters),
        transformed_parameters: map_block(program.transformed_parameters),
        model: map_block(program.model),
        generated_quantities: map_block(program.generated_quantities),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{ExprKind, FunKind, LitKind};
    use crate::ir::meta::ExprTypeLoc;
    use crate::span::{CodeLoc, SourceSpan};
    use crate::types::{AdLevel, UnsizedType};

    fn span() -> SourceSpan {
        SourceSpan::new("f", CodeLoc::new(0, 0), CodeLoc::new(0, 1))
    }

    fn meta(ty: UnsizedType) -> ExprTypeLoc {
        ExprTypeLoc { ty, ad: AdLevel::DataOnly, span: span() }
    }

    fn lit(kind: LitKind, text: &str, ty: UnsizedType) -> Expr<TypedLocated> {
        Expr::new(ExprKind::Lit(kind, text.to_owned()), meta(ty))
    }

    fn call(name: &str, args: Vec<Expr<TypedLocated>>, ty: UnsizedType) -> Expr<TypedLocated> {
        Expr::new(ExprKind::FunApp(FunKind::StanLib, name.to_owned(), args), meta(ty))
    }

    #[test]
    fn folding_a_literal_exposes_a_rewrite_one_level_up() {
        // pow(x, 1/2) -> pow(x, 0.5) (folded) -> sqrt(x) (rewritten), in one pass.
        let catalog = Catalog::builtin();
        let x = Expr::new(ExprKind::Var("x".to_owned()), meta(UnsizedType::Real));
        let half = call("Divide__", vec![lit(LitKind::Real, "1", UnsizedType::Real), lit(LitKind::Real, "2", UnsizedType::Real)], UnsizedType::Real);
        let e = call("pow", vec![x, half], UnsizedType::Real);
        let optimized = optimize(e, &catalog);
        assert!(matches!(&optimized.kind, ExprKind::FunApp(_, name, _) if name == "sqrt"));
    }

    #[test]
    fn constant_subexpression_folds_bottom_up() {
        let catalog = Catalog::builtin();
        let e = call(
            "Plus__",
            vec![
                call("Times__", vec![lit(LitKind::Int, "2", UnsizedType::Int), lit(LitKind::Int, "3", UnsizedType::Int)], UnsizedType::Int),
                lit(LitKind::Int, "1", UnsizedType::Int),
            ],
            UnsizedType::Int,
        );
        let optimized = optimize(e, &catalog);
        assert_eq!(optimized.kind, ExprKind::Lit(LitKind::Int, "7".to_owned()));
    }
}
