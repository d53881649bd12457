//! The semantic analyzer (spec.md §4.5 "Semantic analyzer").
//!
//! Entry point: [`analyze`]. Walks a program's blocks in the fixed order
//! spec.md §4.5 mandates, threading a single [`Context`] that owns the
//! symbol table, the catalog, and the handful of boolean flags that gate
//! block-specific statement forms (`~`, `target +=`, `_rng` calls).

mod expr_typing;
mod identifiers;
mod indexing;
mod return_status;
mod stmt_checking;

pub use identifiers::{validate_identifier, IdentifierError, RESERVED_WORDS};
pub use indexing::index_result_type;
pub use return_status::{satisfies, ReturnStatus};

use crate::catalog::Catalog;
use crate::context::AnalyzerOptions;
use crate::errors::{CompileError, ErrorKind};
use crate::ir::{Located, TypedLocated};
use crate::program::Program;
use crate::span::SourceSpan;
use crate::symbol_table::SymbolTable;
use crate::types::{BlockOrigin, ReturnType};

/// Mutable state threaded through one `analyze` call (spec.md §5: "the
/// symbol table, the context-flag record, and a monotonic label counter ...
/// owned by a single `analyze` call"). The label counter itself belongs to
/// the separate labeling pass ([`crate::ir::label_stmt`]), run after
/// analysis succeeds.
pub struct Context<'a> {
    pub symbols: SymbolTable,
    pub catalog: &'a Catalog,
    pub options: &'a AnalyzerOptions,
    pub model_name: String,
    pub current_block: BlockOrigin,
    pub in_loop: bool,
    /// Set inside `model` and inside functions declared with an `_lp`
    /// suffix or invoked only from such contexts (spec.md §8 invariant 6).
    pub in_model_or_lp_context: bool,
    /// Set inside `transformed_data`, `generated_quantities`, or `_rng`
    /// functions (spec.md §8 invariant 7).
    pub in_rng_context: bool,
    /// `Some(declared return type)` while checking a function body.
    pub current_function_return: Option<ReturnType>,
    /// Names declared directly in the block currently being walked (not
    /// inside a nested scope), reset on every block-loop iteration in
    /// [`analyze`]. Consulted by the `require_definite_assignment` check.
    pub declared_in_block: Vec<String>,
}

impl<'a> Context<'a> {
    fn new(catalog: &'a Catalog, options: &'a AnalyzerOptions, model_name: impl Into<String>) -> Self {
        Self {
            symbols: SymbolTable::new(),
            catalog,
            options,
            model_name: model_name.into(),
            current_block: BlockOrigin::Functions,
            in_loop: false,
            in_model_or_lp_context: false,
            in_rng_context: false,
            current_function_return: None,
            declared_in_block: Vec::new(),
        }
    }
}

/// spec.md §4.5 `analyze(program_untyped) -> program_typed`.
///
/// # Errors
/// The first [`CompileError`] encountered while walking the blocks in
/// fixed order (spec.md §7: "the analyzer raises the first it encounters
/// and stops the current top-level block").
pub fn analyze(
    program: &Program<Located>,
    model_name: &str,
    catalog: &Catalog,
    options: &AnalyzerOptions,
) -> Result<Program<TypedLocated>, CompileError> {
    let mut ctx = Context::new(catalog, options, model_name);
    let mut out: Program<TypedLocated> = Program::new(program.name.clone());

    for (origin, block) in program.blocks_in_order() {
        let Some(stmts) = block else { continue };
        ctx.current_block = origin;
        ctx.in_rng_context = matches!(origin, BlockOrigin::TData | BlockOrigin::GQuant);
        ctx.in_model_or_lp_context = matches!(origin, BlockOrigin::Model);
        ctx.declared_in_block.clear();

        if matches!(origin, BlockOrigin::Model) {
            ctx.symbols.begin_scope();
        }

        let mut checked = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            checked.push(stmt_checking::check_stmt(&mut ctx, stmt)?);
        }

        if matches!(origin, BlockOrigin::Model) {
            ctx.symbols.end_scope();
        }

        if ctx.options.require_definite_assignment && matches!(origin, BlockOrigin::TData | BlockOrigin::TParam) {
            for name in &ctx.declared_in_block {
                if !ctx.symbols.look(name).is_some_and(|info| info.assigned) {
                    return Err(CompileError::new(
                        ErrorKind::UnassignedVariable { name: name.clone() },
                        SourceSpan::synthetic(),
                        format!("'{name}' is declared but never assigned in this block"),
                    ));
                }
            }
        }

        out.set_block(origin, checked);
    }

    Ok(out)
}

pub(crate) fn fatal(msg: impl Into<String>, span: SourceSpan) -> CompileError {
    CompileError::new(ErrorKind::FatalInternal { msg: msg.into() }, span, "internal invariant violation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Expr, ExprKind, FunKind, LitKind, Stmt, StmtKind};
    use crate::span::CodeLoc;
    use crate::types::{AdLevel, SizedType, UnsizedType};

    fn loc() -> SourceSpan {
        SourceSpan::new("m.stan", CodeLoc::new(0, 0), CodeLoc::new(0, 1))
    }

    fn int_lit(n: &str) -> Expr<Located> {
        Expr::new(ExprKind::Lit(LitKind::Int, n.to_owned()), loc())
    }

    #[test]
    fn basic_data_and_param_model_typechecks() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();

        let mut program: Program<Located> = Program::new("eight_schools");
        program.set_block(
            BlockOrigin::Data,
            vec![Stmt::new(
                StmtKind::Decl {
                    ad: AdLevel::DataOnly,
                    name: "n".to_owned(),
                    ty: SizedType::SInt,
                },
                loc(),
            )],
        );
        program.set_block(
            BlockOrigin::Param,
            vec![Stmt::new(
                StmtKind::Decl {
                    ad: AdLevel::AutoDiffable,
                    name: "mu".to_owned(),
                    ty: SizedType::SReal,
                },
                loc(),
            )],
        );
        program.set_block(
            BlockOrigin::Model,
            vec![Stmt::new(
                StmtKind::Tilde {
                    arg: Box::new(Expr::new(ExprKind::Var("mu".to_owned()), loc())),
                    distribution: "normal".to_owned(),
                    args: vec![int_lit("0"), int_lit("1")],
                    truncation: crate::ir::Truncation::None,
                },
                loc(),
            )],
        );

        let typed = analyze(&program, "eight_schools", &catalog, &options).unwrap();
        assert!(typed.model.is_some());
    }

    #[test]
    fn tilde_in_transformed_data_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();

        let mut program: Program<Located> = Program::new("m");
        program.set_block(
            BlockOrigin::TData,
            vec![Stmt::new(
                StmtKind::Tilde {
                    arg: Box::new(Expr::new(ExprKind::Var("x".to_owned()), loc())),
                    distribution: "normal".to_owned(),
                    args: vec![int_lit("0"), int_lit("1")],
                    truncation: crate::ir::Truncation::None,
                },
                loc(),
            )],
        );

        let err = analyze(&program, "m", &catalog, &options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FnTargetPlusEquals);
    }

    #[test]
    fn noninteger_bounds_on_an_int_declaration_are_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut program: Program<Located> = Program::new("m");
        program.set_block(
            BlockOrigin::Data,
            vec![Stmt::new(
                StmtKind::Decl {
                    ad: AdLevel::DataOnly,
                    name: "n".to_owned(),
                    ty: SizedType::SArray(
                        Box::new(SizedType::SInt),
                        Box::new(Expr::new(ExprKind::Lit(LitKind::Real, "0.5".to_owned()), loc())),
                    ),
                },
                loc(),
            )],
        );
        let _ = FunKind::StanLib;
        let err = analyze(&program, "m", &catalog, &options).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidIndex { .. }));
    }

    #[test]
    fn sampling_in_generated_quantities_is_gated_by_the_option() {
        let catalog = Catalog::builtin();
        let mut program: Program<Located> = Program::new("m");
        program.set_block(
            BlockOrigin::GQuant,
            vec![Stmt::new(
                StmtKind::Tilde {
                    arg: Box::new(Expr::new(ExprKind::Var("x".to_owned()), loc())),
                    distribution: "normal".to_owned(),
                    args: vec![int_lit("0"), int_lit("1")],
                    truncation: crate::ir::Truncation::None,
                },
                loc(),
            )],
        );
        program.set_block(
            BlockOrigin::Data,
            vec![Stmt::new(
                StmtKind::Decl {
                    ad: AdLevel::DataOnly,
                    name: "x".to_owned(),
                    ty: SizedType::SReal,
                },
                loc(),
            )],
        );

        let allowed = AnalyzerOptions::default();
        assert!(analyze(&program, "m", &catalog, &allowed).is_ok());

        let disallowed = AnalyzerOptions {
            allow_sampling_in_generated_quantities: false,
            ..AnalyzerOptions::default()
        };
        let err = analyze(&program, "m", &catalog, &disallowed).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FnTargetPlusEquals);
    }

    #[test]
    fn require_definite_assignment_rejects_an_unassigned_transformed_parameter() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions {
            require_definite_assignment: true,
            ..AnalyzerOptions::default()
        };
        let mut program: Program<Located> = Program::new("m");
        program.set_block(
            BlockOrigin::TParam,
            vec![Stmt::new(
                StmtKind::Decl {
                    ad: AdLevel::AutoDiffable,
                    name: "theta".to_owned(),
                    ty: SizedType::SReal,
                },
                loc(),
            )],
        );
        let err = analyze(&program, "m", &catalog, &options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnassignedVariable { name: "theta".to_owned() });
    }

    #[test]
    fn require_definite_assignment_accepts_an_assigned_transformed_parameter() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions {
            require_definite_assignment: true,
            ..AnalyzerOptions::default()
        };
        let mut program: Program<Located> = Program::new("m");
        program.set_block(
            BlockOrigin::TParam,
            vec![
                Stmt::new(
                    StmtKind::Decl {
                        ad: AdLevel::AutoDiffable,
                        name: "theta".to_owned(),
                        ty: SizedType::SReal,
                    },
                    loc(),
                ),
                Stmt::new(
                    StmtKind::Assign(
                        crate::ir::LValue {
                            name: "theta".to_owned(),
                            indices: vec![],
                            meta: loc(),
                        },
                        crate::ir::AssignOp::Assign,
                        Box::new(int_lit("1")),
                    ),
                    loc(),
                ),
            ],
        );
        assert!(analyze(&program, "m", &catalog, &options).is_ok());
    }
}
