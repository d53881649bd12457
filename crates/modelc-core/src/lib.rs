#![doc = include_str!("../../../README.md")]

pub mod analyzer;
pub mod catalog;
pub mod context;
pub mod errors;
pub mod ir;
pub mod lowering;
pub mod optimizer;
pub mod program;
pub mod span;
pub mod symbol_table;
pub mod types;

pub use analyzer::analyze;
pub use catalog::{Catalog, Overload, ResolveError};
pub use context::AnalyzerOptions;
pub use errors::{CompileError, Diagnostics, ErrorKind};
pub use ir::{
    associate, expr_eq_modulo_meta, fold_expr, fold_stmt, label_stmt, map_expr, map_stmt, traverse_expr_with_state,
    traverse_stmt_with_state, AssignOp, Decoration, Expr, ExprKind, ExprTypeLoc, FunKind, FunParam, Index, Label,
    Labeled, LabeledMeta, LabeledTyped, LitKind, Located, LValue, NoMeta, Stmt, StmtKind, StmtLoc, Truncation,
    TypedLocated,
};
pub use lowering::{to_mir, Mir, MirExpr, MirProgram, MirStmt};
pub use optimizer::{optimize, optimize_program, optimize_stmt};
pub use program::{Block, Program};
pub use span::{CodeLoc, IncludedFrom, SourceSpan};
pub use symbol_table::{SymbolInfo, SymbolTable};
pub use types::{
    compatible_arguments_mod_conv, contains_int, return_type_assignable, same_type_mod_array_conv, same_type_mod_conv,
    AdLevel, BlockOrigin, FunType, ReturnType, SizedType, UnsizedType,
};
