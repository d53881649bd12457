//! Structured diagnostics (spec.md §7 "Error handling design").
//!
//! Errors are values, never exceptions: every analyzer function that can
//! fail returns `Result<_, CompileError>`, mirroring [`crate::repl_error`]'s
//! hand-rolled `Display`/`Error`/`From` chain rather than pulling in
//! `thiserror`.

use std::fmt;

use crate::span::SourceSpan;
use crate::types::{BlockOrigin, ReturnType, UnsizedType};

/// The exhaustive set of semantic error kinds (spec.md §7).
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    IdentifierIsKeyword,
    IdentifierIsModelName,
    IdentifierIsStanMathName,
    IdentifierInUse,
    IdentifierNotInScope,
    InvalidIndex { base_type: UnsizedType },
    IllTypedIfReturnTypes { rt1: ReturnType, rt2: ReturnType },
    IllTypedTernaryIf { t1: UnsizedType, t2: UnsizedType, t3: UnsizedType },
    IllTypedFunctionApp { name: String, arg_types: Vec<UnsizedType> },
    IllTypedNRFunction { name: String },
    IllTypedNotAFunction { name: String },
    IllTypedNoSuchFunction { name: String },
    IllTypedBinOp { op: String, lhs: UnsizedType, rhs: UnsizedType },
    IllTypedPrefixOp { op: String, ty: UnsizedType },
    IllTypedPostfixOp { op: String, ty: UnsizedType },
    FnMapRect { inner: String },
    FnConditioning,
    FnTargetPlusEquals,
    FnRng,
    /// A global's assignment falls outside the block that declared it
    /// (spec.md §4.5.6 Assign: "the lhs's block origin must equal the
    /// current block if it is a global").
    AssignOutsideDeclaringBlock { name: String },
    /// A declaration's size expression evaluates under a block origin
    /// later than `TData` (spec.md §3 Invariants: "variable sizes in
    /// top-level declarations must evaluate under a block origin of at
    /// most Data/TData").
    IllegalSizeOrigin { max: BlockOrigin, found: BlockOrigin },
    /// A declared variable was never assigned by the end of its block,
    /// under [`crate::context::AnalyzerOptions::require_definite_assignment`].
    UnassignedVariable { name: String },
    /// `break`/`continue` used outside any enclosing loop (spec.md §8
    /// invariant 5): ordinary invalid input, not an invariant violation.
    IllegalLoopControl { keyword: &'static str },
    /// An invariant violation that should never occur (spec.md §7:
    /// "invariant violation that should never occur").
    FatalInternal { msg: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentifierIsKeyword => write!(f, "identifier is a reserved keyword"),
            Self::IdentifierIsModelName => write!(f, "identifier matches the model name"),
            Self::IdentifierIsStanMathName => write!(f, "identifier shadows a zero-arity built-in"),
            Self::IdentifierInUse => write!(f, "identifier already declared in this scope"),
            Self::IdentifierNotInScope => write!(f, "identifier not in scope"),
            Self::InvalidIndex { base_type } => write!(f, "cannot index into a value of type {base_type}"),
            Self::IllTypedIfReturnTypes { rt1, rt2 } => {
                write!(f, "branches return incompatible types {rt1} and {rt2}")
            }
            Self::IllTypedTernaryIf { t1, t2, t3 } => {
                write!(f, "ternary condition/branches have incompatible types {t1}, {t2}, {t3}")
            }
            Self::IllTypedFunctionApp { name, arg_types } => {
                write!(f, "no overload of '{name}' accepts argument types (")?;
                for (i, ty) in arg_types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            Self::IllTypedNRFunction { name } => write!(f, "'{name}' does not return void and cannot be used as a statement"),
            Self::IllTypedNotAFunction { name } => write!(f, "'{name}' is not a function"),
            Self::IllTypedNoSuchFunction { name } => write!(f, "no function named '{name}'"),
            Self::IllTypedBinOp { op, lhs, rhs } => write!(f, "operator '{op}' not defined for ({lhs}, {rhs})"),
            Self::IllTypedPrefixOp { op, ty } => write!(f, "prefix operator '{op}' not defined for {ty}"),
            Self::IllTypedPostfixOp { op, ty } => write!(f, "postfix operator '{op}' not defined for {ty}"),
            Self::FnMapRect { inner } => write!(f, "map_rect may not wrap '{inner}' here"),
            Self::FnConditioning => write!(f, "conditioning notation not permitted in this context"),
            Self::FnTargetPlusEquals => write!(f, "target += / ~ not permitted in this block"),
            Self::FnRng => write!(f, "_rng function not permitted in this context"),
            Self::AssignOutsideDeclaringBlock { name } => {
                write!(f, "'{name}' can only be assigned in the block that declared it")
            }
            Self::IllegalSizeOrigin { max, found } => {
                write!(f, "size expression depends on block {found}, later than the permitted {max}")
            }
            Self::UnassignedVariable { name } => write!(f, "'{name}' is never assigned in this block"),
            Self::IllegalLoopControl { keyword } => write!(f, "'{keyword}' used outside a loop"),
            Self::FatalInternal { msg } => write!(f, "internal error: {msg}"),
        }
    }
}

/// One diagnostic: a kind, the span it occurred at, and a free-form prose
/// message elaborating on the kind (spec.md §6 "Error channel").
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub span: SourceSpan,
    pub message: String,
}

impl CompileError {
    #[must_use]
    pub fn new(kind: ErrorKind, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Renders the error alongside two lines of source context and a caret
    /// under the offending column (spec.md §7 "User-visible rendering"),
    /// given the full source text the span's line numbers index into.
    /// Falls back to the bare message when the referenced line is out of
    /// range (e.g. a synthetic span).
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let mut out = format!("{self}\n");
        let lines: Vec<&str> = source.lines().collect();
        let line_idx = self.span.begin.line as usize;
        let start = line_idx.saturating_sub(1);
        for (n, text) in lines.iter().enumerate().skip(start).take(2) {
            if n > line_idx {
                break;
            }
            out.push_str(&format!("{:>5} | {text}\n", n + 1));
            if n == line_idx {
                let col = self.span.begin.col as usize;
                out.push_str(&format!("      | {}^\n", " ".repeat(col)));
            }
        }
        out
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.span, self.message)
    }
}

impl std::error::Error for CompileError {}

/// Accumulates diagnostics across a compilation, mirroring spec.md §7's
/// policy note that "an implementation may continue into later blocks to
/// surface more diagnostics".
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<CompileError>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CompileError) {
        self.0.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CompileError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<CompileError> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::CodeLoc;

    #[test]
    fn render_points_caret_at_offending_column() {
        let err = CompileError::new(
            ErrorKind::IdentifierNotInScope,
            SourceSpan::new("model.stan", CodeLoc::new(1, 4), CodeLoc::new(1, 5)),
            "'y' is not declared",
        );
        let rendered = err.render("data {\n  int y = z;\n}\n");
        assert!(rendered.contains("int y = z;"));
        assert!(rendered.contains("^"));
    }

    #[test]
    fn diagnostics_accumulates_in_order() {
        let mut diags = Diagnostics::new();
        diags.push(CompileError::new(ErrorKind::FnRng, SourceSpan::synthetic(), "no"));
        diags.push(CompileError::new(ErrorKind::FnConditioning, SourceSpan::synthetic(), "no"));
        assert_eq!(diags.as_slice().len(), 2);
    }
}
