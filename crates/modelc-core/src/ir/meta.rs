//! The metadata axis of the IR framework (spec.md §4.4, §9 "Fixed-point IR
//! with parametric metadata").
//!
//! The pattern functors in [`crate::ir::expr`] and [`crate::ir::stmt`] are
//! generic over a single `Decoration` type parameter. A `Decoration`
//! chooses what gets attached to every expression node (`ExprMeta`) and
//! every statement node (`StmtMeta`) in the tree — this is the Rust
//! encoding of the source's "fix" combinator parameterized by metadata:
//! one pattern shape, reused unchanged across every metadata
//! specialization by picking a different `Decoration`.
use std::fmt;

use crate::span::SourceSpan;
use crate::types::{AdLevel, UnsizedType};

/// Chooses the per-node metadata carried by a tree. Implemented by three
/// marker types: [`NoMeta`] (untyped AST), [`TypedLocated`] (typed AST /
/// MIR), and [`Labeled<D>`] (any of the above plus a unique label).
pub trait Decoration: Clone + fmt::Debug + PartialEq {
    type ExprMeta: Clone + fmt::Debug + PartialEq;
    type StmtMeta: Clone + fmt::Debug + PartialEq;
}

/// The untyped-AST decoration: no metadata on either expressions or
/// statements. Used for tree shapes built purely for structural tests,
/// where even a source span would be incidental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct NoMeta;

impl Decoration for NoMeta {
    type ExprMeta = ();
    type StmtMeta = ();
}

/// The untyped-but-located decoration: the AST as produced by the
/// (external) parser (spec.md §6 "Input AST ... with location spans").
/// This is what [`crate::analyzer::analyze`] actually consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Located;

impl Decoration for Located {
    type ExprMeta = SourceSpan;
    type StmtMeta = SourceSpan;
}

/// Metadata attached to every expression once the semantic analyzer has
/// run: its inferred type, ad-level, and source span (spec.md §3).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExprTypeLoc {
    pub ty: UnsizedType,
    pub ad: AdLevel,
    pub span: SourceSpan,
}

/// Metadata attached to every statement once analyzed: a span only — per
/// spec.md §3, "Statements carry metadata analogous to expressions but
/// without type."
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StmtLoc {
    pub span: SourceSpan,
}

/// The typed-located decoration: the output of the semantic analyzer
/// (spec.md §4.5) and the shape the MIR partial evaluator (spec.md §4.6)
/// operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct TypedLocated;

impl Decoration for TypedLocated {
    type ExprMeta = ExprTypeLoc;
    type StmtMeta = StmtLoc;
}

/// A label assigned by the single linear labeling pass (spec.md §4.4
/// `associate`, §3 "Invariants": labels are unique within a program).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Wraps an existing per-node metadata value with a unique label, without
/// caring whether the wrapped value is `()`, [`ExprTypeLoc`]/[`StmtLoc`],
/// or anything else — label assignment layers onto whatever decoration is
/// already present (spec.md §4.4: "Labeled IR: ... as typed, plus a
/// unique integer label", generalized here to layer onto any decoration).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabeledMeta<T> {
    pub label: Label,
    pub inner: T,
}

/// The labeled decoration, generic over the decoration it labels.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Labeled<D>(std::marker::PhantomData<D>);

impl<D: Decoration> Decoration for Labeled<D> {
    type ExprMeta = LabeledMeta<D::ExprMeta>;
    type StmtMeta = LabeledMeta<D::StmtMeta>;
}

/// Convenience alias for the fully-decorated labeled typed IR used by the
/// downstream dataflow passes the GLOSSARY mentions as out of scope
/// beyond label assignment and association.
pub type LabeledTyped = Labeled<TypedLocated>;
