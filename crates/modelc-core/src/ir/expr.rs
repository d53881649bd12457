//! The expression pattern functor (spec.md §3 "Expressions (MIR/AST pattern)").

use super::meta::Decoration;

/// The kind of a literal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LitKind {
    Int,
    Real,
    Str,
}

/// Which world a called function comes from (spec.md §3, §4.7: "all calls
/// are marked with one of StanLib/CompilerInternal/UserDefined").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FunKind {
    StanLib,
    CompilerInternal,
    UserDefined,
}

/// An index applied by an `Indexed` expression (spec.md §3 "Indices").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Index<D: Decoration> {
    All,
    Single(Box<Expr<D>>),
    Multi(Box<Expr<D>>),
    Upfrom(Box<Expr<D>>),
    Downfrom(Box<Expr<D>>),
    Between(Box<Expr<D>>, Box<Expr<D>>),
}

impl<D: Decoration> Index<D> {
    /// An index is `Single` exactly when it reduces rank by one
    /// (spec.md §4.5.5). Every other variant (including `Between`, which
    /// *looks* like it names one slice but names a range) preserves rank.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Each child expression of this index, in left-to-right reading
    /// order — used by the generic traversal in [`super::traverse`].
    pub fn children(&self) -> Vec<&Expr<D>> {
        match self {
            Self::All => vec![],
            Self::Single(e) | Self::Multi(e) | Self::Upfrom(e) | Self::Downfrom(e) => vec![e.as_ref()],
            Self::Between(lo, hi) => vec![lo.as_ref(), hi.as_ref()],
        }
    }
}

/// The expression pattern functor, parametric in the metadata carried by
/// every node (spec.md §4.4 "IR framework"; §9 design note: "a generic
/// 'fix' combinator that parameterizes the AST by metadata").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ExprKind<D: Decoration> {
    Var(String),
    Lit(LitKind, String),
    FunApp(FunKind, String, Vec<Expr<D>>),
    /// A `~`-adjacent conditional-distribution application: a bare call to
    /// a distribution-suffixed name used as an expression rather than
    /// inside a `Tilde` statement (spec.md §4.5.4: "`CondDistApp(name,
    /// args)`: as `FunApp`, additionally requires `name` to end with a
    /// distribution suffix").
    CondDistApp(FunKind, String, Vec<Expr<D>>),
    TernaryIf(Box<Expr<D>>, Box<Expr<D>>, Box<Expr<D>>),
    EAnd(Box<Expr<D>>, Box<Expr<D>>),
    EOr(Box<Expr<D>>, Box<Expr<D>>),
    Indexed(Box<Expr<D>>, Vec<Index<D>>),
}

/// One node of the expression tree: its pattern plus its decoration's
/// metadata.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Expr<D: Decoration> {
    pub kind: ExprKind<D>,
    pub meta: D::ExprMeta,
}

impl<D: Decoration> Expr<D> {
    #[must_use]
    pub const fn new(kind: ExprKind<D>, meta: D::ExprMeta) -> Self {
        Self { kind, meta }
    }

    /// Every direct child expression, in the stable pre-order spec.md
    /// §4.4 requires ("strict left-to-right and exhaustive ... pre-order,
    /// natural reading order").
    pub fn children(&self) -> Vec<&Self> {
        match &self.kind {
            ExprKind::Var(_) | ExprKind::Lit(_, _) => vec![],
            ExprKind::FunApp(_, _, args) | ExprKind::CondDistApp(_, _, args) => args.iter().collect(),
            ExprKind::TernaryIf(c, t, e) => vec![c.as_ref(), t.as_ref(), e.as_ref()],
            ExprKind::EAnd(a, b) | ExprKind::EOr(a, b) => vec![a.as_ref(), b.as_ref()],
            ExprKind::Indexed(base, idxs) => {
                let mut out = vec![base.as_ref()];
                out.extend(idxs.iter().flat_map(Index::children));
                out
            }
        }
    }
}
