//! Source location tracking for diagnostics.
//!
//! Mirrors the shape of a parser-produced location span (spec.md §6):
//! a file name, a half-open `[begin, end)` line/column range, and an
//! optional `included_from` chain for diagnostics that originate in a
//! file pulled in by another.

use std::fmt;

/// A single `(line, column)` position, both 0-indexed.
///
/// Kept as plain `u32`s rather than a newtype-per-axis: the parser that
/// produces these (out of scope for this crate, spec.md §1) is the only
/// writer, and both axes are always used together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct CodeLoc {
    pub line: u32,
    pub col: u32,
}

impl CodeLoc {
    #[must_use]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for CodeLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// One link in an `included_from` chain: the file that did the including,
/// and the position of the include directive within it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IncludedFrom {
    pub file: String,
    pub at: CodeLoc,
}

/// A source location span, carried on every typed-located and labeled IR
/// node (spec.md §3, "Expressions").
///
/// Two spans compare equal only by `(file, begin, end)`; the
/// `included_from` chain is informational for rendering and does not
/// affect equality used by the optimizer's structural-equality-modulo-metadata
/// checks (spec.md §9) — metadata, spans included, is never part of that
/// comparison in the first place, so this type needs no custom `PartialEq`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceSpan {
    pub file: String,
    pub begin: CodeLoc,
    pub end: CodeLoc,
    pub included_from: Option<Box<IncludedFrom>>,
}

impl SourceSpan {
    #[must_use]
    pub fn new(file: impl Into<String>, begin: CodeLoc, end: CodeLoc) -> Self {
        Self {
            file: file.into(),
            begin,
            end,
            included_from: None,
        }
    }

    /// A span with no useful location, used for synthetic nodes the
    /// optimizer or analyzer introduce internally (e.g. a rewritten call
    /// that has no single source position of its own).
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new("<synthetic>", CodeLoc::default(), CodeLoc::default())
    }

    #[must_use]
    pub fn with_included_from(mut self, file: impl Into<String>, at: CodeLoc) -> Self {
        self.included_from = Some(Box::new(IncludedFrom { file: file.into(), at }));
        self
    }

    /// Returns a span covering both `self` and `other`, keeping `self`'s
    /// file and `included_from` chain. Used when a compound expression's
    /// span must cover all of its children (e.g. a binary operator).
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            file: self.file.clone(),
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
            included_from: self.included_from.clone(),
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file, self.begin, self.end)?;
        let mut from = self.included_from.as_deref();
        while let Some(link) = from {
            write!(f, " (included from {}:{})", link.file, link.at)?;
            from = None;
        }
        Ok(())
    }
}
