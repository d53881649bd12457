//! Scoped symbol table used by the semantic analyzer (spec.md §4.3
//! "Symbol table").
//!
//! Frames form a stack, innermost last, the same layout
//! [`crate::namespace`]'s `Namespaces` uses for runtime call frames —
//! adapted here to compile-time lookup by name rather than by slot index,
//! since the analyzer never knows slot counts up front.

use ahash::AHashMap;

use crate::types::{AdLevel, BlockOrigin, UnsizedType};

/// Everything the analyzer tracks about one declared identifier (spec.md
/// §4.3: "type, ad-level, origin, and the read-only/assigned flags").
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInfo {
    pub ty: UnsizedType,
    pub ad: AdLevel,
    pub origin: BlockOrigin,
    pub read_only: bool,
    /// Tracks whether a `transformed data`/`transformed parameters` variable
    /// has received its defining assignment yet (spec.md §4.5.7's
    /// "incomplete" status reuses this at the whole-block level; this flag
    /// is the per-variable analogue spec.md §4.3 calls out for declared but
    /// not-yet-assigned names).
    pub assigned: bool,
}

impl SymbolInfo {
    #[must_use]
    pub const fn new(ty: UnsizedType, ad: AdLevel, origin: BlockOrigin) -> Self {
        Self {
            ty,
            ad,
            origin,
            read_only: false,
            assigned: false,
        }
    }
}

/// One lexical frame: the block-scoped names introduced at one nesting
/// level.
#[derive(Debug, Default)]
struct Frame(AHashMap<String, SymbolInfo>);

/// A stack of scopes, innermost last. Frame 0 is the global (program-wide)
/// scope and is never popped.
#[derive(Debug)]
pub struct SymbolTable {
    frames: Vec<Frame>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Pushes a new, empty scope (spec.md §4.5.6 "Block": "pushes/pops a
    /// symbol table frame around its children").
    pub fn begin_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pops the innermost scope.
    ///
    /// # Panics
    /// Panics if called with only the global frame left, which would
    /// indicate a mismatched `begin_scope`/`end_scope` pair upstream.
    pub fn end_scope(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the global symbol table scope");
        self.frames.pop();
    }

    /// Whether `name` is visible in the current (innermost) scope alone,
    /// without searching enclosing scopes — used by the freshness check
    /// (spec.md §4.5.2: "An identifier is fresh if it is not already bound
    /// in the *current* scope").
    #[must_use]
    pub fn declared_in_current_scope(&self, name: &str) -> bool {
        self.frames.last().is_some_and(|f| f.0.contains_key(name))
    }

    /// Declares `name` in the current scope, shadowing any binding of the
    /// same name from an enclosing scope.
    pub fn enter(&mut self, name: impl Into<String>, info: SymbolInfo) {
        self.frames.last_mut().expect("symbol table always has a frame").0.insert(name.into(), info);
    }

    /// Looks up `name`, searching from the innermost scope outward.
    #[must_use]
    pub fn look(&self, name: &str) -> Option<&SymbolInfo> {
        self.frames.iter().rev().find_map(|f| f.0.get(name))
    }

    /// Whether `name` is bound in the global (outermost) scope.
    #[must_use]
    pub fn is_global(&self, name: &str) -> bool {
        self.frames[0].0.contains_key(name)
    }

    pub fn set_read_only(&mut self, name: &str, read_only: bool) {
        if let Some(info) = self.find_mut(name) {
            info.read_only = read_only;
        }
    }

    pub fn set_assigned(&mut self, name: &str, assigned: bool) {
        if let Some(info) = self.find_mut(name) {
            info.assigned = assigned;
        }
    }

    /// Elevates `name`'s recorded origin (spec.md §4.3: "used only by the
    /// analyzer to elevate a local's origin upward according to its
    /// assigned RHS"). A no-op if `name` is not currently bound.
    pub fn unsafe_replace(&mut self, name: &str, new_origin: BlockOrigin) {
        if let Some(info) = self.find_mut(name) {
            info.origin = new_origin;
        }
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut SymbolInfo> {
        self.frames.iter_mut().rev().find_map(|f| f.0.get_mut(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SymbolInfo {
        SymbolInfo::new(UnsizedType::Real, AdLevel::AutoDiffable, BlockOrigin::Model)
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut t = SymbolTable::new();
        t.enter("x", SymbolInfo::new(UnsizedType::Int, AdLevel::DataOnly, BlockOrigin::Data));
        t.begin_scope();
        t.enter("x", info());
        assert_eq!(t.look("x").unwrap().ty, UnsizedType::Real);
        t.end_scope();
        assert_eq!(t.look("x").unwrap().ty, UnsizedType::Int);
    }

    #[test]
    fn declared_in_current_scope_ignores_outer_bindings() {
        let mut t = SymbolTable::new();
        t.enter("x", info());
        t.begin_scope();
        assert!(!t.declared_in_current_scope("x"));
        assert!(t.look("x").is_some());
    }

    #[test]
    #[should_panic(expected = "cannot pop the global symbol table scope")]
    fn end_scope_on_global_frame_panics() {
        let mut t = SymbolTable::new();
        t.end_scope();
    }

    #[test]
    fn assigned_flag_tracks_definition() {
        let mut t = SymbolTable::new();
        t.enter("y", info());
        assert!(!t.look("y").unwrap().assigned);
        t.set_assigned("y", true);
        assert!(t.look("y").unwrap().assigned);
    }

    #[test]
    fn unsafe_replace_elevates_origin_in_place() {
        let mut t = SymbolTable::new();
        t.enter("z", SymbolInfo::new(UnsizedType::Real, AdLevel::AutoDiffable, BlockOrigin::Functions));
        t.unsafe_replace("z", BlockOrigin::Model);
        assert_eq!(t.look("z").unwrap().origin, BlockOrigin::Model);
    }

    #[test]
    fn unsafe_replace_on_unbound_name_is_a_noop() {
        let mut t = SymbolTable::new();
        t.unsafe_replace("missing", BlockOrigin::Model);
        assert!(t.look("missing").is_none());
    }
}
