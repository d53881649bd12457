//! Identifier validation (spec.md §4.5.1 "Identifier validation", §4.5.2
//! "Freshness rule", §4.5.3 "Distribution name variants").

use crate::catalog::Catalog;
use crate::symbol_table::SymbolTable;

/// Language keywords plus target-backend keywords, held verbatim (spec.md
/// §4.5.1: "The reserved list must be held verbatim by the implementation").
pub const RESERVED_WORDS: &[&str] = &[
    "for", "in", "while", "repeat", "until", "if", "then", "else", "true", "false",
    "target", "return", "break", "continue", "void", "int", "real", "vector", "row_vector",
    "matrix", "ordered", "positive_ordered", "simplex", "unit_vector", "cholesky_factor_corr",
    "cholesky_factor_cov", "corr_matrix", "cov_matrix", "functions", "data",
    "transformed data", "parameters", "transformed parameters", "model",
    "generated quantities", "lower", "upper", "offset", "multiplier",
    "print", "reject", "profile",
    // target-backend reserved words (not Stan keywords but unsafe in generated code).
    "alignas", "alignof", "array", "auto", "const", "double", "enum", "explicit",
    "export", "extern", "friend", "inline", "namespace", "new", "operator",
    "private", "protected", "public", "register", "reinterpret_cast", "restrict",
    "static", "static_cast", "struct", "template", "typedef", "typeid", "typename",
    "union", "unsigned", "using", "virtual", "volatile",
];

/// Why an identifier was rejected (mirrors the `Identifier*` kinds of
/// spec.md §7, minus the span/message wrapping [`crate::errors`] adds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierError {
    IsKeyword,
    IsModelName,
    IsStanMathName,
    InUse,
}

/// spec.md §4.5.1: rejected if it equals the model name, ends with `__`,
/// or matches the reserved word set.
pub fn validate_identifier(name: &str, model_name: &str) -> Result<(), IdentifierError> {
    if name == model_name {
        return Err(IdentifierError::IsModelName);
    }
    if name.ends_with("__") {
        return Err(IdentifierError::IsKeyword);
    }
    if RESERVED_WORDS.contains(&name) {
        return Err(IdentifierError::IsKeyword);
    }
    Ok(())
}

/// spec.md §4.5.3: names whose distribution-suffix family must also be
/// checked for freshness alongside `name` itself.
fn suffix_siblings(name: &str) -> Vec<String> {
    if name == "multiply_log" || name == "binomial_coefficient_log" {
        return vec![];
    }
    const FAMILIES: &[(&str, &[&str])] = &[
        ("_lpmf", &["_lpdf", "_log"]),
        ("_lpdf", &["_lpmf", "_log"]),
        ("_lcdf", &["_cdf_log"]),
        ("_lccdf", &["_ccdf_log"]),
        ("_cdf_log", &["_lcdf"]),
        ("_ccdf_log", &["_lccdf"]),
        ("_log", &["_lpmf", "_lpdf"]),
    ];
    for (suffix, siblings) in FAMILIES {
        if let Some(stem) = name.strip_suffix(suffix) {
            return siblings.iter().map(|s| format!("{stem}{s}")).collect();
        }
    }
    vec![]
}

/// spec.md §4.5.2 `check_fresh`: fails if `name` is bound in the current
/// scope, or if it names a built-in with no zero-arity overload and
/// `is_nullary` is true (or there is no zero-arity built-in of that name at
/// all). Also checks every distribution-suffix sibling (spec.md §4.5.3).
pub fn check_fresh(name: &str, is_nullary: bool, symbols: &SymbolTable, catalog: &Catalog) -> Result<(), IdentifierError> {
    check_fresh_one(name, is_nullary, symbols, catalog)?;
    for sibling in suffix_siblings(name) {
        check_fresh_one(&sibling, is_nullary, symbols, catalog)?;
    }
    Ok(())
}

fn check_fresh_one(name: &str, is_nullary: bool, symbols: &SymbolTable, catalog: &Catalog) -> Result<(), IdentifierError> {
    if symbols.declared_in_current_scope(name) {
        return Err(IdentifierError::InUse);
    }
    if catalog.contains(name) {
        let has_zero_arity = catalog.overloads(name).is_some_and(|os| os.iter().any(|o| o.params.is_empty()));
        if is_nullary || !has_zero_arity {
            return Err(IdentifierError::IsStanMathName);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_is_rejected() {
        assert_eq!(validate_identifier("eight_schools", "eight_schools"), Err(IdentifierError::IsModelName));
    }

    #[test]
    fn trailing_double_underscore_is_rejected() {
        assert_eq!(validate_identifier("foo__", "m"), Err(IdentifierError::IsKeyword));
    }

    #[test]
    fn ordinary_name_is_accepted() {
        assert!(validate_identifier("mu", "m").is_ok());
    }

    #[test]
    fn lpmf_sibling_blocks_lpdf_freshness() {
        let mut symbols = SymbolTable::new();
        let catalog = Catalog::new();
        symbols.enter("foo_lpdf", crate::symbol_table::SymbolInfo::new(
            crate::types::UnsizedType::Real,
            crate::types::AdLevel::AutoDiffable,
            crate::types::BlockOrigin::Functions,
        ));
        assert_eq!(check_fresh("foo_lpmf", false, &symbols, &catalog), Err(IdentifierError::InUse));
    }

    #[test]
    fn multiply_log_is_exempt_from_sibling_check() {
        assert_eq!(suffix_siblings("multiply_log"), Vec::<String>::new());
    }
}
