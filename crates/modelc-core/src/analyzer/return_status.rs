//! The return-status algebra (spec.md §4.5.7 "Return-status algebra for
//! conditionals and blocks").

use crate::errors::{CompileError, ErrorKind};
use crate::span::SourceSpan;
use crate::types::{return_type_assignable, ReturnType, UnsizedType};

/// One statement's contribution to whether its enclosing function
/// definitely returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnStatus {
    NoReturn,
    /// A `reject`-like statement: aborts execution, so it satisfies
    /// return-completeness analysis the same way a `Complete` would,
    /// without itself carrying a return type (spec.md §4.5.7).
    AnyReturn,
    Incomplete(ReturnType),
    Complete(ReturnType),
}

/// The least-upper-bound of two return types under int/real widening
/// (spec.md §4.5.7: "Real<->Int is widened to Real"). `None` if they are
/// incompatible.
fn join_return_type(a: &ReturnType, b: &ReturnType) -> Option<ReturnType> {
    match (a, b) {
        (ReturnType::Void, ReturnType::Void) => Some(ReturnType::Void),
        (ReturnType::Returning(t1), ReturnType::Returning(t2)) => {
            if t1 == t2 {
                Some(ReturnType::Returning(t1.clone()))
            } else if matches!((t1, t2), (UnsizedType::Real, UnsizedType::Int) | (UnsizedType::Int, UnsizedType::Real)) {
                Some(ReturnType::Returning(UnsizedType::Real))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Joins two branches of an `IfElse`, or two statements in sequence,
/// per the table in spec.md §4.5.7.
///
/// # Errors
/// [`ErrorKind::IllTypedIfReturnTypes`] if both sides are `Complete`/`Incomplete`
/// with incompatible return types.
pub fn join(a: ReturnStatus, b: ReturnStatus, span: &SourceSpan) -> Result<ReturnStatus, CompileError> {
    use ReturnStatus::{AnyReturn, Complete, Incomplete, NoReturn};

    let incompatible = |rt1: &ReturnType, rt2: &ReturnType| {
        CompileError::new(
            ErrorKind::IllTypedIfReturnTypes {
                rt1: rt1.clone(),
                rt2: rt2.clone(),
            },
            span.clone(),
            "branches return incompatible types",
        )
    };

    Ok(match (a, b) {
        (NoReturn, NoReturn) => NoReturn,
        (AnyReturn, other) | (other, AnyReturn) => other,
        (NoReturn, other @ (Incomplete(_) | Complete(_))) | (other @ (Incomplete(_) | Complete(_)), NoReturn) => {
            match other {
                Complete(rt) | Incomplete(rt) => Incomplete(rt),
                _ => unreachable!(),
            }
        }
        (Complete(rt1), Complete(rt2)) => {
            Complete(join_return_type(&rt1, &rt2).ok_or_else(|| incompatible(&rt1, &rt2))?)
        }
        (Complete(rt1), Incomplete(rt2)) | (Incomplete(rt1), Complete(rt2)) | (Incomplete(rt1), Incomplete(rt2)) => {
            Incomplete(join_return_type(&rt1, &rt2).ok_or_else(|| incompatible(&rt1, &rt2))?)
        }
    })
}

fn return_type_of(status: &ReturnStatus) -> Option<&ReturnType> {
    match status {
        ReturnStatus::Complete(rt) | ReturnStatus::Incomplete(rt) => Some(rt),
        ReturnStatus::NoReturn | ReturnStatus::AnyReturn => None,
    }
}

/// Combines a block's accumulated status so far with its next statement's
/// status, per spec.md §4.5.7: "if any prefix is `Complete`, later
/// statements do not weaken it." Unlike [`join`] (which is symmetric and
/// used for `IfElse` branches that genuinely run on alternative paths),
/// sequencing is asymmetric: a later unconditional return strengthens a
/// merely `Incomplete` prefix instead of being weakened by it.
fn sequence(acc: ReturnStatus, next: ReturnStatus, span: &SourceSpan) -> Result<ReturnStatus, CompileError> {
    use ReturnStatus::{AnyReturn, Complete, Incomplete, NoReturn};

    if matches!(acc, Complete(_) | AnyReturn) {
        return Ok(acc);
    }
    if matches!(next, NoReturn) {
        return Ok(acc);
    }

    let merged = match (return_type_of(&acc), return_type_of(&next)) {
        (Some(rt1), Some(rt2)) => Some(join_return_type(rt1, rt2).ok_or_else(|| {
            CompileError::new(
                ErrorKind::IllTypedIfReturnTypes { rt1: rt1.clone(), rt2: rt2.clone() },
                span.clone(),
                "sequenced statements return incompatible types",
            )
        })?),
        (Some(rt), None) | (None, Some(rt)) => Some(rt.clone()),
        (None, None) => None,
    };

    Ok(match next {
        AnyReturn => AnyReturn,
        Complete(_) => Complete(merged.expect("Complete always carries a return type")),
        Incomplete(_) => Incomplete(merged.expect("Incomplete always carries a return type")),
        NoReturn => unreachable!("handled above"),
    })
}

/// Left-folds [`sequence`] across a block's statements, stopping (for
/// status purposes only) once the accumulated status becomes
/// unconditionally terminal (`Complete`/`AnyReturn` — the statuses a
/// `Return` or `Reject` statement itself produces; spec.md §4.5.7:
/// "statements after such a marker are ignored for status purposes but
/// still checked").
pub fn fold_block(statuses: impl IntoIterator<Item = ReturnStatus>, span: &SourceSpan) -> Result<ReturnStatus, CompileError> {
    let mut acc = ReturnStatus::NoReturn;
    for status in statuses {
        acc = sequence(acc, status, span)?;
        if matches!(acc, ReturnStatus::Complete(_) | ReturnStatus::AnyReturn) {
            break;
        }
    }
    Ok(acc)
}

/// Whether `status` satisfies a declared return type of `expected` for
/// "every path through the body must return a compatible type" (spec.md
/// §4.5.6 `FunDef`).
#[must_use]
pub fn satisfies(status: &ReturnStatus, expected: &ReturnType) -> bool {
    match status {
        ReturnStatus::AnyReturn => true,
        ReturnStatus::Complete(rt) => return_type_assignable(expected, rt),
        ReturnStatus::NoReturn | ReturnStatus::Incomplete(_) => *expected == ReturnType::Void,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        SourceSpan::synthetic()
    }

    #[test]
    fn complete_plus_incomplete_widens_to_incomplete() {
        let joined = join(
            ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Int)),
            ReturnStatus::Incomplete(ReturnType::Returning(UnsizedType::Real)),
            &span(),
        )
        .unwrap();
        assert_eq!(joined, ReturnStatus::Incomplete(ReturnType::Returning(UnsizedType::Real)));
    }

    #[test]
    fn incompatible_complete_branches_error() {
        let err = join(
            ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Int)),
            ReturnStatus::Complete(ReturnType::Void),
            &span(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn single_branch_if_with_no_else_is_incomplete() {
        let joined = join(ReturnStatus::NoReturn, ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Real)), &span()).unwrap();
        assert_eq!(joined, ReturnStatus::Incomplete(ReturnType::Returning(UnsizedType::Real)));
    }

    #[test]
    fn fold_block_stops_weakening_after_complete() {
        let statuses = vec![
            ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Int)),
            ReturnStatus::NoReturn,
        ];
        let folded = fold_block(statuses, &span()).unwrap();
        assert_eq!(folded, ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Int)));
    }

    #[test]
    fn unconditional_return_after_incomplete_if_strengthens_the_block() {
        let statuses = vec![
            ReturnStatus::Incomplete(ReturnType::Returning(UnsizedType::Int)),
            ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Real)),
        ];
        let folded = fold_block(statuses, &span()).unwrap();
        assert_eq!(folded, ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Real)));
    }

    #[test]
    fn complete_int_satisfies_declared_real() {
        assert!(satisfies(
            &ReturnStatus::Complete(ReturnType::Returning(UnsizedType::Int)),
            &ReturnType::Returning(UnsizedType::Real)
        ));
    }

    #[test]
    fn incomplete_never_satisfies_a_non_void_return() {
        assert!(!satisfies(
            &ReturnStatus::Incomplete(ReturnType::Returning(UnsizedType::Real)),
            &ReturnType::Returning(UnsizedType::Real)
        ));
    }
}
