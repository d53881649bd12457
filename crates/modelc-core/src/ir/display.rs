//! Structural `Display` for the no-metadata IR, independent of any
//! decoration (spec.md §9 design note: the IR is "read the same way
//! regardless of which decoration currently dresses it").
//!
//! This is not a source unparser: it renders the pattern functor shape
//! directly rather than reconstructing the original surface syntax (no
//! precedence-driven parenthesization, no recovery of `~`/`target +=`
//! surface sugar beyond the shape the IR already carries).

use std::fmt;

use super::expr::{Expr, ExprKind, Index, LitKind};
use super::meta::Decoration;
use super::stmt::{AssignOp, Stmt, StmtKind, Truncation};
use crate::types::SizedType;

impl<D: Decoration> fmt::Display for SizedType<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SInt => write!(f, "int"),
            Self::SReal => write!(f, "real"),
            Self::SVector(n) => write!(f, "vector[{n}]"),
            Self::SRowVector(n) => write!(f, "row_vector[{n}]"),
            Self::SMatrix(rows, cols) => write!(f, "matrix[{rows}, {cols}]"),
            Self::SArray(inner, len) => write!(f, "array[{len}] {inner}"),
        }
    }
}

/// Infix symbol for the handful of operator names the catalog seeds
/// under a `Plus__`-style internal name (spec.md §4.1 "operators are
/// resolved through the same catalog as named functions").
fn infix_symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "Plus__" => "+",
        "Minus__" => "-",
        "Times__" => "*",
        "Divide__" => "/",
        "Modulo__" => "%",
        "Equals__" => "==",
        "NEquals__" => "!=",
        "Less__" => "<",
        "Leq__" => "<=",
        "Greater__" => ">",
        "Geq__" => ">=",
        _ => return None,
    })
}

fn prefix_symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "PPlus__" => "+",
        "PMinus__" => "-",
        "PNot__" => "!",
        _ => return None,
    })
}

impl<D: Decoration> fmt::Display for Index<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, ":"),
            Self::Single(e) => write!(f, "{e}"),
            Self::Multi(e) => write!(f, "{e}"),
            Self::Upfrom(e) => write!(f, "{e}:"),
            Self::Downfrom(e) => write!(f, ":{e}"),
            Self::Between(lo, hi) => write!(f, "{lo}:{hi}"),
        }
    }
}

fn write_args<D: Decoration>(f: &mut fmt::Formatter<'_>, args: &[Expr<D>]) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

impl<D: Decoration> fmt::Display for ExprKind<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "{name}"),
            Self::Lit(LitKind::Str, text) => write!(f, "{text:?}"),
            Self::Lit(_, text) => write!(f, "{text}"),
            Self::FunApp(_, name, args) if args.len() == 1 => {
                if let Some(sym) = prefix_symbol(name) {
                    write!(f, "{sym}{}", args[0])
                } else {
                    write!(f, "{name}(")?;
                    write_args(f, args)?;
                    write!(f, ")")
                }
            }
            Self::FunApp(_, name, args) if args.len() == 2 => {
                if let Some(sym) = infix_symbol(name) {
                    write!(f, "({} {sym} {})", args[0], args[1])
                } else {
                    write!(f, "{name}(")?;
                    write_args(f, args)?;
                    write!(f, ")")
                }
            }
            Self::FunApp(_, name, args) => {
                write!(f, "{name}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Self::CondDistApp(_, name, args) => {
                write!(f, "{name}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Self::TernaryIf(c, t, e) => write!(f, "({c} ? {t} : {e})"),
            Self::EAnd(a, b) => write!(f, "({a} && {b})"),
            Self::EOr(a, b) => write!(f, "({a} || {b})"),
            Self::Indexed(base, idxs) => {
                write!(f, "{base}[")?;
                for (i, idx) in idxs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{idx}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl<D: Decoration> fmt::Display for Expr<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl AssignOp {
    const fn surface_symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::EltMulAssign => ".*=",
            Self::EltDivAssign => "./=",
        }
    }
}

impl<D: Decoration> fmt::Display for Truncation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Upper(e) => write!(f, " T[, {e}]"),
            Self::Lower(e) => write!(f, " T[{e}, ]"),
            Self::Both(lo, hi) => write!(f, " T[{lo}, {hi}]"),
        }
    }
}

impl<D: Decoration> fmt::Display for StmtKind<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign(lvalue, op, rhs) => {
                write!(f, "{}", lvalue.name)?;
                if !lvalue.indices.is_empty() {
                    write!(f, "[")?;
                    for (i, idx) in lvalue.indices.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{idx}")?;
                    }
                    write!(f, "]")?;
                }
                write!(f, " {} {rhs};", op.surface_symbol())
            }
            Self::TargetPlusEq(e) => write!(f, "target += {e};"),
            Self::NRFunApp(_, name, args) => {
                write!(f, "{name}(")?;
                write_args(f, args)?;
                write!(f, ");")
            }
            Self::Tilde {
                arg,
                distribution,
                args,
                truncation,
            } => {
                write!(f, "{arg} ~ {distribution}(")?;
                write_args(f, args)?;
                write!(f, "){truncation};")
            }
            Self::Break => write!(f, "break;"),
            Self::Continue => write!(f, "continue;"),
            Self::Return(Some(e)) => write!(f, "return {e};"),
            Self::Return(None) => write!(f, "return;"),
            Self::Skip => write!(f, ";"),
            Self::Reject(args) => {
                write!(f, "reject(")?;
                write_args(f, args)?;
                write!(f, ");")
            }
            Self::IfElse(c, then, opt_else) => {
                write!(f, "if ({c}) {then}")?;
                if let Some(e) = opt_else {
                    write!(f, " else {e}")?;
                }
                Ok(())
            }
            Self::While(c, body) => write!(f, "while ({c}) {body}"),
            Self::For { loopvar, lower, upper, body } => {
                write!(f, "for ({loopvar} in {lower}:{upper}) {body}")
            }
            Self::Block(stmts) => {
                writeln!(f, "{{")?;
                for s in stmts {
                    writeln!(f, "  {s}")?;
                }
                write!(f, "}}")
            }
            Self::SList(stmts) => {
                for (i, s) in stmts.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{s}")?;
                }
                Ok(())
            }
            Self::Decl { ad, name, ty } => write!(f, "{ad} {name}; // {ty}"),
            Self::FunDef { returns, name, params, body } => {
                write!(f, "{returns} {name}(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {} {}", p.ad, p.ty, p.name)?;
                }
                write!(f, ") {body}")
            }
        }
    }
}

impl<D: Decoration> fmt::Display for Stmt<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::meta::NoMeta;
    use crate::ir::{FunKind, LValue};

    fn lit(n: &str) -> Box<Expr<NoMeta>> {
        Box::new(Expr::new(ExprKind::Lit(LitKind::Int, n.to_owned()), ()))
    }

    #[test]
    fn binary_operator_renders_infix() {
        let e: Expr<NoMeta> = Expr::new(ExprKind::FunApp(FunKind::StanLib, "Plus__".to_owned(), vec![*lit("1"), *lit("2")]), ());
        assert_eq!(e.to_string(), "(1 + 2)");
    }

    #[test]
    fn ordinary_call_renders_as_name_and_args() {
        let e: Expr<NoMeta> = Expr::new(ExprKind::FunApp(FunKind::StanLib, "sqrt".to_owned(), vec![*lit("4")]), ());
        assert_eq!(e.to_string(), "sqrt(4)");
    }

    #[test]
    fn indexed_expression_renders_brackets() {
        let base: Expr<NoMeta> = Expr::new(ExprKind::Var("x".to_owned()), ());
        let e: Expr<NoMeta> = Expr::new(ExprKind::Indexed(Box::new(base), vec![Index::Single(lit("1"))]), ());
        assert_eq!(e.to_string(), "x[1]");
    }

    #[test]
    fn assign_statement_renders_with_surface_symbol() {
        let s: Stmt<NoMeta> = Stmt::new(
            StmtKind::Assign(
                LValue {
                    name: "x".to_owned(),
                    indices: vec![],
                    meta: (),
                },
                AssignOp::AddAssign,
                lit("1"),
            ),
            (),
        );
        assert_eq!(s.to_string(), "x += 1;");
    }
}
