//! Statement checking (spec.md §4.5.6 "Statement checking").

use super::expr_typing::{lpdf_name, lpmf_name, type_expr};
use super::indexing::index_result_type;
use super::return_status::{fold_block, satisfies, ReturnStatus};
use super::Context;
use crate::catalog::ResolveError;
use crate::errors::{CompileError, ErrorKind};
use crate::ir::meta::{Located, StmtLoc, TypedLocated};
use crate::ir::{AssignOp, Expr, LValue, Stmt, StmtKind, Truncation};
use crate::symbol_table::SymbolInfo;
use crate::types::{same_type_mod_conv, AdLevel, ReturnType, SizedType, UnsizedType};

fn in_scope_err(name: &str, span: &crate::span::SourceSpan) -> CompileError {
    CompileError::new(ErrorKind::IdentifierNotInScope, span.clone(), format!("'{name}' is not declared"))
}

fn lvalue_type(
    ctx: &mut Context<'_>,
    lvalue: &LValue<Located>,
) -> Result<(LValue<TypedLocated>, UnsizedType, AdLevel, crate::types::BlockOrigin), CompileError> {
    let info = ctx
        .symbols
        .look(&lvalue.name)
        .cloned()
        .ok_or_else(|| in_scope_err(&lvalue.name, &lvalue.meta))?;
    if info.read_only {
        return Err(CompileError::new(
            ErrorKind::IdentifierInUse,
            lvalue.meta.clone(),
            format!("'{}' is read-only and cannot be assigned", lvalue.name),
        ));
    }
    let typed_indices = lvalue
        .indices
        .iter()
        .map(|i| super::expr_typing::type_index(ctx, i))
        .collect::<Result<Vec<_>, _>>()?;
    let ty = if typed_indices.is_empty() {
        info.ty.clone()
    } else {
        index_result_type(&info.ty, &typed_indices).ok_or_else(|| {
            CompileError::new(ErrorKind::InvalidIndex { base_type: info.ty.clone() }, lvalue.meta.clone(), "cannot index assignment target")
        })?
    };
    Ok((
        LValue {
            name: lvalue.name.clone(),
            indices: typed_indices,
            meta: lvalue.meta.clone(),
        },
        ty,
        info.ad,
        info.origin,
    ))
}

/// The block origin an already-typed expression evaluates under: a literal
/// is `Data`, a variable carries its symbol's recorded origin, and every
/// compound form is the LUB of its children (spec.md §4.5.4 "origin is LUB
/// of arg origins", GLOSSARY "LUB"). Used only by [`check_stmt`]'s
/// `Assign`/`Decl` origin checks — `ExprTypeLoc` itself does not carry an
/// origin slot, so this walks the typed tree against the symbol table
/// instead of reading it off the metadata.
fn expr_origin(ctx: &Context<'_>, e: &Expr<TypedLocated>) -> crate::types::BlockOrigin {
    use crate::ir::ExprKind;
    use crate::types::BlockOrigin;
    match &e.kind {
        ExprKind::Lit(..) => BlockOrigin::Data,
        ExprKind::Var(name) => ctx.symbols.look(name).map_or(BlockOrigin::MathLibrary, |info| info.origin),
        ExprKind::FunApp(_, _, args) | ExprKind::CondDistApp(_, _, args) => {
            args.iter().fold(BlockOrigin::Functions, |acc, a| acc.max(expr_origin(ctx, a)))
        }
        ExprKind::TernaryIf(c, t, f) => expr_origin(ctx, c).max(expr_origin(ctx, t)).max(expr_origin(ctx, f)),
        ExprKind::EAnd(a, b) | ExprKind::EOr(a, b) => expr_origin(ctx, a).max(expr_origin(ctx, b)),
        ExprKind::Indexed(base, idxs) => idxs.iter().fold(expr_origin(ctx, base), |acc, idx| acc.max(index_origin(ctx, idx))),
    }
}

fn index_origin(ctx: &Context<'_>, idx: &crate::ir::Index<TypedLocated>) -> crate::types::BlockOrigin {
    use crate::ir::Index;
    use crate::types::BlockOrigin;
    match idx {
        Index::All => BlockOrigin::Functions,
        Index::Single(e) | Index::Multi(e) | Index::Upfrom(e) | Index::Downfrom(e) => expr_origin(ctx, e),
        Index::Between(lo, hi) => expr_origin(ctx, lo).max(expr_origin(ctx, hi)),
    }
}

/// spec.md §4.5.6. Types and checks one statement, returning the typed
/// node plus its contribution to the enclosing block's return-status fold
/// (spec.md §4.5.7).
pub fn check_stmt(ctx: &mut Context<'_>, s: &Stmt<Located>) -> Result<Stmt<TypedLocated>, CompileError> {
    let (stmt, _status) = check_stmt_with_status(ctx, s)?;
    Ok(stmt)
}

fn check_stmt_with_status(ctx: &mut Context<'_>, s: &Stmt<Located>) -> Result<(Stmt<TypedLocated>, ReturnStatus), CompileError> {
    let span = s.meta.clone();
    let meta = StmtLoc { span: span.clone() };

    Ok(match &s.kind {
        StmtKind::Assign(lvalue, op, rhs) => {
            let (lvalue, target_ty, target_ad, target_origin) = lvalue_type(ctx, lvalue)?;
            let _ = target_ad;
            if ctx.symbols.is_global(&lvalue.name) && target_origin != ctx.current_block {
                return Err(CompileError::new(
                    ErrorKind::AssignOutsideDeclaringBlock { name: lvalue.name.clone() },
                    span,
                    format!("'{}' was declared in block {target_origin} and cannot be assigned in {}", lvalue.name, ctx.current_block),
                ));
            }
            let rhs = type_expr(ctx, rhs)?;
            if !same_type_mod_conv(op.catalog_name(), &target_ty, &rhs.meta.ty) {
                return Err(CompileError::new(
                    ErrorKind::IllTypedBinOp {
                        op: op.catalog_name().to_owned(),
                        lhs: target_ty,
                        rhs: rhs.meta.ty.clone(),
                    },
                    span,
                    "right-hand side is not assignable to the left-hand side",
                ));
            }
            // Local-only origin elevation (spec.md §4.3: `unsafe_replace` "elevates
            // a local's origin upward according to its assigned RHS"); globals keep
            // the fixed origin the declaring block gave them.
            if !ctx.symbols.is_global(&lvalue.name) {
                let rhs_origin = expr_origin(ctx, &rhs);
                if rhs_origin > target_origin {
                    ctx.symbols.unsafe_replace(&lvalue.name, rhs_origin);
                }
            }
            ctx.symbols.set_assigned(&lvalue.name, true);
            (Stmt::new(StmtKind::Assign(lvalue, *op, Box::new(rhs)), meta), ReturnStatus::NoReturn)
        }
        StmtKind::TargetPlusEq(e) => {
            require_model_or_lp(ctx, &span)?;
            let e = type_expr(ctx, e)?;
            if !e.meta.ty.is_int_or_real() && !e.meta.ty.is_container() {
                return Err(CompileError::new(
                    ErrorKind::IllTypedNotAFunction { name: "target".to_owned() },
                    span,
                    "target += requires an int/real or container of int/real",
                ));
            }
            (Stmt::new(StmtKind::TargetPlusEq(Box::new(e)), meta), ReturnStatus::NoReturn)
        }
        StmtKind::NRFunApp(kind, name, args) => {
            if name.ends_with("_rng") && !ctx.in_rng_context {
                return Err(CompileError::new(
                    ErrorKind::FnRng,
                    span,
                    format!("'{name}' may only be called from transformed data, generated quantities, or an _rng function"),
                ));
            }
            if name.ends_with("_lp") && !ctx.in_model_or_lp_context {
                return Err(CompileError::new(
                    ErrorKind::FnTargetPlusEquals,
                    span,
                    format!("'{name}' may only be called from the model block or an _lp function"),
                ));
            }
            let typed_args: Vec<Expr<TypedLocated>> = args.iter().map(|a| type_expr(ctx, a)).collect::<Result<_, _>>()?;
            let actuals: Vec<(AdLevel, UnsizedType)> = typed_args.iter().map(|a| (a.meta.ad, a.meta.ty.clone())).collect();
            match ctx.catalog.resolve(name, &actuals) {
                Ok(ReturnType::Void) => {}
                Ok(ReturnType::Returning(_)) => {}
                Err(ResolveError::UnknownName) => {
                    return Err(CompileError::new(
                        ErrorKind::IllTypedNoSuchFunction { name: name.clone() },
                        span,
                        format!("no function named '{name}'"),
                    ))
                }
                Err(ResolveError::NoMatchingOverload) => {
                    return Err(CompileError::new(
                        ErrorKind::IllTypedFunctionApp {
                            name: name.clone(),
                            arg_types: actuals.into_iter().map(|(_, t)| t).collect(),
                        },
                        span,
                        format!("no overload of '{name}' matches the supplied argument types"),
                    ))
                }
            }
            let status = if name == "reject" { ReturnStatus::AnyReturn } else { ReturnStatus::NoReturn };
            (Stmt::new(StmtKind::NRFunApp(*kind, name.clone(), typed_args), meta), status)
        }
        StmtKind::Reject(args) => {
            let typed_args: Vec<Expr<TypedLocated>> = args.iter().map(|a| type_expr(ctx, a)).collect::<Result<_, _>>()?;
            (Stmt::new(StmtKind::Reject(typed_args), meta), ReturnStatus::AnyReturn)
        }
        StmtKind::Tilde { arg, distribution, args, truncation } => {
            require_model_or_lp(ctx, &span)?;
            if distribution.ends_with("_cdf") || distribution.ends_with("_ccdf") {
                return Err(CompileError::new(
                    ErrorKind::IllTypedNoSuchFunction { name: distribution.clone() },
                    span,
                    format!("'{distribution}' is a cdf/ccdf and cannot be used as a sampling-statement distribution"),
                ));
            }
            let arg = type_expr(ctx, arg)?;
            let typed_args: Vec<Expr<TypedLocated>> = args.iter().map(|a| type_expr(ctx, a)).collect::<Result<_, _>>()?;
            let mut actuals: Vec<(AdLevel, UnsizedType)> = vec![(arg.meta.ad, arg.meta.ty.clone())];
            actuals.extend(typed_args.iter().map(|a| (a.meta.ad, a.meta.ty.clone())));

            let has_density = ctx.catalog.resolve(&lpdf_name(distribution), &actuals).is_ok()
                || ctx.catalog.resolve(&lpmf_name(distribution), &actuals).is_ok()
                || ctx.catalog.resolve(&format!("{distribution}_log"), &actuals).is_ok();
            if !has_density {
                return Err(CompileError::new(
                    ErrorKind::IllTypedNoSuchFunction {
                        name: lpdf_name(distribution),
                    },
                    span,
                    format!("no sampling statement overload for '{distribution}'"),
                ));
            }
            // spec.md §4.5.6: a truncated `~` additionally requires matching
            // `_lcdf`/`_lccdf` overloads for the same actuals.
            if !matches!(truncation, Truncation::None) {
                let lcdf_name = format!("{distribution}_lcdf");
                let lccdf_name = format!("{distribution}_lccdf");
                let has_cdf =
                    ctx.catalog.resolve(&lcdf_name, &actuals).is_ok() && ctx.catalog.resolve(&lccdf_name, &actuals).is_ok();
                if !has_cdf {
                    return Err(CompileError::new(
                        ErrorKind::IllTypedNoSuchFunction { name: lcdf_name },
                        span,
                        format!("'{distribution}' has no cdf/ccdf overload for a truncated sampling statement"),
                    ));
                }
            }
            let truncation = type_truncation(ctx, truncation)?;
            (
                Stmt::new(
                    StmtKind::Tilde {
                        arg: Box::new(arg),
                        distribution: distribution.clone(),
                        args: typed_args,
                        truncation,
                    },
                    meta,
                ),
                ReturnStatus::NoReturn,
            )
        }
        StmtKind::Break => {
            if !ctx.in_loop {
                return Err(CompileError::new(ErrorKind::IllegalLoopControl { keyword: "break" }, span, "break outside a loop"));
            }
            (Stmt::new(StmtKind::Break, meta), ReturnStatus::NoReturn)
        }
        StmtKind::Continue => {
            if !ctx.in_loop {
                return Err(CompileError::new(
                    ErrorKind::IllegalLoopControl { keyword: "continue" },
                    span,
                    "continue outside a loop",
                ));
            }
            (Stmt::new(StmtKind::Continue, meta), ReturnStatus::NoReturn)
        }
        StmtKind::Return(opt) => {
            let Some(expected) = ctx.current_function_return.clone() else {
                return Err(CompileError::new(
                    ErrorKind::FatalInternal { msg: "return outside function".to_owned() },
                    span,
                    "return statement outside a function body",
                ));
            };
            let (typed_opt, status) = match opt {
                None => {
                    if expected != ReturnType::Void {
                        return Err(CompileError::new(
                            ErrorKind::IllTypedIfReturnTypes { rt1: expected.clone(), rt2: ReturnType::Void },
                            span,
                            "bare return is only valid in a void function",
                        ));
                    }
                    (None, ReturnStatus::Complete(ReturnType::Void))
                }
                Some(e) => {
                    let e = type_expr(ctx, e)?;
                    let rt = ReturnType::Returning(e.meta.ty.clone());
                    if !crate::types::return_type_assignable(&expected, &rt) {
                        return Err(CompileError::new(
                            ErrorKind::IllTypedIfReturnTypes { rt1: expected.clone(), rt2: rt.clone() },
                            span,
                            "return type not assignable to the function's declared return type",
                        ));
                    }
                    (Some(Box::new(e)), ReturnStatus::Complete(rt))
                }
            };
            (Stmt::new(StmtKind::Return(typed_opt), meta), status)
        }
        StmtKind::Skip => (Stmt::new(StmtKind::Skip, meta), ReturnStatus::NoReturn),
        StmtKind::IfElse(c, then, opt_else) => {
            let c = type_expr(ctx, c)?;
            if !c.meta.ty.is_int_or_real() {
                return Err(CompileError::new(
                    ErrorKind::IllTypedTernaryIf {
                        t1: c.meta.ty.clone(),
                        t2: UnsizedType::Int,
                        t3: UnsizedType::Int,
                    },
                    span.clone(),
                    "if condition must be int or real",
                ));
            }
            let (then_typed, then_status) = check_stmt_with_status(ctx, then)?;
            let (else_typed, status) = match opt_else {
                None => (None, super::return_status::join(ReturnStatus::NoReturn, then_status, &span)?),
                Some(e) => {
                    let (typed, else_status) = check_stmt_with_status(ctx, e)?;
                    (Some(Box::new(typed)), super::return_status::join(then_status, else_status, &span)?)
                }
            };
            (
                Stmt::new(StmtKind::IfElse(Box::new(c), Box::new(then_typed), else_typed), meta),
                status,
            )
        }
        StmtKind::While(c, body) => {
            let c = type_expr(ctx, c)?;
            if !c.meta.ty.is_int_or_real() {
                return Err(CompileError::new(
                    ErrorKind::IllTypedBinOp {
                        op: "while".to_owned(),
                        lhs: c.meta.ty.clone(),
                        rhs: c.meta.ty.clone(),
                    },
                    span,
                    "while condition must be int or real",
                ));
            }
            let was_loop = ctx.in_loop;
            ctx.in_loop = true;
            let (body, _) = check_stmt_with_status(ctx, body)?;
            ctx.in_loop = was_loop;
            (Stmt::new(StmtKind::While(Box::new(c), Box::new(body)), meta), ReturnStatus::NoReturn)
        }
        StmtKind::For { loopvar, lower, upper, body } => {
            let lower = type_expr(ctx, lower)?;
            let upper = type_expr(ctx, upper)?;
            if lower.meta.ty != UnsizedType::Int || upper.meta.ty != UnsizedType::Int {
                return Err(CompileError::new(
                    ErrorKind::IllTypedBinOp {
                        op: "for".to_owned(),
                        lhs: lower.meta.ty.clone(),
                        rhs: upper.meta.ty.clone(),
                    },
                    span,
                    "for loop bounds must be int",
                ));
            }
            ctx.symbols.begin_scope();
            ctx.symbols.enter(
                loopvar.clone(),
                SymbolInfo {
                    ty: UnsizedType::Int,
                    ad: AdLevel::DataOnly,
                    origin: ctx.current_block,
                    read_only: true,
                    assigned: true,
                },
            );
            let was_loop = ctx.in_loop;
            ctx.in_loop = true;
            let (body, _) = check_stmt_with_status(ctx, body)?;
            ctx.in_loop = was_loop;
            ctx.symbols.end_scope();
            (
                Stmt::new(
                    StmtKind::For {
                        loopvar: loopvar.clone(),
                        lower: Box::new(lower),
                        upper: Box::new(upper),
                        body: Box::new(body),
                    },
                    meta,
                ),
                ReturnStatus::NoReturn,
            )
        }
        StmtKind::Block(stmts) => {
            ctx.symbols.begin_scope();
            let mut typed = Vec::with_capacity(stmts.len());
            let mut statuses = Vec::with_capacity(stmts.len());
            for stmt in stmts {
                let (t, st) = check_stmt_with_status(ctx, stmt)?;
                typed.push(t);
                statuses.push(st);
            }
            ctx.symbols.end_scope();
            let status = fold_block(statuses, &span)?;
            (Stmt::new(StmtKind::Block(typed), meta), status)
        }
        StmtKind::SList(stmts) => {
            let mut typed = Vec::with_capacity(stmts.len());
            let mut statuses = Vec::with_capacity(stmts.len());
            for stmt in stmts {
                let (t, st) = check_stmt_with_status(ctx, stmt)?;
                typed.push(t);
                statuses.push(st);
            }
            let status = fold_block(statuses, &span)?;
            (Stmt::new(StmtKind::SList(typed), meta), status)
        }
        StmtKind::Decl { ad, name, ty } => {
            super::identifiers::validate_identifier(name, &ctx.model_name).map_err(|e| identifier_error(e, &span, name))?;
            super::identifiers::check_fresh(name, false, &ctx.symbols, ctx.catalog).map_err(|e| identifier_error(e, &span, name))?;

            for size_expr in ty.size_exprs() {
                let typed_size = type_expr(ctx, size_expr)?;
                if typed_size.meta.ty != UnsizedType::Int {
                    return Err(CompileError::new(
                        ErrorKind::InvalidIndex { base_type: typed_size.meta.ty.clone() },
                        span.clone(),
                        "array/container bounds must be integer",
                    ));
                }
                let size_origin = expr_origin(ctx, &typed_size);
                if size_origin > crate::types::BlockOrigin::TData {
                    return Err(CompileError::new(
                        ErrorKind::IllegalSizeOrigin {
                            max: crate::types::BlockOrigin::TData,
                            found: size_origin,
                        },
                        span.clone(),
                        "variable sizes must evaluate under data or transformed data",
                    ));
                }
            }

            let typed_ty = type_sized(ctx, ty)?;
            ctx.symbols.enter(
                name.clone(),
                SymbolInfo {
                    ty: typed_ty.to_unsized(),
                    ad: *ad,
                    origin: ctx.current_block,
                    read_only: false,
                    assigned: false,
                },
            );
            ctx.declared_in_block.push(name.clone());
            (
                Stmt::new(
                    StmtKind::Decl {
                        ad: *ad,
                        name: name.clone(),
                        ty: typed_ty,
                    },
                    meta,
                ),
                ReturnStatus::NoReturn,
            )
        }
        StmtKind::FunDef { returns, name, params, body } => {
            let fun_ty = UnsizedType::Fun(crate::types::FunType {
                params: params.iter().map(|p| (p.ad, p.ty.clone())).collect(),
                returns: Box::new(returns.clone()),
            });
            // spec.md §4.5.6 "FunDef": the first declaration records the
            // signature; a later definition must match it exactly.
            match ctx.symbols.look(name) {
                Some(existing) if existing.ty == fun_ty => {}
                Some(_) => {
                    return Err(CompileError::new(
                        ErrorKind::IdentifierInUse,
                        span.clone(),
                        format!("'{name}' is already declared with a different signature"),
                    ));
                }
                None => {
                    super::identifiers::validate_identifier(name, &ctx.model_name)
                        .map_err(|e| identifier_error(e, &span, name))?;
                    super::identifiers::check_fresh(name, false, &ctx.symbols, ctx.catalog)
                        .map_err(|e| identifier_error(e, &span, name))?;
                }
            }
            ctx.symbols.enter(
                name.clone(),
                SymbolInfo {
                    ty: fun_ty,
                    ad: AdLevel::DataOnly,
                    origin: crate::types::BlockOrigin::Functions,
                    read_only: true,
                    assigned: true,
                },
            );
            ctx.symbols.begin_scope();
            for p in params {
                ctx.symbols.enter(
                    p.name.clone(),
                    SymbolInfo {
                        ty: p.ty.clone(),
                        ad: p.ad,
                        origin: crate::types::BlockOrigin::Functions,
                        read_only: true,
                        assigned: true,
                    },
                );
            }
            let was_model_or_lp = ctx.in_model_or_lp_context;
            let was_rng = ctx.in_rng_context;
            if name.ends_with("_lp") {
                ctx.in_model_or_lp_context = true;
            }
            if name.ends_with("_rng") {
                ctx.in_rng_context = true;
            }
            let prior_return = ctx.current_function_return.replace(returns.clone());

            let (body_typed, status) = check_stmt_with_status(ctx, body)?;
            if !satisfies(&status, returns) {
                ctx.symbols.end_scope();
                ctx.current_function_return = prior_return;
                ctx.in_model_or_lp_context = was_model_or_lp;
                ctx.in_rng_context = was_rng;
                return Err(CompileError::new(
                    ErrorKind::IllTypedIfReturnTypes {
                        rt1: returns.clone(),
                        rt2: ReturnType::Void,
                    },
                    span,
                    format!("not every path through '{name}' returns a value"),
                ));
            }

            ctx.symbols.end_scope();
            ctx.current_function_return = prior_return;
            ctx.in_model_or_lp_context = was_model_or_lp;
            ctx.in_rng_context = was_rng;

            (
                Stmt::new(
                    StmtKind::FunDef {
                        returns: returns.clone(),
                        name: name.clone(),
                        params: params.clone(),
                        body: Box::new(body_typed),
                    },
                    meta,
                ),
                ReturnStatus::NoReturn,
            )
        }
    })
}

fn identifier_error(e: super::identifiers::IdentifierError, span: &crate::span::SourceSpan, name: &str) -> CompileError {
    use super::identifiers::IdentifierError as IE;
    let kind = match e {
        IE::IsKeyword => ErrorKind::IdentifierIsKeyword,
        IE::IsModelName => ErrorKind::IdentifierIsModelName,
        IE::IsStanMathName => ErrorKind::IdentifierIsStanMathName,
        IE::InUse => ErrorKind::IdentifierInUse,
    };
    CompileError::new(kind, span.clone(), format!("'{name}' is not a valid identifier here"))
}

fn require_model_or_lp(ctx: &Context<'_>, span: &crate::span::SourceSpan) -> Result<(), CompileError> {
    let gq_allowed = ctx.options.allow_sampling_in_generated_quantities && ctx.current_block == crate::types::BlockOrigin::GQuant;
    if ctx.in_model_or_lp_context || gq_allowed {
        Ok(())
    } else {
        Err(CompileError::new(
            ErrorKind::FnTargetPlusEquals,
            span.clone(),
            "sampling statements and target += are only permitted in model or _lp functions",
        ))
    }
}

fn type_truncation(ctx: &mut Context<'_>, t: &Truncation<Located>) -> Result<Truncation<TypedLocated>, CompileError> {
    Ok(match t {
        Truncation::None => Truncation::None,
        Truncation::Upper(e) => Truncation::Upper(Box::new(type_expr(ctx, e)?)),
        Truncation::Lower(e) => Truncation::Lower(Box::new(type_expr(ctx, e)?)),
        Truncation::Both(lo, hi) => Truncation::Both(Box::new(type_expr(ctx, lo)?), Box::new(type_expr(ctx, hi)?)),
    })
}

fn type_sized(ctx: &mut Context<'_>, ty: &SizedType<Located>) -> Result<SizedType<TypedLocated>, CompileError> {
    Ok(match ty {
        SizedType::SInt => SizedType::SInt,
        SizedType::SReal => SizedType::SReal,
        SizedType::SVector(e) => SizedType::SVector(Box::new(type_expr(ctx, e)?)),
        SizedType::SRowVector(e) => SizedType::SRowVector(Box::new(type_expr(ctx, e)?)),
        SizedType::SMatrix(rows, cols) => SizedType::SMatrix(Box::new(type_expr(ctx, rows)?), Box::new(type_expr(ctx, cols)?)),
        SizedType::SArray(inner, len) => SizedType::SArray(Box::new(type_sized(ctx, inner)?), Box::new(type_expr(ctx, len)?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::context::AnalyzerOptions;
    use crate::ir::{ExprKind, LitKind};
    use crate::span::CodeLoc;
    use crate::types::BlockOrigin;

    fn loc() -> crate::span::SourceSpan {
        crate::span::SourceSpan::new("m.stan", CodeLoc::new(0, 0), CodeLoc::new(0, 1))
    }

    fn int_lit(n: &str) -> Expr<Located> {
        Expr::new(ExprKind::Lit(LitKind::Int, n.to_owned()), loc())
    }

    fn ctx(catalog: &Catalog, options: &AnalyzerOptions) -> Context<'_> {
        Context::new(catalog, options, "m")
    }

    #[test]
    fn break_outside_a_loop_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let err = check_stmt(&mut c, &Stmt::new(StmtKind::Break, loc())).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IllegalLoopControl { keyword: "break" }));
    }

    #[test]
    fn break_inside_a_while_loop_is_accepted() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let loop_stmt = Stmt::new(
            StmtKind::While(Box::new(int_lit("1")), Box::new(Stmt::new(StmtKind::Break, loc()))),
            loc(),
        );
        assert!(check_stmt(&mut c, &loop_stmt).is_ok());
    }

    #[test]
    fn assigning_to_an_undeclared_name_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let stmt = Stmt::new(
            StmtKind::Assign(
                LValue {
                    name: "missing".to_owned(),
                    indices: vec![],
                    meta: loc(),
                },
                AssignOp::Assign,
                Box::new(int_lit("1")),
            ),
            loc(),
        );
        let err = check_stmt(&mut c, &stmt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IdentifierNotInScope);
    }

    #[test]
    fn for_loop_var_is_read_only_inside_the_body() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let assign_loopvar = Stmt::new(
            StmtKind::Assign(
                LValue {
                    name: "i".to_owned(),
                    indices: vec![],
                    meta: loc(),
                },
                AssignOp::Assign,
                Box::new(int_lit("0")),
            ),
            loc(),
        );
        let for_stmt = Stmt::new(
            StmtKind::For {
                loopvar: "i".to_owned(),
                lower: Box::new(int_lit("1")),
                upper: Box::new(int_lit("10")),
                body: Box::new(assign_loopvar),
            },
            loc(),
        );
        let err = check_stmt(&mut c, &for_stmt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IdentifierInUse);
    }

    #[test]
    fn rng_call_outside_rng_context_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let stmt = Stmt::new(StmtKind::NRFunApp(crate::ir::FunKind::StanLib, "normal_rng".to_owned(), vec![]), loc());
        let err = check_stmt(&mut c, &stmt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FnRng);
    }

    #[test]
    fn rng_call_inside_generated_quantities_is_accepted_by_the_gate() {
        // The gate itself only checks `in_rng_context`; unknown-name resolution
        // still fails, so this asserts the gate is bypassed, not full success.
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        c.in_rng_context = true;
        let stmt = Stmt::new(StmtKind::NRFunApp(crate::ir::FunKind::StanLib, "normal_rng".to_owned(), vec![]), loc());
        let err = check_stmt(&mut c, &stmt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllTypedNoSuchFunction { name: "normal_rng".to_owned() });
    }

    #[test]
    fn local_origin_elevates_when_rhs_outranks_declaration() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        c.symbols.enter(
            "local_x",
            SymbolInfo::new(UnsizedType::Real, AdLevel::AutoDiffable, BlockOrigin::Functions),
        );
        c.symbols.enter(
            "theta",
            SymbolInfo {
                ty: UnsizedType::Real,
                ad: AdLevel::AutoDiffable,
                origin: BlockOrigin::Param,
                read_only: false,
                assigned: true,
            },
        );
        let stmt = Stmt::new(
            StmtKind::Assign(
                LValue {
                    name: "local_x".to_owned(),
                    indices: vec![],
                    meta: loc(),
                },
                AssignOp::Assign,
                Box::new(Expr::new(ExprKind::Var("theta".to_owned()), loc())),
            ),
            loc(),
        );
        check_stmt(&mut c, &stmt).unwrap();
        assert_eq!(c.symbols.look("local_x").unwrap().origin, BlockOrigin::Param);
    }

    #[test]
    fn global_assigned_outside_its_declaring_block_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        c.symbols.enter(
            "n",
            SymbolInfo::new(UnsizedType::Int, AdLevel::DataOnly, BlockOrigin::Data),
        );
        c.current_block = BlockOrigin::TData;
        let stmt = Stmt::new(
            StmtKind::Assign(
                LValue {
                    name: "n".to_owned(),
                    indices: vec![],
                    meta: loc(),
                },
                AssignOp::Assign,
                Box::new(int_lit("1")),
            ),
            loc(),
        );
        let err = check_stmt(&mut c, &stmt).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AssignOutsideDeclaringBlock { name: "n".to_owned() });
    }

    #[test]
    fn function_missing_a_return_on_every_path_is_rejected() {
        let catalog = Catalog::builtin();
        let options = AnalyzerOptions::default();
        let mut c = ctx(&catalog, &options);
        let fundef = Stmt::new(
            StmtKind::FunDef {
                returns: ReturnType::Returning(UnsizedType::Real),
                name: "half".to_owned(),
                params: vec![],
                body: Box::new(Stmt::new(StmtKind::Block(vec![Stmt::new(StmtKind::Skip, loc())]), loc())),
            },
            loc(),
        );
        let err = check_stmt(&mut c, &fundef).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IllTypedIfReturnTypes { .. }));
    }
}
