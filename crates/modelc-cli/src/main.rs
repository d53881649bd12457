use std::{env, process::ExitCode, time::Instant};

use modelc_core::{
    analyze, optimize_program, to_mir, AdLevel, AnalyzerOptions, BlockOrigin, Catalog, Expr, ExprKind, LitKind, Located,
    Program, SizedType, Stmt, StmtKind, Truncation,
};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let model_name = if args.len() > 1 { &args[1] } else { "eight_schools" };

    let program = demo_program(model_name);
    let catalog = Catalog::builtin();
    let options = AnalyzerOptions::default();

    let start = Instant::now();
    let typed = match analyze(&program, model_name, &catalog, &options) {
        Ok(typed) => typed,
        Err(err) => {
            let elapsed = start.elapsed();
            eprintln!("analysis failed after {elapsed:?}:\n{}", err.render(""));
            return ExitCode::FAILURE;
        }
    };
    let elapsed = start.elapsed();
    eprintln!("analysis succeeded after {elapsed:?}");

    let mir = to_mir(typed);
    let optimized = if options.optimize { optimize_program(mir, &catalog) } else { mir };

    for (origin, block) in optimized.blocks_in_order() {
        let Some(stmts) = block else { continue };
        println!("{origin} {{");
        for stmt in stmts {
            println!("  {stmt}");
        }
        println!("}}");
    }

    ExitCode::SUCCESS
}

/// No parser lives in this crate (spec.md's Non-goals: "parsing ... are
/// out of scope"), so the CLI drives the pipeline over a small built-in
/// program rather than reading a source file from disk.
fn demo_program(model_name: &str) -> Program<Located> {
    let mut program: Program<Located> = Program::new(model_name);

    program.set_block(BlockOrigin::Data, vec![decl(AdLevel::DataOnly, "n", SizedType::SInt)]);

    program.set_block(
        BlockOrigin::Param,
        vec![
            decl(AdLevel::AutoDiffable, "mu", SizedType::SReal),
            decl(AdLevel::AutoDiffable, "tau", SizedType::SReal),
        ],
    );

    program.set_block(
        BlockOrigin::Model,
        vec![
            tilde(var("mu"), "normal", vec![real_lit("0.0"), real_lit("10.0")]),
            tilde(var("tau"), "normal", vec![real_lit("0.0"), real_lit("1.0")]),
        ],
    );

    program
}

fn loc() -> modelc_core::SourceSpan {
    modelc_core::SourceSpan::synthetic()
}

fn decl(ad: AdLevel, name: &str, ty: SizedType<Located>) -> Stmt<Located> {
    Stmt::new(
        StmtKind::Decl {
            ad,
            name: name.to_owned(),
            ty,
        },
        loc(),
    )
}

fn tilde(arg: Expr<Located>, distribution: &str, args: Vec<Expr<Located>>) -> Stmt<Located> {
    Stmt::new(
        StmtKind::Tilde {
            arg: Box::new(arg),
            distribution: distribution.to_owned(),
            args,
            truncation: Truncation::None,
        },
        loc(),
    )
}

fn var(name: &str) -> Expr<Located> {
    Expr::new(ExprKind::Var(name.to_owned()), loc())
}

fn real_lit(text: &str) -> Expr<Located> {
    Expr::new(ExprKind::Lit(LitKind::Real, text.to_owned()), loc())
}

