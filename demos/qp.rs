#![allow(non_snake_case)]
use cosmo::engine::{julia, AnyEngine};
use cosmo::{ConeSpec, CscMatrix, Model, SettingsBuilder};

// QP Example
//
// run with `cargo run --example qp` to solve with COSMO.jl, or
// `cargo run --example qp -- clarabel` for the in-process engine.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine_name = std::env::args().nth(1).unwrap_or_else(|| "julia".to_string());

    let P = CscMatrix::from_rows(&[[4., 1.], [1., 2.]]);
    let q = vec![1., 1.];

    // A = [A0; -A0] with lower bounds l = [1, 0, 0] and upper bounds u = [1, 0.7, 0.7]
    let A = CscMatrix::from_rows(&[
        [1., 1.],
        [1., 0.],
        [0., 1.],
        [-1., -1.],
        [-1., 0.],
        [0., -1.],
    ]);
    let b = vec![1., 0.7, 0.7, -1., 0., 0.];
    let cone = ConeSpec::from_pairs([("l", 6)])?;

    let mut settings = SettingsBuilder::default();
    settings.verbose(true);
    if engine_name == "julia" {
        settings.kkt_solver("CholmodKKTSolver");
    }

    let mut model = Model::with_engine(AnyEngine::from_name(&engine_name)?);
    model.setup(&P, &q, &A, &b, &cone, settings.build()?)?;
    model.warm_start(&[1., 0.], None, None)?;
    model.optimize()?;

    println!("Solved with obj: {}", model.get_objective_value()?);
    println!("Solution = {:?}", model.get_x()?);

    drop(model);
    julia::shutdown()?;
    Ok(())
}
