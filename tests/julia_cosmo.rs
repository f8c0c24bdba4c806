#![allow(non_snake_case)]

// These tests need a Julia installation with COSMO and JSON available,
// located through COSMO_JULIA / COSMO_JULIA_PROJECT.  Run them with
// `cargo test -- --ignored`.

use cosmo::engine::julia;
use cosmo::{ConeSpec, CscMatrix, Model, ModelError, SettingsBuilder, SolverStatus};

fn basic_qp_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, ConeSpec) {
    let P = CscMatrix::from_rows(&[[4., 1.], [1., 2.]]);
    let q = vec![1., 1.];
    let A = CscMatrix::from_rows(&[
        [1., 1.],
        [1., 0.],
        [0., 1.],
        [-1., -1.],
        [-1., 0.],
        [0., -1.],
    ]);
    let b = vec![1., 0.7, 0.7, -1., 0., 0.];
    let cone = ConeSpec::from_pairs([("l", 6)]).unwrap();
    (P, q, A, b, cone)
}

#[test]
#[ignore]
fn test_cosmo_qp() {
    let (P, q, A, b, cone) = basic_qp_data();
    let settings = SettingsBuilder::default().verbose(true).build().unwrap();

    let mut model = Model::new();
    model.setup(&P, &q, &A, &b, &cone, settings).unwrap();
    model.warm_start(&[1., 0.], None, None).unwrap();
    model.optimize().unwrap();

    assert_eq!(*model.get_status().unwrap(), SolverStatus::Solved);
    let x = model.get_x().unwrap();
    assert!((x[0] - 0.3).abs() <= 1e-4);
    assert!((x[1] - 0.7).abs() <= 1e-4);
    assert!((model.get_objective_value().unwrap() - 1.88).abs() <= 1e-4);
    assert!(model.get_iterations().unwrap() > 0);
    assert!(julia::is_running());
}

#[test]
#[ignore]
fn test_cosmo_rejects_kkt_solver() {
    let (P, q, A, b, cone) = basic_qp_data();
    let settings = SettingsBuilder::default()
        .kkt_solver("NoSuchKKTSolver")
        .build()
        .unwrap();

    let mut model = Model::new();
    let err = model.setup(&P, &q, &A, &b, &cone, settings).unwrap_err();
    assert!(matches!(err, ModelError::SolverInitialization(_)));
    assert!(!model.is_setup());
}
