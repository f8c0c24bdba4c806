#![cfg(unix)]
#![allow(non_snake_case)]

mod common;

use common::FakeJulia;
use cosmo::engine::julia::JuliaEngine;
use cosmo::io::ConfigurablePrintTarget;
use cosmo::{ConeSpec, CscMatrix, Model, Settings};
use std::sync::Arc;

fn test_print_model(fake: &FakeJulia) -> Model<JuliaEngine> {
    let P = CscMatrix::identity(1);
    let q = [0.];
    let A = CscMatrix::identity(1);
    let b = [1.];
    let cone = ConeSpec::from_pairs([("l", 1)]).unwrap();

    let mut model = Model::with_engine(JuliaEngine::with_runtime(Arc::clone(&fake.runtime)));
    model.setup(&P, &q, &A, &b, &cone, Settings::default()).unwrap();
    model
}

#[test]
fn test_print_to_stdout() {
    let fake = FakeJulia::start();
    let mut model = test_print_model(&fake);
    model.engine_mut().print_to_stdout();
    model.optimize().unwrap();
}

#[test]
fn test_print_to_buffer() {
    let fake = FakeJulia::start();
    let mut model = test_print_model(&fake);
    model.engine_mut().print_to_buffer();
    model.optimize().unwrap();
    let result = model.engine_mut().get_print_buffer().unwrap();
    assert!(result.contains("COSMO"));
}

#[test]
fn test_print_to_file() {
    use std::io::{Read, Seek};

    let fake = FakeJulia::start();
    let mut model = test_print_model(&fake);
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    model.engine_mut().print_to_file(file.into_file());
    model.optimize().unwrap();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("COSMO"));
}

#[test]
fn test_print_to_stream() {
    use std::io::{Read, Seek};

    let fake = FakeJulia::start();
    let mut model = test_print_model(&fake);
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    let stream = Box::new(file.into_file());

    model.engine_mut().print_to_stream(stream);
    model.optimize().unwrap();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("COSMO"));
}

#[test]
fn test_print_to_sink() {
    let fake = FakeJulia::start();
    let mut model = test_print_model(&fake);
    model.engine_mut().print_to_sink();
    model.optimize().unwrap();
    // no output
    assert!(model.engine_mut().get_print_buffer().is_err());
}
