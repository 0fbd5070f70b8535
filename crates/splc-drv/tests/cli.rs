//! CLI end-to-end tests for the `splc` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn splc() -> Command {
    Command::cargo_bin("splc").expect("binary builds")
}

#[test]
fn compiles_minimal_program_to_bas_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("minimal.spl");
    let output = dir.path().join("minimal.bas");
    fs::write(&input, "glob { } proc { } func { } main { var { } halt }").unwrap();

    splc().arg(&input).arg(&output).assert().success();

    assert_eq!(fs::read_to_string(&output).unwrap(), "10 STOP\n");
}

#[test]
fn compiles_assign_and_print() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("prog.spl");
    let output = dir.path().join("prog.bas");
    fs::write(
        &input,
        "glob { } proc { } func { } main { var { x } x = 42 ; print x }",
    )
    .unwrap();

    splc().arg(&input).arg(&output).assert().success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "10 main_x = 42\n20 PRINT main_x\n"
    );
}

#[test]
fn type_error_fails_without_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.spl");
    let output = dir.path().join("bad.bas");
    fs::write(
        &input,
        "glob { } proc { } func { } main { var { p } p = ( 1 and 2 ) }",
    )
    .unwrap();

    splc()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "right-hand side of assignment must be numeric",
        ))
        .stderr(predicate::str::contains("error[types]"));

    // no partial output on failure
    assert!(!output.exists());
}

#[test]
fn lex_error_reports_position() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.spl");
    let output = dir.path().join("bad.bas");
    fs::write(&input, "glob { 01 }").unwrap();

    splc()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[lex]"))
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn syntax_error_reports_lookahead() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.spl");
    let output = dir.path().join("bad.bas");
    fs::write(&input, "glob { } proc { } func { } main { }").unwrap();

    splc()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[parse]"))
        .stderr(predicate::str::contains("Syntax error at"));
}

#[test]
fn missing_input_file_fails_with_io_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.bas");

    splc()
        .arg(dir.path().join("nosuch.spl"))
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[io]"));
}

#[test]
fn custom_step_flag() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("prog.spl");
    let output = dir.path().join("prog.bas");
    fs::write(&input, "glob { } proc { } func { } main { var { } halt }").unwrap();

    splc()
        .arg(&input)
        .arg(&output)
        .arg("--step")
        .arg("100")
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&output).unwrap(), "100 STOP\n");
}

#[test]
fn multiple_diagnostics_one_line_each() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.spl");
    let output = dir.path().join("bad.bas");
    fs::write(
        &input,
        "glob { x x } proc { } func { } main { var { } if 1 { halt } }",
    )
    .unwrap();

    splc()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[symbols]"))
        .stderr(predicate::str::contains("error[types]"));
}
