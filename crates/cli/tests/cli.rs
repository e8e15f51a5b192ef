#![allow(unused_crate_dependencies)]

use std::{fs, path::Path, process::Command};
use talon_ast::{Program, ProgramBuilder, Ty};
use talon_cli::{CliError, parse_args, run_compiler};

const CMD: &str = env!("CARGO_BIN_EXE_talonc");

/// `{ String s = "hi"; }` with a one-method `Object`.
fn program() -> Program {
    let mut b = ProgramBuilder::new();
    let object = b.class("Object", None);
    let string = b.class("String", Some(object));
    b.string_class(string);
    let m = b.method(object, "id", &[], Ty::Class(object));
    let this = b.this(object);
    b.set_body(m, vec![], Some(this));
    let hi = b.str("hi");
    let (decl, _) = b.local("s", Ty::Class(string), hi);
    let main = b.block(vec![decl]);
    b.main(main);
    b.finish()
}

fn write_program(dir: &Path) -> String {
    let path = dir.join("program.json");
    fs::write(&path, serde_json::to_string(&program()).unwrap()).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn compiles_json_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_program(dir.path());
    let out = dir.path().join("out.s");
    let opts = parse_args(["talonc", input.as_str(), "-o", out.to_str().unwrap()]).unwrap();
    run_compiler(&opts).unwrap();

    let asm = fs::read_to_string(&out).unwrap();
    assert!(asm.starts_with(".data\nCLASS_Object:\n"), "{asm}");
    assert!(asm.contains("\t.word CLASS_String\n\t.word -1\n\t.word 2\n"), "{asm}");
    assert!(asm.contains("\t.ascii \"hi\"\n\t.align 2\n"), "{asm}");
    assert!(asm.contains("\n.text\n\t.globl main\nmain:\n\tjal vm_init\n"), "{asm}");
    assert!(asm.contains("_id:\n\tsubu $sp, $sp, 4\n"), "{asm}");
    assert!(asm.ends_with("\tjr $ra\n"), "{asm}");
}

#[test]
fn stop_after_layout_writes_data_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_program(dir.path());
    let out = dir.path().join("out.s");
    let opts = parse_args([
        "talonc",
        input.as_str(),
        "-o",
        out.to_str().unwrap(),
        "--stop-after",
        "layout",
    ])
    .unwrap();
    run_compiler(&opts).unwrap();

    let asm = fs::read_to_string(&out).unwrap();
    assert!(asm.starts_with(".data\n"));
    assert!(!asm.contains(".text"), "{asm}");
}

#[test]
fn malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    fs::write(&input, "{ \"classes\": 3 }").unwrap();
    let opts = parse_args(["talonc", input.to_str().unwrap()]).unwrap();
    let err = run_compiler(&opts).unwrap_err();
    assert!(matches!(err, CliError::Json(_)), "{err:?}");
}

#[test]
fn binary_writes_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_program(dir.path());
    let output = Command::new(CMD).args([input.as_str(), "--annotate", "-j1"]).output().unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(".data\nCLASS_Object:\t# 0..1\n"), "{stdout}");
}

#[test]
fn binary_reports_errors() {
    let output = Command::new(CMD).arg("/nonexistent/program.json").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: couldn't read `/nonexistent/program.json`"), "{stderr}");
}
