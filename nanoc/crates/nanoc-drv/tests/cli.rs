//! End-to-end CLI tests: invoke the built `nanoc` binary against source
//! files on disk and check the emitted assembly text and exit code.
//! One positional argument, no flags, assembly on stdout, exit 0 on
//! success / non-zero on any fatal error.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn nanoc_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nanoc"))
}

fn write_source(src: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp source file");
    file.write_all(src.as_bytes()).expect("failed to write source");
    file
}

#[test]
fn trivial_exit_emits_start_and_sys_exit() {
    let src = write_source("int main() { return 0; }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("_start:"))
        .stdout(predicate::str::contains("movq $0, %rdi"))
        .stdout(predicate::str::contains("movq $60, %rax"))
        .stdout(predicate::str::contains("syscall"))
        .stdout(predicate::str::contains("print:").not());
}

#[test]
fn print_call_emits_the_call_sequence_and_helper() {
    let src = write_source("int main() { print(7); return 0; }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("movq $7, %rax"))
        .stdout(predicate::str::contains("call print"))
        .stdout(predicate::str::contains("\nprint:\n"));
}

#[test]
fn arithmetic_program_compiles_to_a_full_listing() {
    let src = write_source("int main() { int a = 1; int b = 2; return a + b; }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".global _start"))
        .stdout(predicate::str::contains(".data"))
        .stdout(predicate::str::contains("buf: .skip 1024"))
        .stdout(predicate::str::contains("addq %rbx, %rax"));
}

#[test]
fn multi_function_program_renames_only_main_to_start() {
    let src = write_source(
        "int add(int a, int b) { return a + b; } \
         int main() { print(add(1, 2)); return 0; }",
    );

    nanoc_bin()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\nadd:\n"))
        .stdout(predicate::str::contains("_start:"))
        .stdout(predicate::str::contains("add:").and(predicate::str::contains("main:").not()));
}

#[test]
fn equality_condition_compiles_to_je() {
    let src = write_source("int main() { if (1 == 2) { return 1; } return 0; }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cmpq %r9, %r8"))
        .stdout(predicate::str::contains("je L"));
}

#[test]
fn lone_equals_in_a_condition_is_a_fatal_parse_error() {
    let src = write_source("int main() { if (1 = 2) { return 1; } return 0; }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

#[test]
fn redeclaration_is_a_fatal_error_with_nonzero_exit() {
    let src = write_source("int main() { int x = 0; int x = 1; return x; }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("redeclaration"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn syntax_error_is_a_fatal_error_with_nonzero_exit() {
    let src = write_source("int main() { return 0 }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

#[test]
fn undeclared_function_is_a_fatal_error() {
    let src = write_source("int main() { foo(); return 0; }");

    nanoc_bin()
        .arg(src.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("undeclared"));
}

#[test]
fn missing_input_file_argument_is_a_fatal_error() {
    nanoc_bin().assert().failure();
}

#[test]
fn nonexistent_input_path_is_a_fatal_error() {
    nanoc_bin()
        .arg("/nonexistent/path/does-not-exist.c")
        .assert()
        .failure();
}
