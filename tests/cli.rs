use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

#[test]
fn beautifies_standard_input() {
    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.write_stdin("var x=1");

    cmd.assert().success().stdout("var x = 1\n");
}

#[test]
fn help_exits_successfully() {
    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--replace").and(predicate::str::contains("STDIN")));
}

#[test]
fn indent_options_apply_to_output() {
    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.args(["-i", "2"]).write_stdin("if(a){b()}");

    cmd.assert().success().stdout("if (a) {\n  b()\n}\n");
}

#[test]
fn files_are_printed_in_argument_order() {
    let dir = TempDir::new().unwrap();
    let b = write(dir.path(), "b.js", "var b=2;");
    let a = write(dir.path(), "a.js", "var a=1;");

    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg(&b).arg(&a);

    cmd.assert()
        .success()
        .stdout("var b = 2;\n\nvar a = 1;\n");
}

#[test]
fn glob_pattern_expands_to_matching_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.js", "one()");
    write(dir.path(), "notes.txt", "not javascript");
    let pattern = dir.path().join("*.js").display().to_string();

    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg(&pattern);

    cmd.assert().success().stdout("one()\n");
}

#[test]
fn pattern_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.js").display().to_string();

    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg(&pattern);

    cmd.assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("No files matched"));
}

#[test]
fn missing_file_aborts_batch() {
    let dir = TempDir::new().unwrap();
    let present = write(dir.path(), "present.js", "var a=1;");
    let missing = dir.path().join("missing.js").display().to_string();

    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg(&present).arg(&missing);

    cmd.assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("missing.js"));
}

#[test]
fn replace_rewrites_files_and_keeps_malformed_ones() {
    let dir = TempDir::new().unwrap();
    let first = write(dir.path(), "first.js", "var a=1;");
    let broken = write(dir.path(), "broken.js", "function f() {");
    let last = write(dir.path(), "last.js", "var c=3;");

    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg("--replace").arg(&first).arg(&broken).arg(&last);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Beautification failed for 1 of 3 file(s)"))
        .stderr(predicate::str::contains("broken.js"));

    assert_eq!(fs::read_to_string(&first).unwrap(), "var a = 1;\n");
    assert_eq!(fs::read_to_string(&broken).unwrap(), "function f() {");
    assert_eq!(fs::read_to_string(&last).unwrap(), "var c = 3;\n");
}

#[test]
fn replace_reports_completion() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "only.js", "var a=1;");

    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg("-r").arg(&file);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Beautification complete!"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "var a = 1;\n");
}

#[test]
fn replace_with_wildcard_skips_non_javascript() {
    let dir = TempDir::new().unwrap();
    let readme = write(dir.path(), "README.md", "Hello world. See it");
    let script = write(dir.path(), "app.js", "var a=1;");
    let pattern = dir.path().join("*").display().to_string();

    let mut cmd = cargo_bin_cmd!("beaut");
    cmd.arg("-r").arg(&pattern);

    cmd.assert().success();

    assert_eq!(fs::read_to_string(&readme).unwrap(), "Hello world. See it");
    assert_eq!(fs::read_to_string(&script).unwrap(), "var a = 1;\n");
}
