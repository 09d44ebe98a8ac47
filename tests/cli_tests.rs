use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn apexgen() -> Command {
    Command::cargo_bin("apexgen").unwrap()
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_prints_imports_then_code() {
    let dir = TempDir::new().unwrap();
    let file = write_source(
        &dir,
        "Repo.cls",
        "public class Repo { void run() { System.debug([SELECT Id FROM Account]); } }",
    );

    let expected = "\
import com.freedom_man.system.Account;
import com.freedom_man.system.Database;
import com.freedom_man.system.System;

public class Repo {
    void run() {
        System.debug([
            SELECT
                Id
            FROM
                Account
        ]);
    }
}
";
    apexgen().arg(&file).assert().success().stdout(expected);
}

#[test]
fn test_no_imports_leaves_leading_blank_line() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Foo.cls", "public class Foo { Integer x = 1; }");

    apexgen()
        .arg(&file)
        .assert()
        .success()
        .stdout("\npublic class Foo {\n    Integer x = 1;\n}\n");
}

#[test]
fn test_indent_option() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Foo.cls", "class Foo { void a() { b(); } }");

    apexgen()
        .arg(&file)
        .args(["--indent", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  void a() {\n    b();\n  }"));
}

#[test]
fn test_custom_registry() {
    let dir = TempDir::new().unwrap();
    let registry = write_source(
        &dir,
        "registry.json",
        r#"{"database": "acme.Db", "entries": {"Invoice": "acme.billing.Invoice"}}"#,
    );
    let file = write_source(
        &dir,
        "Billing.cls",
        "class Billing { Object rows = [SELECT Id FROM Invoice]; }",
    );

    apexgen()
        .arg(&file)
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "import acme.Db;\nimport acme.billing.Invoice;\n\nclass Billing {",
        ));
}

#[test]
fn test_record_types() {
    apexgen()
        .arg("--record-types")
        .assert()
        .success()
        .stdout("public class Account {\n    public String Name = 'hoge';\n}\n");
}

#[test]
fn test_parse_error_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Broken.cls", "public class Broken { void run( }");

    apexgen()
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn test_missing_file_fails() {
    apexgen()
        .arg("/nonexistent/Missing.cls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_bad_registry_fails() {
    let dir = TempDir::new().unwrap();
    let registry = write_source(&dir, "registry.json", r#"{"entries": {}}"#);
    let file = write_source(&dir, "Foo.cls", "class Foo {}");

    apexgen()
        .arg(&file)
        .arg("--registry")
        .arg(&registry)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load registry"));
}

#[test]
fn test_requires_a_file() {
    apexgen().assert().failure();
}
