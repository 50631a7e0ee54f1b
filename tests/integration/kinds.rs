use predicates::prelude::*;

use crate::common::{TestProject, stdout_of};

#[test]
fn test_kinds_default_order() {
    let project = TestProject::new();

    let output = project.ktmpl().arg("kinds").output().unwrap();
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "  0  Namespace");
    assert_eq!(lines.len(), 35);
    assert!(lines[34].contains("<unlisted kinds>"));
    assert!(lines[34].trim_start().starts_with("34"));
}

#[test]
fn test_kinds_delete_order() {
    let project = TestProject::new();

    let output = project.ktmpl().args(["kinds", "--order", "delete"]).output().unwrap();
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].trim_start().starts_with("-1"));
    assert_eq!(lines[1], "  0  APIService");
    assert_eq!(lines.last().copied(), Some(" 33  Namespace"));
}

#[test]
fn test_kinds_custom_order_from_config() {
    let project = TestProject::new();
    project.write("ktmpl.toml", "create-update-kinds-order = [\"CustomResourceDefinition\", \"Namespace\"]\n");

    project
        .ktmpl()
        .args(["--config", "ktmpl.toml", "kinds"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("  0  CustomResourceDefinition\n  1  Namespace\n"));
}

#[test]
fn test_kinds_rejects_unknown_config_keys() {
    let project = TestProject::new();
    project.write("ktmpl.toml", "kinds-orders = \"delete\"\n");

    project
        .ktmpl()
        .args(["--config", "ktmpl.toml", "kinds"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}
