use predicates::prelude::*;

use crate::common::{TestProject, stdout_of};

#[test]
fn test_list_sorted_names() {
    let project = TestProject::with_rbac();

    let output = project.ktmpl().args(["list", "test"]).output().unwrap();
    assert!(output.status.success());
    let lines: Vec<String> = stdout_of(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        [
            "test/clusterrole.yaml",
            "test/clusterrolebinding.yaml",
            "test/serviceaccount.yaml"
        ]
    );
}

#[test]
fn test_list_recursive_and_excluded() {
    let project = TestProject::with_rbac();
    project.write("test/nested/extra.yaml", "kind: Secret\n");

    project
        .ktmpl()
        .args(["list", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extra.yaml").not());

    project
        .ktmpl()
        .args(["list", "test", "--recursive", "--exclude", "test/serviceaccount.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test/nested/extra.yaml"))
        .stdout(predicate::str::contains("serviceaccount").not());
}

#[test]
fn test_list_marks_helpers() {
    let project = TestProject::with_rbac();
    project.write("test/_helpers.tpl", "");

    project
        .ktmpl()
        .args(["list", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test/_helpers.tpl"))
        .stdout(predicate::str::contains("(helpers)"));
}
