use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_missing_key_error_policy() {
    let project = TestProject::new();
    project.write("app/cm.yaml", "kind: ConfigMap\nmetadata:\n  name: {{ nmae }}\n");

    project
        .ktmpl()
        .args(["render", "app", "--missing-key", "error", "--set", "name=cm"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to render template 'app/cm.yaml'"))
        .stderr(predicate::str::contains("nmae"));
}

#[test]
fn test_no_assets_matched() {
    let project = TestProject::new();
    std::fs::create_dir_all(project.root().join("empty")).unwrap();

    project
        .ktmpl()
        .args(["render", "empty"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No asset found in path \"empty\""))
        .stderr(predicate::str::contains("--recursive"));
}

#[test]
fn test_invalid_delimiter_regex() {
    let project = TestProject::with_rbac();

    project
        .ktmpl()
        .args(["render", "test", "--delimiter", "(unclosed"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid document delimiter regex"));
}

#[test]
fn test_template_syntax_error() {
    let project = TestProject::new();
    project.write("app/broken.yaml", "kind: ConfigMap\nname: {{ oops\n");

    project
        .ktmpl()
        .args(["render", "app"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("app/broken.yaml"));
}

#[test]
fn test_root_must_be_a_directory() {
    let project = TestProject::new();

    project
        .ktmpl()
        .args(["render", "test", "--root", "does-not-exist"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_malformed_set_assignment() {
    let project = TestProject::with_rbac();

    project
        .ktmpl()
        .args(["render", "test", "--set", "novalue"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_missing_key_error_policy_in_condition() {
    let project = TestProject::new();
    project.write("app/svc.yaml", "{% if expose %}kind: Service\nmetadata:\n  name: web\n{% endif %}");

    project
        .ktmpl()
        .args(["render", "app", "--missing-key", "error"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("`expose`"));

    project
        .ktmpl()
        .args(["render", "app", "--missing-key", "error", "--set", "expose=true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind: Service"));
}
