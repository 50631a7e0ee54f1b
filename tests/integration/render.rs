use predicates::prelude::*;

use crate::common::{TestProject, kinds_of, stdout_of};

const VALUES: &str = "\
ManagedClusterName: hub
ManagedClusterNamespace: hub-ns
BootstrapServiceAccountName: agent
";

#[test]
fn test_render_default_order() {
    let project = TestProject::with_rbac();
    project.write("values.yaml", VALUES);

    let output = project
        .ktmpl()
        .args(["render", "test", "-f", "values.yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert_eq!(kinds_of(&stdout), ["ClusterRole", "ClusterRoleBinding", "ServiceAccount"]);
    assert!(stdout.contains("name: hub:bootstrap"));
    assert!(stdout.contains("namespace: hub-ns"));
}

#[test]
fn test_render_delete_order() {
    let project = TestProject::with_rbac();
    project.write("values.yaml", VALUES);

    let output = project
        .ktmpl()
        .args(["render", "test", "-f", "values.yaml", "--order", "delete"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        kinds_of(&stdout_of(&output)),
        ["ServiceAccount", "ClusterRoleBinding", "ClusterRole"]
    );
}

#[test]
fn test_render_with_root_flag() {
    let project = TestProject::with_rbac();
    let values = project.write("values.yaml", VALUES);

    let root = project.root_arg();
    let values = values.to_string_lossy().into_owned();
    let output = project
        .ktmpl()
        .current_dir(std::env::temp_dir())
        .args(["render", "test", "--root", &root, "-f", &values])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(kinds_of(&stdout_of(&output)).len(), 3);
}

#[test]
fn test_render_custom_order_from_config() {
    let project = TestProject::with_rbac();
    project.write("values.yaml", VALUES);
    project.write(
        "ktmpl.toml",
        "create-update-kinds-order = [\"ServiceAccount\", \"ClusterRole\", \"ClusterRoleBinding\"]\n",
    );

    let output = project
        .ktmpl()
        .args(["--config", "ktmpl.toml", "render", "test", "-f", "values.yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        kinds_of(&stdout_of(&output)),
        ["ServiceAccount", "ClusterRole", "ClusterRoleBinding"]
    );
}

#[test]
fn test_render_config_from_env() {
    let project = TestProject::with_rbac();
    project.write("values.yaml", VALUES);
    project.write("opts.toml", "kinds-order = \"delete\"\n");

    let output = project
        .ktmpl()
        .env("KTMPL_CONFIG", project.root().join("opts.toml"))
        .args(["render", "test", "-f", "values.yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(kinds_of(&stdout_of(&output))[0], "ServiceAccount");
}

#[test]
fn test_render_set_overrides_values_file() {
    let project = TestProject::with_rbac();
    project.write("values.yaml", VALUES);
    project.write("prod.yaml", "ManagedClusterNamespace: prod-ns\n");

    project
        .ktmpl()
        .args([
            "render",
            "test",
            "-f",
            "values.yaml",
            "-f",
            "prod.yaml",
            "--set",
            "ManagedClusterName=edge",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("edge:bootstrap"))
        .stdout(predicate::str::contains("namespace: prod-ns"))
        .stdout(predicate::str::contains("hub:bootstrap").not());
}

#[test]
fn test_render_json_format() {
    let project = TestProject::with_rbac();
    project.write("values.yaml", VALUES);

    let output = project
        .ktmpl()
        .args(["render", "test", "-f", "values.yaml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    let role = stdout.find("\"ClusterRole\"").unwrap();
    let account = stdout.find("\"ServiceAccount\"").unwrap();
    assert!(role < account);
    assert!(stdout.contains("\"hub:bootstrap\""));
}

#[test]
fn test_render_recursive_with_helpers() {
    let project = TestProject::new();
    project.write("app/_helpers.tpl", "{% set fullname = prefix ~ \"-web\" %}");
    project.write(
        "app/deployment.yaml",
        "kind: Deployment\nmetadata:\n  name: {{ fullname }}\n",
    );
    project.write("app/ns/namespace.yaml", "kind: Namespace\nmetadata:\n  name: {{ prefix }}\n");

    let output = project
        .ktmpl()
        .args(["render", "app", "-r", "--set", "prefix=shop"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert_eq!(kinds_of(&stdout), ["Namespace", "Deployment"]);
    assert!(stdout.contains("name: shop-web"));
}

#[test]
fn test_render_excludes_and_skips_blank_assets() {
    let project = TestProject::with_rbac();
    project.write("values.yaml", VALUES);
    project.write("test/disabled.yaml", "{% if enabled %}kind: Secret\n{% endif %}\n");

    let output = project
        .ktmpl()
        .args([
            "render",
            "test",
            "-f",
            "values.yaml",
            "--exclude",
            "test/clusterrole.yaml",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(kinds_of(&stdout_of(&output)), ["ClusterRoleBinding", "ServiceAccount"]);
}

#[test]
fn test_render_missing_key_zero_renders_empty() {
    let project = TestProject::new();
    project.write("app/cm.yaml", "kind: ConfigMap\nmetadata:\n  name: cm\ndata:\n  tier: \"{{ tier }}\"\n");

    project
        .ktmpl()
        .args(["render", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tier: ''"));
}

#[test]
fn test_render_custom_delimiter() {
    let project = TestProject::new();
    project.write(
        "app/all.yaml",
        "kind: Deployment\nmetadata:\n  name: web\n###\nkind: Namespace\nmetadata:\n  name: web\n",
    );

    let output = project
        .ktmpl()
        .args([
            "render",
            "app",
            "--delimiter",
            "(?m)^#{3}$",
            "--delimiter-string",
            "###\\n",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(kinds_of(&stdout_of(&output)), ["Namespace", "Deployment"]);
}

#[test]
fn test_render_secret_with_b64enc() {
    let project = TestProject::new();
    project.write(
        "db/secret.yaml",
        "apiVersion: v1\nkind: Secret\nmetadata:\n  name: db\ndata:\n  password: {{ password | b64enc }}\n",
    );

    project
        .ktmpl()
        .args(["render", "db", "--set", "password=s3cr3t"])
        .assert()
        .success()
        .stdout(predicate::str::contains("password: czNjcjN0"));
}
