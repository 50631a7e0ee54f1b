use serde_json::json;

use super::*;
use crate::asset::MemoryAssetReader;
use crate::constants::NO_VALUE_PLACEHOLDER;
use crate::core::ErrorCategory;
use crate::templating::MissingKeyPolicy;
use crate::test_utils::{init_test_logging, rbac_reader, rbac_values};

fn processor(reader: MemoryAssetReader) -> TemplateProcessor<MemoryAssetReader> {
    init_test_logging(None);
    TemplateProcessor::new(reader, &Options::default()).unwrap()
}

fn kinds(objects: &[StructuredObject]) -> Vec<&str> {
    objects.iter().map(StructuredObject::kind).collect()
}

#[test]
fn test_rbac_default_order() {
    let tp = processor(rbac_reader());
    let objects =
        tp.template_resources_in_path_unstructured("test", &[], true, &rbac_values()).unwrap();
    assert_eq!(kinds(&objects), ["ClusterRole", "ClusterRoleBinding", "ServiceAccount"]);
    assert_eq!(objects[0].name(), "mymanagedcluster:bootstrap");
    assert_eq!(objects[2].namespace(), "mymanagedclusterNS");
}

#[test]
fn test_rbac_custom_order() {
    let options = Options {
        create_update_kinds_order: Some(KindsOrder::new([
            "ServiceAccount",
            "ClusterRole",
            "ClusterRoleBinding",
        ])),
        ..Options::default()
    };
    let tp = TemplateProcessor::new(rbac_reader(), &options).unwrap();
    let objects =
        tp.template_resources_in_path_unstructured("test", &[], true, &rbac_values()).unwrap();
    assert_eq!(kinds(&objects), ["ServiceAccount", "ClusterRole", "ClusterRoleBinding"]);
}

#[test]
fn test_delete_mode_switch() {
    let mut tp = processor(rbac_reader());
    assert_eq!(tp.sort_mode(), SortMode::CreateUpdate);
    let applied =
        tp.template_resources_in_path_unstructured("test", &[], false, &rbac_values()).unwrap();

    tp.set_delete_order();
    assert_eq!(tp.sort_mode(), SortMode::Delete);
    let deleted =
        tp.template_resources_in_path_unstructured("test", &[], false, &rbac_values()).unwrap();
    assert_eq!(kinds(&deleted), ["ServiceAccount", "ClusterRoleBinding", "ClusterRole"]);
    // Earlier results are not re-sorted.
    assert_eq!(kinds(&applied), ["ClusterRole", "ClusterRoleBinding", "ServiceAccount"]);

    tp.set_create_update_order();
    assert_eq!(tp.sort_mode(), SortMode::CreateUpdate);
}

#[test]
fn test_sort_with_explicit_mode_keeps_active_mode() {
    let tp = processor(rbac_reader());
    let mut objects =
        tp.template_resources_in_path_unstructured("test", &[], true, &rbac_values()).unwrap();
    tp.sort_with_mode(&mut objects, SortMode::Delete);
    assert_eq!(kinds(&objects), ["ServiceAccount", "ClusterRoleBinding", "ClusterRole"]);
    assert_eq!(tp.sort_mode(), SortMode::CreateUpdate);
    tp.sort_for_apply(&mut objects);
    assert_eq!(kinds(&objects), ["ClusterRole", "ClusterRoleBinding", "ServiceAccount"]);
}

#[test]
fn test_initial_mode_from_options() {
    let options = Options {
        mode: SortMode::Delete,
        ..Options::default()
    };
    let tp = TemplateProcessor::new(rbac_reader(), &options).unwrap();
    assert_eq!(tp.sort_mode(), SortMode::Delete);
    assert_eq!(tp.kinds_order(SortMode::Delete), &KindsOrder::default_delete());
}

#[test]
fn test_multi_document_asset_and_blank_fragments() {
    let reader = MemoryAssetReader::new().with_asset(
        "app/all.yaml",
        "kind: Deployment\nmetadata:\n  name: web\n---\n   \n---\nkind: Namespace\nmetadata:\n  name: apps\n---\n",
    );
    let tp = processor(reader);
    let objects = tp.template_resources_in_path_unstructured("app", &[], false, &json!({})).unwrap();
    assert_eq!(kinds(&objects), ["Namespace", "Deployment"]);
}

#[test]
fn test_blank_payloads_yield_no_objects() {
    let tp = processor(MemoryAssetReader::new());
    let objects = tp.bytes_array_to_unstructured(&["", "---\n  \n---\n", "\n"]).unwrap();
    assert!(objects.is_empty());
}

#[test]
fn test_kindless_document_is_kept() {
    let tp = processor(MemoryAssetReader::new());
    let objects = tp
        .bytes_array_to_unstructured(&["replicas: 3\n---\nkind: Secret\nmetadata:\n  name: s\n"])
        .unwrap();
    assert_eq!(kinds(&objects), ["", "Secret"]);
    assert_eq!(objects[0].get("replicas"), Some(&json!(3)));
}

#[test]
fn test_comment_only_document_is_empty_object() {
    let tp = processor(MemoryAssetReader::new());
    let object = tp.bytes_to_unstructured("# nothing here\n").unwrap();
    assert!(object.as_map().is_empty());
}

#[test]
fn test_gated_asset_renders_to_nothing() {
    let reader = MemoryAssetReader::new()
        .with_asset("opt/a.yaml", "{% if enabled %}kind: ConfigMap\nmetadata:\n  name: a\n{% endif %}\n")
        .with_asset("opt/b.yaml", "kind: Secret\nmetadata:\n  name: b\n");
    let tp = processor(reader);
    let names = tp.asset_names_in_path("opt", &[], false).unwrap();
    assert_eq!(tp.template_resources(&names, &json!({"enabled": false})).unwrap().len(), 1);
    assert_eq!(tp.template_resources(&names, &json!({"enabled": true})).unwrap().len(), 2);
}

#[test]
fn test_helpers_are_prefixed_and_never_rendered_alone() {
    let reader = MemoryAssetReader::new()
        .with_asset("app/_helpers.tpl", "{% set app = \"web-\" ~ suffix %}")
        .with_asset("app/svc.yaml", "kind: Service\nmetadata:\n  name: {{ app }}\n")
        .with_asset("other/cm.yaml", "kind: ConfigMap\nmetadata:\n  name: plain\n");
    let tp = processor(reader);
    let values = json!({"suffix": "1"});

    assert_eq!(tp.template_resource("app/_helpers.tpl", &values).unwrap(), None);
    assert_eq!(
        tp.template_resource("app/svc.yaml", &values).unwrap().as_deref(),
        Some("kind: Service\nmetadata:\n  name: web-1\n")
    );
    // No helpers in `other/`, which is not an error.
    assert!(tp.template_resource("other/cm.yaml", &values).unwrap().is_some());

    let objects = tp.template_resources_in_path_unstructured("app", &[], false, &values).unwrap();
    assert_eq!(kinds(&objects), ["Service"]);
}

#[test]
fn test_top_level_helpers() {
    let reader = MemoryAssetReader::new()
        .with_asset("_helpers.tpl", "{% set ns = \"prod\" %}")
        .with_asset("ns.yaml", "kind: Namespace\nmetadata:\n  name: {{ ns }}\n");
    let tp = processor(reader);
    let objects = tp.template_resources_in_path_unstructured(".", &[], false, &json!({})).unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name(), "prod");
}

#[test]
fn test_missing_key_policies() {
    let reader = MemoryAssetReader::new()
        .with_asset("m/cm.yaml", "kind: ConfigMap\nmetadata:\n  name: cm\ndata:\n  v: \"{{ missing }}\"\n");

    let cases = [
        (MissingKeyPolicy::Zero, Some("")),
        (MissingKeyPolicy::Invalid, Some(NO_VALUE_PLACEHOLDER)),
        (MissingKeyPolicy::Default, Some(NO_VALUE_PLACEHOLDER)),
        (MissingKeyPolicy::Error, None),
    ];
    for (policy, expected) in cases {
        let options = Options {
            missing_key: policy,
            ..Options::default()
        };
        let tp = TemplateProcessor::new(reader.clone(), &options).unwrap();
        let result = tp.template_resources_in_path_unstructured("m", &[], false, &json!({}));
        match expected {
            Some(text) => {
                let objects = result.unwrap();
                assert_eq!(objects[0].get("data.v"), Some(&json!(text)), "policy {policy}");
            }
            None => {
                let err = result.unwrap_err();
                assert_eq!(err.category(), ErrorCategory::Render);
            }
        }
    }
}

#[test]
fn test_secret_data_is_base64_encoded() {
    let tp = processor(MemoryAssetReader::new().with_asset(
        "db/secret.yaml",
        "apiVersion: v1\nkind: Secret\nmetadata:\n  name: db\n  annotations:\n    \
         checksum: {{ password | sha256sum }}\ndata:\n  password: {{ password | b64enc }}\n",
    ));
    let objects =
        tp.template_resources_in_path_unstructured("db", &[], false, &json!({"password": "s3cr3t"})).unwrap();
    assert_eq!(kinds(&objects), ["Secret"]);
    assert_eq!(objects[0].get("data.password"), Some(&json!("czNjcjN0")));
    let checksum = objects[0].get("metadata.annotations.checksum").and_then(Value::as_str).unwrap();
    assert_eq!(checksum.len(), 64);
}

#[test]
fn test_error_policy_rejects_missing_condition_key() {
    let reader = MemoryAssetReader::new()
        .with_asset("m/svc.yaml", "{% if expose %}kind: Service\nmetadata:\n  name: web\n{% endif %}");
    let options = Options {
        missing_key: MissingKeyPolicy::Error,
        ..Options::default()
    };
    let tp = TemplateProcessor::new(reader, &options).unwrap();

    let err = tp.template_resources_in_path_unstructured("m", &[], false, &json!({})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Render);
    let objects =
        tp.template_resources_in_path_unstructured("m", &[], false, &json!({"expose": false})).unwrap();
    assert!(objects.is_empty());
}

#[test]
fn test_no_assets_matched() {
    let tp = processor(rbac_reader());
    let excluded = vec!["test/clusterrole.yaml".to_string()];
    let err = tp.asset_names_in_path("nowhere", &excluded, true).unwrap_err();
    assert_eq!(
        err,
        KtmplError::NoAssetsMatched {
            path: "nowhere".to_string(),
            excluded,
            recursive: true,
        }
    );
}

#[test]
fn test_excluded_assets_are_skipped() {
    let tp = processor(rbac_reader());
    let excluded = vec!["test/serviceaccount.yaml".to_string()];
    let objects =
        tp.template_resources_in_path_unstructured("test", &excluded, false, &rbac_values()).unwrap();
    assert_eq!(kinds(&objects), ["ClusterRole", "ClusterRoleBinding"]);
    assert_eq!(tp.assets("test", &excluded, false).unwrap().len(), 2);
}

#[test]
fn test_batch_is_fail_fast() {
    let reader = rbac_reader().with_asset("test/zz-broken.yaml", "kind: [unterminated\n");
    let tp = processor(reader);
    let err = tp
        .template_resources_in_path_unstructured("test", &[], false, &rbac_values())
        .unwrap_err();
    assert!(matches!(err, KtmplError::DecodeFailed { .. }), "{err}");

    let reader = rbac_reader().with_asset("test/bad.yaml", "{{ unclosed");
    let err = processor(reader)
        .template_resources_in_path_yaml("test", &[], false, &rbac_values())
        .unwrap_err();
    assert!(matches!(err, KtmplError::RenderFailed { ref template, .. } if template == "test/bad.yaml"));
}

#[test]
fn test_invalid_utf8() {
    let reader = MemoryAssetReader::new().with_asset("bin/blob.yaml", vec![0xff, 0xfe, 0x00]);
    let tp = processor(reader);
    assert_eq!(
        tp.template_resource("bin/blob.yaml", &json!({})).unwrap_err(),
        KtmplError::InvalidEncoding {
            name: "bin/blob.yaml".to_string()
        }
    );
    assert!(matches!(
        tp.template_bytes(&[0xc3, 0x28], &json!({})),
        Err(KtmplError::InvalidEncoding { .. })
    ));
}

#[test]
fn test_template_bytes() {
    let tp = processor(MemoryAssetReader::new());
    assert_eq!(
        tp.template_bytes(b"name: {{ n }}\n", &json!({"n": "x"})).unwrap().as_deref(),
        Some("name: x\n")
    );
    assert_eq!(tp.template_bytes(b"  \n", &json!({})).unwrap(), None);
}

#[test]
fn test_yaml_output_and_join() {
    let tp = processor(rbac_reader());
    let yamls = tp.template_resources_in_path_yaml("test", &[], false, &rbac_values()).unwrap();
    assert_eq!(yamls.len(), 3);
    assert!(yamls[0].starts_with("apiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRole\n"));

    let joined = tp.join_documents(&yamls);
    assert_eq!(joined.matches("---\n").count(), 2);
    let again = tp.bytes_array_to_unstructured(&[joined]).unwrap();
    assert_eq!(kinds(&again), ["ClusterRole", "ClusterRoleBinding", "ServiceAccount"]);
}

#[test]
fn test_custom_delimiter() {
    let options = Options {
        delimiter: "(?m)^#{3}$".to_string(),
        delimiter_string: "###\n".to_string(),
        ..Options::default()
    };
    let tp = TemplateProcessor::new(MemoryAssetReader::new(), &options).unwrap();
    let objects = tp
        .bytes_array_to_unstructured(&["kind: Secret\nmetadata:\n  name: a\n###\nkind: Namespace\nmetadata:\n  name: b\n"])
        .unwrap();
    assert_eq!(kinds(&objects), ["Secret", "Namespace"]);
    assert_eq!(tp.join_documents(&["a: 1", "b: 2"]), "a: 1\n###\nb: 2");
}

#[test]
fn test_invalid_delimiter_fails_construction() {
    let options = Options {
        delimiter: "(?m)^(-{3}$".to_string(),
        ..Options::default()
    };
    let err = TemplateProcessor::new(MemoryAssetReader::new(), &options).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_duplicate_kinds_still_construct() {
    let options = Options {
        create_update_kinds_order: Some(KindsOrder::new(["Secret", "Namespace", "Secret"])),
        ..Options::default()
    };
    let tp = TemplateProcessor::new(MemoryAssetReader::new(), &options).unwrap();
    let mut objects = tp
        .bytes_array_to_unstructured(&["kind: Namespace\n---\nkind: Secret\n"])
        .unwrap();
    tp.sort_for_apply(&mut objects);
    assert_eq!(kinds(&objects), ["Secret", "Namespace"]);
}

#[test]
fn test_to_yamls_and_jsons() {
    let objects = vec![
        StructuredObject::from_json(br#"{"kind":"A"}"#).unwrap().into_object(),
        StructuredObject::from_json(br#"{"kind":"B"}"#).unwrap().into_object(),
    ];
    assert_eq!(to_yamls(&objects).unwrap(), ["kind: A\n", "kind: B\n"]);
    assert_eq!(to_jsons(&objects).unwrap()[1], "{\n  \"kind\": \"B\"\n}");
}
