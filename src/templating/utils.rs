//! Helpers for assembling template values.

use serde_json::{Map, Value};

/// Perform a deep merge of two JSON values.
///
/// Recursively merges `overrides` into `base`. For objects, fields from
/// `overrides` are added or replace fields in `base`. For arrays and
/// primitives, `overrides` completely replaces `base`.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use ktmpl_cli::templating::deep_merge_json;
///
/// let base = json!({ "image": { "repo": "nginx", "tag": "1.25" } });
/// let overrides = json!({ "image": { "tag": "1.27" }, "replicas": 2 });
///
/// let merged = deep_merge_json(base, &overrides);
/// assert_eq!(merged, json!({ "image": { "repo": "nginx", "tag": "1.27" }, "replicas": 2 }));
/// ```
pub fn deep_merge_json(mut base: Value, overrides: &Value) -> Value {
    match (base.as_object_mut(), overrides.as_object()) {
        (Some(base_obj), Some(override_obj)) => {
            for (key, override_value) in override_obj {
                match base_obj.get_mut(key) {
                    Some(base_value) if base_value.is_object() && override_value.is_object() => {
                        let merged = deep_merge_json(base_value.take(), override_value);
                        *base_value = merged;
                    }
                    _ => {
                        base_obj.insert(key.clone(), override_value.clone());
                    }
                }
            }
            base
        }
        _ => overrides.clone(),
    }
}

/// Parse a `key.path=value` assignment into a nested value.
///
/// The right-hand side is read as a YAML scalar, so `replicas=3` yields a
/// number and `debug=true` a boolean; `name=` yields an empty string.
///
/// # Errors
///
/// Returns a message when `=` is missing or the key path has an empty
/// segment.
pub fn parse_assignment(assignment: &str) -> Result<Value, String> {
    let Some((path, raw)) = assignment.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got '{assignment}'"));
    };
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(format!("invalid key path '{path}'"));
    }

    let leaf = if raw.is_empty() {
        Value::String(String::new())
    } else {
        serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    };

    Ok(segments.iter().rev().fold(leaf, |value, segment| {
        let mut map = Map::new();
        map.insert((*segment).to_string(), value);
        Value::Object(map)
    }))
}
