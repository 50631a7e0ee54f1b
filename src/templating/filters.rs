//! Built-in Tera filters for manifest templates.
//!
//! These helpers cover the formatting chores that come up when YAML is
//! produced by text substitution:
//!
//! | Filter     | Example                                 | Result                      |
//! |------------|-----------------------------------------|-----------------------------|
//! | `to_yaml`  | `{{ labels \| to_yaml }}`               | YAML text, no trailing `\n` |
//! | `indent`   | `{{ text \| indent(spaces=4) }}`        | every line indented         |
//! | `nindent`  | `{{ text \| nindent(spaces=4) }}`       | newline, then `indent`      |
//! | `quote`    | `{{ name \| quote }}`                   | `"name"`, escaped           |
//! | `squote`   | `{{ name \| squote }}`                  | `'name'`                    |
//! | `required` | `{{ image \| required(message="...") }}`| error when null or empty    |
//! | `b64enc`   | `{{ password \| b64enc }}`              | standard base64             |
//! | `b64dec`   | `{{ encoded \| b64dec }}`               | decoded UTF-8 text          |
//! | `sha256sum`| `{{ config \| sha256sum }}`             | lowercase hex digest        |
//!
//! Tera's own filters (`default`, `upper`, `lower`, `trim`, `json_encode`,
//! ...) remain available alongside these.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tera::{Error, Result, Value};

use super::context::FunctionTable;

const DEFAULT_INDENT: u64 = 2;

/// Table holding every built-in helper.
#[must_use]
pub fn builtin_function_table() -> FunctionTable {
    FunctionTable::new()
        .with_filter("to_yaml", to_yaml)
        .with_filter("indent", indent)
        .with_filter("nindent", nindent)
        .with_filter("quote", quote)
        .with_filter("squote", squote)
        .with_filter("required", required)
        .with_filter("b64enc", b64enc)
        .with_filter("b64dec", b64dec)
        .with_filter("sha256sum", sha256sum)
}

/// Serialize any value as YAML.
pub fn to_yaml(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| Error::msg(format!("to_yaml filter error: {e}")))?;
    Ok(Value::String(yaml.trim_end_matches('\n').to_string()))
}

/// Prefix every line with `spaces` spaces (default 2).
pub fn indent(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let pad = " ".repeat(spaces(args)?);
    let text = as_text(value);
    Ok(Value::String(format!("{pad}{}", text.replace('\n', &format!("\n{pad}")))))
}

/// Like [`indent`], preceded by a newline.
pub fn nindent(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    match indent(value, args)? {
        Value::String(s) => Ok(Value::String(format!("\n{s}"))),
        other => Ok(other),
    }
}

/// Wrap in double quotes, escaping quotes, backslashes and control characters.
pub fn quote(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let quoted = serde_json::to_string(&as_text(value))
        .map_err(|e| Error::msg(format!("quote filter error: {e}")))?;
    Ok(Value::String(quoted))
}

/// Wrap in single quotes without escaping.
pub fn squote(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(format!("'{}'", as_text(value))))
}

/// Fail rendering when the value is null or an empty string.
pub fn required(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let missing = match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if missing {
        let message = args
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("a required value is empty");
        return Err(Error::msg(message.to_string()));
    }
    Ok(value.clone())
}

/// Base64-encode the text form of the value, e.g. for `Secret.data`.
pub fn b64enc(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(STANDARD.encode(as_text(value))))
}

/// Decode standard base64 into UTF-8 text.
pub fn b64dec(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let bytes = STANDARD
        .decode(as_text(value).trim())
        .map_err(|e| Error::msg(format!("b64dec filter error: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| Error::msg("b64dec filter error: decoded bytes are not UTF-8"))?;
    Ok(Value::String(text))
}

pub fn sha256sum(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let digest = Sha256::digest(as_text(value).as_bytes());
    Ok(Value::String(hex::encode(digest)))
}

fn spaces(args: &HashMap<String, Value>) -> Result<usize> {
    match args.get("spaces") {
        None => Ok(DEFAULT_INDENT as usize),
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| Error::msg("indent filter expects a non-negative integer `spaces`")),
    }
}

/// Strings as-is, everything else in its JSON text form.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
