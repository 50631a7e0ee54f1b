//! Generic structured objects decoded from rendered documents.
//!
//! A [`StructuredObject`] wraps the decoded JSON map of one document and
//! exposes the identity fields the ordering engine needs. Decoding never
//! requires a `kind`: documents that are not Kubernetes objects (value files,
//! plain lists of settings, ...) come back as [`Decoded::Untyped`] and keep
//! flowing through the pipeline with an empty kind.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::asset::AssetReader;
use crate::core::{KtmplError, Result};
use crate::ordering::KindedResource;

/// One decoded document.
///
/// Identity accessors return `""` when the field is absent. Key order of the
/// source document is preserved through decoding and serialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct StructuredObject {
    content: Map<String, Value>,
}

/// Outcome of decoding one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The document declares a `kind`.
    Typed(StructuredObject),
    /// The document has no `kind`; it is kept with an empty kind.
    Untyped(StructuredObject),
}

impl Decoded {
    #[must_use]
    pub fn into_object(self) -> StructuredObject {
        match self {
            Self::Typed(object) | Self::Untyped(object) => object,
        }
    }

    #[must_use]
    pub const fn is_typed(&self) -> bool {
        matches!(self, Self::Typed(_))
    }
}

impl StructuredObject {
    /// Wrap an already decoded map, checking the identity fields.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::DecodeFailed`] when `kind` or `apiVersion` is
    /// not a string, when `metadata` is not a mapping, or when
    /// `metadata.name` / `metadata.namespace` is not a string.
    pub fn from_map(content: Map<String, Value>) -> Result<Decoded> {
        for field in ["kind", "apiVersion"] {
            if let Some(v) = content.get(field) {
                if !v.is_string() {
                    return Err(KtmplError::decode(format!(
                        "field '{field}' must be a string, got {}",
                        json_type(v)
                    )));
                }
            }
        }
        match content.get("metadata") {
            None | Some(Value::Null) => {}
            Some(Value::Object(metadata)) => {
                for field in ["name", "namespace"] {
                    match metadata.get(field) {
                        None | Some(Value::Null) | Some(Value::String(_)) => {}
                        Some(v) => {
                            return Err(KtmplError::decode(format!(
                                "field 'metadata.{field}' must be a string, got {}",
                                json_type(v)
                            )));
                        }
                    }
                }
            }
            Some(v) => {
                return Err(KtmplError::decode(format!(
                    "field 'metadata' must be a mapping, got {}",
                    json_type(v)
                )));
            }
        }

        let object = Self {
            content,
        };
        if object.kind().is_empty() {
            Ok(Decoded::Untyped(object))
        } else {
            Ok(Decoded::Typed(object))
        }
    }

    /// Decode canonical JSON bytes.
    ///
    /// `null` (a document holding only comments) decodes to an empty untyped
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::DecodeFailed`] for invalid JSON, a top level
    /// that is not an object, or mistyped identity fields.
    pub fn from_json(json: &[u8]) -> Result<Decoded> {
        match serde_json::from_slice::<Value>(json)? {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Ok(Decoded::Untyped(Self::default())),
            other => Err(KtmplError::decode(format!(
                "expected an object at the top level, got {}",
                json_type(&other)
            ))),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        self.str_field("kind")
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        self.str_field("apiVersion")
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata_field("name")
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        self.metadata_field("namespace")
    }

    /// Look up a nested value by a dotted path, e.g. `spec.replicas`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        parts.try_fold(self.content.get(first)?, |value, key| value.get(key))
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.content
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.content
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::DecodeFailed`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.content)?)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::DecodeFailed`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.content)?)
    }

    fn str_field(&self, key: &str) -> &str {
        self.content.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn metadata_field(&self, key: &str) -> &str {
        self.content
            .get("metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

impl KindedResource for StructuredObject {
    fn kind(&self) -> &str {
        StructuredObject::kind(self)
    }

    fn namespace(&self) -> &str {
        StructuredObject::namespace(self)
    }

    fn name(&self) -> &str {
        StructuredObject::name(self)
    }
}

/// Canonicalize one document through `reader` and decode it.
///
/// A missing `kind` is logged and tolerated; every other failure aborts.
///
/// # Errors
///
/// Propagates [`AssetReader::to_json`] failures and decode failures.
pub fn decode_document<R: AssetReader + ?Sized>(
    reader: &R,
    document: &str,
) -> Result<StructuredObject> {
    trace!("Decoding document:\n{}", document);
    let json = reader.to_json(document.as_bytes())?;
    let decoded = StructuredObject::from_json(&json)?;
    if !decoded.is_typed() {
        debug!("Document has no kind, keeping it as an untyped object");
    }
    Ok(decoded.into_object())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
