//! Immutable rendering configuration.
//!
//! A [`RenderContext`] is assembled once per processor and shared by every
//! render call. It bundles the template function table, the missing-key
//! policy and the document delimiter.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tera::{Tera, Value};

use crate::constants::NO_VALUE_PLACEHOLDER;
use crate::document::Delimiter;

/// A template filter: `{{ value | name(arg=...) }}`.
pub type FilterFn =
    Arc<dyn Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// A template function: `{{ name(arg=...) }}`.
pub type FunctionFn = Arc<dyn Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// What happens when a template references a key that the values lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Substitute the zero value, an empty string.
    #[default]
    Zero,
    /// Fail the render.
    Error,
    /// Substitute the literal `<no value>`.
    Invalid,
    /// Engine default; behaves like [`MissingKeyPolicy::Invalid`].
    Default,
}

impl MissingKeyPolicy {
    /// Text injected for a missing key, or `None` when missing keys are fatal.
    #[must_use]
    pub const fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Zero => Some(""),
            Self::Error => None,
            Self::Invalid | Self::Default => Some(NO_VALUE_PLACEHOLDER),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Error => "error",
            Self::Invalid => "invalid",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for MissingKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingKeyPolicy {
    type Err = String;

    /// Accepts both `zero` and the long `missingkey=zero` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("missingkey=").unwrap_or(s) {
            "zero" => Ok(Self::Zero),
            "error" => Ok(Self::Error),
            "invalid" => Ok(Self::Invalid),
            "default" => Ok(Self::Default),
            other => Err(format!(
                "unknown missing-key policy '{other}', expected zero, error, invalid or default"
            )),
        }
    }
}

/// Named filters and functions made available to every template.
#[derive(Clone, Default)]
pub struct FunctionTable {
    filters: BTreeMap<String, FilterFn>,
    functions: BTreeMap<String, FunctionFn>,
}

impl FunctionTable {
    /// An empty table. See [`builtin_function_table`](super::filters::builtin_function_table)
    /// for the default helpers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a filter.
    #[must_use]
    pub fn with_filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Add or replace a function.
    #[must_use]
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Merge `other` into this table; entries of `other` win on name clashes.
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        self.filters.extend(other.filters.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        self.functions.extend(other.functions.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        self
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Register every entry on a Tera instance.
    pub(crate) fn install(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            let filter = Arc::clone(filter);
            tera.register_filter(name, move |value: &Value, args: &HashMap<String, Value>| {
                filter(value, args)
            });
        }
        for (name, function) in &self.functions {
            let function = Arc::clone(function);
            tera.register_function(name, move |args: &HashMap<String, Value>| function(args));
        }
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Everything a render call needs besides the template and its values.
#[derive(Debug, Clone)]
pub struct RenderContext {
    functions: FunctionTable,
    missing_key: MissingKeyPolicy,
    delimiter: Delimiter,
}

impl RenderContext {
    pub fn new(functions: FunctionTable, missing_key: MissingKeyPolicy, delimiter: Delimiter) -> Self {
        Self {
            functions,
            missing_key,
            delimiter,
        }
    }

    #[must_use]
    pub const fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    #[must_use]
    pub const fn missing_key(&self) -> MissingKeyPolicy {
        self.missing_key
    }

    #[must_use]
    pub const fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(
            super::filters::builtin_function_table(),
            MissingKeyPolicy::default(),
            Delimiter::default(),
        )
    }
}
