//! Tera templating for manifest assets.
//!
//! Assets are rendered with Tera against a JSON value tree supplied by the
//! caller (usually merged from YAML values files). Top-level keys of the
//! values are template variables:
//!
//! ```yaml
//! apiVersion: v1
//! kind: ServiceAccount
//! metadata:
//!   name: {{ name }}
//!   namespace: {{ namespace | default(value="default") }}
//!   labels:{{ labels | to_yaml | nindent(spaces=4) }}
//! ```
//!
//! # Helpers
//!
//! A `_helpers.tpl` asset is prepended to every sibling asset before
//! rendering, so `{% set %}` statements and `{% macro %}` definitions in it
//! are visible to them (macros are called through `self::`).
//!
//! # Missing keys
//!
//! See [`MissingKeyPolicy`]. Under `zero` an undefined variable renders as
//! an empty string, under `invalid` and `default` as `<no value>`, and under
//! `error` the render fails. An undefined bare condition (`{% if enabled %}`)
//! is false under the lenient policies and fails under `error` once its
//! branch is reached. `is defined` and the `default` filter read optional
//! values under every policy.

pub mod context;
pub mod filters;
pub mod renderer;
pub mod utils;
mod variables;

pub use context::{FilterFn, FunctionFn, FunctionTable, MissingKeyPolicy, RenderContext};
pub use filters::builtin_function_table;
pub use renderer::{TemplateRenderer, format_tera_error};
pub use utils::{deep_merge_json, parse_assignment};
