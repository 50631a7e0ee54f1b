//! ktmpl - templated Kubernetes manifests, rendered and ordered
//!
//! Renders a directory of Tera-templated manifests with caller-supplied
//! values and orders the resulting objects so that they can be created,
//! updated or deleted without tripping over kind-level dependencies:
//! namespaces before the objects living in them, RBAC before the workloads
//! using it, and the reverse for teardown.
//!
//! # Pipeline
//!
//! ```text
//! AssetReader --names/bytes--> TemplateRenderer --text--> Delimiter::split
//!     --documents--> decode_document --objects--> OrderingPolicy::sort
//! ```
//!
//! # Core Modules
//!
//! - [`asset`] - the [`AssetReader`](asset::AssetReader) seam, directory and
//!   in-memory readers, path queries
//! - [`templating`] - Tera rendering, helper filters, missing-key policies
//! - [`document`] - splitting and joining multi-document payloads
//! - [`object`] - generic structured objects decoded from documents
//! - [`ordering`] - kind lists, sort modes and the ordering engine
//! - [`processor`] - the [`TemplateProcessor`](processor::TemplateProcessor)
//!   tying it all together
//!
//! ## Supporting Modules
//!
//! - [`config`] - [`Options`](config::Options) and their TOML form
//! - [`core`] - error types and user-facing error formatting
//! - [`constants`] - shared defaults
//! - [`cli`] - the `ktmpl` command line
//!
//! # Example
//!
//! ```rust
//! use ktmpl_cli::asset::MemoryAssetReader;
//! use ktmpl_cli::config::Options;
//! use ktmpl_cli::processor::TemplateProcessor;
//! use serde_json::json;
//!
//! # fn main() -> ktmpl_cli::core::Result<()> {
//! let reader = MemoryAssetReader::new().with_asset(
//!     "app/all.yaml",
//!     "kind: Deployment\nmetadata:\n  name: {{ app }}\n---\nkind: Namespace\nmetadata:\n  name: {{ app }}\n",
//! );
//! let mut processor = TemplateProcessor::new(reader, &Options::default())?;
//! let values = json!({ "app": "web" });
//!
//! let apply = processor.template_resources_in_path_yaml("app", &[], false, &values)?;
//! assert!(apply[0].contains("kind: Namespace"));
//!
//! processor.set_delete_order();
//! let delete = processor.template_resources_in_path_yaml("app", &[], false, &values)?;
//! assert!(delete[0].contains("kind: Deployment"));
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod document;
pub mod object;
pub mod ordering;
pub mod processor;
pub mod templating;

// test_utils is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
