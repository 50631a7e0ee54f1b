//! The rendering pipeline.
//!
//! [`TemplateProcessor`] ties the asset reader, the renderer, the document
//! splitter, the structuring layer and the ordering engine together:
//!
//! ```text
//! names -> bytes -> rendered text -> documents -> objects -> ordered objects
//! ```
//!
//! Every batch operation is fail-fast: the first failing asset aborts the
//! batch and no partial result is returned.
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
//! let reader = MemoryAssetReader::new()
//!     .with_asset("rbac/sa.yaml", "kind: ServiceAccount\nmetadata:\n  name: {{ name }}\n")
//!     .with_asset("rbac/ns.yaml", "kind: Namespace\nmetadata:\n  name: {{ name }}\n");
//! let processor = TemplateProcessor::new(reader, &Options::default())?;
//!
//! let objects = processor.template_resources_in_path_unstructured(
//!     "rbac",
//!     &[],
//!     false,
//!     &json!({ "name": "hub" }),
//! )?;
//! let kinds: Vec<&str> = objects.iter().map(|o| o.kind()).collect();
//! assert_eq!(kinds, ["Namespace", "ServiceAccount"]);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use tracing::{debug, warn};

use crate::asset::{self, AssetReader};
use crate::config::Options;
use crate::constants::{ANONYMOUS_TEMPLATE_NAME, HELPERS_FILE_NAME};
use crate::core::{KtmplError, Result};
use crate::document::Delimiter;
use crate::object::{self, StructuredObject};
use crate::ordering::{KindedResource, KindsOrder, OrderingPolicy, SortMode};
use crate::templating::{FunctionTable, RenderContext, TemplateRenderer, builtin_function_table};

/// Renders, structures and orders the assets of one reader.
///
/// Holds the reader, the immutable render context and both kind lists.
/// The active mode is the only mutable state and can only be changed through
/// `&mut self`; [`sort_with_mode`](Self::sort_with_mode) orders with an
/// explicit mode instead.
#[derive(Debug)]
pub struct TemplateProcessor<R: AssetReader> {
    reader: R,
    renderer: TemplateRenderer,
    create_update_order: KindsOrder,
    delete_order: KindsOrder,
    mode: SortMode,
}

impl<R: AssetReader> TemplateProcessor<R> {
    /// Build a processor with the built-in template helpers.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::InvalidDelimiter`] or
    /// [`KtmplError::DelimiterMismatch`] when the configured delimiter is
    /// unusable.
    pub fn new(reader: R, options: &Options) -> Result<Self> {
        Self::with_functions(reader, options, builtin_function_table())
    }

    /// Build a processor with a custom function table.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_functions(reader: R, options: &Options, functions: FunctionTable) -> Result<Self> {
        let context = options.render_context(functions)?;
        Ok(Self::from_parts(
            reader,
            context,
            options.kinds_order(SortMode::CreateUpdate),
            options.kinds_order(SortMode::Delete),
            options.mode,
        ))
    }

    /// Assemble a processor from already validated parts.
    pub fn from_parts(
        reader: R,
        context: RenderContext,
        create_update_order: KindsOrder,
        delete_order: KindsOrder,
        mode: SortMode,
    ) -> Self {
        for (list_mode, kinds) in
            [(SortMode::CreateUpdate, &create_update_order), (SortMode::Delete, &delete_order)]
        {
            let duplicates = kinds.duplicates();
            if !duplicates.is_empty() {
                warn!(
                    "Kinds listed more than once in the {} order, first position wins: {:?}",
                    list_mode, duplicates
                );
            }
        }
        Self {
            reader,
            renderer: TemplateRenderer::new(context),
            create_update_order,
            delete_order,
            mode,
        }
    }

    #[must_use]
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    #[must_use]
    pub fn delimiter(&self) -> &Delimiter {
        self.renderer.context().delimiter()
    }

    /// The kind list used for `mode`.
    #[must_use]
    pub const fn kinds_order(&self, mode: SortMode) -> &KindsOrder {
        match mode {
            SortMode::CreateUpdate => &self.create_update_order,
            SortMode::Delete => &self.delete_order,
        }
    }

    /// Names of the assets in `path`. See [`asset::asset_names_in_path`].
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::NoAssetsMatched`] when nothing matches.
    pub fn asset_names_in_path(
        &self,
        path: &str,
        excluded: &[String],
        recursive: bool,
    ) -> Result<Vec<String>> {
        asset::asset_names_in_path(&self.reader, path, excluded, recursive)
    }

    /// Raw bytes of every asset in `path`, in name order.
    ///
    /// # Errors
    ///
    /// Fails when nothing matches or any asset cannot be read.
    pub fn assets(&self, path: &str, excluded: &[String], recursive: bool) -> Result<Vec<Vec<u8>>> {
        self.asset_names_in_path(path, excluded, recursive)?
            .iter()
            .map(|name| self.reader.asset(name))
            .collect()
    }

    /// Render raw template bytes; `None` when the output is blank.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::InvalidEncoding`] for non UTF-8 input and
    /// [`KtmplError::RenderFailed`] when rendering fails.
    pub fn template_bytes(&self, bytes: &[u8], values: &Value) -> Result<Option<String>> {
        let content = utf8(ANONYMOUS_TEMPLATE_NAME, bytes)?;
        self.renderer.render(ANONYMOUS_TEMPLATE_NAME, content, values)
    }

    /// Render one named asset.
    ///
    /// An asset named `_helpers.tpl` is never rendered on its own and yields
    /// `None`. For every other asset, the `_helpers.tpl` in the same
    /// directory is prepended when it exists.
    ///
    /// # Errors
    ///
    /// Fails when the asset cannot be read, is not UTF-8, or does not render.
    pub fn template_resource(&self, name: &str, values: &Value) -> Result<Option<String>> {
        if file_name(name) == HELPERS_FILE_NAME {
            debug!("Skipping helpers asset {}", name);
            return Ok(None);
        }

        let helpers = match self.reader.asset(&helpers_for(name)) {
            Ok(bytes) => bytes,
            Err(KtmplError::AssetNotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        let body = self.reader.asset(name)?;
        debug!("Rendering asset {} ({} helper bytes)", name, helpers.len());

        let mut source = helpers;
        source.extend_from_slice(&body);
        let content = utf8(name, &source)?;
        self.renderer.render(name, content, values)
    }

    /// Render each asset in order, dropping blank results.
    ///
    /// # Errors
    ///
    /// Fails on the first asset that fails.
    pub fn template_resources<S: AsRef<str>>(&self, names: &[S], values: &Value) -> Result<Vec<String>> {
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            if let Some(rendered) = self.template_resource(name.as_ref(), values)? {
                results.push(rendered);
            }
        }
        Ok(results)
    }

    /// Split every payload into documents and decode them, keeping order.
    ///
    /// # Errors
    ///
    /// Fails on the first document that does not decode.
    pub fn bytes_array_to_unstructured<S: AsRef<str>>(
        &self,
        payloads: &[S],
    ) -> Result<Vec<StructuredObject>> {
        let mut objects = Vec::new();
        for payload in payloads {
            for document in self.delimiter().split(payload.as_ref()) {
                objects.push(self.bytes_to_unstructured(&document)?);
            }
        }
        Ok(objects)
    }

    /// Decode a single document through the reader's canonicalizer.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::DecodeFailed`] for malformed documents.
    pub fn bytes_to_unstructured(&self, document: &str) -> Result<StructuredObject> {
        object::decode_document(&self.reader, document)
    }

    /// Render, structure and sort the named assets with the active mode.
    ///
    /// # Errors
    ///
    /// Fails on the first render or decode failure.
    pub fn template_resources_unstructured<S: AsRef<str>>(
        &self,
        names: &[S],
        values: &Value,
    ) -> Result<Vec<StructuredObject>> {
        let rendered = self.template_resources(names, values)?;
        let mut objects = self.bytes_array_to_unstructured(&rendered)?;
        self.sort_for_apply(&mut objects);
        for object in &objects {
            debug!("Ordered {}/{}", object.kind(), object.name());
        }
        Ok(objects)
    }

    /// [`template_resources_unstructured`](Self::template_resources_unstructured)
    /// over the assets in `path`.
    ///
    /// # Errors
    ///
    /// Fails when nothing matches, or on the first render or decode failure.
    pub fn template_resources_in_path_unstructured(
        &self,
        path: &str,
        excluded: &[String],
        recursive: bool,
        values: &Value,
    ) -> Result<Vec<StructuredObject>> {
        let names = self.asset_names_in_path(path, excluded, recursive)?;
        self.template_resources_unstructured(&names, values)
    }

    /// Ordered objects of `path`, each serialized to YAML.
    ///
    /// # Errors
    ///
    /// See [`template_resources_in_path_unstructured`](Self::template_resources_in_path_unstructured).
    pub fn template_resources_in_path_yaml(
        &self,
        path: &str,
        excluded: &[String],
        recursive: bool,
        values: &Value,
    ) -> Result<Vec<String>> {
        let objects = self.template_resources_in_path_unstructured(path, excluded, recursive, values)?;
        to_yamls(&objects)
    }

    /// Sort with the active mode.
    pub fn sort_for_apply<T: KindedResource>(&self, resources: &mut [T]) {
        self.sort_with_mode(resources, self.mode);
    }

    /// Sort with an explicit mode, leaving the active mode untouched.
    pub fn sort_with_mode<T: KindedResource>(&self, resources: &mut [T], mode: SortMode) {
        OrderingPolicy::new(mode, self.kinds_order(mode)).sort(resources);
    }

    pub fn set_delete_order(&mut self) {
        self.mode = SortMode::Delete;
    }

    pub fn set_create_update_order(&mut self) {
        self.mode = SortMode::CreateUpdate;
    }

    #[must_use]
    pub const fn sort_mode(&self) -> SortMode {
        self.mode
    }

    /// Join serialized documents with the canonical delimiter literal.
    pub fn join_documents<S: AsRef<str>>(&self, documents: &[S]) -> String {
        self.delimiter().join(documents)
    }
}

/// Serialize every object to YAML, keeping order.
///
/// # Errors
///
/// Returns [`KtmplError::DecodeFailed`] if an object cannot be serialized.
pub fn to_yamls(objects: &[StructuredObject]) -> Result<Vec<String>> {
    objects.iter().map(StructuredObject::to_yaml).collect()
}

/// Serialize every object to pretty-printed JSON, keeping order.
///
/// # Errors
///
/// Returns [`KtmplError::DecodeFailed`] if an object cannot be serialized.
pub fn to_jsons(objects: &[StructuredObject]) -> Result<Vec<String>> {
    objects.iter().map(StructuredObject::to_json).collect()
}

fn utf8<'a>(name: &str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|_| KtmplError::InvalidEncoding {
        name: name.to_string(),
    })
}

fn file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// The helpers asset that applies to `name`.
fn helpers_for(name: &str) -> String {
    match asset::parent_dir(name) {
        "." => HELPERS_FILE_NAME.to_string(),
        "/" => format!("/{HELPERS_FILE_NAME}"),
        dir => format!("{dir}/{HELPERS_FILE_NAME}"),
    }
}

#[cfg(test)]
mod tests;
