//! Asset sources and name resolution.
//!
//! The pipeline never touches storage directly. Everything it needs from the
//! outside world goes through the [`AssetReader`] trait:
//! - fetch the raw bytes of one asset by name
//! - list every available asset name
//! - canonicalize a document to JSON before it is decoded
//!
//! Two implementations ship with the crate:
//! - [`FsAssetReader`] serves a directory tree
//! - [`MemoryAssetReader`] serves an in-memory map, useful for embedding
//!   manifests in a binary and for tests
//!
//! Asset names are `/`-separated relative paths such as `base/namespace.yaml`.

mod fs;
mod memory;
mod resolver;

pub use fs::FsAssetReader;
pub use memory::MemoryAssetReader;
pub use resolver::{asset_names_in_path, is_excluded, matches_path, parent_dir};

use crate::core::Result;

/// Read access to a named collection of template assets.
///
/// Implementations are called synchronously; any timeout or retry policy
/// belongs to the implementation.
pub trait AssetReader {
    /// Return the raw content of `name`.
    ///
    /// Must return [`KtmplError::AssetNotFound`](crate::core::KtmplError::AssetNotFound)
    /// when no such asset exists; the processor relies on that variant to
    /// treat a missing helpers partial as absent.
    fn asset(&self, name: &str) -> Result<Vec<u8>>;

    /// List the names of every available asset.
    fn asset_names(&self) -> Result<Vec<String>>;

    /// Convert one document to JSON.
    ///
    /// The default implementation parses YAML, which is a superset of JSON.
    fn to_json(&self, document: &[u8]) -> Result<Vec<u8>> {
        yaml_to_json(document)
    }
}

impl<T: AssetReader + ?Sized> AssetReader for &T {
    fn asset(&self, name: &str) -> Result<Vec<u8>> {
        (**self).asset(name)
    }

    fn asset_names(&self) -> Result<Vec<String>> {
        (**self).asset_names()
    }

    fn to_json(&self, document: &[u8]) -> Result<Vec<u8>> {
        (**self).to_json(document)
    }
}

impl<T: AssetReader + ?Sized> AssetReader for Box<T> {
    fn asset(&self, name: &str) -> Result<Vec<u8>> {
        (**self).asset(name)
    }

    fn asset_names(&self) -> Result<Vec<String>> {
        (**self).asset_names()
    }

    fn to_json(&self, document: &[u8]) -> Result<Vec<u8>> {
        (**self).to_json(document)
    }
}

/// Convert a YAML document to compact JSON bytes.
///
/// A document holding only blank lines and comments converts to `null`.
///
/// # Errors
///
/// Returns [`KtmplError::DecodeFailed`](crate::core::KtmplError::DecodeFailed)
/// for malformed YAML or YAML that has no JSON equivalent (non-string keys).
pub fn yaml_to_json(document: &[u8]) -> Result<Vec<u8>> {
    let comments_only = String::from_utf8_lossy(document).lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if comments_only {
        return Ok(b"null".to_vec());
    }
    let value: serde_json::Value = serde_yaml::from_slice(document)?;
    Ok(serde_json::to_vec(&value)?)
}
