//! In-memory asset reader.

use std::collections::BTreeMap;

use super::AssetReader;
use crate::core::{KtmplError, Result};

/// Assets held in a sorted map, listed in name order.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    assets: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_asset(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(name, content);
        self
    }

    /// Add or replace an asset.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.assets.insert(name.into(), content.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl<N, C> FromIterator<(N, C)> for MemoryAssetReader
where
    N: Into<String>,
    C: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut reader = Self::new();
        for (name, content) in iter {
            reader.insert(name, content);
        }
        reader
    }
}

impl AssetReader for MemoryAssetReader {
    fn asset(&self, name: &str) -> Result<Vec<u8>> {
        self.assets.get(name).cloned().ok_or_else(|| KtmplError::AssetNotFound {
            name: name.to_string(),
        })
    }

    fn asset_names(&self) -> Result<Vec<String>> {
        Ok(self.assets.keys().cloned().collect())
    }
}
