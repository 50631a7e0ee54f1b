//! Directory-backed asset reader.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::AssetReader;
use crate::core::{KtmplError, Result};

/// Serves every regular file below `root`.
///
/// Asset names are paths relative to `root` with `/` separators, listed in
/// lexicographic order so that runs over the same tree are reproducible.
#[derive(Debug, Clone)]
pub struct FsAssetReader {
    root: PathBuf,
}

impl FsAssetReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an asset name onto the filesystem, refusing names that escape `root`.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(KtmplError::AssetNotFound {
                name: name.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl AssetReader for FsAssetReader {
    fn asset(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => KtmplError::AssetNotFound {
                name: name.to_string(),
            },
            _ => KtmplError::AssetReadFailed {
                name: name.to_string(),
                reason: e.to_string(),
            },
        })
    }

    fn asset_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| KtmplError::AssetReadFailed {
                name: self.root.display().to_string(),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
        names.sort();
        debug!("Found {} asset(s) under {}", names.len(), self.root.display());
        Ok(names)
    }
}
