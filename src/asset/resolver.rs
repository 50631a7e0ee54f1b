//! Matching asset names against a directory query.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::AssetReader;
use crate::core::{KtmplError, Result};

/// Names from `reader` that live in `path`.
///
/// A name matches when its parent directory equals `path`, or, with
/// `recursive`, when its parent directory is `path` or lies below it.
/// Directories are compared component by component, so `base` does not match
/// `base-extra/x.yaml`. Names listed in `excluded` are skipped. The reader's
/// listing order is preserved.
///
/// # Errors
///
/// Returns [`KtmplError::NoAssetsMatched`] when nothing matches, and
/// propagates listing failures from the reader.
pub fn asset_names_in_path<R: AssetReader + ?Sized>(
    reader: &R,
    path: &str,
    excluded: &[String],
    recursive: bool,
) -> Result<Vec<String>> {
    let names = reader.asset_names()?;
    debug!("Resolving {} asset name(s) against path '{}'", names.len(), path);

    let results: Vec<String> = names
        .into_iter()
        .filter(|name| !is_excluded(name, excluded))
        .filter(|name| matches_path(name, path, recursive))
        .collect();

    if results.is_empty() {
        return Err(KtmplError::NoAssetsMatched {
            path: path.to_string(),
            excluded: excluded.to_vec(),
            recursive,
        });
    }

    debug!("Matched assets: {:?}", results);
    Ok(results)
}

/// Exact-name exclusion check.
#[must_use]
pub fn is_excluded(name: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|e| e == name)
}

/// Whether `name` belongs to the directory `path`.
#[must_use]
pub fn matches_path(name: &str, path: &str, recursive: bool) -> bool {
    let dir = normalize(Path::new(parent_dir(name)));
    let path = normalize(Path::new(path));
    if recursive {
        dir.starts_with(&path)
    } else {
        dir == path
    }
}

/// Parent directory of an asset name, `.` for top-level names.
#[must_use]
pub fn parent_dir(name: &str) -> &str {
    match name.rfind('/') {
        Some(0) => "/",
        Some(idx) => &name[..idx],
        None => ".",
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}
