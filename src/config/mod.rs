//! Processor options and their TOML representation.
//!
//! Every key is optional; omitted keys keep their defaults.
//!
//! ```toml
//! # create-update (default) or delete
//! kinds-order = "create-update"
//! # zero (default), error, invalid or default
//! missing-key = "zero"
//! delimiter = "(?m)^-{3}$"
//! delimiter-string = "---\n"
//!
//! # Replaces the built-in lists when present
//! create-update-kinds-order = ["Namespace", "ServiceAccount", "ClusterRole"]
//! delete-kinds-order = ["ClusterRole", "ServiceAccount", "Namespace"]
//! ```
//!
//! When only `create-update-kinds-order` is given, the delete order stays
//! the built-in one; the two lists are independent.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::constants::{KUBERNETES_YAMLS_DELIMITER, KUBERNETES_YAMLS_DELIMITER_STRING};
use crate::core::{KtmplError, Result};
use crate::document::Delimiter;
use crate::ordering::{KindsOrder, SortMode};
use crate::templating::{FunctionTable, MissingKeyPolicy, RenderContext};

/// Construction inputs of a [`TemplateProcessor`](crate::processor::TemplateProcessor).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Options {
    /// Initial sort mode.
    #[serde(rename = "kinds-order", alias = "mode")]
    pub mode: SortMode,
    /// Regular expression separating documents inside one rendered asset.
    pub delimiter: String,
    /// Canonical delimiter text used when joining documents.
    pub delimiter_string: String,
    pub missing_key: MissingKeyPolicy,
    /// Custom create/update list; `None` selects the built-in list.
    pub create_update_kinds_order: Option<KindsOrder>,
    /// Custom delete list; `None` selects the reverse of the built-in list.
    pub delete_kinds_order: Option<KindsOrder>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: SortMode::default(),
            delimiter: KUBERNETES_YAMLS_DELIMITER.to_string(),
            delimiter_string: KUBERNETES_YAMLS_DELIMITER_STRING.to_string(),
            missing_key: MissingKeyPolicy::default(),
            create_update_kinds_order: None,
            delete_kinds_order: None,
        }
    }
}

impl Options {
    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not match the
    /// schema above.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options from {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse options from {}", path.display()))
    }

    /// Parse options from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::ConfigError`] on invalid TOML or unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| KtmplError::ConfigError {
            message: e.to_string(),
        })
    }

    /// The list in effect for `mode`.
    #[must_use]
    pub fn kinds_order(&self, mode: SortMode) -> KindsOrder {
        match mode {
            SortMode::CreateUpdate => self
                .create_update_kinds_order
                .clone()
                .unwrap_or_else(KindsOrder::default_create_update),
            SortMode::Delete => {
                self.delete_kinds_order.clone().unwrap_or_else(KindsOrder::default_delete)
            }
        }
    }

    /// Validate the delimiter and bundle it with `functions`.
    ///
    /// # Errors
    ///
    /// Returns [`KtmplError::InvalidDelimiter`] or
    /// [`KtmplError::DelimiterMismatch`] from [`Delimiter::new`].
    pub fn render_context(&self, functions: FunctionTable) -> Result<RenderContext> {
        let delimiter = Delimiter::new(&self.delimiter, &self.delimiter_string)?;
        Ok(RenderContext::new(functions, self.missing_key, delimiter))
    }
}
