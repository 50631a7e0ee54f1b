//! Arguments and setup shared by the CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use tracing::debug;

use crate::asset::FsAssetReader;
use crate::config::Options;
use crate::ordering::SortMode;
use crate::processor::TemplateProcessor;
use crate::templating::{MissingKeyPolicy, deep_merge_json, parse_assignment};

/// Which assets to process.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory, relative to `--root`, whose assets are processed
    pub path: String,

    /// Root directory of the asset tree
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Asset name to skip, relative to the root (repeatable)
    #[arg(long = "exclude", value_name = "NAME")]
    pub excluded: Vec<String>,

    /// Include assets in subdirectories of PATH
    #[arg(short, long)]
    pub recursive: bool,
}

/// Command-line overrides of the options file.
#[derive(Args, Debug, Clone, Default)]
pub struct ProcessorArgs {
    /// Sort mode: create-update or delete
    #[arg(long, value_name = "MODE")]
    pub order: Option<SortMode>,

    /// Missing key policy: zero, error, invalid or default
    #[arg(long, value_name = "POLICY")]
    pub missing_key: Option<MissingKeyPolicy>,

    /// Regular expression separating documents
    #[arg(long, value_name = "REGEX")]
    pub delimiter: Option<String>,

    /// Canonical delimiter text used between output documents; `\n` is expanded
    #[arg(long, value_name = "TEXT")]
    pub delimiter_string: Option<String>,
}

impl ProcessorArgs {
    /// Apply every override that was given.
    pub fn apply(&self, options: &mut Options) {
        if let Some(mode) = self.order {
            options.mode = mode;
        }
        if let Some(policy) = self.missing_key {
            options.missing_key = policy;
        }
        if let Some(ref delimiter) = self.delimiter {
            options.delimiter.clone_from(delimiter);
        }
        if let Some(ref literal) = self.delimiter_string {
            options.delimiter_string = unescape_newlines(literal);
        }
    }
}

/// Options resolved from the config file and the overrides.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub options: Options,
}

impl CommandContext {
    /// Load `config_path` when given, then apply `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>, overrides: &ProcessorArgs) -> Result<Self> {
        let mut options = match config_path {
            Some(path) => {
                debug!("Loading options from {}", path.display());
                Options::load_from(path)?
            }
            None => Options::default(),
        };
        overrides.apply(&mut options);
        Ok(Self {
            options,
        })
    }

    /// A processor over the directory tree at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory or the delimiter is
    /// invalid.
    pub fn processor(&self, root: &Path) -> Result<TemplateProcessor<FsAssetReader>> {
        if !root.is_dir() {
            anyhow::bail!("Asset root {} is not a directory", root.display());
        }
        TemplateProcessor::new(FsAssetReader::new(root), &self.options)
            .context("Invalid processor options")
    }
}

/// Merge values files in order, then apply `--set` assignments.
///
/// # Errors
///
/// Returns an error if a file cannot be read, is not a YAML mapping, or an
/// assignment is malformed.
pub fn load_values(files: &[PathBuf], assignments: &[String]) -> Result<Value> {
    let mut values = Value::Object(Map::new());
    for file in files {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read values file {}", file.display()))?;
        if content.trim().is_empty() {
            continue;
        }
        let layer: Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse values file {}", file.display()))?;
        match &layer {
            Value::Null => continue,
            Value::Object(_) => values = deep_merge_json(values, &layer),
            _ => anyhow::bail!("Values file {} must contain a mapping", file.display()),
        }
    }
    for assignment in assignments {
        let layer = parse_assignment(assignment)
            .map_err(|e| anyhow::anyhow!("Invalid --set '{assignment}': {e}"))?;
        values = deep_merge_json(values, &layer);
    }
    Ok(values)
}

fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
