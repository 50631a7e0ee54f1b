//! `ktmpl render`: render and order the assets of a directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use super::common::{CommandContext, ProcessorArgs, SourceArgs, load_values};
use crate::processor::{to_jsons, to_yamls};

/// Serialization of the output documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Render templates and print the ordered documents.
///
/// Documents are separated by the canonical delimiter (`---` by default),
/// so the output can be piped straight into `kubectl apply -f -`.
#[derive(Args, Debug)]
pub struct RenderCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// YAML file with template values; later files override earlier ones (repeatable)
    #[arg(short = 'f', long = "values", value_name = "FILE")]
    values: Vec<PathBuf>,

    /// Set a value, e.g. `image.tag=v2` (repeatable, applied after --values)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    #[command(flatten)]
    processor: ProcessorArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,
}

impl RenderCommand {
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let rendered = self.render(config_path)?;
        std::io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .context("Failed to write output")?;
        Ok(())
    }

    /// Produce the full output text.
    pub fn render(&self, config_path: Option<&Path>) -> Result<String> {
        let context = CommandContext::load(config_path, &self.processor)?;
        let processor = context.processor(&self.source.root)?;
        let values = load_values(&self.values, &self.set)?;

        let objects = processor
            .template_resources_in_path_unstructured(
                &self.source.path,
                &self.source.excluded,
                self.source.recursive,
                &values,
            )
            .with_context(|| format!("Failed to render assets in '{}'", self.source.path))?;
        info!(
            "Rendered {} object(s) from '{}' in {} order",
            objects.len(),
            self.source.path,
            processor.sort_mode()
        );

        let documents = match self.format {
            OutputFormat::Yaml => to_yamls(&objects)?,
            OutputFormat::Json => to_jsons(&objects)?,
        };
        let mut output = processor.join_documents(&documents);
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        Ok(output)
    }
}
