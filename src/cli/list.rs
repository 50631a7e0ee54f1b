//! `ktmpl list`: show which assets a path selects.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, ProcessorArgs, SourceArgs};
use crate::constants::HELPERS_FILE_NAME;

/// Print the asset names selected by PATH, one per line.
///
/// Helpers partials are listed too, marked as such, because they take part
/// in rendering their siblings.
#[derive(Args, Debug)]
pub struct ListCommand {
    #[command(flatten)]
    source: SourceArgs,
}

impl ListCommand {
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        for line in self.lines(config_path)? {
            println!("{line}");
        }
        Ok(())
    }

    pub fn lines(&self, config_path: Option<&Path>) -> Result<Vec<String>> {
        let context = CommandContext::load(config_path, &ProcessorArgs::default())?;
        let processor = context.processor(&self.source.root)?;
        let names = processor.asset_names_in_path(
            &self.source.path,
            &self.source.excluded,
            self.source.recursive,
        )?;
        Ok(names
            .into_iter()
            .map(|name| {
                if name.rsplit('/').next() == Some(HELPERS_FILE_NAME) {
                    format!("{name} {}", "(helpers)".dimmed())
                } else {
                    name
                }
            })
            .collect())
    }
}
