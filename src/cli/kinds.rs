//! `ktmpl kinds`: print the effective kind order.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, ProcessorArgs};
use crate::ordering::{OrderingPolicy, SortMode};

/// Print the kinds in the order they are applied (or deleted), with weights.
#[derive(Args, Debug)]
pub struct KindsCommand {
    /// Sort mode to show; defaults to the configured mode
    #[arg(long, value_name = "MODE")]
    order: Option<SortMode>,
}

impl KindsCommand {
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        for line in self.lines(config_path)? {
            println!("{line}");
        }
        Ok(())
    }

    pub fn lines(&self, config_path: Option<&Path>) -> Result<Vec<String>> {
        let overrides = ProcessorArgs {
            order: self.order,
            ..ProcessorArgs::default()
        };
        let options = CommandContext::load(config_path, &overrides)?.options;
        let mode = options.mode;
        let kinds = options.kinds_order(mode);
        let policy = OrderingPolicy::new(mode, &kinds);

        let mut lines: Vec<String> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| format!("{i:>3}  {kind}"))
            .collect();
        let unlisted = format!("{:>3}  {}", policy.default_weight(), "<unlisted kinds>".dimmed());
        match mode {
            SortMode::CreateUpdate => lines.push(unlisted),
            SortMode::Delete => lines.insert(0, unlisted),
        }
        Ok(lines)
    }
}
