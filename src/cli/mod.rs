//! Command-line interface for ktmpl.
//!
//! # Commands
//!
//! - `render` - render the assets of a directory and print the ordered documents
//! - `list` - print the asset names a directory query selects
//! - `kinds` - print the effective kind order with its weights
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--config` / `-c` - TOML options file (also `KTMPL_CONFIG`)
//!
//! `RUST_LOG`, when set, takes precedence over `--verbose` and `--quiet`.
//!
//! # Examples
//!
//! ```bash
//! # Render everything below manifests/base, values from two files
//! ktmpl render base --root manifests -r -f values.yaml -f prod.yaml
//!
//! # Teardown order, one value overridden
//! ktmpl render base --root manifests --order delete --set image.tag=v2
//!
//! # Show the built-in delete order
//! ktmpl kinds --order delete
//! ```

mod common;
mod kinds;
mod list;
mod render;


pub use common::{CommandContext, ProcessorArgs, SourceArgs, load_values};
pub use render::OutputFormat;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level for the subscriber; `RUST_LOG` overrides it.
    pub log_level: String,
    pub config_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(
    name = "ktmpl",
    about = "Render templated Kubernetes manifests in dependency-safe order",
    version,
    long_about = "ktmpl renders a directory of Tera-templated manifests with YAML values and \
                  prints the resulting objects ordered by kind, for create/update or for delete."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Options file (TOML)
    #[arg(short, long, global = true, env = "KTMPL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render templates and print the ordered documents
    Render(render::RenderCommand),
    /// List the assets a path selects
    List(list::ListCommand),
    /// Print the effective kind order
    Kinds(kinds::KindsCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Propagates the command's failure; `main` turns it into a
    /// user-facing message.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };
        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let config_path = config.config_path.as_deref();
        match self.command {
            Commands::Render(cmd) => cmd.execute(config_path),
            Commands::List(cmd) => cmd.execute(config_path),
            Commands::Kinds(cmd) => cmd.execute(config_path),
        }
    }
}
