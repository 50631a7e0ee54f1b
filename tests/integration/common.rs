//! Test project scaffolding for the integration suite.

// Not every helper is used by every test file.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use ktmpl_cli::test_utils::write_rbac_fixtures;
use tempfile::TempDir;

/// A temporary manifest tree the `ktmpl` binary runs against.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    /// A project with the three RBAC assets under `test/`.
    pub fn with_rbac() -> Self {
        let project = Self::new();
        write_rbac_fixtures(project.root()).unwrap();
        project
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn root_arg(&self) -> String {
        self.root().to_string_lossy().into_owned()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// A `ktmpl` command with a clean environment and the project as cwd.
    pub fn ktmpl(&self) -> Command {
        let mut cmd = Command::cargo_bin("ktmpl").unwrap();
        cmd.current_dir(self.root()).env_remove("KTMPL_CONFIG").env_remove("RUST_LOG");
        cmd
    }
}

/// Top-level `kind:` values of a rendered YAML stream, in order.
pub fn kinds_of(stdout: &str) -> Vec<String> {
    stdout.lines().filter_map(|l| l.strip_prefix("kind: ")).map(str::to_string).collect()
}

pub fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
