//! Command-line interface for devtools.
//!
//! # Available Commands
//!
//! - `clone` - Clone all known or the listed projects
//! - `export` - Export projects to the local Conan cache
//! - `export-deps` - Fetch and export every missing dependency of one project
//! - `clear-cache` - Remove all known projects from the local Conan cache
//! - `install` - Run `conan install` for one project
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only show errors
//! - `--config` - Path to a configuration file
//! - `--root-dir` - Directory holding `devtools.toml` (also `DEVTOOLS_ROOT_DIR`)
//!
//! # Example
//!
//! ```bash
//! # Get every project and pin math to a release
//! devtools clone --projects math/v1.2.0
//!
//! # Make everything math needs available to Conan
//! cd ~/dev/projects/math/source && devtools export-deps --profile clang
//! ```
//!
//! Every command produces a list of problems. An empty list means success.

mod clear_cache;
mod clone;
pub mod common;
mod export;
mod export_deps;
mod install;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::conan::ConanCli;
use crate::config::DevtoolsConfig;
use crate::git::Git;
use common::Problems;

/// Main CLI structure for devtools.
#[derive(Parser, Debug)]
#[command(
    name = "devtools",
    about = "Developer tools for a family of Conan projects",
    version,
    long_about = "devtools clones, exports and resolves the dependencies of a set of git-hosted Conan projects."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing `devtools.toml`.
    #[arg(long, global = true, env = "DEVTOOLS_ROOT_DIR", value_name = "DIR")]
    root_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone all known or the listed projects.
    Clone(clone::CloneCommand),

    /// Export projects to the local Conan cache.
    Export(export::ExportCommand),

    /// Resolve all packages required by one project and export them to the local Conan cache.
    ExportDeps(export_deps::ExportDepsCommand),

    /// Remove all known projects from the local Conan cache.
    ClearCache(clear_cache::ClearCacheCommand),

    /// Run `conan install` for one project.
    Install(install::InstallCommand),
}

impl Cli {
    /// Sets up logging, loads the configuration and runs the command.
    ///
    /// # Errors
    ///
    /// Configuration failures and command failures that are not problems.
    pub async fn execute(self) -> Result<Problems> {
        self.init_logging();

        let config_path = DevtoolsConfig::locate(self.config.as_deref(), self.root_dir.as_deref())?;
        let config = DevtoolsConfig::load(&config_path).await?;
        let cwd = std::env::current_dir().context("Failed to determine the current directory")?;

        self.execute_with_config(&config, &cwd).await
    }

    /// Runs the command with an already loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_with_config(self, config: &DevtoolsConfig, cwd: &Path) -> Result<Problems> {
        match self.command {
            Commands::Clone(cmd) => cmd.execute(config).await,
            Commands::Export(cmd) => cmd.execute(config, &Git, &ConanCli).await,
            Commands::ExportDeps(cmd) => cmd.execute(config, cwd, &Git, &ConanCli).await,
            Commands::ClearCache(cmd) => cmd.execute(config).await,
            Commands::Install(cmd) => cmd.execute(config, cwd).await,
        }
    }

    /// Filter directive implied by `--verbose` and `--quiet`.
    fn default_log_directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// `RUST_LOG` wins over the flags.
    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_log_directive()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.verbose)
            .without_time()
            .with_writer(std::io::stderr)
            .try_init();
    }
}
