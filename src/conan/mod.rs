//! Package-manager operations for devtools
//!
//! The exporter and resolver only see the [`PackageManager`] trait. The
//! production implementation, [`ConanCli`], shells out to the Conan 2 command
//! line through [`ConanCommand`].
//!
//! Graph construction distinguishes three results:
//! - a resolved graph or a structured error, both as [`GraphOutcome`]
//! - a [`GraphLoadError`] when Conan could not express the failure as a graph
//!   document; its text is all the caller has to go on

mod command_builder;
mod graph;

pub use command_builder::{ConanCommand, ConanCommandOutput};

use crate::core::DevtoolsError;
use crate::models::PackageReference;
use crate::utils::platform::{command_exists, get_conan_command};
use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result of a graph attempt that produced a graph document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphOutcome {
    /// Every requirement was found
    Resolved,
    /// The first blocking requirement is absent from the cache
    Missing(PackageReference),
    /// Any other structured graph error
    Other {
        /// Error kind as reported by the package manager
        kind: String,
        /// Requirement the error is about, when known
        reference: Option<PackageReference>,
        /// Free-form detail
        message: Option<String>,
    },
}

/// Graph construction failed without a structured description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GraphLoadError {
    message: String,
}

impl GraphLoadError {
    /// Wraps the failure text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The raw failure text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Package-manager operations consumed by the exporter and resolver.
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    /// Exports the recipe in `source` into the local cache.
    async fn export(&self, source: &Path) -> Result<()>;

    /// Builds the dependency graph of `recipe`.
    async fn load_graph(
        &self,
        recipe: &Path,
        host_profile: &str,
        build_profile: &str,
    ) -> Result<GraphOutcome, GraphLoadError>;

    /// Resolves a profile name: a file of that name under `search_path` wins,
    /// otherwise the name is left for the package manager to look up.
    fn resolve_profile(&self, name: &str, search_path: Option<&Path>) -> String {
        search_path
            .map(|dir| dir.join(name))
            .filter(|candidate| candidate.is_file())
            .map_or_else(|| name.to_string(), |candidate| candidate.display().to_string())
    }
}

/// Options for `conan install`.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Profile used for both host and build context
    pub profile: String,
    /// Values for `--build`
    pub build: Vec<String>,
    /// Output folder
    pub output_folder: PathBuf,
}

/// [`PackageManager`] backed by the `conan` executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConanCli;

impl PackageManager for ConanCli {
    async fn export(&self, source: &Path) -> Result<()> {
        tracing::info!("Exporting {} to the Conan cache", source.display());
        ConanCommand::export(source).execute_success().await
    }

    async fn load_graph(
        &self,
        recipe: &Path,
        host_profile: &str,
        build_profile: &str,
    ) -> Result<GraphOutcome, GraphLoadError> {
        let output = ConanCommand::graph_info(recipe, host_profile, build_profile)
            .execute_unchecked()
            .await
            .map_err(|e| GraphLoadError::new(format!("{e:#}")))?;
        graph::parse_graph_output(&output.stdout, &output.stderr)
    }
}

impl ConanCli {
    /// Removes every recipe matching `pattern` from the local cache.
    ///
    /// # Errors
    ///
    /// Fails when conan cannot be run or exits with an error.
    pub async fn remove_from_cache(&self, pattern: &str) -> Result<()> {
        tracing::info!("Removing {} from the Conan cache", pattern);
        ConanCommand::remove(pattern).inherit_stdio().execute_success().await
    }

    /// Installs the dependencies of the recipe in `source`.
    ///
    /// # Errors
    ///
    /// Fails when conan cannot be run or exits with an error.
    pub async fn install(&self, source: &Path, options: &InstallOptions) -> Result<()> {
        tracing::info!(
            "Installing {} with profile {} into {}",
            source.display(),
            options.profile,
            options.output_folder.display()
        );
        ConanCommand::install(source, &options.profile, &options.build, &options.output_folder)
            .inherit_stdio()
            .with_timeout(None)
            .execute_success()
            .await
    }
}

/// Fails with [`DevtoolsError::ConanNotFound`] when `conan` is not on `PATH`.
///
/// # Errors
///
/// Returns `ConanNotFound` if the executable cannot be located.
pub fn ensure_conan_available() -> Result<()> {
    if !command_exists(get_conan_command()) {
        return Err(DevtoolsError::ConanNotFound.into());
    }
    Ok(())
}
