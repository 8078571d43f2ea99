//! `devtools export`: export project recipes into the Conan cache.

use anyhow::Result;
use clap::Args;

use super::common::{Problems, select_projects};
use crate::conan::PackageManager;
use crate::config::DevtoolsConfig;
use crate::export::PackageExporter;
use crate::git::VersionControl;
use crate::models::ProjectSpec;

/// Exports all known or the listed projects.
///
/// By default the current checkout is exported. For `name/tag` the tag is
/// checked out first; either way the working tree ends up where it started.
#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Projects to export, as `name` or `name/tag`. Defaults to every known project.
    #[arg(long, num_args = 0.., value_name = "PROJECT")]
    pub projects: Vec<ProjectSpec>,
}

impl ExportCommand {
    /// Runs the command against the given collaborators.
    ///
    /// # Errors
    ///
    /// Never fails as a whole; each failed export is one problem.
    pub async fn execute<V, P>(self, config: &DevtoolsConfig, vcs: &V, package_manager: &P) -> Result<Problems>
    where
        V: VersionControl,
        P: PackageManager,
    {
        let exporter = PackageExporter::new(vcs, package_manager);
        let mut problems = Problems::new();

        for spec in select_projects(config, &self.projects) {
            let source = config.source_dir(&spec.name);
            if let Err(e) = exporter.export(&source, spec.reference.as_deref()).await {
                tracing::debug!("Export of {} failed: {:?}", spec, e);
                problems.push(e.to_string());
            }
        }

        Ok(problems)
    }
}
