//! `devtools export-deps`: fetch and export every missing dependency of a project.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::common::{Problems, resolve_project};
use crate::conan::PackageManager;
use crate::config::DevtoolsConfig;
use crate::core::DevtoolsError;
use crate::git::VersionControl;
use crate::models::ProjectSpec;
use crate::resolver::DependencyResolver;

/// Resolves all packages required by a single project and exports them to
/// the local Conan cache.
#[derive(Args, Debug)]
pub struct ExportDepsCommand {
    /// Project name. Derived from the working directory when omitted.
    #[arg(long, value_name = "PROJECT")]
    pub project: Option<ProjectSpec>,

    /// Profile name. A file of that name in the project's
    /// `buildtools/profiles` folder takes precedence over the Conan cache.
    #[arg(long, value_name = "PROFILE")]
    pub profile: String,
}

impl ExportDepsCommand {
    /// Runs the command against the given collaborators.
    ///
    /// # Errors
    ///
    /// Fails when the resolver's scratch directory cannot be created.
    pub async fn execute<V, P>(
        self,
        config: &DevtoolsConfig,
        cwd: &Path,
        vcs: &V,
        package_manager: &P,
    ) -> Result<Problems>
    where
        V: VersionControl,
        P: PackageManager,
    {
        let project = match resolve_project(config, self.project.as_ref(), cwd) {
            Ok(project) => project,
            Err(problem) => return Ok(vec![problem]),
        };
        if let Some(tag) = &project.reference {
            tracing::warn!("Ignoring tag {} of {}; dependencies are resolved for the current checkout", tag, project.name);
        }

        let recipe = config.recipe_path(&project.name);
        if !recipe.is_file() {
            return Ok(vec![
                DevtoolsError::RecipeNotFound {
                    path: recipe.display().to_string(),
                }
                .to_string(),
            ]);
        }
        let profile =
            package_manager.resolve_profile(&self.profile, Some(&config.profile_dir(&project.name)));

        let resolver = DependencyResolver::new(config, vcs, package_manager)?;
        let problems = resolver.resolve(&recipe, &profile).await;
        if !problems.is_empty() {
            tracing::info!("Failed to resolve dependencies for {}", project.name);
        }
        Ok(problems.iter().map(ToString::to_string).collect())
    }
}
