//! `devtools install`: run `conan install` for a single project.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::common::{Problems, resolve_project};
use crate::conan::{ConanCli, InstallOptions, PackageManager};
use crate::config::DevtoolsConfig;
use crate::core::DevtoolsError;
use crate::models::ProjectSpec;

/// Installs the dependencies of a single project.
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Project name. Derived from the working directory when omitted.
    #[arg(long, value_name = "PROJECT")]
    pub project: Option<ProjectSpec>,

    /// Profile name. A file of that name in the project's
    /// `buildtools/profiles` folder takes precedence over the Conan cache.
    #[arg(long, value_name = "PROFILE")]
    pub profile: String,

    /// Values passed to `--build`.
    #[arg(long, num_args = 0.., default_values_t = vec!["missing:*".to_string()])]
    pub build: Vec<String>,

    /// Output folder. Relative paths are taken from `<project_dir>/<project>`.
    #[arg(long = "output-folder", visible_alias = "of", default_value = "build")]
    pub output_folder: PathBuf,
}

impl InstallCommand {
    /// Resolves what `conan install` would be run with, or the problem that
    /// prevents it.
    fn plan(&self, config: &DevtoolsConfig, cwd: &Path) -> Result<(PathBuf, InstallOptions), String> {
        let project = resolve_project(config, self.project.as_ref(), cwd)?;

        let recipe = config.recipe_path(&project.name);
        if !recipe.is_file() {
            return Err(DevtoolsError::RecipeNotFound {
                path: recipe.display().to_string(),
            }
            .to_string());
        }

        let output_folder = if self.output_folder.is_absolute() {
            self.output_folder.clone()
        } else {
            config.project_root(&project.name).join(&self.output_folder)
        };

        let options = InstallOptions {
            profile: ConanCli.resolve_profile(&self.profile, Some(&config.profile_dir(&project.name))),
            build: self.build.clone(),
            output_folder,
        };
        Ok((config.source_dir(&project.name), options))
    }

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Fails when conan cannot be run or the install fails.
    pub async fn execute(self, config: &DevtoolsConfig, cwd: &Path) -> Result<Problems> {
        match self.plan(config, cwd) {
            Ok((source, options)) => {
                ConanCli.install(&source, &options).await?;
                Ok(Problems::new())
            }
            Err(problem) => Ok(vec![problem]),
        }
    }
}
