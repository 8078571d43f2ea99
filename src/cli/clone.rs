//! `devtools clone`: fetch project sources into the project directory.

use anyhow::Result;
use clap::Args;

use super::common::{Problems, select_projects};
use crate::config::DevtoolsConfig;
use crate::git::{Git, VersionControl};
use crate::models::ProjectSpec;

/// Clones all known or the listed projects.
///
/// Projects already present under `<project_dir>/<name>/source` are opened
/// instead of cloned. A `name/tag` entry is checked out after opening.
#[derive(Args, Debug)]
pub struct CloneCommand {
    /// Projects to clone, as `name` or `name/tag`. Defaults to every known project.
    #[arg(long, num_args = 0.., value_name = "PROJECT")]
    pub projects: Vec<ProjectSpec>,
}

impl CloneCommand {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Fails only if git is not installed; per-project failures are problems.
    pub async fn execute(self, config: &DevtoolsConfig) -> Result<Problems> {
        crate::git::ensure_git_available()?;
        let mut problems = Problems::new();

        for spec in select_projects(config, &self.projects) {
            let url = config.repository_url(&spec.name);
            let source = config.source_dir(&spec.name);

            let repo = match Git.open_or_clone(&url, &source).await {
                Ok(repo) => repo,
                Err(e) => {
                    problems.push(format!("Failed to clone {} into {}: {e}", url, source.display()));
                    continue;
                }
            };

            if let Some(reference) = &spec.reference {
                tracing::info!("Checking out {} in {}", reference, source.display());
                if let Err(e) = Git.checkout(&repo, reference).await {
                    tracing::debug!("{:#}", e);
                    problems.push(format!(
                        "Failed to checkout {} for {} at {}",
                        reference,
                        url,
                        source.display()
                    ));
                }
            }
        }

        Ok(problems)
    }
}
