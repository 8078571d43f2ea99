//! Helpers shared by the devtools commands

use colored::Colorize;
use std::path::Path;

use crate::config::DevtoolsConfig;
use crate::core::DevtoolsError;
use crate::models::ProjectSpec;

/// Human-readable descriptions of everything that went wrong in a command.
pub type Problems = Vec<String>;

/// Projects a multi-project command works on: every known project when none
/// were requested, otherwise the known ones among the request.
#[must_use]
pub fn select_projects(config: &DevtoolsConfig, requested: &[ProjectSpec]) -> Vec<ProjectSpec> {
    if requested.is_empty() {
        config.all_projects()
    } else {
        config.filter_known(requested)
    }
}

/// The project a single-project command works on.
///
/// Without an explicit project it is derived from `cwd`, which must lie
/// inside the project directory.
///
/// # Errors
///
/// Returns the problem to report when no known project can be determined.
pub fn resolve_project(
    config: &DevtoolsConfig,
    requested: Option<&ProjectSpec>,
    cwd: &Path,
) -> Result<ProjectSpec, String> {
    let spec = match requested {
        Some(spec) => spec.clone(),
        None => config.project_from_dir(cwd).map(ProjectSpec::named).ok_or_else(|| {
            DevtoolsError::ProjectNotDerivable {
                cwd: cwd.display().to_string(),
            }
            .to_string()
        })?,
    };

    if config.is_known(&spec.name) {
        tracing::debug!("Working on project {}", spec);
        Ok(spec)
    } else {
        Err(DevtoolsError::UnknownProject {
            name: spec.name,
        }
        .to_string())
    }
}

/// Prints the outcome of a command and returns whether it succeeded.
pub fn report(problems: &[String]) -> bool {
    if problems.is_empty() {
        println!("{}", "devtools ran successfully.".green());
        return true;
    }

    eprintln!("{}", "devtools encountered the following problems:".red().bold());
    for problem in problems {
        eprintln!("  - {problem}");
    }
    false
}
