//! `devtools clear-cache`: remove every known project from the Conan cache.

use anyhow::Result;
use clap::Args;

use super::common::Problems;
use crate::conan::{ConanCli, ensure_conan_available};
use crate::config::DevtoolsConfig;

/// Removes all known projects from the local Conan cache.
#[derive(Args, Debug)]
pub struct ClearCacheCommand {}

impl ClearCacheCommand {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Fails only when conan is unavailable; each failed removal is one problem.
    pub async fn execute(self, config: &DevtoolsConfig) -> Result<Problems> {
        ensure_conan_available()?;
        let conan = ConanCli;
        let mut problems = Problems::new();

        for project in config.projects() {
            let pattern = format!("{project}/*");
            if let Err(e) = conan.remove_from_cache(&pattern).await {
                problems.push(format!("Failed to remove {pattern} from the Conan cache: {e:#}"));
            }
        }

        Ok(problems)
    }
}
