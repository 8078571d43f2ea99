//! Common fixtures for devtools integration tests

// Not every test module uses every helper
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use conan_devtools::config::{CONFIG_FILE_NAME, DevtoolsConfig};
use conan_devtools::test_utils::TestGit;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A devtools root directory with a configuration file and a project tree.
pub struct TestWorkspace {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root_dir: PathBuf,
    project_dir: PathBuf,
}

impl TestWorkspace {
    /// Creates the workspace and writes `devtools.toml` listing `projects`.
    pub fn new(projects: &[&str]) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root_dir = temp_dir.path().join("tools");
        let project_dir = temp_dir.path().join("projects");
        fs::create_dir_all(&root_dir)?;
        fs::create_dir_all(&project_dir)?;

        let list = projects.iter().map(|p| format!("\"{p}\"")).collect::<Vec<_>>().join(", ");
        fs::write(
            root_dir.join(CONFIG_FILE_NAME),
            format!(
                "project_dir = \"{}\"\norganization = \"acme\"\nprojects = [{list}]\n",
                project_dir.display().to_string().replace('\\', "/")
            ),
        )?;

        Ok(Self {
            _temp_dir: temp_dir,
            root_dir,
            project_dir,
        })
    }

    /// Directory holding `devtools.toml`.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Root of the project tree.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// `<project_dir>/<name>/source`
    pub fn source_dir(&self, name: &str) -> PathBuf {
        self.project_dir.join(name).join("source")
    }

    /// Loads the workspace configuration the way the binary does.
    pub async fn config(&self) -> Result<DevtoolsConfig> {
        DevtoolsConfig::load(&self.root_dir.join(CONFIG_FILE_NAME)).await
    }

    /// Creates a project repository on `main` with a recipe, tagged `v1.0`,
    /// and one more commit on top of the tag.
    ///
    /// `VERSION` reads `1.0` at the tag and `dev` on `main`.
    pub fn add_project(&self, name: &str) -> Result<TestGit> {
        let git = TestGit::init_on_main(self.source_dir(name))?;
        git.write_file("conanfile.py", &format!("from conan import ConanFile\n\nclass Recipe(ConanFile):\n    name = \"{name}\"\n"))?;
        git.write_file("VERSION", "1.0")?;
        git.add_all()?;
        git.commit("Add recipe")?;
        git.tag("v1.0")?;
        git.write_file("VERSION", "dev")?;
        git.add_all()?;
        git.commit("Start next version")?;
        Ok(git)
    }

    /// The `devtools` binary pointed at this workspace.
    pub fn devtools(&self) -> Command {
        let mut cmd = Command::cargo_bin("devtools").expect("devtools binary is built");
        cmd.env("DEVTOOLS_ROOT_DIR", &self.root_dir)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .current_dir(&self.project_dir);
        cmd
    }
}
