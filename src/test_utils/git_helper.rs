//! Git test helper utilities
//!
//! Provides a small wrapper around the git binary for building throwaway
//! repositories in tests.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git command runner bound to one test repository.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    fn run_git_command(&self, args: &[&str], action: &str) -> Result<std::process::Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| action.to_string())?;

        if !output.status.success() {
            bail!("{} failed: {}", action, String::from_utf8_lossy(&output.stderr));
        }

        Ok(output)
    }

    /// Create a new TestGit instance for the given repository path
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Creates `path`, initialises a repository with one commit and leaves it
    /// on branch `main`.
    pub fn init_on_main(path: impl Into<PathBuf>) -> Result<Self> {
        let git = Self::new(path);
        std::fs::create_dir_all(&git.repo_path)?;
        git.init()?;
        git.config_user()?;
        git.write_file("README.md", "# test project\n")?;
        git.add_all()?;
        git.commit("Initial commit")?;
        git.ensure_branch("main")?;
        Ok(git)
    }

    /// Initialize a new git repository
    pub fn init(&self) -> Result<()> {
        self.run_git_command(&["init"], "Failed to initialize git repository")?;
        Ok(())
    }

    /// Configure git user for tests
    pub fn config_user(&self) -> Result<()> {
        self.run_git_command(
            &["config", "user.email", "test@devtools.example"],
            "Failed to configure git user email",
        )?;
        self.run_git_command(
            &["config", "user.name", "Test User"],
            "Failed to configure git user name",
        )?;
        Ok(())
    }

    /// Write a file relative to the repository root
    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.repo_path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Add all files to staging
    pub fn add_all(&self) -> Result<()> {
        self.run_git_command(&["add", "."], "Failed to add files to git")?;
        Ok(())
    }

    /// Create a commit with the given message
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run_git_command(&["commit", "-m", message], "Failed to create git commit")?;
        Ok(())
    }

    /// Create a tag
    pub fn tag(&self, tag_name: &str) -> Result<()> {
        self.run_git_command(&["tag", tag_name], &format!("Failed to create tag: {}", tag_name))?;
        Ok(())
    }

    /// Ensure we're on a specific branch, creating it if it doesn't exist
    pub fn ensure_branch(&self, branch_name: &str) -> Result<()> {
        if self.checkout(branch_name).is_ok() {
            return Ok(());
        }
        self.create_branch(branch_name)
    }

    /// Return the repository path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Checkout a branch or commit
    pub fn checkout(&self, ref_name: &str) -> Result<()> {
        self.run_git_command(&["checkout", ref_name], &format!("Failed to checkout: {}", ref_name))?;
        Ok(())
    }

    /// Detach HEAD at the current commit
    pub fn detach(&self) -> Result<()> {
        self.run_git_command(&["checkout", "--detach"], "Failed to detach HEAD")?;
        Ok(())
    }

    /// Create and checkout a branch
    pub fn create_branch(&self, branch_name: &str) -> Result<()> {
        self.run_git_command(
            &["checkout", "-b", branch_name],
            &format!("Failed to create branch: {}", branch_name),
        )?;
        Ok(())
    }

    /// Get current commit hash
    pub fn get_commit_hash(&self) -> Result<String> {
        let output = self.run_git_command(&["rev-parse", "HEAD"], "Failed to get commit hash")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Get the current branch name; empty when detached
    pub fn get_current_branch(&self) -> Result<String> {
        let output = self
            .run_git_command(&["branch", "--show-current"], "Failed to get current branch name")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
