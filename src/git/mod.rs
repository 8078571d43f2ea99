//! Git operations for devtools
//!
//! The version-control collaborator of the exporter and resolver is expressed
//! as the [`VersionControl`] trait. The production implementation, [`Git`],
//! drives the system `git` binary through [`GitCommand`], the same way Cargo
//! does with `git-fetch-with-cli`: SSH agents, credential helpers and user
//! configuration all work without extra setup.
//!
//! # Examples
//!
//! ```rust,no_run
//! use conan_devtools::git::{Git, VersionControl};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let git = Git;
//! let repo = git.open(Path::new("/home/me/dev/math/source")).await?;
//! if !git.is_detached(&repo).await? {
//!     println!("on branch {}", git.current_branch(&repo).await?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod command_builder;

pub use command_builder::{CloneOptions, GitCommand};

use crate::core::DevtoolsError;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Version-control operations consumed by the exporter and resolver.
///
/// Every method blocks its caller until the underlying operation finishes;
/// callers run them strictly one after another.
#[allow(async_fn_in_trait)]
pub trait VersionControl {
    /// Handle to an opened repository.
    type Repo;

    /// Opens the working tree at `path`.
    async fn open(&self, path: &Path) -> Result<Self::Repo>;

    /// Whether HEAD points directly at a commit.
    async fn is_detached(&self, repo: &Self::Repo) -> Result<bool>;

    /// Name of the checked-out branch. Only meaningful when not detached.
    async fn current_branch(&self, repo: &Self::Repo) -> Result<String>;

    /// Full hash of the commit HEAD points at.
    async fn current_commit(&self, repo: &Self::Repo) -> Result<String>;

    /// Checks out a branch, tag or commit.
    async fn checkout(&self, repo: &Self::Repo, reference: &str) -> Result<()>;

    /// Clones `url` into `target`.
    async fn clone_repo(&self, url: &str, target: &Path, options: &CloneOptions)
    -> Result<Self::Repo>;
}

/// A local git working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Creates a handle without validating the path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the working tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `<path>/.git` exists (directory, or file for worktrees and submodules).
    #[must_use]
    pub fn has_git_dir(&self) -> bool {
        self.path.join(".git").exists()
    }
}

/// [`VersionControl`] backed by the system git binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git;

impl VersionControl for Git {
    type Repo = GitRepo;

    async fn open(&self, path: &Path) -> Result<GitRepo> {
        // rev-parse alone would accept any directory nested in a repository
        if !path.is_dir() || !GitRepo::new(path).has_git_dir() {
            return Err(DevtoolsError::GitRepoInvalid {
                path: path.display().to_string(),
            }
            .into());
        }

        GitCommand::git_dir().current_dir(path).execute_success().await.map_err(|e| {
            match e.downcast_ref::<DevtoolsError>() {
                Some(DevtoolsError::GitNotFound) => e,
                _ => DevtoolsError::GitRepoInvalid {
                    path: path.display().to_string(),
                }
                .into(),
            }
        })?;

        Ok(GitRepo::new(path))
    }

    async fn is_detached(&self, repo: &GitRepo) -> Result<bool> {
        let head = GitCommand::head_ref().current_dir(repo.path()).execute_stdout().await?;
        Ok(head == "HEAD")
    }

    async fn current_branch(&self, repo: &GitRepo) -> Result<String> {
        GitCommand::current_branch().current_dir(repo.path()).execute_stdout().await
    }

    async fn current_commit(&self, repo: &GitRepo) -> Result<String> {
        GitCommand::current_commit().current_dir(repo.path()).execute_stdout().await
    }

    async fn checkout(&self, repo: &GitRepo, reference: &str) -> Result<()> {
        GitCommand::checkout(reference).current_dir(repo.path()).execute_success().await
    }

    async fn clone_repo(&self, url: &str, target: &Path, options: &CloneOptions) -> Result<GitRepo> {
        tracing::info!("Cloning repository from {} to {}", url, target.display());
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        GitCommand::clone(url, target, options).execute_success().await?;
        Ok(GitRepo::new(target))
    }
}

impl Git {
    /// Opens `target` when it already holds a checkout, otherwise clones `url`
    /// into it with submodules.
    ///
    /// # Errors
    ///
    /// Propagates open and clone failures.
    pub async fn open_or_clone(&self, url: &str, target: &Path) -> Result<GitRepo> {
        if GitRepo::new(target).has_git_dir() {
            tracing::info!("Opening existing repository at {}", target.display());
            self.open(target).await
        } else {
            let options = CloneOptions {
                recurse_submodules: true,
                ..CloneOptions::default()
            };
            self.clone_repo(url, target, &options).await
        }
    }
}

/// Checks if Git is installed and accessible on the system.
#[must_use]
pub fn is_git_installed() -> bool {
    std::process::Command::new(crate::utils::platform::get_git_command())
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Fails with [`DevtoolsError::GitNotFound`] when git is unavailable.
///
/// # Errors
///
/// Returns `GitNotFound` if `git --version` cannot be run.
pub fn ensure_git_available() -> Result<()> {
    if !is_git_installed() {
        return Err(DevtoolsError::GitNotFound.into());
    }
    Ok(())
}
