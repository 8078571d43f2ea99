//! Type-safe Git command builder for consistent command execution
//!
//! All git invocations in devtools go through [`GitCommand`], which runs the
//! system `git` binary with `-C <dir>`, applies a timeout, captures output and
//! turns non-zero exits into typed [`DevtoolsError`] values.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::DevtoolsError;
use crate::utils::platform::get_git_command;

/// Options for cloning a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Fetch only the tip commit (`--depth 1`)
    pub shallow: bool,
    /// Initialise and update submodules after cloning
    pub recurse_submodules: bool,
    /// Branch or tag to check out instead of the remote HEAD
    pub branch: Option<String>,
}

impl CloneOptions {
    /// Shallow clone of `branch`, the shape used for scratch clones.
    pub fn shallow(branch: impl Into<String>) -> Self {
        Self {
            shallow: true,
            recurse_submodules: false,
            branch: Some(branch.into()),
        }
    }

    /// Enables submodule checkout.
    #[must_use]
    pub const fn with_submodules(mut self) -> Self {
        self.recurse_submodules = true;
        self
    }
}

/// Builder for constructing and executing Git commands with consistent error handling.
///
/// # Examples
///
/// ```rust,no_run
/// use conan_devtools::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let branch = GitCommand::current_branch()
///     .current_dir("/path/to/repo")
///     .execute_stdout()
///     .await?;
/// println!("on {branch}");
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: 5 minutes
/// - **Output capture**: Enabled
/// - **Working directory**: Current process directory
pub struct GitCommand {
    /// Command arguments to pass to Git (e.g., ["clone", "url", "path"])
    args: Vec<String>,

    /// Working directory, passed to git as `-C <dir>`
    current_dir: Option<PathBuf>,

    /// Whether to capture command output (true) or inherit stdio (false)
    capture_output: bool,

    /// Maximum duration to wait for command completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional context string for log messages
    context: Option<String>,

    /// For clone commands, the URL for error messages
    clone_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            capture_output: true,
            timeout_duration: Some(Duration::from_secs(300)),
            context: None,
            clone_url: None,
        }
    }
}

impl GitCommand {
    /// Creates a new Git command builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the repository directory the command runs against.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument to the Git command.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to the Git command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Disables output capture, letting git write straight to the terminal.
    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context for logging (e.g., project name)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    /// Execute the command and return the output
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let full_args = self.full_args();
        let prefix = self.context.as_ref().map(|ctx| format!("({ctx}) ")).unwrap_or_default();

        tracing::debug!(target: "git", "{}Executing command: {} {}", prefix, git_command, full_args.join(" "));

        let mut cmd = Command::new(git_command);
        cmd.args(&full_args);
        if self.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        anyhow::Error::from(DevtoolsError::GitNotFound)
                    } else {
                        anyhow::Error::from(e)
                            .context(format!("Failed to execute git {}", full_args.join(" ")))
                    }
                })?,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(DevtoolsError::GitCommandError {
                        operation: self.args.first().cloned().unwrap_or_else(|| "unknown".to_string()),
                        stderr: format!(
                            "Git command timed out after {} seconds. Try running it manually: git {}",
                            duration.as_secs(),
                            full_args.join(" ")
                        ),
                    }
                    .into());
                }
            }
        } else {
            output_future
                .await
                .context(format!("Failed to execute git {}", full_args.join(" ")))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(target: "git", "{}Command failed with exit code: {:?}", prefix, output.status.code());
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "{}Error: {}", prefix, stderr.trim());
            }

            let error = match self.args.first().map(String::as_str) {
                Some("clone") => DevtoolsError::GitCloneFailed {
                    url: self.clone_url.unwrap_or_else(|| "unknown".to_string()),
                    reason: stderr,
                },
                Some("checkout") => DevtoolsError::GitCheckoutFailed {
                    reference: self.args.get(1).cloned().unwrap_or_default(),
                    reason: stderr,
                },
                operation => DevtoolsError::GitCommandError {
                    operation: operation.unwrap_or("unknown").to_string(),
                    stderr: if stderr.is_empty() { stdout } else { stderr },
                },
            };
            return Err(error.into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "git", "{}{}", prefix, stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::trace!(target: "git", "{}{}", prefix, stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "git::perf",
                "{}Git {} took {:.2}s",
                prefix,
                self.args.first().map_or("unknown", String::as_str),
                elapsed.as_secs_f64()
            );
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute the command and return only stdout as a trimmed string
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute the command and check for success
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Output from a Git command
#[derive(Debug)]
pub struct GitCommandOutput {
    /// Standard output from the Git command
    pub stdout: String,
    /// Standard error output from the Git command
    pub stderr: String,
}

// Convenience builders for common Git operations

impl GitCommand {
    /// Create a clone command honouring `options`
    pub fn clone(url: &str, target: impl AsRef<Path>, options: &CloneOptions) -> Self {
        let mut cmd = Self::new().arg("clone");
        if options.shallow {
            cmd = cmd.args(["--depth", "1"]);
        }
        if options.recurse_submodules {
            cmd = cmd.arg("--recurse-submodules");
            if options.shallow {
                cmd = cmd.arg("--shallow-submodules");
            }
        }
        if let Some(branch) = &options.branch {
            cmd = cmd.args(["-b", branch.as_str()]);
        }
        cmd = cmd.arg(url).arg(target.as_ref().display().to_string());
        cmd.clone_url = Some(url.to_string());
        cmd
    }

    /// Create a checkout command
    ///
    /// The reference is always the second argument; error mapping relies on it.
    /// The trailing `--` makes git reject a reference that only names a path
    /// instead of restoring that path from the index.
    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", ref_name, "--"])
    }

    /// Create a command to get the current commit hash
    pub fn current_commit() -> Self {
        Self::new().args(["rev-parse", "HEAD"])
    }

    /// Create a command to get the current branch; prints nothing when detached
    pub fn current_branch() -> Self {
        Self::new().args(["branch", "--show-current"])
    }

    /// Create a command printing the symbolic name of HEAD; `HEAD` when detached
    pub fn head_ref() -> Self {
        Self::new().args(["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Create a command that succeeds only inside a git working tree
    pub fn git_dir() -> Self {
        Self::new().args(["rev-parse", "--git-dir"])
    }

    /// Create a `git --version` command
    pub fn version() -> Self {
        Self::new().arg("--version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_basic() {
        let cmd = GitCommand::new().arg("status").arg("--short");
        assert_eq!(cmd.args, vec!["status", "--short"]);
    }

    #[test]
    fn test_command_builder_with_dir() {
        let cmd = GitCommand::new().current_dir("/tmp/repo").arg("status");
        assert_eq!(cmd.current_dir, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(cmd.full_args(), vec!["-C", "/tmp/repo", "status"]);
    }

    #[test]
    fn test_clone_builder_full() {
        let cmd = GitCommand::clone("https://example.com/repo.git", "/tmp/target", &CloneOptions::default());
        assert_eq!(cmd.args, vec!["clone", "https://example.com/repo.git", "/tmp/target"]);
        assert_eq!(cmd.clone_url.as_deref(), Some("https://example.com/repo.git"));
    }

    #[test]
    fn test_clone_builder_shallow_with_submodules() {
        let options = CloneOptions::shallow("v1.2.3").with_submodules();
        let cmd = GitCommand::clone("https://example.com/repo.git", "/tmp/target", &options);
        assert_eq!(
            cmd.args,
            vec![
                "clone",
                "--depth",
                "1",
                "--recurse-submodules",
                "--shallow-submodules",
                "-b",
                "v1.2.3",
                "https://example.com/repo.git",
                "/tmp/target"
            ]
        );
    }

    #[test]
    fn test_checkout_builder() {
        let cmd = GitCommand::checkout("v1.0");
        assert_eq!(cmd.args, vec!["checkout", "v1.0", "--"]);
    }

    #[test]
    fn test_head_ref_builder() {
        let cmd = GitCommand::head_ref();
        assert_eq!(cmd.args, vec!["rev-parse", "--abbrev-ref", "HEAD"]);
    }

    #[tokio::test]
    async fn test_git_version() {
        let output = GitCommand::version().execute_stdout().await.unwrap();
        assert!(output.starts_with("git version"));
    }

    #[tokio::test]
    async fn test_checkout_outside_repo_maps_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = GitCommand::checkout("nowhere")
            .current_dir(temp.path())
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DevtoolsError>(),
            Some(DevtoolsError::GitCheckoutFailed { reference, .. }) if reference == "nowhere"
        ));
    }
}
