//! Builder for `conan` invocations
//!
//! Mirrors [`GitCommand`](crate::git::GitCommand): every call logs its full
//! command line under the `conan` target, runs with a timeout and maps spawn
//! and exit failures onto [`DevtoolsError`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::DevtoolsError;
use crate::utils::platform::get_conan_command;

/// Builder for constructing and executing Conan commands.
///
/// # Examples
///
/// ```rust,no_run
/// use conan_devtools::conan::ConanCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// ConanCommand::export("/home/me/dev/math/source").execute_success().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConanCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    capture_output: bool,
    timeout_duration: Option<Duration>,
}

impl Default for ConanCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            capture_output: true,
            // Installs may build dependencies from source.
            timeout_duration: Some(Duration::from_secs(3600)),
        }
    }
}

/// Output of a finished Conan command.
pub struct ConanCommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Whether the process exited with status zero
    pub success: bool,
}

impl ConanCommand {
    /// Creates an empty command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory of the process.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Lets conan write straight to the terminal.
    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    /// Runs the command and returns its output whatever the exit status.
    ///
    /// # Errors
    ///
    /// [`DevtoolsError::ConanNotFound`] when the binary cannot be spawned,
    /// [`DevtoolsError::ConanCommandError`] on timeout.
    pub async fn execute_unchecked(self) -> Result<ConanCommandOutput> {
        let conan = get_conan_command();
        tracing::debug!(target: "conan", "Executing command: {} {}", conan, self.args.join(" "));

        let mut cmd = Command::new(conan);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        if self.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        let map_spawn = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::Error::from(DevtoolsError::ConanNotFound)
            } else {
                anyhow::Error::from(e).context(format!("Failed to execute conan {}", self.args.join(" ")))
            }
        };

        let output = match self.timeout_duration {
            Some(duration) => match timeout(duration, cmd.output()).await {
                Ok(result) => result.map_err(map_spawn)?,
                Err(_) => {
                    tracing::warn!(
                        target: "conan",
                        "Command timed out after {} seconds: conan {}",
                        duration.as_secs(),
                        self.args.join(" ")
                    );
                    return Err(DevtoolsError::ConanCommandError {
                        operation: self.operation(),
                        stderr: format!("Conan command timed out after {} seconds", duration.as_secs()),
                    }
                    .into());
                }
            },
            None => cmd.output().await.map_err(map_spawn)?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            tracing::debug!(target: "conan", "Command failed with exit code: {:?}", output.status.code());
        }

        Ok(ConanCommandOutput {
            stdout,
            stderr,
            success: output.status.success(),
        })
    }

    /// Runs the command and fails on a non-zero exit status.
    ///
    /// # Errors
    ///
    /// As [`execute_unchecked`](Self::execute_unchecked), plus
    /// [`DevtoolsError::ConanCommandError`] carrying stderr on failure.
    pub async fn execute(self) -> Result<ConanCommandOutput> {
        let operation = self.operation();
        let output = self.execute_unchecked().await?;
        if !output.success {
            return Err(DevtoolsError::ConanCommandError {
                operation,
                stderr: if output.stderr.trim().is_empty() {
                    output.stdout
                } else {
                    output.stderr
                },
            }
            .into());
        }
        Ok(output)
    }

    /// Runs the command and discards its output.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await.context("Conan command failed")?;
        Ok(())
    }
}

// Convenience builders for the commands devtools issues

impl ConanCommand {
    /// `conan export <source>`
    pub fn export(source: impl AsRef<Path>) -> Self {
        Self::new().arg("export").arg(source.as_ref().display().to_string())
    }

    /// `conan graph info <recipe> -pr:h=<host> -pr:b=<build> --format=json`
    pub fn graph_info(recipe: impl AsRef<Path>, host_profile: &str, build_profile: &str) -> Self {
        Self::new()
            .args(["graph", "info"])
            .arg(recipe.as_ref().display().to_string())
            .arg(format!("-pr:h={host_profile}"))
            .arg(format!("-pr:b={build_profile}"))
            .arg("--format=json")
    }

    /// `conan remove -c <pattern>`
    pub fn remove(pattern: &str) -> Self {
        Self::new().args(["remove", "-c", pattern])
    }

    /// `conan install -pr:h=<p> -pr:b=<p> --build=<b>... -of=<output> <source>`
    pub fn install(source: impl AsRef<Path>, profile: &str, build: &[String], output_folder: &Path) -> Self {
        Self::new()
            .arg("install")
            .arg(format!("-pr:h={profile}"))
            .arg(format!("-pr:b={profile}"))
            .args(build.iter().map(|b| format!("--build={b}")))
            .arg(format!("-of={}", output_folder.display()))
            .arg(source.as_ref().display().to_string())
    }
}
