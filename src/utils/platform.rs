//! Platform-specific helpers for locating external tools and resolving paths.
//!
//! devtools shells out to two external programs, `git` and `conan`. This module
//! hides the executable-name differences between Windows and Unix-like systems
//! and provides the path expansion used when reading `project_dir` from the
//! configuration file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use conan_devtools::utils::platform::{get_git_command, resolve_path};
//!
//! # fn example() -> anyhow::Result<()> {
//! let projects = resolve_path("~/dev/projects")?;
//! println!("{} lives under {}", get_git_command(), projects.display());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the home directory path for the current user.
///
/// # Errors
///
/// Returns an error when neither `HOME` (Unix) nor `USERPROFILE` (Windows)
/// can be resolved.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Returns the appropriate Git command name for the current platform.
///
/// - `"git.exe"` on Windows
/// - `"git"` on Unix-like systems (macOS, Linux, BSD)
///
/// The executable must still be reachable through `PATH`.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Returns the appropriate Conan command name for the current platform.
///
/// Conan is usually installed into a Python virtual environment, whose
/// `Scripts` (Windows) or `bin` (Unix) directory is expected on `PATH`.
#[must_use]
pub const fn get_conan_command() -> &'static str {
    if is_windows() {
        "conan.exe"
    } else {
        "conan"
    }
}

/// Checks whether a command can be found on `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Resolves a path with tilde expansion and environment variable substitution.
///
/// Only `~/` (the current user's home) is supported for tilde expansion;
/// `$VAR` and `${VAR}` are expanded with `shellexpand`.
///
/// # Examples
///
/// ```rust,no_run
/// use conan_devtools::utils::platform::resolve_path;
///
/// # fn example() -> anyhow::Result<()> {
/// let dir = resolve_path("$HOME/dev/projects")?;
/// assert!(dir.is_absolute());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error for `~user` forms, for undefined environment variables,
/// or when the home directory is unknown.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = if let Some(stripped) = path.strip_prefix("~/") {
        get_home_dir()?.join(stripped)
    } else if path == "~" {
        get_home_dir()?
    } else if path.starts_with('~') {
        return Err(anyhow::anyhow!(
            "Invalid path: {path}\n\n\
            Tilde expansion only supports '~/' for home directory.\n\
            Use '~/' followed by a relative path, like '~/dev/projects'"
        ));
    } else {
        PathBuf::from(path)
    };

    let path_str = expanded.to_string_lossy();
    let expanded_str = shellexpand::env(&path_str)
        .with_context(|| {
            format!(
                "Failed to expand environment variables in path: {path_str}\n\n\
                Common issues:\n\
                - Undefined environment variable (e.g., $UNDEFINED_VAR)\n\
                - Invalid variable syntax (use $VAR or ${{VAR}})"
            )
        })?
        .into_owned();

    Ok(PathBuf::from(expanded_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        if is_windows() {
            assert_eq!(get_git_command(), "git.exe");
            assert_eq!(get_conan_command(), "conan.exe");
        } else {
            assert_eq!(get_git_command(), "git");
            assert_eq!(get_conan_command(), "conan");
        }
    }

    #[test]
    fn test_resolve_path_tilde() {
        let home = get_home_dir().unwrap();
        assert_eq!(resolve_path("~/dev").unwrap(), home.join("dev"));
        assert_eq!(resolve_path("~").unwrap(), home);
    }

    #[test]
    fn test_resolve_path_rejects_other_user() {
        assert!(resolve_path("~someone/dev").is_err());
    }

    #[test]
    fn test_resolve_path_plain() {
        assert_eq!(resolve_path("/opt/projects").unwrap(), PathBuf::from("/opt/projects"));
    }

    #[test]
    fn test_resolve_path_undefined_variable() {
        let result = resolve_path("$DEVTOOLS_SURELY_UNDEFINED_VARIABLE/projects");
        assert!(result.is_err());
    }
}
