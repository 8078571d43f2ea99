//! Error handling for devtools
//!
//! Two layers cooperate here:
//!
//! - [`DevtoolsError`] enumerates the failure modes of the external tools and of
//!   configuration handling. Library code returns it wrapped in `anyhow::Error`.
//! - [`ErrorContext`] pairs an error with optional details and a suggestion. The
//!   binary converts whatever escapes a command through [`user_friendly_error`]
//!   and prints it with terminal colors.
//!
//! Failures of the export/resolve core do not travel through this module: they
//! are folded into problem lists (see [`crate::export::ExportError`] and
//! [`crate::resolver::ResolutionProblem`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use conan_devtools::core::{DevtoolsError, user_friendly_error};
//!
//! let error = anyhow::Error::from(DevtoolsError::ConanNotFound);
//! let context = user_friendly_error(error);
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Failure modes of external tools, configuration and project lookup.
#[derive(Error, Debug, Clone)]
pub enum DevtoolsError {
    /// Git operation failed during execution
    ///
    /// Raised when a git command exits non-zero and no more specific variant
    /// applies.
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g., "rev-parse", "branch")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Path exists but is not a git working tree
    #[error("Not a valid git repository: {path}")]
    GitRepoInvalid {
        /// The path that was expected to contain a git repository
        path: String,
    },

    /// Git repository clone failed
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone
        url: String,
        /// The reason for the clone failure
        reason: String,
    },

    /// Git checkout failed
    #[error("Failed to checkout reference '{reference}'")]
    GitCheckoutFailed {
        /// The git reference (branch, tag, or commit) that failed to checkout
        reference: String,
        /// The reason for the checkout failure
        reason: String,
    },

    /// Conan operation failed during execution
    #[error("Conan operation failed: {operation}")]
    ConanCommandError {
        /// The conan subcommand that failed (e.g., "export", "remove")
        operation: String,
        /// The error output from the conan command
        stderr: String,
    },

    /// Conan executable not found in PATH
    #[error("Conan is not installed or not found in PATH")]
    ConanNotFound,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Where the configuration was looked up
        path: String,
    },

    /// Invalid configuration file syntax
    #[error("Invalid configuration file syntax in {file}")]
    ConfigParseError {
        /// Path to the file
        file: String,
        /// Parser message
        reason: String,
    },

    /// Project name not present in the configured registry
    #[error("Unknown project {name}")]
    UnknownProject {
        /// The rejected project name
        name: String,
    },

    /// No project argument and the working directory is outside the project tree
    #[error("Could not derive a project from the current directory {cwd}")]
    ProjectNotDerivable {
        /// The current working directory
        cwd: String,
    },

    /// Project recipe file is missing
    #[error("Could not find {path}")]
    RecipeNotFound {
        /// Expected recipe location
        path: String,
    },

    /// Malformed package reference text
    #[error("Invalid package reference: {reference}")]
    InvalidPackageReference {
        /// The text that failed to parse
        reference: String,
    },

    /// Generic error with a message
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error wrapper carrying user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DevtoolsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without details or suggestion.
    #[must_use]
    pub const fn new(error: DevtoolsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognises [`DevtoolsError`] (tailored suggestions), [`std::io::Error`] and
/// TOML parse errors. Anything else is rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(devtools_error) = error.downcast_ref::<DevtoolsError>() {
        return create_error_context(devtools_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DevtoolsError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check ownership and permissions of the project directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DevtoolsError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(DevtoolsError::ConfigParseError {
            file: "devtools.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in devtools.toml. Verify quotes, brackets and key names")
        .with_details(toml_error.to_string());
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DevtoolsError::Other {
        message,
    })
}

fn create_error_context(error: DevtoolsError) -> ErrorContext {
    match &error {
        DevtoolsError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ or your package manager (e.g., 'apt install git')")
            .with_details("devtools drives the system git binary for every repository operation"),

        DevtoolsError::ConanNotFound => ErrorContext::new(error)
            .with_suggestion("Install Conan 2 with 'pip install conan' and make sure the virtual environment is active")
            .with_details("devtools drives the system conan binary for exports and dependency graphs"),

        DevtoolsError::GitCommandError { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Try running the git command manually in the repository for more details")
                .with_details(details)
        }

        DevtoolsError::GitCloneFailed { url, reason } => {
            let suggestion = format!(
                "Verify the repository URL is correct: {url}. Check the 'http' setting in devtools.toml if SSH keys are not set up"
            );
            let details = reason.trim().to_string();
            ErrorContext::new(error).with_suggestion(suggestion).with_details(details)
        }

        DevtoolsError::GitCheckoutFailed { reason, .. } => {
            let details = reason.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Verify the branch or tag exists and that the working tree has no conflicting local changes")
                .with_details(details)
        }

        DevtoolsError::ConanCommandError { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Try running the conan command manually with '-vvv' for more details")
                .with_details(details)
        }

        DevtoolsError::ConfigNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Pass --config <file>, or set DEVTOOLS_ROOT_DIR to the directory containing devtools.toml")
            .with_details("devtools.toml defines project_dir, organization and the list of known projects"),

        DevtoolsError::ConfigParseError { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_suggestion("Check the TOML syntax in devtools.toml. Verify quotes, brackets and key names")
                .with_details(details)
        }

        DevtoolsError::UnknownProject { .. } => ErrorContext::new(error)
            .with_suggestion("Add the project to the 'projects' list in devtools.toml"),

        DevtoolsError::ProjectNotDerivable { .. } => ErrorContext::new(error)
            .with_suggestion("Pass --project explicitly or run the command from inside a project directory"),

        _ => ErrorContext::new(error),
    }
}
