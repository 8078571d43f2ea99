//! Core error types shared across devtools
//!
//! - [`DevtoolsError`] - failure modes of git, conan, configuration and project lookup
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - converts any `anyhow::Error` for CLI display
//!
//! # Examples
//!
//! ```rust
//! use conan_devtools::core::{DevtoolsError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn lookup() -> Result<()> {
//!     Err(DevtoolsError::UnknownProject { name: "widgets".to_string() }.into())
//! }
//!
//! if let Err(e) = lookup() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{DevtoolsError, ErrorContext, user_friendly_error};
