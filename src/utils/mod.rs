//! Cross-platform utilities
//!
//! - [`platform`] - Executable names for external tools and path resolution

pub mod platform;

pub use platform::{command_exists, get_conan_command, get_git_command, get_home_dir, is_windows, resolve_path};
