//! devtools - developer tools for a family of Conan projects
//!
//! A set of C++ projects, each in its own git repository under one
//! organization, depend on each other through Conan recipes. devtools keeps
//! their checkouts and the local Conan cache in step:
//!
//! - clones every project into `<project_dir>/<name>/source`
//! - exports recipes into the Conan cache, optionally at a tag, always putting
//!   the working tree back on the branch or commit it was on
//! - for one project, repeatedly builds the dependency graph and fetches and
//!   exports whatever owned requirement is missing until the graph resolves
//!
//! # Core Modules
//!
//! - [`export`] - [`PackageExporter`](export::PackageExporter) and the
//!   [`RevisionGuard`](export::RevisionGuard) that restores working trees
//! - [`resolver`] - the iterative [`DependencyResolver`](resolver::DependencyResolver)
//!
//! # Collaborators
//!
//! - [`git`] - the [`VersionControl`](git::VersionControl) trait and its
//!   system-git implementation
//! - [`conan`] - the [`PackageManager`](conan::PackageManager) trait and its
//!   Conan CLI implementation
//!
//! # Supporting Modules
//!
//! - [`cli`] - command-line interface
//! - [`config`] - the `devtools.toml` configuration
//! - [`core`] - error types and user-facing error formatting
//! - [`models`] - package references, revision states and project arguments
//! - [`utils`] - platform helpers
//!
//! # Configuration (devtools.toml)
//!
//! ```toml
//! project_dir = "~/dev/projects"
//! organization = "TimZoet"
//! http = true
//! projects = ["alexandria", "bettertest", "common", "math", "pyreq"]
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! devtools clone
//! devtools export --projects math/v1.2.0 common
//! devtools export-deps --project math --profile clang
//! devtools install --profile clang --build missing:*
//! devtools clear-cache
//! ```

pub mod cli;
pub mod conan;
pub mod config;
pub mod core;
pub mod export;
pub mod git;
pub mod models;
pub mod resolver;
pub mod utils;

// test_utils is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
