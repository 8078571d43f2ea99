//! Configuration management for devtools
//!
//! devtools reads a single TOML file, `devtools.toml`, at startup. The file
//! names the directory all project checkouts live under, the organization that
//! owns them (used for fetch URLs and for deciding which missing requirements
//! devtools may fetch itself), and the registry of known projects.
//!
//! # Location
//!
//! 1. `--config <file>` when given
//! 2. `<root>/devtools.toml`, with `<root>` from `--root-dir` or `DEVTOOLS_ROOT_DIR`
//! 3. `~/.devtools/devtools.toml`
//!
//! Only the command-line layer consults the environment. Everything below it
//! receives a validated [`DevtoolsConfig`].

mod global;

pub use global::{CONFIG_FILE_NAME, DevtoolsConfig};
