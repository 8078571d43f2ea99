//! Test utilities for devtools
//!
//! Shared by unit tests and, through the `test-utils` feature, by the
//! integration tests:
//! - [`init_test_logging`] for opt-in tracing output
//! - [`TestGit`] for building throwaway git repositories
//! - [`FakeVcs`] and [`FakePackageManager`], in-memory collaborators that
//!   record every call and can be told to fail
//!
//! # Example
//!
//! ```rust,no_run
//! use conan_devtools::test_utils::{FakePackageManager, FakeVcs};
//!
//! let vcs = FakeVcs::new();
//! vcs.add_repo("/dev/math/source", "main", ["v1.0"]);
//! let conan = FakePackageManager::new();
//! assert!(conan.exports().is_empty());
//! ```

pub mod fakes;
pub mod git_helper;

pub use fakes::{CloneRecord, FakePackageManager, FakeVcs};
pub use git_helper::TestGit;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests stay silent.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
