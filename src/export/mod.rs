//! Exporting project sources into the package cache
//!
//! [`PackageExporter::export`] opens a working tree, optionally checks out a
//! tag or branch, exports the recipe and puts the working tree back where it
//! was. The revision identity after the call equals the one before it on every
//! path that got as far as opening the repository; a failure to put it back is
//! reported as [`ExportError::Restore`] rather than swallowed.
//!
//! Uncommitted changes are not stashed. A checkout they conflict with fails
//! and is reported like any other checkout failure.

mod guard;

pub use guard::RevisionGuard;

use crate::conan::PackageManager;
use crate::git::VersionControl;
use crate::models::RevisionState;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an export did not succeed.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The source is not a repository. Nothing was changed.
    #[error("Failed to open repository at {}", .path.display())]
    Open {
        /// Source path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// The requested reference could not be checked out. The original
    /// revision has been restored.
    #[error("Failed to checkout {reference} at {}; export did not succeed", .path.display())]
    Checkout {
        /// Source path
        path: PathBuf,
        /// Requested tag, branch or commit
        reference: String,
        /// Underlying failure
        reason: String,
    },

    /// The package manager rejected the export. The original revision has
    /// been restored.
    #[error("Failed to export {} to the package cache: {reason}", .path.display())]
    Export {
        /// Source path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// The original revision could not be checked out again.
    #[error("Failed to restore {} to {state}: {reason}", .path.display())]
    Restore {
        /// Source path
        path: PathBuf,
        /// Revision that could not be restored
        state: RevisionState,
        /// Underlying failure
        reason: String,
        /// Failure of the export itself, if it failed too
        #[source]
        original: Option<Box<ExportError>>,
    },

    /// HEAD is neither on a branch nor at a readable commit.
    #[error("Cannot determine the revision of {}: {reason}", .path.display())]
    InvalidRevisionState {
        /// Source path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },
}

/// Exports sources, restoring their revision afterwards.
pub struct PackageExporter<'a, V, P> {
    vcs: &'a V,
    package_manager: &'a P,
}

impl<'a, V: VersionControl, P: PackageManager> PackageExporter<'a, V, P> {
    /// Creates an exporter over the given collaborators.
    pub const fn new(vcs: &'a V, package_manager: &'a P) -> Self {
        Self {
            vcs,
            package_manager,
        }
    }

    /// Exports `source`, after checking out `reference` when given.
    ///
    /// # Errors
    ///
    /// Every variant of [`ExportError`]. Except for `Open` and
    /// `InvalidRevisionState`, which fail before anything is changed, the
    /// working tree has been restored unless the error is `Restore`.
    pub async fn export(&self, source: &Path, reference: Option<&str>) -> Result<(), ExportError> {
        let repo = self.vcs.open(source).await.map_err(|e| {
            tracing::debug!("Failed to open {}: {:#}", source.display(), e);
            ExportError::Open {
                path: source.to_path_buf(),
                reason: format!("{e:#}"),
            }
        })?;

        let guard = RevisionGuard::capture(self.vcs, &repo, source).await?;

        guard
            .protect(async {
                if let Some(reference) = reference {
                    tracing::info!("Checking out {} in {}", reference, source.display());
                    self.vcs.checkout(&repo, reference).await.map_err(|e| ExportError::Checkout {
                        path: source.to_path_buf(),
                        reference: reference.to_string(),
                        reason: format!("{e:#}"),
                    })?;
                }

                self.package_manager.export(source).await.map_err(|e| ExportError::Export {
                    path: source.to_path_buf(),
                    reason: format!("{e:#}"),
                })
            })
            .await
    }
}
