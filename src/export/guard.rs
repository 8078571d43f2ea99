//! Revision guard: returns a working tree to the revision it was found at.
//!
//! [`RevisionGuard::capture`] records where HEAD points before anything is
//! changed. [`RevisionGuard::protect`] then runs the mutating work and checks
//! the captured revision out again on every exit path of that work: a normal
//! result, an error result, or a panic (re-raised once restore has run).
//!
//! Both `protect` and `restore` consume the guard, so a restore can run at
//! most once. A guard dropped without restoring, e.g. because the future
//! driving it was cancelled, logs an error naming the lost state.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use super::ExportError;
use crate::git::VersionControl;
use crate::models::RevisionState;

/// Captured revision of one repository, bound to the collaborator that can
/// restore it.
pub struct RevisionGuard<'a, V: VersionControl> {
    vcs: &'a V,
    repo: &'a V::Repo,
    path: PathBuf,
    state: RevisionState,
    restored: bool,
}

impl<'a, V: VersionControl> RevisionGuard<'a, V> {
    /// Records the current revision of `repo`: the commit when HEAD is
    /// detached, the branch name otherwise.
    ///
    /// # Errors
    ///
    /// [`ExportError::InvalidRevisionState`] when the state cannot be read or
    /// the captured name is empty.
    pub async fn capture(vcs: &'a V, repo: &'a V::Repo, path: &Path) -> Result<Self, ExportError> {
        let invalid = |reason: String| ExportError::InvalidRevisionState {
            path: path.to_path_buf(),
            reason,
        };

        let detached = vcs.is_detached(repo).await.map_err(|e| invalid(format!("{e:#}")))?;
        let state = if detached {
            RevisionState::Detached(vcs.current_commit(repo).await.map_err(|e| invalid(format!("{e:#}")))?)
        } else {
            RevisionState::Branch(vcs.current_branch(repo).await.map_err(|e| invalid(format!("{e:#}")))?)
        };

        if state.checkout_ref().trim().is_empty() {
            return Err(invalid(format!("HEAD resolves to an empty {}", if detached { "commit" } else { "branch" })));
        }

        tracing::debug!("Captured {} of {}", state, path.display());
        Ok(Self {
            vcs,
            repo,
            path: path.to_path_buf(),
            state,
            restored: false,
        })
    }

    /// The captured revision.
    #[must_use]
    pub const fn state(&self) -> &RevisionState {
        &self.state
    }

    /// Checks the captured revision out again.
    ///
    /// # Errors
    ///
    /// [`ExportError::Restore`] when the checkout fails; the working tree is
    /// then left wherever the failed checkout put it.
    pub async fn restore(mut self) -> Result<(), ExportError> {
        tracing::info!("Restoring {} to {}", self.path.display(), self.state);
        let result = self.vcs.checkout(self.repo, self.state.checkout_ref()).await;
        self.restored = true;

        result.map_err(|e| ExportError::Restore {
            path: self.path.clone(),
            state: self.state.clone(),
            reason: format!("{e:#}"),
            original: None,
        })
    }

    /// Runs `body`, then restores whatever its outcome.
    ///
    /// A body error is returned unchanged when restore succeeds. A failed
    /// restore wins over the body's result and carries the body error, if
    /// any, as its source. A panic in `body` is resumed after restoring.
    ///
    /// # Errors
    ///
    /// The body's error or [`ExportError::Restore`].
    pub async fn protect<T, F>(self, body: F) -> Result<T, ExportError>
    where
        F: Future<Output = Result<T, ExportError>>,
    {
        let outcome = AssertUnwindSafe(body).catch_unwind().await;
        let restore = self.restore().await;

        match (outcome, restore) {
            (Ok(result), Ok(())) => result,
            (Ok(result), Err(ExportError::Restore { path, state, reason, .. })) => {
                Err(ExportError::Restore {
                    path,
                    state,
                    reason,
                    original: result.err().map(Box::new),
                })
            }
            (Ok(_), Err(other)) => Err(other),
            (Err(panic), restore) => {
                if let Err(e) = restore {
                    tracing::error!("{}", e);
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}

impl<V: VersionControl> Drop for RevisionGuard<'_, V> {
    fn drop(&mut self) {
        if !self.restored {
            tracing::error!(
                "{} was not restored to {}; check it out manually",
                self.path.display(),
                self.state
            );
        }
    }
}
