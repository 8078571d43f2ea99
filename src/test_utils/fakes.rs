//! In-memory collaborators for exporter and resolver tests.
//!
//! Both fakes are cheap to clone; clones share state, so a test can keep one
//! handle for assertions while the code under test borrows another.

use crate::conan::{GraphLoadError, GraphOutcome, PackageManager};
use crate::core::DevtoolsError;
use crate::git::{CloneOptions, VersionControl};
use crate::models::{PackageReference, RevisionState};
use anyhow::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct FakeRepoState {
    head: RevisionState,
    branches: HashSet<String>,
    tags: HashMap<String, String>,
}

impl FakeRepoState {
    fn on_branch(branch: &str) -> Self {
        Self {
            head: RevisionState::Branch(branch.to_string()),
            branches: HashSet::from([branch.to_string()]),
            tags: HashMap::new(),
        }
    }
}

/// A clone performed through [`FakeVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRecord {
    /// Fetch URL
    pub url: String,
    /// Clone destination
    pub target: PathBuf,
    /// Options the clone was requested with
    pub options: CloneOptions,
}

#[derive(Debug, Default)]
struct FakeVcsState {
    repos: HashMap<PathBuf, FakeRepoState>,
    failing_checkouts: HashSet<String>,
    fail_clones: bool,
    checkouts: Vec<(PathBuf, String)>,
    clones: Vec<CloneRecord>,
}

/// In-memory [`VersionControl`].
///
/// Repositories are keyed by path. Checking out a known branch attaches HEAD
/// to it; checking out a tag or a tag's commit detaches HEAD.
#[derive(Debug, Clone, Default)]
pub struct FakeVcs {
    state: Arc<Mutex<FakeVcsState>>,
}

impl FakeVcs {
    /// Creates a fake without repositories.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeVcsState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Registers a repository at `path` on `branch`, with the given tags.
    pub fn add_repo<I, S>(&self, path: impl AsRef<Path>, branch: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut repo = FakeRepoState::on_branch(branch);
        for tag in tags {
            let tag = tag.into();
            let commit = format!("{:0>40}", tag.len() * 7 + repo.tags.len());
            repo.tags.insert(tag, commit);
        }
        self.lock().repos.insert(path.as_ref().to_path_buf(), repo);
    }

    /// Adds a branch to an existing repository.
    pub fn add_branch(&self, path: impl AsRef<Path>, branch: &str) {
        if let Some(repo) = self.lock().repos.get_mut(path.as_ref()) {
            repo.branches.insert(branch.to_string());
        }
    }

    /// Forces the HEAD of a repository, bypassing checkout.
    pub fn set_head(&self, path: impl AsRef<Path>, head: RevisionState) {
        if let Some(repo) = self.lock().repos.get_mut(path.as_ref()) {
            repo.head = head;
        }
    }

    /// Current HEAD of the repository at `path`.
    pub fn head(&self, path: impl AsRef<Path>) -> Option<RevisionState> {
        self.lock().repos.get(path.as_ref()).map(|repo| repo.head.clone())
    }

    /// Commit hash a tag resolves to.
    pub fn tag_commit(&self, path: impl AsRef<Path>, tag: &str) -> Option<String> {
        self.lock().repos.get(path.as_ref()).and_then(|repo| repo.tags.get(tag).cloned())
    }

    /// Makes every checkout of `reference` fail.
    pub fn fail_checkout_of(&self, reference: &str) {
        self.lock().failing_checkouts.insert(reference.to_string());
    }

    /// Makes every clone fail.
    pub fn fail_clones(&self) {
        self.lock().fail_clones = true;
    }

    /// Checkouts attempted so far, in order.
    pub fn checkouts(&self) -> Vec<(PathBuf, String)> {
        self.lock().checkouts.clone()
    }

    /// Clones attempted so far, in order.
    pub fn clones(&self) -> Vec<CloneRecord> {
        self.lock().clones.clone()
    }
}

impl VersionControl for FakeVcs {
    type Repo = PathBuf;

    async fn open(&self, path: &Path) -> Result<PathBuf> {
        if self.lock().repos.contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(DevtoolsError::GitRepoInvalid {
                path: path.display().to_string(),
            }
            .into())
        }
    }

    async fn is_detached(&self, repo: &PathBuf) -> Result<bool> {
        Ok(self.head(repo).is_some_and(|head| head.is_detached()))
    }

    async fn current_branch(&self, repo: &PathBuf) -> Result<String> {
        match self.head(repo) {
            Some(RevisionState::Branch(name)) => Ok(name),
            _ => Ok(String::new()),
        }
    }

    async fn current_commit(&self, repo: &PathBuf) -> Result<String> {
        match self.head(repo) {
            Some(RevisionState::Detached(commit)) => Ok(commit),
            Some(RevisionState::Branch(name)) => Ok(format!("{name:0>40}")),
            None => Err(DevtoolsError::GitRepoInvalid {
                path: repo.display().to_string(),
            }
            .into()),
        }
    }

    async fn checkout(&self, repo: &PathBuf, reference: &str) -> Result<()> {
        let mut state = self.lock();
        state.checkouts.push((repo.clone(), reference.to_string()));

        let failing = state.failing_checkouts.contains(reference);
        let checkout_failed = || DevtoolsError::GitCheckoutFailed {
            reference: reference.to_string(),
            reason: format!("error: pathspec '{reference}' did not match any file(s) known to git"),
        };
        let repo_state = state.repos.get_mut(repo).ok_or_else(checkout_failed)?;
        if failing {
            return Err(checkout_failed().into());
        }

        repo_state.head = if repo_state.branches.contains(reference) {
            RevisionState::Branch(reference.to_string())
        } else if let Some(commit) = repo_state.tags.get(reference) {
            RevisionState::Detached(commit.clone())
        } else if repo_state.tags.values().any(|commit| commit == reference) {
            RevisionState::Detached(reference.to_string())
        } else {
            return Err(checkout_failed().into());
        };
        Ok(())
    }

    async fn clone_repo(&self, url: &str, target: &Path, options: &CloneOptions) -> Result<PathBuf> {
        let mut state = self.lock();
        state.clones.push(CloneRecord {
            url: url.to_string(),
            target: target.to_path_buf(),
            options: options.clone(),
        });
        if state.fail_clones {
            return Err(DevtoolsError::GitCloneFailed {
                url: url.to_string(),
                reason: "fatal: repository not found".to_string(),
            }
            .into());
        }

        let branch = options.branch.as_deref().unwrap_or("main");
        state.repos.insert(target.to_path_buf(), FakeRepoState::on_branch(branch));
        Ok(target.to_path_buf())
    }
}

#[derive(Debug, Default)]
struct FakePackageManagerState {
    outcomes: VecDeque<Result<GraphOutcome, GraphLoadError>>,
    repeat_last: Option<Result<GraphOutcome, GraphLoadError>>,
    failing_exports: HashSet<PathBuf>,
    fail_all_exports: bool,
    exports: Vec<PathBuf>,
    graph_loads: Vec<(PathBuf, String, String)>,
}

/// In-memory [`PackageManager`].
///
/// Graph attempts pop scripted outcomes in order; once the script runs out,
/// the graph resolves.
#[derive(Debug, Clone, Default)]
pub struct FakePackageManager {
    state: Arc<Mutex<FakePackageManagerState>>,
}

impl FakePackageManager {
    /// Creates a fake whose graphs always resolve.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakePackageManagerState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Queues the result of the next unscripted graph attempt.
    pub fn push_outcome(&self, outcome: Result<GraphOutcome, GraphLoadError>) -> &Self {
        self.lock().outcomes.push_back(outcome);
        self
    }

    /// Queues a structured missing requirement.
    pub fn push_missing(&self, reference: PackageReference) -> &Self {
        self.push_outcome(Ok(GraphOutcome::Missing(reference)))
    }

    /// Queues an unstructured failure with the given text.
    pub fn push_unstructured(&self, message: &str) -> &Self {
        self.push_outcome(Err(GraphLoadError::new(message)))
    }

    /// Returns `outcome` for every attempt once the queue is empty.
    pub fn repeat_forever(&self, outcome: Result<GraphOutcome, GraphLoadError>) {
        self.lock().repeat_last = Some(outcome);
    }

    /// Makes exports of `source` fail.
    pub fn fail_export_of(&self, source: impl AsRef<Path>) {
        self.lock().failing_exports.insert(source.as_ref().to_path_buf());
    }

    /// Makes every export fail.
    pub fn fail_exports(&self) {
        self.lock().fail_all_exports = true;
    }

    /// Exports attempted so far, in order.
    pub fn exports(&self) -> Vec<PathBuf> {
        self.lock().exports.clone()
    }

    /// Graph attempts so far as `(recipe, host profile, build profile)`.
    pub fn graph_loads(&self) -> Vec<(PathBuf, String, String)> {
        self.lock().graph_loads.clone()
    }
}

impl PackageManager for FakePackageManager {
    async fn export(&self, source: &Path) -> Result<()> {
        let mut state = self.lock();
        state.exports.push(source.to_path_buf());
        if state.fail_all_exports || state.failing_exports.contains(source) {
            return Err(DevtoolsError::ConanCommandError {
                operation: "export".to_string(),
                stderr: format!("ERROR: {}/conanfile.py: invalid recipe", source.display()),
            }
            .into());
        }
        Ok(())
    }

    async fn load_graph(
        &self,
        recipe: &Path,
        host_profile: &str,
        build_profile: &str,
    ) -> Result<GraphOutcome, GraphLoadError> {
        let mut state = self.lock();
        state.graph_loads.push((
            recipe.to_path_buf(),
            host_profile.to_string(),
            build_profile.to_string(),
        ));
        match state.outcomes.pop_front() {
            Some(outcome) => outcome,
            None => state.repeat_last.clone().unwrap_or(Ok(GraphOutcome::Resolved)),
        }
    }
}
