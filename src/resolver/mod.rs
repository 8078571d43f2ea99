//! Iterative dependency resolution
//!
//! [`DependencyResolver::resolve`] asks the package manager for the dependency
//! graph of a recipe. Each attempt surfaces at most one blocking requirement.
//! When that requirement belongs to the configured organization (or is the
//! meta-dependency, whose failures only show up as text) the resolver clones
//! its source into a scratch directory, exports it and tries again. Anything
//! else ends the run with a [`ResolutionProblem`].
//!
//! # Termination
//!
//! A run stops when:
//! - the graph resolves
//! - a failure cannot be fetched away
//! - a requirement that was already fetched and exported in this run is
//!   reported missing again
//! - `max_resolve_rounds` graph attempts have been made, when configured
//!
//! # Scratch clones
//!
//! Clones live under a temporary directory owned by the resolver, at
//! `<scratch>/<name>/<ref>`, and are removed when the resolver is dropped.
//! Exports of an already cached coordinate are assumed to be harmless.

mod classify;

pub use classify::{FetchRequest, MetaDependencyMatcher, Step, classify};

use crate::conan::PackageManager;
use crate::config::DevtoolsConfig;
use crate::export::PackageExporter;
use crate::git::{CloneOptions, VersionControl};
use crate::models::PackageReference;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;
use thiserror::Error;

/// A terminal outcome of a resolver run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionProblem {
    /// Graph construction failed with text that names nothing fetchable
    #[error("Unexpected error when loading the dependency graph: {message}")]
    UnexpectedGraphError {
        /// Failure text
        message: String,
    },

    /// A missing requirement belongs to someone else
    #[error("Failed to resolve dependency {}: {reference} is not owned by {organization}", .reference.name)]
    ForeignRequirement {
        /// The missing requirement
        reference: PackageReference,
        /// Organization the resolver fetches for
        organization: String,
    },

    /// A structured graph error other than a missing requirement
    #[error("Failed to resolve dependency {subject}: graph error of kind '{kind}'")]
    UnsupportedGraphError {
        /// Error kind reported by the package manager
        kind: String,
        /// Requirement or message the error is about
        subject: String,
    },

    /// The requirement's source could not be cloned
    #[error("Failed to fetch {reference} from {url}: {reason}")]
    FetchFailed {
        /// The requirement
        reference: PackageReference,
        /// Fetch URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// The cloned source could not be exported
    #[error("Failed to export {reference}: {reason}")]
    ExportFailed {
        /// The requirement
        reference: PackageReference,
        /// Underlying failure
        reason: String,
    },

    /// The requirement was fetched and exported, yet is still missing
    #[error("Dependency {reference} is still missing after it was fetched and exported")]
    RepeatedRequirement {
        /// The requirement
        reference: PackageReference,
    },

    /// The configured ceiling on graph attempts was reached
    #[error("Dependency graph did not resolve within {rounds} attempts")]
    RoundLimitExceeded {
        /// The ceiling
        rounds: usize,
    },
}

/// Fetches and exports missing requirements until a graph resolves.
///
/// # Examples
///
/// ```rust,no_run
/// use conan_devtools::conan::{ConanCli, PackageManager};
/// use conan_devtools::config::DevtoolsConfig;
/// use conan_devtools::git::Git;
/// use conan_devtools::resolver::DependencyResolver;
///
/// # async fn example(config: &DevtoolsConfig) -> anyhow::Result<()> {
/// let resolver = DependencyResolver::new(config, &Git, &ConanCli)?;
/// let recipe = config.recipe_path("math");
/// let profile = ConanCli.resolve_profile("clang", Some(&config.profile_dir("math")));
/// for problem in resolver.resolve(&recipe, &profile).await {
///     eprintln!("{problem}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct DependencyResolver<'a, V, P> {
    config: &'a DevtoolsConfig,
    vcs: &'a V,
    package_manager: &'a P,
    matcher: MetaDependencyMatcher,
    scratch: TempDir,
}

impl<'a, V: VersionControl, P: PackageManager> DependencyResolver<'a, V, P> {
    /// Creates a resolver with a fresh scratch directory.
    ///
    /// # Errors
    ///
    /// Fails when the scratch directory cannot be created.
    pub fn new(config: &'a DevtoolsConfig, vcs: &'a V, package_manager: &'a P) -> Result<Self> {
        let matcher = MetaDependencyMatcher::new(config.meta_dependency(), config.organization())
            .context("Invalid meta-dependency name")?;
        let scratch = tempfile::Builder::new()
            .prefix("devtools-deps-")
            .tempdir()
            .context("Failed to create a scratch directory for dependency sources")?;

        Ok(Self {
            config,
            vcs,
            package_manager,
            matcher,
            scratch,
        })
    }

    /// Directory scratch clones are made in.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Resolves the graph of `recipe` with `profile` as host and build profile.
    ///
    /// Returns the problems that ended the run; empty means the graph
    /// resolved.
    pub async fn resolve(&self, recipe: &Path, profile: &str) -> Vec<ResolutionProblem> {
        let mut problems = Vec::new();
        let mut fetched = HashSet::new();
        let mut attempts = 0;

        loop {
            if let Some(limit) = self.config.max_resolve_rounds() {
                if attempts >= limit {
                    tracing::warn!("Giving up on {} after {} graph attempts", recipe.display(), attempts);
                    problems.push(ResolutionProblem::RoundLimitExceeded {
                        rounds: limit,
                    });
                    return problems;
                }
            }
            attempts += 1;

            tracing::debug!("Loading dependency graph of {} (attempt {})", recipe.display(), attempts);
            let attempt = self.package_manager.load_graph(recipe, profile, profile).await;

            match classify(&attempt, self.config.organization(), &self.matcher) {
                Step::Done => {
                    tracing::info!("All dependencies of {} are available", recipe.display());
                    return problems;
                }
                Step::Stop(problem) => {
                    tracing::debug!("Stopping resolution of {}: {}", recipe.display(), problem);
                    problems.push(problem);
                    return problems;
                }
                Step::Fetch(request) => {
                    let coordinate =
                        (request.reference.name.clone(), request.checkout_ref().to_string());
                    if !fetched.insert(coordinate) {
                        problems.push(ResolutionProblem::RepeatedRequirement {
                            reference: request.reference,
                        });
                        return problems;
                    }
                    if let Err(problem) = self.fetch_and_export(&request).await {
                        problems.push(problem);
                        return problems;
                    }
                }
            }
        }
    }

    async fn fetch_and_export(&self, request: &FetchRequest) -> Result<(), ResolutionProblem> {
        let reference = &request.reference;
        let url = self.config.repository_url(&reference.name);
        let target = self.scratch.path().join(&reference.name).join(request.checkout_ref());
        let fetch_failed = |reason: String| ResolutionProblem::FetchFailed {
            reference: reference.clone(),
            url: url.clone(),
            reason,
        };

        if target.exists() {
            tokio::fs::remove_dir_all(&target).await.map_err(|e| fetch_failed(e.to_string()))?;
        }

        let mut options = CloneOptions::shallow(request.checkout_ref());
        if request.submodules {
            options = options.with_submodules();
        }

        tracing::info!("Fetching {} at {}", reference, request.checkout_ref());
        self.vcs
            .clone_repo(&url, &target, &options)
            .await
            .map_err(|e| fetch_failed(format!("{e:#}")))?;

        PackageExporter::new(self.vcs, self.package_manager)
            .export(&target, None)
            .await
            .map_err(|e| ResolutionProblem::ExportFailed {
                reference: reference.clone(),
                reason: e.to_string(),
            })
    }
}
