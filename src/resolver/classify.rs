//! Classification of graph attempts into resolver steps.
//!
//! Everything the resolver decides about a graph attempt is made here, so the
//! text-matching rule for the meta-dependency lives in one testable place.

use regex::Regex;

use super::ResolutionProblem;
use crate::conan::{GraphLoadError, GraphOutcome};
use crate::models::PackageReference;

/// Recognises a meta-dependency coordinate inside free-form error text.
///
/// The coordinate looks like `<name>/<x.y.z>@<organization>/v<x.y.z>`; the
/// organization is matched case-insensitively.
#[derive(Debug, Clone)]
pub struct MetaDependencyMatcher {
    name: String,
    pattern: Regex,
}

impl MetaDependencyMatcher {
    /// Builds the matcher for the meta-dependency `name` owned by `organization`.
    ///
    /// # Errors
    ///
    /// Fails only if the resulting expression is rejected by the regex engine.
    pub fn new(name: &str, organization: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"{}/(\d+\.\d+\.\d+)@((?i:{}))/(v\d+\.\d+\.\d+)",
            regex::escape(name),
            regex::escape(organization)
        ))?;
        Ok(Self {
            name: name.to_string(),
            pattern,
        })
    }

    /// The first coordinate in `text`, if any.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<PackageReference> {
        let captures = self.pattern.captures(text)?;
        Some(PackageReference::new(
            self.name.clone(),
            captures.get(1)?.as_str(),
            captures.get(2)?.as_str(),
            captures.get(3)?.as_str(),
        ))
    }
}

/// What to clone and export before the next graph attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Requirement to satisfy
    pub reference: PackageReference,
    /// Whether the clone needs submodules
    pub submodules: bool,
}

impl FetchRequest {
    /// Branch or tag to clone.
    #[must_use]
    pub fn checkout_ref(&self) -> &str {
        self.reference.source_ref()
    }
}

/// The resolver's next step after a graph attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The graph resolved; stop without a problem
    Done,
    /// Fetch and export a requirement, then try again
    Fetch(FetchRequest),
    /// Stop and report
    Stop(ResolutionProblem),
}

/// Decides what to do about one graph attempt.
///
/// - unstructured failure naming the meta-dependency: fetch it, without
///   submodules
/// - unstructured failure of any other kind: stop
/// - resolved graph: done
/// - missing requirement owned by `organization`: fetch it with submodules
/// - missing requirement owned by anyone else, or another structured error:
///   stop, naming the requirement
#[must_use]
pub fn classify(
    attempt: &Result<GraphOutcome, GraphLoadError>,
    organization: &str,
    matcher: &MetaDependencyMatcher,
) -> Step {
    match attempt {
        Err(error) => match matcher.find(error.message()) {
            Some(reference) => Step::Fetch(FetchRequest {
                reference,
                submodules: false,
            }),
            None => Step::Stop(ResolutionProblem::UnexpectedGraphError {
                message: error.message().to_string(),
            }),
        },
        Ok(GraphOutcome::Resolved) => Step::Done,
        Ok(GraphOutcome::Missing(reference)) if reference.is_owned_by(organization) => {
            Step::Fetch(FetchRequest {
                reference: reference.clone(),
                submodules: true,
            })
        }
        Ok(GraphOutcome::Missing(reference)) => Step::Stop(ResolutionProblem::ForeignRequirement {
            reference: reference.clone(),
            organization: organization.to_string(),
        }),
        Ok(GraphOutcome::Other {
            kind,
            reference,
            message,
        }) => Step::Stop(ResolutionProblem::UnsupportedGraphError {
            kind: kind.clone(),
            subject: reference
                .as_ref()
                .map(ToString::to_string)
                .or_else(|| message.clone())
                .unwrap_or_else(|| "unknown requirement".to_string()),
        }),
    }
}
