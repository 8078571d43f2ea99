//! Shared data models for devtools operations
//!
//! - [`PackageReference`] - a Conan recipe coordinate `name/version@user/channel`
//! - [`RevisionState`] - where a repository's HEAD points (branch or detached commit)
//! - [`ProjectSpec`] - a `project[/tag]` argument as accepted on the command line

use crate::core::DevtoolsError;
use std::fmt;
use std::str::FromStr;

/// A package coordinate as reported by the package manager.
///
/// The textual form is `name/version[@user[/channel]][#revision]`. The revision
/// suffix is accepted and ignored.
///
/// # Examples
///
/// ```rust
/// use conan_devtools::models::PackageReference;
///
/// let reference: PackageReference = "math/1.2.3@timzoet/v1.2.3".parse().unwrap();
/// assert_eq!(reference.name, "math");
/// assert_eq!(reference.version, "1.2.3");
/// assert_eq!(reference.user.as_deref(), Some("timzoet"));
/// assert_eq!(reference.channel.as_deref(), Some("v1.2.3"));
/// assert!(reference.is_owned_by("TimZoet"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageReference {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Owner (Conan "user") of the recipe
    pub user: Option<String>,
    /// Channel qualifier; for owned projects this names the git tag or branch
    pub channel: Option<String>,
}

impl PackageReference {
    /// Creates a reference with owner and channel.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        user: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: Some(user.into()),
            channel: Some(channel.into()),
        }
    }

    /// Whether the recipe belongs to `organization` (case-insensitive).
    #[must_use]
    pub fn is_owned_by(&self, organization: &str) -> bool {
        self.user.as_deref().is_some_and(|user| user.eq_ignore_ascii_case(organization))
    }

    /// The git ref the recipe source is published under: the channel, or the
    /// version when the reference carries no channel.
    #[must_use]
    pub fn source_ref(&self) -> &str {
        self.channel.as_deref().unwrap_or(&self.version)
    }
}

impl FromStr for PackageReference {
    type Err = DevtoolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DevtoolsError::InvalidPackageReference {
            reference: s.to_string(),
        };

        let without_revision = s.trim().split('#').next().unwrap_or_default();
        let (base, owner) = match without_revision.split_once('@') {
            Some((base, owner)) => (base, Some(owner)),
            None => (without_revision, None),
        };

        let (name, version) = base.split_once('/').ok_or_else(invalid)?;
        if name.is_empty() || version.is_empty() || version.contains('/') {
            return Err(invalid());
        }

        let (user, channel) = match owner {
            None => (None, None),
            Some(owner) => match owner.split_once('/') {
                Some((user, channel)) if !user.is_empty() && !channel.is_empty() => {
                    (Some(user.to_string()), Some(channel.to_string()))
                }
                Some(_) => return Err(invalid()),
                None if !owner.is_empty() => (Some(owner.to_string()), None),
                None => return Err(invalid()),
            },
        };

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            user,
            channel,
        })
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let Some(user) = &self.user {
            write!(f, "@{user}")?;
            if let Some(channel) = &self.channel {
                write!(f, "/{channel}")?;
            }
        }
        Ok(())
    }
}

/// Revision identity of a working tree: exactly one of a branch name or a
/// detached commit hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionState {
    /// HEAD tracks the named branch
    Branch(String),
    /// HEAD points directly at the commit
    Detached(String),
}

impl RevisionState {
    /// The ref to hand to `checkout` to return to this state.
    #[must_use]
    pub fn checkout_ref(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Detached(name) => name,
        }
    }

    /// Whether HEAD was detached.
    #[must_use]
    pub const fn is_detached(&self) -> bool {
        matches!(self, Self::Detached(_))
    }
}

impl fmt::Display for RevisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "branch {name}"),
            Self::Detached(commit) => write!(f, "commit {commit}"),
        }
    }
}

/// A project named on the command line, with an optional tag or branch:
/// `alexandria` or `alexandria/v1.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectSpec {
    /// Project name as listed in the configuration
    pub name: String,
    /// Tag or branch to check out, if any
    pub reference: Option<String>,
}

impl ProjectSpec {
    /// A project argument without a tag.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: None,
        }
    }
}

impl FromStr for ProjectSpec {
    type Err = DevtoolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DevtoolsError::Other {
            message: format!("Invalid project '{s}': expected 'name' or 'name/tag'"),
        };

        match s.split_once('/') {
            None if !s.is_empty() => Ok(Self::named(s)),
            Some((name, reference))
                if !name.is_empty() && !reference.is_empty() && !reference.contains('/') =>
            {
                Ok(Self {
                    name: name.to_string(),
                    reference: Some(reference.to_string()),
                })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ProjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => write!(f, "{}/{}", self.name, reference),
            None => write!(f, "{}", self.name),
        }
    }
}
