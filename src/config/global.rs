//! The `devtools.toml` configuration file.
//!
//! The file is read once at the process boundary, validated, and turned into
//! an immutable [`DevtoolsConfig`] that is passed by reference to every
//! command, exporter and resolver.
//!
//! # Format
//!
//! ```toml
//! project_dir = "~/dev/projects"
//! organization = "TimZoet"
//! host = "github.com"        # default
//! ssh_user = "git"           # default
//! http = true                # default; false selects SSH URLs
//! meta_dependency = "pyreq"  # default
//! max_resolve_rounds = 64    # optional
//! projects = ["alexandria", "bettertest", "common", "math", "pyreq"]
//! ```
//!
//! Each project lives at `<project_dir>/<name>/source`.

use crate::core::DevtoolsError;
use crate::models::ProjectSpec;
use crate::utils::platform::{get_home_dir, resolve_path};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// File name looked up inside the devtools root directory.
pub const CONFIG_FILE_NAME: &str = "devtools.toml";

fn default_host() -> String {
    "github.com".to_string()
}

fn default_ssh_user() -> String {
    "git".to_string()
}

const fn default_http() -> bool {
    true
}

fn default_meta_dependency() -> String {
    "pyreq".to_string()
}

/// On-disk shape of `devtools.toml`, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    project_dir: String,
    organization: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_ssh_user")]
    ssh_user: String,
    #[serde(default = "default_http")]
    http: bool,
    #[serde(default = "default_meta_dependency")]
    meta_dependency: String,
    #[serde(default)]
    max_resolve_rounds: Option<usize>,
    projects: Vec<String>,
}

/// Validated devtools configuration.
///
/// # Examples
///
/// ```rust
/// use conan_devtools::config::DevtoolsConfig;
///
/// let config = DevtoolsConfig::new("/home/me/dev", "TimZoet", ["math", "common"]).unwrap();
/// assert_eq!(config.repository_url("math"), "https://github.com/TimZoet/math.git");
/// assert!(config.is_known("common"));
/// ```
#[derive(Debug, Clone)]
pub struct DevtoolsConfig {
    project_dir: PathBuf,
    organization: String,
    host: String,
    ssh_user: String,
    use_https: bool,
    meta_dependency: String,
    max_resolve_rounds: Option<usize>,
    projects: Vec<String>,
}

impl DevtoolsConfig {
    /// Builds a configuration with default host, transport and meta-dependency.
    ///
    /// # Errors
    ///
    /// Fails with [`DevtoolsError::ConfigError`] for the same reasons a file
    /// would be rejected.
    pub fn new<I, S>(
        project_dir: impl Into<PathBuf>,
        organization: impl Into<String>,
        projects: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = Self {
            project_dir: project_dir.into(),
            organization: organization.into(),
            host: default_host(),
            ssh_user: default_ssh_user(),
            use_https: default_http(),
            meta_dependency: default_meta_dependency(),
            max_resolve_rounds: None,
            projects: projects.into_iter().map(Into::into).collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Switches fetch URLs between HTTPS and SSH.
    #[must_use]
    pub fn with_https(mut self, use_https: bool) -> Self {
        self.use_https = use_https;
        self
    }

    /// Overrides the git host used in fetch URLs.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Overrides the meta-dependency recognised in unstructured graph errors.
    #[must_use]
    pub fn with_meta_dependency(mut self, name: impl Into<String>) -> Self {
        self.meta_dependency = name.into();
        self
    }

    /// Caps the number of graph attempts per resolver run.
    #[must_use]
    pub const fn with_max_resolve_rounds(mut self, rounds: Option<usize>) -> Self {
        self.max_resolve_rounds = rounds;
        self
    }

    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - [`DevtoolsError::ConfigNotFound`] when the file does not exist
    /// - [`DevtoolsError::ConfigParseError`] for TOML or schema errors
    /// - [`DevtoolsError::ConfigError`] when validation fails
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DevtoolsError::ConfigNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!(
            "Loaded configuration from {} ({} projects)",
            path.display(),
            config.projects.len()
        );
        Ok(config)
    }

    /// Parses and validates configuration text. `origin` is only used in error
    /// messages.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| DevtoolsError::ConfigParseError {
            file: origin.display().to_string(),
            reason: e.to_string(),
        })?;

        let project_dir = resolve_path(&raw.project_dir).map_err(|e| DevtoolsError::ConfigError {
            message: format!("project_dir '{}' could not be resolved: {e}", raw.project_dir),
        })?;

        let config = Self {
            project_dir,
            organization: raw.organization,
            host: raw.host,
            ssh_user: raw.ssh_user,
            use_https: raw.http,
            meta_dependency: raw.meta_dependency,
            max_resolve_rounds: raw.max_resolve_rounds,
            projects: raw.projects,
        };
        config.validate()?;
        Ok(config)
    }

    /// Picks the configuration file: an explicit path wins, then
    /// `<root_dir>/devtools.toml`, then `~/.devtools/devtools.toml`.
    ///
    /// # Errors
    ///
    /// Fails only when the home directory is needed and cannot be determined.
    pub fn locate(explicit: Option<&Path>, root_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(root) = root_dir {
            return Ok(root.join(CONFIG_FILE_NAME));
        }
        Ok(get_home_dir()?.join(".devtools").join(CONFIG_FILE_NAME))
    }

    fn validate(&self) -> Result<()> {
        let fail = |message: String| -> Result<()> {
            Err(DevtoolsError::ConfigError {
                message,
            }
            .into())
        };

        if !self.project_dir.is_absolute() {
            return fail(format!(
                "project_dir must be an absolute path, got {}",
                self.project_dir.display()
            ));
        }
        if self.organization.trim().is_empty() {
            return fail("organization must not be empty".to_string());
        }
        if self.host.trim().is_empty() {
            return fail("host must not be empty".to_string());
        }
        if self.meta_dependency.trim().is_empty() {
            return fail("meta_dependency must not be empty".to_string());
        }
        if self.max_resolve_rounds == Some(0) {
            return fail("max_resolve_rounds must be at least 1".to_string());
        }
        if self.projects.is_empty() {
            return fail("projects must list at least one project".to_string());
        }

        let mut seen = HashSet::new();
        for project in &self.projects {
            if project.is_empty() || project.contains('/') || project.contains('\\') {
                return fail(format!("invalid project name '{project}'"));
            }
            if !seen.insert(project.as_str()) {
                return fail(format!("project '{project}' is listed more than once"));
            }
        }

        Ok(())
    }

    /// Root directory under which all projects live.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Organization owning the projects.
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Whether fetch URLs use HTTPS rather than SSH.
    #[must_use]
    pub const fn use_https(&self) -> bool {
        self.use_https
    }

    /// Name of the meta-dependency whose failures only surface as text.
    #[must_use]
    pub fn meta_dependency(&self) -> &str {
        &self.meta_dependency
    }

    /// Optional ceiling on graph attempts per resolver run.
    #[must_use]
    pub const fn max_resolve_rounds(&self) -> Option<usize> {
        self.max_resolve_rounds
    }

    /// Known project names, in configuration order.
    #[must_use]
    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// Whether `name` is a known project.
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.projects.iter().any(|p| p == name)
    }

    /// `<project_dir>/<name>`
    #[must_use]
    pub fn project_root(&self, name: &str) -> PathBuf {
        self.project_dir.join(name)
    }

    /// `<project_dir>/<name>/source`
    #[must_use]
    pub fn source_dir(&self, name: &str) -> PathBuf {
        self.project_root(name).join("source")
    }

    /// `<project_dir>/<name>/source/conanfile.py`
    #[must_use]
    pub fn recipe_path(&self, name: &str) -> PathBuf {
        self.source_dir(name).join("conanfile.py")
    }

    /// `<project_dir>/<name>/source/buildtools/profiles`
    #[must_use]
    pub fn profile_dir(&self, name: &str) -> PathBuf {
        self.source_dir(name).join("buildtools").join("profiles")
    }

    /// Fetch URL for a repository of the organization.
    ///
    /// `https://<host>/<organization>/<name>.git` or
    /// `<ssh_user>@<host>:<organization>/<name>.git`.
    #[must_use]
    pub fn repository_url(&self, name: &str) -> String {
        if self.use_https {
            format!("https://{}/{}/{}.git", self.host, self.organization, name)
        } else {
            format!("{}@{}:{}/{}.git", self.ssh_user, self.host, self.organization, name)
        }
    }

    /// Every known project, without tags.
    #[must_use]
    pub fn all_projects(&self) -> Vec<ProjectSpec> {
        self.projects.iter().map(ProjectSpec::named).collect()
    }

    /// Drops unknown and duplicate specs, preserving first-seen order.
    #[must_use]
    pub fn filter_known(&self, specs: &[ProjectSpec]) -> Vec<ProjectSpec> {
        let mut seen = HashSet::new();
        let mut known = Vec::new();
        for spec in specs {
            if !self.is_known(&spec.name) {
                tracing::warn!("Skipping unknown project {}", spec.name);
                continue;
            }
            if seen.insert(spec.clone()) {
                known.push(spec.clone());
            }
        }
        known
    }

    /// Derives the project from a working directory inside the project tree:
    /// the first component of `cwd` relative to `project_dir`.
    #[must_use]
    pub fn project_from_dir(&self, cwd: &Path) -> Option<String> {
        // The working directory may arrive canonicalized (symlinked temp dirs)
        let relative = cwd.strip_prefix(&self.project_dir).ok().or_else(|| {
            let canonical = std::fs::canonicalize(&self.project_dir).ok()?;
            cwd.strip_prefix(canonical).ok()
        })?;
        match relative.components().next()? {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml(project_dir: &str) -> String {
        format!(
            r#"
project_dir = "{project_dir}"
organization = "TimZoet"
projects = ["alexandria", "common", "pyreq"]
"#
        )
    }

    #[test]
    fn test_parse_minimal_config() {
        let config =
            DevtoolsConfig::from_toml_str(&sample_toml("/srv/dev"), Path::new("devtools.toml"))
                .unwrap();
        assert_eq!(config.project_dir(), Path::new("/srv/dev"));
        assert_eq!(config.organization(), "TimZoet");
        assert!(config.use_https());
        assert_eq!(config.meta_dependency(), "pyreq");
        assert_eq!(config.max_resolve_rounds(), None);
        assert_eq!(config.projects().len(), 3);
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
project_dir = "/srv/dev"
organization = "acme"
host = "git.example.com"
ssh_user = "gitlab"
http = false
meta_dependency = "buildreq"
max_resolve_rounds = 10
projects = ["core"]
"#;
        let config = DevtoolsConfig::from_toml_str(content, Path::new("devtools.toml")).unwrap();
        assert_eq!(config.repository_url("core"), "gitlab@git.example.com:acme/core.git");
        assert_eq!(config.meta_dependency(), "buildreq");
        assert_eq!(config.max_resolve_rounds(), Some(10));
    }

    #[test]
    fn test_tilde_project_dir_is_expanded() {
        let config =
            DevtoolsConfig::from_toml_str(&sample_toml("~/dev"), Path::new("devtools.toml"))
                .unwrap();
        assert_eq!(config.project_dir(), get_home_dir().unwrap().join("dev"));
    }

    #[test]
    fn test_relative_project_dir_rejected() {
        let err = DevtoolsConfig::from_toml_str(&sample_toml("dev"), Path::new("devtools.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let content = format!("{}\nprojectdir = \"/x\"\n", sample_toml("/srv/dev"));
        let err = DevtoolsConfig::from_toml_str(&content, Path::new("devtools.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DevtoolsError>(),
            Some(DevtoolsError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_invalid_projects_rejected() {
        assert!(DevtoolsConfig::new("/srv/dev", "acme", Vec::<String>::new()).is_err());
        assert!(DevtoolsConfig::new("/srv/dev", "acme", ["a", "a"]).is_err());
        assert!(DevtoolsConfig::new("/srv/dev", "acme", ["a/b"]).is_err());
        assert!(DevtoolsConfig::new("/srv/dev", "", ["a"]).is_err());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let content = format!("{}\nmax_resolve_rounds = 0\n", sample_toml("/srv/dev"));
        assert!(DevtoolsConfig::from_toml_str(&content, Path::new("devtools.toml")).is_err());
    }

    #[test]
    fn test_paths_and_urls() {
        let config = DevtoolsConfig::new("/srv/dev", "TimZoet", ["math"]).unwrap();
        assert_eq!(config.source_dir("math"), PathBuf::from("/srv/dev/math/source"));
        assert_eq!(config.recipe_path("math"), PathBuf::from("/srv/dev/math/source/conanfile.py"));
        assert_eq!(
            config.profile_dir("math"),
            PathBuf::from("/srv/dev/math/source/buildtools/profiles")
        );
        assert_eq!(config.repository_url("math"), "https://github.com/TimZoet/math.git");

        let ssh = config.with_https(false);
        assert_eq!(ssh.repository_url("math"), "git@github.com:TimZoet/math.git");
    }

    #[test]
    fn test_filter_known_dedupes_in_order() {
        let config = DevtoolsConfig::new("/srv/dev", "acme", ["a", "b", "c"]).unwrap();
        let specs: Vec<ProjectSpec> = ["c", "unknown", "a/v1", "c", "a/v1", "a"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let filtered = config.filter_known(&specs);
        let names: Vec<String> = filtered.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["c", "a/v1", "a"]);
    }

    #[test]
    fn test_project_from_dir() {
        let config = DevtoolsConfig::new("/srv/dev", "acme", ["math"]).unwrap();
        assert_eq!(
            config.project_from_dir(Path::new("/srv/dev/math/source/src")),
            Some("math".to_string())
        );
        assert_eq!(config.project_from_dir(Path::new("/srv/dev")), None);
        assert_eq!(config.project_from_dir(Path::new("/elsewhere/math")), None);
    }

    #[test]
    fn test_locate() {
        let explicit = DevtoolsConfig::locate(Some(Path::new("/etc/dt.toml")), None).unwrap();
        assert_eq!(explicit, PathBuf::from("/etc/dt.toml"));

        let rooted = DevtoolsConfig::locate(None, Some(Path::new("/srv/tools"))).unwrap();
        assert_eq!(rooted, PathBuf::from("/srv/tools/devtools.toml"));

        let fallback = DevtoolsConfig::locate(None, None).unwrap();
        assert!(fallback.ends_with(".devtools/devtools.toml"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = DevtoolsConfig::load(&temp.path().join("devtools.toml")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DevtoolsError>(),
            Some(DevtoolsError::ConfigNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("devtools.toml");
        std::fs::write(&path, sample_toml("/srv/dev")).unwrap();

        let config = DevtoolsConfig::load(&path).await.unwrap();
        assert!(config.is_known("pyreq"));
    }
}
