//! Resolver runs configured from a `devtools.toml` file.

use conan_devtools::conan::{GraphLoadError, GraphOutcome, PackageManager};
use conan_devtools::config::DevtoolsConfig;
use conan_devtools::models::PackageReference;
use conan_devtools::resolver::{DependencyResolver, ResolutionProblem};
use conan_devtools::test_utils::{FakePackageManager, FakeVcs, init_test_logging};
use std::path::Path;

use crate::common::TestWorkspace;

fn missing(reference: &str) -> Result<GraphOutcome, GraphLoadError> {
    Ok(GraphOutcome::Missing(reference.parse().unwrap()))
}

#[tokio::test]
async fn test_chain_of_owned_requirements_resolves() {
    init_test_logging(None);
    let workspace = TestWorkspace::new(&["app", "common", "math", "pyreq"]).unwrap();
    let config = workspace.config().await.unwrap();
    let vcs = FakeVcs::new();
    let conan = FakePackageManager::new();
    conan
        .push_unstructured("ERROR: Error loading conanfile: pyreq/1.0.0@acme/v1.0.0 not found")
        .push_outcome(missing("math/2.1.0@acme/v2.1.0"))
        .push_outcome(missing("common/0.4.0@acme/v0.4.0"));

    let resolver = DependencyResolver::new(&config, &vcs, &conan).unwrap();
    let recipe = config.recipe_path("app");
    let profile = conan.resolve_profile("default", Some(&config.profile_dir("app")));
    let problems = resolver.resolve(&recipe, &profile).await;

    assert!(problems.is_empty(), "unexpected problems: {problems:?}");
    let clones = vcs.clones();
    let cloned: Vec<(&str, Option<&str>, bool)> = clones
        .iter()
        .map(|c| {
            (
                c.url.as_str(),
                c.options.branch.as_deref(),
                c.options.recurse_submodules,
            )
        })
        .collect();
    assert_eq!(
        cloned,
        vec![
            ("https://github.com/acme/pyreq.git", Some("v1.0.0"), false),
            ("https://github.com/acme/math.git", Some("v2.1.0"), true),
            ("https://github.com/acme/common.git", Some("v0.4.0"), true),
        ]
    );
    assert!(clones.iter().all(|c| c.target.starts_with(resolver.scratch_dir())));
    assert_eq!(conan.exports().len(), 3);
    assert_eq!(conan.graph_loads().len(), 4);
    assert!(conan.graph_loads().iter().all(|(_, host, build)| host == "default" && build == "default"));
}

#[tokio::test]
async fn test_stops_at_first_foreign_requirement() {
    let workspace = TestWorkspace::new(&["app", "math"]).unwrap();
    let config = workspace.config().await.unwrap();
    let vcs = FakeVcs::new();
    let conan = FakePackageManager::new();
    conan
        .push_outcome(missing("math/2.1.0@acme/v2.1.0"))
        .push_outcome(missing("fmt/10.2.1"))
        .push_outcome(missing("common/0.4.0@acme/v0.4.0"));

    let resolver = DependencyResolver::new(&config, &vcs, &conan).unwrap();
    let problems = resolver.resolve(&config.recipe_path("app"), "default").await;

    assert_eq!(
        problems,
        vec![ResolutionProblem::ForeignRequirement {
            reference: "fmt/10.2.1".parse::<PackageReference>().unwrap(),
            organization: "acme".to_string(),
        }]
    );
    assert_eq!(vcs.clones().len(), 1);
    assert_eq!(conan.graph_loads().len(), 2);
}

#[tokio::test]
async fn test_configured_round_limit_applies() {
    let config = DevtoolsConfig::from_toml_str(
        r#"
project_dir = "/srv/dev"
organization = "acme"
max_resolve_rounds = 1
projects = ["app"]
"#,
        Path::new("devtools.toml"),
    )
    .unwrap();
    let vcs = FakeVcs::new();
    let conan = FakePackageManager::new();
    conan.repeat_forever(missing("math/2.1.0@acme/v2.1.0"));

    let resolver = DependencyResolver::new(&config, &vcs, &conan).unwrap();
    let problems = resolver.resolve(Path::new("/srv/dev/app/source/conanfile.py"), "default").await;

    assert_eq!(
        problems,
        vec![ResolutionProblem::RoundLimitExceeded {
            rounds: 1
        }]
    );
    assert_eq!(vcs.clones().len(), 1);
}

#[tokio::test]
async fn test_scratch_directory_is_removed_with_resolver() {
    let workspace = TestWorkspace::new(&["app"]).unwrap();
    let config = workspace.config().await.unwrap();
    let vcs = FakeVcs::new();
    let conan = FakePackageManager::new();

    let resolver = DependencyResolver::new(&config, &vcs, &conan).unwrap();
    let scratch = resolver.scratch_dir().to_path_buf();
    assert!(scratch.is_dir());

    drop(resolver);
    assert!(!scratch.exists());
}
