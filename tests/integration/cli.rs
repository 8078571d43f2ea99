//! The `devtools` binary end to end.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::TestWorkspace;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("devtools")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export-deps"))
        .stdout(predicate::str::contains("clear-cache"));
}

#[test]
fn test_missing_configuration_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    Command::cargo_bin("devtools")
        .unwrap()
        .env("DEVTOOLS_ROOT_DIR", temp.path())
        .env("NO_COLOR", "1")
        .args(["export-deps", "--profile", "default"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_invalid_configuration_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::write(temp.path().join("devtools.toml"), "project_dir = \"relative\"\norganization = \"acme\"\nprojects = [\"a\"]\n")
        .unwrap();
    Command::cargo_bin("devtools")
        .unwrap()
        .env("NO_COLOR", "1")
        .args(["--root-dir", temp.path().to_str().unwrap(), "clone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project_dir must be an absolute path"));
}

#[test]
fn test_unknown_project_is_reported() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    workspace
        .devtools()
        .args(["export-deps", "--project", "widgets", "--profile", "default"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown project widgets"));
}

#[test]
fn test_project_outside_tree_is_reported() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    workspace
        .devtools()
        .current_dir(workspace.root_dir())
        .args(["install", "--profile", "default"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not derive a project"));
}

#[test]
fn test_missing_recipe_is_reported_for_derived_project() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    std::fs::create_dir_all(workspace.source_dir("math")).unwrap();
    workspace
        .devtools()
        .current_dir(workspace.source_dir("math"))
        .args(["export-deps", "--profile", "default"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("conanfile.py"));
}

#[test]
fn test_clone_checks_out_tag_of_existing_project() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();

    workspace
        .devtools()
        .args(["clone", "--projects", "math/v1.0", "unknown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("devtools ran successfully."));

    assert_eq!(repo.get_current_branch().unwrap(), "");
    assert_eq!(std::fs::read_to_string(repo.repo_path().join("VERSION")).unwrap(), "1.0");
}

#[test]
fn test_clone_reports_missing_tag() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();

    workspace
        .devtools()
        .args(["clone", "--projects", "math/v9.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to checkout v9.9"))
        .stderr(predicate::str::contains(format!("at {}\n", workspace.source_dir("math").display())));

    assert_eq!(repo.get_current_branch().unwrap(), "main");
}

#[test]
fn test_export_with_missing_tag_restores_branch() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();

    workspace
        .devtools()
        .args(["export", "--projects", "math/v9.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to checkout v9.9"))
        .stderr(predicate::str::contains("export did not succeed"));

    assert_eq!(repo.get_current_branch().unwrap(), "main");
    assert_eq!(std::fs::read_to_string(repo.repo_path().join("VERSION")).unwrap(), "dev");
}
