//! Exports against real git working trees.

use anyhow::Result;
use conan_devtools::conan::{GraphLoadError, GraphOutcome, PackageManager};
use conan_devtools::export::{ExportError, PackageExporter};
use conan_devtools::git::Git;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::common::TestWorkspace;

/// Records what `VERSION` read at the moment of each export.
#[derive(Default)]
struct SnapshotConan {
    seen: Mutex<Vec<(PathBuf, String)>>,
    fail: bool,
}

impl SnapshotConan {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn versions(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(_, v)| v.clone()).collect()
    }
}

impl PackageManager for SnapshotConan {
    async fn export(&self, source: &Path) -> Result<()> {
        let version = std::fs::read_to_string(source.join("VERSION"))?;
        self.seen.lock().unwrap().push((source.to_path_buf(), version));
        if self.fail {
            anyhow::bail!("ERROR: recipe rejected");
        }
        Ok(())
    }

    async fn load_graph(&self, _: &Path, _: &str, _: &str) -> Result<GraphOutcome, GraphLoadError> {
        Ok(GraphOutcome::Resolved)
    }
}

#[tokio::test]
async fn test_export_without_ref_keeps_branch() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();
    let conan = SnapshotConan::default();

    PackageExporter::new(&Git, &conan).export(repo.repo_path(), None).await.unwrap();

    assert_eq!(conan.versions(), vec!["dev"]);
    assert_eq!(repo.get_current_branch().unwrap(), "main");
}

#[tokio::test]
async fn test_export_tag_then_restore_branch() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();
    let head = repo.get_commit_hash().unwrap();
    let conan = SnapshotConan::default();

    PackageExporter::new(&Git, &conan).export(repo.repo_path(), Some("v1.0")).await.unwrap();

    assert_eq!(conan.versions(), vec!["1.0"]);
    assert_eq!(repo.get_current_branch().unwrap(), "main");
    assert_eq!(repo.get_commit_hash().unwrap(), head);
}

#[tokio::test]
async fn test_missing_ref_leaves_branch_untouched() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();
    let conan = SnapshotConan::default();

    let err = PackageExporter::new(&Git, &conan)
        .export(repo.repo_path(), Some("does-not-exist"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Checkout { .. }));
    assert!(conan.versions().is_empty());
    assert_eq!(repo.get_current_branch().unwrap(), "main");
}

#[tokio::test]
async fn test_ref_naming_a_tracked_file_is_checkout_failure() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();
    let readme = repo.repo_path().join("README.md");
    std::fs::write(&readme, "work in progress\n").unwrap();
    let conan = SnapshotConan::default();

    let err = PackageExporter::new(&Git, &conan)
        .export(repo.repo_path(), Some("README.md"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Checkout { .. }));
    assert!(conan.versions().is_empty());
    assert_eq!(std::fs::read_to_string(&readme).unwrap(), "work in progress\n");
    assert_eq!(repo.get_current_branch().unwrap(), "main");
}

#[tokio::test]
async fn test_failed_export_restores_branch() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();
    let conan = SnapshotConan::failing();

    let err = PackageExporter::new(&Git, &conan)
        .export(repo.repo_path(), Some("v1.0"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Export { .. }));
    assert!(err.to_string().contains("recipe rejected"));
    assert_eq!(conan.versions(), vec!["1.0"]);
    assert_eq!(repo.get_current_branch().unwrap(), "main");
}

#[tokio::test]
async fn test_detached_head_is_restored_to_same_commit() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let repo = workspace.add_project("math").unwrap();
    repo.detach().unwrap();
    let detached_at = repo.get_commit_hash().unwrap();
    let conan = SnapshotConan::default();

    PackageExporter::new(&Git, &conan).export(repo.repo_path(), Some("v1.0")).await.unwrap();

    assert_eq!(conan.versions(), vec!["1.0"]);
    assert_eq!(repo.get_current_branch().unwrap(), "");
    assert_eq!(repo.get_commit_hash().unwrap(), detached_at);
}

#[tokio::test]
async fn test_export_of_plain_directory_is_open_failure() {
    let workspace = TestWorkspace::new(&["math"]).unwrap();
    let source = workspace.source_dir("math");
    std::fs::create_dir_all(&source).unwrap();
    let conan = SnapshotConan::default();

    let err = PackageExporter::new(&Git, &conan).export(&source, None).await.unwrap_err();

    assert!(matches!(err, ExportError::Open { .. }));
    assert!(conan.versions().is_empty());
}
