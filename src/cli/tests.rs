use super::*;
use clap::Parser;

#[test]
fn test_parse_clone_with_projects() {
    let cli = Cli::try_parse_from(["devtools", "clone", "--projects", "math", "common/v1.0"]).unwrap();
    let Commands::Clone(cmd) = cli.command else {
        panic!("expected clone");
    };
    let projects: Vec<String> = cmd.projects.iter().map(ToString::to_string).collect();
    assert_eq!(projects, vec!["math", "common/v1.0"]);
}

#[test]
fn test_parse_export_without_projects() {
    let cli = Cli::try_parse_from(["devtools", "export"]).unwrap();
    assert!(matches!(cli.command, Commands::Export(ref cmd) if cmd.projects.is_empty()));
}

#[test]
fn test_parse_export_deps_requires_profile() {
    assert!(Cli::try_parse_from(["devtools", "export-deps", "--project", "math"]).is_err());

    let cli = Cli::try_parse_from(["devtools", "export-deps", "--profile", "clang"]).unwrap();
    let Commands::ExportDeps(cmd) = cli.command else {
        panic!("expected export-deps");
    };
    assert_eq!(cmd.profile, "clang");
    assert!(cmd.project.is_none());
}

#[test]
fn test_parse_install_defaults() {
    let cli = Cli::try_parse_from(["devtools", "install", "--profile", "gcc"]).unwrap();
    let Commands::Install(cmd) = cli.command else {
        panic!("expected install");
    };
    assert_eq!(cmd.build, vec!["missing:*"]);
    assert_eq!(cmd.output_folder, PathBuf::from("build"));
}

#[test]
fn test_parse_install_overrides() {
    let cli = Cli::try_parse_from([
        "devtools",
        "install",
        "--project",
        "math",
        "--profile",
        "gcc",
        "--build",
        "missing",
        "cascade",
        "--of",
        "/tmp/out",
    ])
    .unwrap();
    let Commands::Install(cmd) = cli.command else {
        panic!("expected install");
    };
    assert_eq!(cmd.build, vec!["missing", "cascade"]);
    assert_eq!(cmd.output_folder, PathBuf::from("/tmp/out"));
}

#[test]
fn test_invalid_project_argument_rejected() {
    assert!(Cli::try_parse_from(["devtools", "clone", "--projects", "a/b/c"]).is_err());
}

#[test]
fn test_verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["devtools", "-v", "-q", "clear-cache"]).is_err());
}

#[test]
fn test_log_directive() {
    let cli = Cli::try_parse_from(["devtools", "clear-cache"]).unwrap();
    assert_eq!(cli.default_log_directive(), "info");
    let cli = Cli::try_parse_from(["devtools", "--verbose", "clear-cache"]).unwrap();
    assert_eq!(cli.default_log_directive(), "debug");
    let cli = Cli::try_parse_from(["devtools", "clear-cache", "--quiet"]).unwrap();
    assert_eq!(cli.default_log_directive(), "error");
}

#[test]
fn test_global_config_flags() {
    let cli = Cli::try_parse_from([
        "devtools",
        "--config",
        "/etc/devtools.toml",
        "clear-cache",
        "--root-dir",
        "/srv/tools",
    ])
    .unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/etc/devtools.toml")));
    assert_eq!(cli.root_dir, Some(PathBuf::from("/srv/tools")));
}
