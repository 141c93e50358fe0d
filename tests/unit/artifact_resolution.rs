//! Artifact resolution against a repository in Maven layout.

use flowpack_cli::artifact::Artifact;
use flowpack_cli::constants::ENV_LOCAL_REPOSITORY;
use flowpack_cli::core::FlowpackError;
use flowpack_cli::descriptor::{BuildSettings, FlowmanSettings};
use flowpack_cli::repo::Repository;
use flowpack_cli::test_utils::FakeRepository;
use serial_test::serial;
use tempfile::TempDir;

fn settings(version: &str, plugins: &[&str]) -> FlowmanSettings {
    FlowmanSettings {
        version: version.to_string(),
        plugins: plugins.iter().map(ToString::to_string).collect(),
        ..FlowmanSettings::default()
    }
}

#[test]
fn test_classpath_for_bundled_tools() {
    let repo = FakeRepository::new();
    let flowman = settings("0.30.0", &["flowman-kafka"]);
    let build = BuildSettings {
        dependencies: vec!["org.postgresql:postgresql:42.5.0".to_string()],
        ..BuildSettings::default()
    };

    let mut artifacts = vec![flowman.resolve_tools(), flowman.resolve_spark_dependencies()];
    artifacts.extend(build.resolve_dependencies().unwrap());
    artifacts.extend(flowman.resolve_plugin_jars().unwrap());
    for artifact in &artifacts {
        repo.install_stub(artifact);
    }

    let repository = Repository::new(repo.root());
    let classpath = repository.classpath(&artifacts).unwrap();

    assert!(classpath.contains("flowman-tools-0.30.0.jar"));
    assert!(classpath.contains("flowman-spark-dependencies-0.30.0.pom"));
    assert!(classpath.contains("postgresql-42.5.0.jar"));
    assert!(classpath.contains("flowman-plugin-kafka-0.30.0.jar"));
}

#[test]
fn test_plugin_dist_resolves_through_repository() {
    let repo = FakeRepository::new();
    repo.install_plugin_dist("flowman-kafka", "0.30.0");

    let flowman = settings("0.30.0", &["flowman-kafka"]);
    let dists = flowman.resolve_plugin_dists().unwrap();
    assert_eq!(dists.len(), 1);

    let repository = Repository::new(repo.root());
    let path = repository.artifact_file(&dists[0]).unwrap();
    assert!(path.ends_with(
        "com/dimajix/flowman/flowman-plugin-kafka/0.30.0/flowman-plugin-kafka-0.30.0-bin.tar.gz"
    ));
}

#[test]
fn test_missing_artifact_reports_search_path() {
    let repo = FakeRepository::new();
    let repository = Repository::new(repo.root());

    let dist = settings("0.30.0", &[]).resolve_dist();
    let err = repository.artifact_file(&dist).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Artifact 'com.dimajix.flowman:flowman-dist:tar.gz:bin:0.30.0' not found in local repository"
    );
    let FlowpackError::ArtifactNotFound { path, .. } = err else {
        panic!("expected ArtifactNotFound");
    };
    assert!(path.ends_with("flowman-dist-0.30.0-bin.tar.gz"));
    assert!(path.starts_with(&repo.root().display().to_string()));
}

#[test]
fn test_artifact_files_keep_requested_order() {
    let repo = FakeRepository::new();
    let first = Artifact::new("org.acme", "one", "1.0");
    let second = Artifact::new("org.acme", "two", "2.0");
    repo.install_stub(&second);
    repo.install_stub(&first);

    let repository = Repository::new(repo.root());
    let files = repository.artifact_files(&[first, second]).unwrap();
    assert!(files[0].ends_with("one-1.0.jar"));
    assert!(files[1].ends_with("two-2.0.jar"));
}

#[test]
#[serial]
fn test_locate_uses_environment_variable() {
    let dir = TempDir::new().unwrap();
    // Guarded by #[serial]: no other test touches the process environment
    unsafe { std::env::set_var(ENV_LOCAL_REPOSITORY, dir.path()) };
    let located = Repository::locate(None);
    unsafe { std::env::remove_var(ENV_LOCAL_REPOSITORY) };

    assert_eq!(located.root(), dir.path());
}

#[test]
#[serial]
fn test_explicit_root_beats_environment_variable() {
    let dir = TempDir::new().unwrap();
    unsafe { std::env::set_var(ENV_LOCAL_REPOSITORY, dir.path()) };
    let located = Repository::locate(Some("/custom/repo"));
    unsafe { std::env::remove_var(ENV_LOCAL_REPOSITORY) };

    assert_eq!(located.root(), std::path::Path::new("/custom/repo"));
}

#[test]
fn test_locate_expands_home_prefix() {
    if let Some(home) = dirs::home_dir() {
        let located = Repository::locate(Some("~/repo"));
        assert_eq!(located.root(), home.join("repo"));
    }
}
