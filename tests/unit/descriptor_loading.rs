//! Descriptor loading through the full interpolation chain.

use flowpack_cli::core::FlowpackError;
use flowpack_cli::descriptor::{Descriptor, Interpolator};
use flowpack_cli::test_utils::{DescriptorFixture, FakeRepository, ProjectFixture, init_test_logging};

#[test]
fn test_load_with_full_source_chain() {
    init_test_logging(None);

    let repo = FakeRepository::new();
    let fixture = ProjectFixture::new();
    fixture.add_project("flows");
    let path = fixture.write_descriptor(
        "
name: shipping
version: '${release}'
flowman:
  version: '${flowman.version}'
  config:
    - flowman.workspace.root=${project.basedir}/workspace
    - repo.root=${localRepository}
projects:
  - flows
packages:
  dist:
    kind: dist
",
    );

    let basedir = fixture.path().canonicalize().unwrap();
    let interpolator = Interpolator::new()
        .with_local_repository(repo.root())
        .with_defines(&["release=2.4.0".to_string(), "flowman.version=0.31.2".to_string()])
        .with_env()
        .with_project(&basedir);
    let descriptor = Descriptor::load(&path, &interpolator).unwrap();

    assert_eq!(descriptor.version, "2.4.0");
    assert_eq!(descriptor.identity(), "shipping-2.4.0");
    assert_eq!(descriptor.flowman.version, "0.31.2");
    assert_eq!(
        descriptor.flowman.config[0],
        format!("flowman.workspace.root={}/workspace", basedir.display())
    );
    assert_eq!(
        descriptor.flowman.config[1],
        format!("repo.root={}", repo.root().display())
    );
}

#[test]
fn test_unresolved_references_survive_loading() {
    let fixture = ProjectFixture::new();
    fixture.add_project("flows");
    let path = fixture.write_descriptor(
        "
flowman:
  version: 0.30.0
  environment:
    - basedir=${data.root}/input
projects:
  - flows
",
    );

    let descriptor = Descriptor::load(&path, &Interpolator::new()).unwrap();
    assert_eq!(descriptor.flowman.environment, vec!["basedir=${data.root}/input"]);
}

#[test]
fn test_canned_fixtures_load() {
    let fixture = ProjectFixture::new();
    fixture.add_project("flows");

    fixture.write_descriptor(&DescriptorFixture::basic_dist().content);
    let descriptor = fixture.load_descriptor();
    assert_eq!(descriptor.packages.len(), 1);

    fixture.write_descriptor(&DescriptorFixture::dist_and_fatjar().content);
    let descriptor = fixture.load_descriptor();
    assert_eq!(descriptor.packages.len(), 2);
    assert_eq!(descriptor.deployments.len(), 1);

    // Loads fine, but has nothing to build
    fixture.write_descriptor(&DescriptorFixture::missing_packages().content);
    let descriptor = fixture.load_descriptor();
    let err = descriptor.find_package("").unwrap_err();
    assert!(matches!(err, FlowpackError::MissingField { .. }));
}

#[test]
fn test_projects_resolve_against_basedir() {
    let fixture = ProjectFixture::new();
    fixture.add_project("pipelines/daily");
    let path = fixture.write_descriptor(
        "
flowman:
  version: 0.30.0
projects:
  - pipelines/daily
",
    );

    let descriptor = Descriptor::load(&path, &Interpolator::new()).unwrap();
    let declared = descriptor.find_project("daily").unwrap();
    assert_eq!(declared, "pipelines/daily");
    assert!(descriptor.basedir().join(declared).join("project.yml").is_file());
}
