//! Build, pack and deploy workflows against a fake repository.

use std::fs::{self, File};
use std::path::Path;

use anyhow::Result;
use flate2::read::GzDecoder;
use flowpack_cli::test_utils::DescriptorFixture;

use crate::common::{FileAssert, TestWorkspace};

/// A workspace with the basic dist descriptor and its Flowman artifacts.
fn dist_workspace() -> Result<TestWorkspace> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    workspace.write_descriptor(&DescriptorFixture::basic_dist().content)?;
    workspace.repository().install_flowman_dist("0.30.0", &[]);
    workspace.repository().install_plugin_dist("flowman-kafka", "0.30.0");
    Ok(workspace)
}

fn tar_entries(path: &Path) -> Vec<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().display().to_string())
        .collect()
}

#[test]
fn test_build_stages_dist_package() -> Result<()> {
    let workspace = dist_workspace()?;

    let output = workspace.run_flowpack(&["build"])?;
    output.assert_success().assert_stdout_contains("-- Building package 'dist'");

    let build_dir = workspace.build_dir("dist");
    FileAssert::exists(build_dir.join("flowman-0.30.0/bin/flowexec"));
    FileAssert::exists(
        build_dir.join("flowman-0.30.0/plugins/flowman-kafka/flowman-kafka-0.30.0.jar"),
    );
    FileAssert::exists(build_dir.join("resources/flows/project.yml"));
    FileAssert::contains(
        build_dir.join("resources/conf/default-namespace.yml"),
        "flowman-kafka",
    );
    Ok(())
}

#[test]
fn test_pack_produces_tarball() -> Result<()> {
    let workspace = dist_workspace()?;

    let output = workspace.run_flowpack(&["pack", "--package", "dist"])?;
    output
        .assert_success()
        .assert_stdout_contains("-- Building package 'dist'")
        .assert_stdout_contains("-- Packing package 'dist'");

    let artifact = workspace.build_dir("dist").join("shipping-1.0.0.tar.gz");
    FileAssert::exists(&artifact);

    let entries = tar_entries(&artifact);
    assert!(entries.iter().any(|e| e == "shipping-1.0.0/bin/flowexec"));
    assert!(entries.iter().any(|e| e == "shipping-1.0.0/conf/default-namespace.yml"));
    assert!(entries.iter().any(|e| e == "shipping-1.0.0/flows/flows/project.yml"));
    assert!(
        entries
            .iter()
            .any(|e| e == "shipping-1.0.0/plugins/flowman-kafka/flowman-kafka-0.30.0.jar")
    );
    // The examples bundled with the distribution stay out of the tarball.
    assert!(!entries.iter().any(|e| e.contains("/examples/")));
    Ok(())
}

#[test]
fn test_deploy_copies_artifact() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    let releases = workspace.project_path().join("releases");
    fs::create_dir_all(&releases)?;
    workspace.write_descriptor(
        &DescriptorFixture::dist_and_fatjar()
            .with_value("location", &releases.display().to_string())
            .content,
    )?;
    workspace.repository().install_flowman_dist("0.30.0", &[]);
    workspace.repository().install_plugin_dist("flowman-kafka", "0.30.0");

    let output = workspace.run_flowpack(&["deploy"])?;
    output.assert_success().assert_stdout_contains("-- Deploying 'prod'");
    FileAssert::exists(releases.join("shipping-1.0.0.tar.gz"));
    Ok(())
}

#[test]
fn test_skip_tests_runs_nothing() -> Result<()> {
    let workspace = dist_workspace()?;

    let output = workspace.run_flowpack(&["test", "--skip-tests"])?;
    output.assert_success();
    assert!(!output.stdout.contains("-- Testing"));
    Ok(())
}

#[test]
fn test_build_reports_missing_artifact() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    workspace.write_descriptor(&DescriptorFixture::basic_dist().content)?;

    let output = workspace.run_flowpack(&["build"])?;
    output
        .assert_failure()
        .assert_stderr_contains("not found in local repository")
        .assert_stderr_contains("--local-repository");
    Ok(())
}
