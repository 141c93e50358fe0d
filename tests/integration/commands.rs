//! CLI surface: help, list output and error reporting.

use anyhow::Result;
use assert_cmd::Command;
use flowpack_cli::test_utils::DescriptorFixture;
use predicates::prelude::*;

use crate::common::TestWorkspace;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("flowpack").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("shell"))
        .stdout(predicate::str::contains("pack"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("flowpack").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flowpack"));
}

#[test]
fn test_list_table() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    workspace.write_descriptor(&DescriptorFixture::dist_and_fatjar().content)?;

    let output = workspace.run_flowpack(&["list"])?;
    output
        .assert_success()
        .assert_stdout_contains("shipping 1.0.0")
        .assert_stdout_contains("Packages:")
        .assert_stdout_contains("dist")
        .assert_stdout_contains("fatjar")
        .assert_stdout_contains("Deployments:")
        .assert_stdout_contains("prod")
        .assert_stdout_contains("Projects:")
        .assert_stdout_contains("flows");
    Ok(())
}

#[test]
fn test_list_json() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    workspace.write_descriptor(&DescriptorFixture::dist_and_fatjar().content)?;

    let output = workspace.run_flowpack(&["list", "--format", "json"])?;
    output.assert_success();

    let listing: serde_json::Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(listing["name"], "shipping");
    assert_eq!(listing["version"], "1.0.0");
    assert_eq!(listing["packages"][0]["name"], "dist");
    assert_eq!(listing["packages"][1]["kind"], "fatjar");
    assert_eq!(listing["deployments"][0]["name"], "prod");
    assert_eq!(listing["deployments"][0]["package"], "dist");
    assert_eq!(listing["projects"][0], "flows");
    Ok(())
}

#[test]
fn test_missing_descriptor() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let output = workspace.run_flowpack(&["list"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Deployment descriptor not found")
        .assert_stderr_contains("-f/--descriptor");
    Ok(())
}

#[test]
fn test_unknown_package_gets_suggestion() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    workspace.write_descriptor(&DescriptorFixture::dist_and_fatjar().content)?;

    let output = workspace.run_flowpack(&["build", "--package", "dost"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Package 'dost' not found")
        .assert_stderr_contains("Did you mean 'dist'?");
    Ok(())
}

#[test]
fn test_unknown_package_kind_is_reported() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    workspace.write_descriptor(
        "
flowman:
  version: 0.30.0
projects:
  - flows
packages:
  dist:
    kind: tarball
",
    )?;

    let output = workspace.run_flowpack(&["list"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Unknown package kind 'tarball' for 'dist'")
        .assert_stderr_contains("Supported package kinds are 'dist' and 'fatjar'");
    Ok(())
}

#[test]
fn test_defines_reach_the_descriptor() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    workspace.add_project("flows")?;
    workspace.write_descriptor(
        "
name: shipping
version: '${release}'
flowman:
  version: 0.30.0
projects:
  - flows
packages:
  dist:
    kind: dist
",
    )?;

    let output = workspace.run_flowpack(&["list", "-D", "release=7.1.0"])?;
    output.assert_success().assert_stdout_contains("shipping 7.1.0");
    Ok(())
}
