//! Common test utilities and fixtures for flowpack integration tests
//!
//! This module consolidates frequently used test patterns to reduce duplication
//! and improve test maintainability.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use flowpack_cli::test_utils::FakeRepository;

/// Test workspace builder: a project directory holding a deployment
/// descriptor and its Flowman projects, plus a fake local Maven repository.
pub struct TestWorkspace {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    repository: FakeRepository,
}

impl TestWorkspace {
    /// Create a new workspace with an empty project directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        fs::create_dir_all(&project_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            repository: FakeRepository::new(),
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// The fake Maven repository commands resolve artifacts against
    pub fn repository(&self) -> &FakeRepository {
        &self.repository
    }

    /// Build directory of a package below the project directory
    pub fn build_dir(&self, package: &str) -> PathBuf {
        self.project_dir.join("target/flowman").join(package)
    }

    /// Write a deployment descriptor to the project directory
    pub fn write_descriptor(&self, content: &str) -> Result<PathBuf> {
        let path = self.project_dir.join("deployment.yml");
        fs::write(&path, content)
            .with_context(|| format!("Failed to write descriptor to {path:?}"))?;
        Ok(path)
    }

    /// Create a Flowman project directory with a minimal project.yml
    pub fn add_project(&self, name: &str) -> Result<()> {
        let project = self.project_dir.join(name);
        fs::create_dir_all(project.join("mapping"))?;
        fs::write(
            project.join("project.yml"),
            format!("name: {name}\nversion: 1.0\n"),
        )?;
        fs::write(project.join("mapping/empty.yml"), "mappings: {}\n")?;
        Ok(())
    }

    /// Run a flowpack command in the project directory
    ///
    /// The child process resolves artifacts against this workspace's fake
    /// repository through the `FLOWPACK_LOCAL_REPOSITORY` environment
    /// variable, so the caller's environment is never touched.
    pub fn run_flowpack(&self, args: &[&str]) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_flowpack");
        let output = Command::new(binary)
            .args(args)
            .current_dir(&self.project_dir)
            .env("FLOWPACK_LOCAL_REPOSITORY", self.repository.root())
            .env("NO_COLOR", "1")
            .output()
            .context("Failed to run flowpack command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStdout: {}\nStderr: {}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success,
            "Command unexpectedly succeeded\nStdout: {}",
            self.stdout
        );
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(
            !path.exists(),
            "Expected file to not exist: {}",
            path.display()
        );
    }

    /// Assert a file contains specific content
    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{}'\nActual content: {}",
            path.display(),
            expected,
            content
        );
    }
}
