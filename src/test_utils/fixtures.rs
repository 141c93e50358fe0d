//! Test fixtures for deployment descriptors and project directories.
//!
//! This module provides canned descriptor contents and a temporary project
//! directory builder used by unit and integration tests alike.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::descriptor::{Descriptor, Interpolator};

/// Canned `deployment.yml` contents for common test scenarios.
#[derive(Clone, Debug)]
pub struct DescriptorFixture {
    pub content: String,
    pub name: String,
}

impl DescriptorFixture {
    /// A dist package with one project and a built-in plugin.
    #[must_use]
    pub fn basic_dist() -> Self {
        Self {
            name: "basic_dist".to_string(),
            content: r"
name: shipping
version: 1.0.0

flowman:
  version: 0.30.0
  plugins:
    - flowman-kafka
  config:
    - flowman.workspace.root=/tmp/flowman
  environment:
    - basedir=/data

projects:
  - flows

packages:
  dist:
    kind: dist
"
            .trim_start()
            .to_string(),
        }
    }

    /// A fatjar package next to a dist package, plus a copy deployment.
    #[must_use]
    pub fn dist_and_fatjar() -> Self {
        Self {
            name: "dist_and_fatjar".to_string(),
            content: r"
name: shipping
version: 1.0.0

flowman:
  version: 0.30.0
  plugins:
    - flowman-kafka

projects:
  - flows

packages:
  dist:
    kind: dist
  uberjar:
    kind: fatjar
    skipTests: true

deployments:
  prod:
    kind: copy
    package: dist
    location: '{location}'
"
            .trim_start()
            .to_string(),
        }
    }

    /// A descriptor that fails validation (no packages).
    #[must_use]
    pub fn missing_packages() -> Self {
        Self {
            name: "missing_packages".to_string(),
            content: "flowman:\n  version: 0.30.0\nprojects:\n  - flows\n".to_string(),
        }
    }

    /// Replace a `{placeholder}` marker in the canned content.
    #[must_use]
    pub fn with_value(mut self, placeholder: &str, value: &str) -> Self {
        self.content = self.content.replace(&format!("{{{placeholder}}}"), value);
        self
    }
}

/// A temporary directory holding a deployment descriptor and its sources.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// An empty fixture directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create fixture directory"),
        }
    }

    /// Root of the fixture directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a `deployment.yml` with the given content.
    pub fn write_descriptor(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("deployment.yml");
        fs::write(&path, content).expect("failed to write descriptor");
        path
    }

    /// Create a Flowman project directory with a minimal `project.yml`.
    pub fn add_project(&self, rel: &str) -> &Self {
        let project = self.dir.path().join(rel);
        fs::create_dir_all(project.join("mapping")).expect("failed to create project");
        let name = Path::new(rel)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(rel);
        fs::write(
            project.join("project.yml"),
            format!("name: {name}\nversion: 1.0\n"),
        )
        .expect("failed to write project.yml");
        fs::write(project.join("mapping/empty.yml"), "mappings: {}\n")
            .expect("failed to write mapping");
        self
    }

    /// Write an arbitrary file below the fixture root.
    pub fn add_file(&self, rel: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directory");
        }
        fs::write(&path, content).expect("failed to write file");
        self
    }

    /// Load the fixture's descriptor without extra defines.
    #[must_use]
    pub fn load_descriptor(&self) -> Descriptor {
        Descriptor::load(&self.dir.path().join("deployment.yml"), &Interpolator::new())
            .expect("failed to load fixture descriptor")
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
