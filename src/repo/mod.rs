//! Local Maven-layout artifact repository.
//!
//! Flowman releases, plugins and extra dependencies are resolved as files
//! under a Maven repository root, normally `~/.m2/repository` populated by a
//! previous `mvn install` or by any Maven-compatible tool. This module only
//! locates files; it never downloads anything.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::artifact::Artifact;
use crate::constants::ENV_LOCAL_REPOSITORY;
use crate::core::FlowpackError;

/// Separator between classpath entries.
const CLASSPATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// A local Maven-layout repository rooted at a directory.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Open a repository at an explicit root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the repository root.
    ///
    /// Order of precedence: the explicit `--local-repository` value, the
    /// `FLOWPACK_LOCAL_REPOSITORY` environment variable, then
    /// `~/.m2/repository`. Explicit values may use `~` and environment
    /// references, which are expanded.
    #[must_use]
    pub fn locate(explicit: Option<&str>) -> Self {
        let root = explicit
            .map(ToString::to_string)
            .or_else(|| std::env::var(ENV_LOCAL_REPOSITORY).ok())
            .map(|path| expand_path(&path))
            .unwrap_or_else(default_root);
        debug!("using local repository at {}", root.display());
        Self { root }
    }

    /// Repository root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an artifact file inside this repository.
    ///
    /// Fails with [`FlowpackError::ArtifactNotFound`] when the file does not
    /// exist; the error names the path that was searched.
    pub fn artifact_file(&self, artifact: &Artifact) -> Result<PathBuf, FlowpackError> {
        let path = self.root.join(artifact.repository_path());
        if !path.is_file() {
            return Err(FlowpackError::ArtifactNotFound {
                coords: artifact.to_string(),
                path: path.display().to_string(),
            });
        }
        debug!("resolved {artifact} to {}", path.display());
        Ok(path)
    }

    /// Resolve several artifacts at once, preserving order.
    pub fn artifact_files(&self, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, FlowpackError> {
        artifacts.iter().map(|artifact| self.artifact_file(artifact)).collect()
    }

    /// Resolve artifacts and join their paths into a Java classpath string.
    pub fn classpath(&self, artifacts: &[Artifact]) -> Result<String, FlowpackError> {
        let files = self.artifact_files(artifacts)?;
        let entries: Vec<String> =
            files.iter().map(|file| file.display().to_string()).collect();
        Ok(entries.join(CLASSPATH_SEPARATOR))
    }
}

fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(path),
    }
}

fn default_root() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".m2").join("repository")
}
