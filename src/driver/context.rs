//! Per-package build directory layout and source staging.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::constants::{BUILD_DIR, OUTPUT_DIR};
use crate::core::FlowpackError;
use crate::descriptor::Descriptor;
use crate::utils::{copy_dir_if_exists, ensure_dir};

/// Directory layout for building one package.
///
/// Every package builds below `<descriptor dir>/target/flowman/<package>`,
/// so packages of one descriptor never clobber each other. The `resources`
/// subdirectory receives the staged projects and configuration; packed
/// artifacts land directly in the build directory.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Root build directory of the package.
    pub build_dir: PathBuf,
    /// Staging directory for projects, resources and configuration.
    pub output_dir: PathBuf,
}

impl BuildContext {
    #[must_use]
    pub fn new(descriptor: &Descriptor, package_name: &str) -> Self {
        let build_dir = descriptor.basedir().join(BUILD_DIR).join(package_name);
        let output_dir = build_dir.join(OUTPUT_DIR);
        Self {
            build_dir,
            output_dir,
        }
    }

    /// Root of the unpacked Flowman release inside [`Self::build_dir`].
    ///
    /// The binary distribution tarball carries a single top-level
    /// `flowman-<version>` directory.
    #[must_use]
    pub fn home_dir(&self, version: &str) -> PathBuf {
        self.build_dir.join(format!("flowman-{version}"))
    }
}

/// Copy the declared projects and resources plus a local `conf/` directory
/// into a staging root, keeping their declared relative paths.
///
/// A declared directory that does not exist is skipped with a warning; a
/// missing `conf/` is skipped silently since most descriptors do not ship
/// one.
pub(crate) fn stage_sources(
    descriptor: &Descriptor,
    target_root: &Path,
) -> Result<(), FlowpackError> {
    ensure_dir(target_root)?;
    for source in descriptor.projects.iter().chain(&descriptor.resources) {
        let from = descriptor.basedir().join(source);
        if !copy_dir_if_exists(&from, &target_root.join(source))? {
            warn!("skipping missing directory {}", from.display());
        }
    }
    copy_dir_if_exists(&descriptor.basedir().join("conf"), &target_root.join("conf"))?;
    Ok(())
}

/// The declared project paths a command applies to: the named project, or
/// every declared project when no name is given.
pub(crate) fn select_projects(
    descriptor: &Descriptor,
    project: Option<&str>,
) -> Result<Vec<String>, FlowpackError> {
    match project {
        Some(name) => Ok(vec![descriptor.find_project(name)?.to_string()]),
        None => Ok(descriptor.projects.clone()),
    }
}
