//! Shared plumbing for CLI command execution.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{ErrorContext, FlowpackError, IntoAnyhowWithContext};
use crate::descriptor::{
    Deployment, Descriptor, Interpolator, Package, project_basename, similar_names,
};
use crate::repo::Repository;

/// Descriptor and repository loaded once from the global CLI options.
pub(crate) struct CommandContext {
    pub descriptor: Descriptor,
    pub repository: Repository,
}

impl CommandContext {
    /// Locate the repository and load the descriptor.
    ///
    /// Interpolation sources are added in the conventional order: local
    /// repository, command-line defines, environment variables, project
    /// metadata.
    pub(crate) fn load(
        descriptor: &Path,
        defines: &[String],
        local_repository: Option<&str>,
    ) -> Result<Self> {
        let repository = Repository::locate(local_repository);
        let basedir = match descriptor.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let basedir = basedir.canonicalize().unwrap_or(basedir);

        let interpolator = Interpolator::new()
            .with_local_repository(repository.root())
            .with_defines(defines)
            .with_env()
            .with_project(&basedir);
        let descriptor = Descriptor::load(descriptor, &interpolator)?;

        Ok(Self {
            descriptor,
            repository,
        })
    }
}

/// Attach a "did you mean" suggestion to a failed entity lookup.
///
/// Other errors pass through unchanged and pick up their generic suggestion
/// in [`user_friendly_error`](crate::core::user_friendly_error).
pub(crate) fn with_suggestions(error: FlowpackError, descriptor: &Descriptor) -> anyhow::Error {
    let (similar, entities) = match &error {
        FlowpackError::PackageNotFound {
            name,
        } => (
            similar_names(name, descriptor.packages.iter().map(Package::name)),
            "packages",
        ),
        FlowpackError::DeploymentNotFound {
            name,
        } => (
            similar_names(name, descriptor.deployments.iter().map(Deployment::name)),
            "deployments",
        ),
        FlowpackError::ProjectNotFound {
            name,
        } => (
            similar_names(name, descriptor.projects.iter().map(|path| project_basename(path))),
            "projects",
        ),
        _ => return error.into(),
    };
    if similar.is_empty() {
        return error.into();
    }

    let suggestion = format!(
        "Did you mean '{}'? Run 'flowpack list' to see the declared {entities}",
        similar.join("' or '")
    );
    error.into_anyhow_with_context(ErrorContext::suggestion(suggestion))
}
