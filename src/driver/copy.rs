//! Copy deployments: put a packed artifact at a target location.

use std::path::Path;

use tracing::info;

use crate::core::FlowpackError;
use crate::descriptor::CopyDeployment;
use crate::remotefs::FileSystemRegistry;

/// Copy the packed artifact to the deployment's location.
///
/// The location is resolved through the registry; a bare path deploys to
/// the local filesystem.
pub(crate) fn deploy(
    deployment: &CopyDeployment,
    artifact: &Path,
    registry: &FileSystemRegistry,
) -> Result<(), FlowpackError> {
    let (filesystem, target) = registry.resolve(&deployment.location)?;
    info!("copying {} to {}", artifact.display(), deployment.location);
    filesystem.put(&target, artifact)
}
