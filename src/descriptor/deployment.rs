//! Deployment entities of the deployment descriptor.
//!
//! A deployment publishes a previously built package somewhere. The only
//! kind is `copy`, which uploads the packed artifact to a target location.

use serde::{Deserialize, Serialize};

/// Discriminator values accepted for the `kind` field of a deployment.
pub(crate) const DEPLOYMENT_KINDS: &[&str] = &["copy"];

/// A deployment target, selected by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Deployment {
    /// Copy the packed artifact of a package to a location.
    #[serde(rename = "copy")]
    Copy(CopyDeployment),
}

impl Deployment {
    /// Entity name, back-filled from the descriptor map key.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Copy(deployment) => &deployment.name,
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        match self {
            Self::Copy(deployment) => deployment.name = name.to_string(),
        }
    }

    /// The `kind` discriminator this deployment was declared with.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Copy(_) => "copy",
        }
    }

    /// Name of the package this deployment publishes.
    #[must_use]
    pub fn package(&self) -> &str {
        match self {
            Self::Copy(deployment) => &deployment.package,
        }
    }
}

/// A `copy`-kind deployment: upload the packed artifact to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyDeployment {
    /// Entity name, back-filled from the descriptor map key.
    #[serde(skip)]
    pub name: String,

    /// Name of the package whose packed artifact is published.
    pub package: String,

    /// Target location URI, e.g. `s3://bucket/releases` or a local path.
    pub location: String,
}
