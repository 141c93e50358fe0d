//! Package entities of the deployment descriptor.
//!
//! A package is an independently buildable target selected by its `kind`
//! discriminator: `dist` produces a tarball distribution with an unpacked
//! Flowman release inside, `fatjar` (alias `jar`) produces a single shaded
//! jar. Both carry the same optional settings overrides; the concrete kinds
//! only add a field or two of their own.

use serde::{Deserialize, Serialize};

use super::settings::{BuildSettings, ExecutionSettings, FlowmanSettings};

/// Discriminator values accepted for the `kind` field of a package.
pub(crate) const PACKAGE_KINDS: &[&str] = &["dist", "fatjar", "jar"];

/// A buildable packaging target, selected by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Package {
    /// Tarball distribution with an unpacked Flowman release inside.
    #[serde(rename = "dist")]
    Dist(DistPackage),
    /// Single shaded jar with projects and configuration as resources.
    #[serde(rename = "fatjar", alias = "jar")]
    Fatjar(JarPackage),
}

impl Package {
    /// Entity name, back-filled from the descriptor map key.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Dist(pkg) => &pkg.name,
            Self::Fatjar(pkg) => &pkg.name,
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        match self {
            Self::Dist(pkg) => pkg.name = name.to_string(),
            Self::Fatjar(pkg) => pkg.name = name.to_string(),
        }
    }

    /// The `kind` discriminator this package was declared with.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dist(_) => "dist",
            Self::Fatjar(_) => "fatjar",
        }
    }

    /// Package-level Flowman settings overrides.
    #[must_use]
    pub fn flowman(&self) -> &FlowmanSettings {
        match self {
            Self::Dist(pkg) => &pkg.flowman,
            Self::Fatjar(pkg) => &pkg.flowman,
        }
    }

    /// Package-level build settings overrides.
    #[must_use]
    pub fn build(&self) -> &BuildSettings {
        match self {
            Self::Dist(pkg) => &pkg.build,
            Self::Fatjar(pkg) => &pkg.build,
        }
    }

    /// Package-level execution settings overrides.
    #[must_use]
    pub fn execution(&self) -> &ExecutionSettings {
        match self {
            Self::Dist(pkg) => &pkg.execution,
            Self::Fatjar(pkg) => &pkg.execution,
        }
    }

    /// Whether the test step is skipped for this package.
    #[must_use]
    pub fn skip_tests(&self) -> bool {
        match self {
            Self::Dist(pkg) => pkg.skip_tests,
            Self::Fatjar(pkg) => pkg.skip_tests,
        }
    }
}

/// A `dist`-kind package: tarball distribution layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistPackage {
    /// Entity name, back-filled from the descriptor map key.
    #[serde(skip)]
    pub name: String,

    /// Flowman settings overrides, merged onto the descriptor-level block.
    #[serde(deserialize_with = "super::de::null_as_default")]
    pub flowman: FlowmanSettings,

    /// Build settings overrides.
    #[serde(deserialize_with = "super::de::null_as_default")]
    pub build: BuildSettings,

    /// Execution settings overrides.
    #[serde(deserialize_with = "super::de::null_as_default")]
    pub execution: ExecutionSettings,

    /// Skip the test step for this package.
    #[serde(rename = "skipTests")]
    pub skip_tests: bool,

    /// Top-level directory inside the packed tarball. Empty means
    /// `<name>-<version>` of the descriptor identity.
    #[serde(rename = "baseDirectory")]
    pub base_directory: String,
}

/// A `fatjar`-kind package: one shaded jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JarPackage {
    /// Entity name, back-filled from the descriptor map key.
    #[serde(skip)]
    pub name: String,

    /// Flowman settings overrides, merged onto the descriptor-level block.
    #[serde(deserialize_with = "super::de::null_as_default")]
    pub flowman: FlowmanSettings,

    /// Build settings overrides.
    #[serde(deserialize_with = "super::de::null_as_default")]
    pub build: BuildSettings,

    /// Execution settings overrides.
    #[serde(deserialize_with = "super::de::null_as_default")]
    pub execution: ExecutionSettings,

    /// Skip the test step for this package.
    #[serde(rename = "skipTests")]
    pub skip_tests: bool,

    /// Bundle the project and resource directories into the jar.
    #[serde(rename = "includeProjects")]
    pub include_projects: bool,
}

impl Default for JarPackage {
    fn default() -> Self {
        Self {
            name: String::new(),
            flowman: FlowmanSettings::default(),
            build: BuildSettings::default(),
            execution: ExecutionSettings::default(),
            skip_tests: false,
            include_projects: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_dist_package() {
        let yaml = "
kind: dist
flowman:
  version: 0.30.0
  plugins:
    - flowman-kafka
baseDirectory: my-dist
";
        let package: Package = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(package.kind(), "dist");
        assert_eq!(package.flowman().version, "0.30.0");
        assert_eq!(package.flowman().plugins, vec!["flowman-kafka"]);
        assert!(!package.skip_tests());

        let Package::Dist(dist) = package else {
            panic!("expected a dist package");
        };
        assert_eq!(dist.base_directory, "my-dist");
    }

    #[test]
    fn test_deserialize_fatjar_package() {
        let yaml = "
kind: fatjar
skipTests: true
includeProjects: false
";
        let package: Package = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(package.kind(), "fatjar");
        assert!(package.skip_tests());

        let Package::Fatjar(jar) = package else {
            panic!("expected a fatjar package");
        };
        assert!(!jar.include_projects);
    }

    #[test]
    fn test_jar_is_an_alias_for_fatjar() {
        let package: Package = serde_yaml::from_str("kind: jar").unwrap();
        assert_eq!(package.kind(), "fatjar");
    }

    #[test]
    fn test_include_projects_defaults_to_true() {
        let package: Package = serde_yaml::from_str("kind: fatjar").unwrap();
        let Package::Fatjar(jar) = package else {
            panic!("expected a fatjar package");
        };
        assert!(jar.include_projects);
    }

    #[test]
    fn test_empty_settings_blocks() {
        let yaml = "
kind: dist
flowman:
build:
execution:
";
        let package: Package = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(package.flowman(), &FlowmanSettings::default());
        assert_eq!(package.build(), &BuildSettings::default());
        assert_eq!(package.execution(), &ExecutionSettings::default());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<Package, _> = serde_yaml::from_str("kind: tarball");
        assert!(result.is_err());
    }
}
