//! Deployment descriptor model, loading and lookup.
//!
//! The descriptor (`deployment.yml`) is the single input that drives
//! everything: which Flowman release to bundle, which projects to ship, and
//! which packages and deployments exist. Loading happens in stages so that
//! errors point at the right layer:
//!
//! 1. Read the file and parse it into a raw YAML tree.
//! 2. Interpolate `${...}` references over the raw tree
//!    ([`interpolation::Interpolator`]).
//! 3. Validate the `kind` discriminator of every package and deployment
//!    entry, so an unknown kind is reported by name instead of as a generic
//!    deserialization failure.
//! 4. Deserialize into the typed tree, back-filling each entity's `name`
//!    from its map key and preserving declaration order.
//! 5. Validate required fields (`flowman.version`, `projects`).
//!
//! A loaded [`Descriptor`] is immutable; the driver loads it once per
//! invocation and threads it by reference.

mod de;
pub mod deployment;
pub mod interpolation;
pub mod package;
pub mod settings;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::FlowpackError;

pub use deployment::{CopyDeployment, Deployment};
pub use interpolation::Interpolator;
pub use package::{DistPackage, JarPackage, Package};
pub use settings::{BuildSettings, ExecutionSettings, FlowmanSettings, Merge};

/// Maximum Levenshtein distance for a name suggestion, as a percentage of
/// the looked-up name's length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// The root document of a `deployment.yml`.
///
/// Field names follow the descriptor format; `projects` also accepts the
/// legacy `flows` key. Unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptor {
    /// Canonical path of the descriptor file. Set by [`Descriptor::load`].
    #[serde(skip)]
    file: PathBuf,

    /// Base name for packed artifacts. Defaults to the name of the
    /// directory containing the descriptor.
    pub name: String,

    /// Version appended to packed artifact names. Optional.
    pub version: String,

    /// Descriptor-level Flowman settings. `flowman.version` is required.
    #[serde(deserialize_with = "de::null_as_default")]
    pub flowman: FlowmanSettings,

    /// Descriptor-level build settings.
    #[serde(deserialize_with = "de::null_as_default")]
    pub build: BuildSettings,

    /// Descriptor-level execution settings.
    #[serde(deserialize_with = "de::null_as_default")]
    pub execution: ExecutionSettings,

    /// Flowman project directories to bundle, relative to the descriptor.
    #[serde(alias = "flows", deserialize_with = "de::string_or_seq")]
    pub projects: Vec<String>,

    /// Additional resource directories bundled next to the projects.
    #[serde(deserialize_with = "de::string_or_seq")]
    pub resources: Vec<String>,

    /// Declared packages in declaration order.
    #[serde(skip)]
    pub packages: Vec<Package>,

    /// Declared deployments in declaration order.
    #[serde(skip)]
    pub deployments: Vec<Deployment>,
}

impl Descriptor {
    /// Load and validate a deployment descriptor.
    ///
    /// The `interpolator` is applied to the raw YAML tree before typed
    /// deserialization, so `${...}` references work in every string value.
    pub fn load(path: &Path, interpolator: &Interpolator) -> Result<Self, FlowpackError> {
        if !path.is_file() {
            return Err(FlowpackError::DescriptorNotFound {
                path: path.display().to_string(),
            });
        }
        let file = path.canonicalize()?;

        let text = std::fs::read_to_string(&file)?;
        let mut tree: serde_yaml::Value = serde_yaml::from_str(&text)
            .map_err(|err| descriptor_parse(&file, err.to_string()))?;
        interpolator.interpolate_tree(&mut tree);

        Self::from_tree(&file, tree)
    }

    fn from_tree(file: &Path, tree: serde_yaml::Value) -> Result<Self, FlowpackError> {
        let mut packages_section = None;
        let mut deployments_section = None;
        if let serde_yaml::Value::Mapping(mapping) = &tree {
            for (key, value) in mapping {
                match key.as_str() {
                    Some("packages") => packages_section = Some(value.clone()),
                    Some("deployments") => deployments_section = Some(value.clone()),
                    _ => {}
                }
            }
        }

        let mut descriptor: Self = serde_yaml::from_value(tree)
            .map_err(|err| descriptor_parse(file, err.to_string()))?;
        descriptor.file = file.to_path_buf();

        descriptor.packages = decode_entities(
            file,
            packages_section,
            "package",
            package::PACKAGE_KINDS,
            Package::set_name,
        )?;
        descriptor.deployments = decode_entities(
            file,
            deployments_section,
            "deployment",
            deployment::DEPLOYMENT_KINDS,
            Deployment::set_name,
        )?;

        if descriptor.name.is_empty() {
            if let Some(dir_name) = file.parent().and_then(Path::file_name) {
                descriptor.name = dir_name.to_string_lossy().to_string();
            }
        }

        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<(), FlowpackError> {
        if self.flowman.version.trim().is_empty() {
            return Err(FlowpackError::MissingField {
                entity: "deployment descriptor".to_string(),
                field: "flowman.version".to_string(),
            });
        }
        if self.projects.is_empty() {
            return Err(FlowpackError::MissingField {
                entity: "deployment descriptor".to_string(),
                field: "projects".to_string(),
            });
        }

        // Projects are looked up by case-insensitive basename, so two
        // entries must not collide on it.
        let mut seen: HashMap<String, &str> = HashMap::new();
        for project in &self.projects {
            let basename = project_basename(project);
            if seen.insert(basename.to_lowercase(), project).is_some() {
                return Err(FlowpackError::DuplicateEntity {
                    entity: "project".to_string(),
                    name: basename.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Canonical path of the descriptor file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Directory containing the descriptor; project paths are relative to it.
    #[must_use]
    pub fn basedir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new("."))
    }

    /// `<name>-<version>` of the descriptor, with empty parts left out.
    #[must_use]
    pub fn identity(&self) -> String {
        join_non_empty(&[&self.name, &self.version])
    }

    /// Base file name (without extension) for an entity's packed artifact.
    #[must_use]
    pub fn artifact_name(&self, entity_name: &str) -> String {
        join_non_empty(&[&self.name, &self.version, entity_name])
    }

    /// Look up a package by name.
    ///
    /// An empty name selects the first declared package.
    pub fn find_package(&self, name: &str) -> Result<&Package, FlowpackError> {
        if name.is_empty() {
            return self.packages.first().ok_or_else(|| FlowpackError::MissingField {
                entity: "deployment descriptor".to_string(),
                field: "packages".to_string(),
            });
        }
        self.packages
            .iter()
            .find(|package| package.name() == name)
            .ok_or_else(|| FlowpackError::PackageNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a deployment by name.
    ///
    /// An empty name selects the first declared deployment.
    pub fn find_deployment(&self, name: &str) -> Result<&Deployment, FlowpackError> {
        if name.is_empty() {
            return self.deployments.first().ok_or_else(|| FlowpackError::MissingField {
                entity: "deployment descriptor".to_string(),
                field: "deployments".to_string(),
            });
        }
        self.deployments
            .iter()
            .find(|deployment| deployment.name() == name)
            .ok_or_else(|| FlowpackError::DeploymentNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a declared project path by name.
    ///
    /// The name is matched case-insensitively against the basename of each
    /// declared project path; an empty name selects the first declared
    /// project. The returned path is the declared relative path, which works
    /// both against [`Self::basedir`] and against a staged build directory.
    pub fn find_project(&self, name: &str) -> Result<&str, FlowpackError> {
        if name.is_empty() {
            return self
                .projects
                .first()
                .map(String::as_str)
                .ok_or_else(|| FlowpackError::MissingField {
                    entity: "deployment descriptor".to_string(),
                    field: "projects".to_string(),
                });
        }
        self.projects
            .iter()
            .find(|project| project_basename(project).eq_ignore_ascii_case(name))
            .map(String::as_str)
            .ok_or_else(|| FlowpackError::ProjectNotFound {
                name: name.to_string(),
            })
    }

    /// Effective Flowman settings for a package.
    #[must_use]
    pub fn effective_flowman_settings(&self, package: &Package) -> FlowmanSettings {
        FlowmanSettings::merge(&self.flowman, package.flowman())
    }

    /// Effective build settings for a package.
    #[must_use]
    pub fn effective_build_settings(&self, package: &Package) -> BuildSettings {
        BuildSettings::merge(&self.build, package.build())
    }

    /// Effective execution settings for a package.
    #[must_use]
    pub fn effective_execution_settings(&self, package: &Package) -> ExecutionSettings {
        ExecutionSettings::merge(&self.execution, package.execution())
    }
}

/// Decode one entity section (`packages:` or `deployments:`) into a vector
/// in declaration order, validating `kind` discriminators first.
fn decode_entities<T, F>(
    file: &Path,
    section: Option<serde_yaml::Value>,
    entity: &'static str,
    kinds: &[&str],
    set_name: F,
) -> Result<Vec<T>, FlowpackError>
where
    T: serde::de::DeserializeOwned,
    F: Fn(&mut T, &str),
{
    let Some(section) = section else {
        return Ok(Vec::new());
    };
    if section.is_null() {
        return Ok(Vec::new());
    }
    let serde_yaml::Value::Mapping(mapping) = section else {
        return Err(descriptor_parse(
            file,
            format!("'{entity}s' must be a mapping of names to entities"),
        ));
    };

    let mut entities = Vec::with_capacity(mapping.len());
    for (key, value) in &mapping {
        let Some(name) = key.as_str() else {
            return Err(descriptor_parse(file, format!("{entity} names must be strings")));
        };

        let kind = entity_kind(value);
        match kind {
            None => {
                return Err(FlowpackError::MissingField {
                    entity: format!("{entity} '{name}'"),
                    field: "kind".to_string(),
                });
            }
            Some(kind) if !kinds.contains(&kind) => {
                return Err(FlowpackError::UnknownEntityKind {
                    entity: entity.to_string(),
                    name: name.to_string(),
                    kind: kind.to_string(),
                });
            }
            Some(_) => {}
        }

        let mut decoded: T = serde_yaml::from_value(value.clone())
            .map_err(|err| descriptor_parse(file, format!("{entity} '{name}': {err}")))?;
        set_name(&mut decoded, name);
        entities.push(decoded);
    }
    Ok(entities)
}

fn entity_kind(value: &serde_yaml::Value) -> Option<&str> {
    let serde_yaml::Value::Mapping(fields) = value else {
        return None;
    };
    fields
        .iter()
        .find_map(|(key, value)| (key.as_str() == Some("kind")).then(|| value.as_str()))
        .flatten()
}

fn descriptor_parse(file: &Path, reason: String) -> FlowpackError {
    FlowpackError::DescriptorParse {
        file: file.display().to_string(),
        reason,
    }
}

pub(crate) fn project_basename(path: &str) -> &str {
    Path::new(path).file_name().and_then(|name| name.to_str()).unwrap_or(path)
}

fn join_non_empty(parts: &[&str]) -> String {
    parts.iter().copied().filter(|part| !part.is_empty()).collect::<Vec<_>>().join("-")
}

/// Names similar to `target`, closest first, at most three.
///
/// Used to build "did you mean" suggestions when a package, deployment or
/// project lookup fails.
pub(crate) fn similar_names<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored.into_iter().take(3).map(|(_, name)| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = "
flowman:
  version: 0.30.0
  plugins:
    - flowman-kafka

build:
  dependencies:
    - org.postgresql:postgresql:42.5.0

execution:
  profiles:
    - integration

projects:
  - flows

packages:
  dist:
    kind: dist
    flowman:
      plugins:
        - flowman-avro
  uberjar:
    kind: fatjar
    skipTests: true

deployments:
  prod:
    kind: copy
    package: dist
    location: s3://releases/flowman
";

    fn write_descriptor(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("deployment.yml");
        fs::write(&path, contents).unwrap();
        path
    }

    fn load(contents: &str) -> (TempDir, Descriptor) {
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, contents);
        let descriptor = Descriptor::load(&path, &Interpolator::new()).unwrap();
        (dir, descriptor)
    }

    #[test]
    fn test_load_full_descriptor() {
        let (_dir, descriptor) = load(DESCRIPTOR);

        assert_eq!(descriptor.flowman.version, "0.30.0");
        assert_eq!(descriptor.flowman.plugins, vec!["flowman-kafka"]);
        assert_eq!(descriptor.build.dependencies, vec!["org.postgresql:postgresql:42.5.0"]);
        assert_eq!(descriptor.execution.profiles, vec!["integration"]);
        assert_eq!(descriptor.projects, vec!["flows"]);

        // Declaration order and back-filled names
        let names: Vec<&str> = descriptor.packages.iter().map(Package::name).collect();
        assert_eq!(names, vec!["dist", "uberjar"]);
        assert_eq!(descriptor.packages[0].kind(), "dist");
        assert_eq!(descriptor.packages[1].kind(), "fatjar");
        assert_eq!(descriptor.deployments[0].name(), "prod");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployment.yml");
        let err = Descriptor::load(&path, &Interpolator::new()).unwrap_err();
        assert!(matches!(err, FlowpackError::DescriptorNotFound { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, "flowman: [unclosed");
        let err = Descriptor::load(&path, &Interpolator::new()).unwrap_err();
        assert!(matches!(err, FlowpackError::DescriptorParse { .. }));
    }

    #[test]
    fn test_unknown_package_kind() {
        let yaml = "
flowman:
  version: 0.30.0
projects:
  - flows
packages:
  dist:
    kind: tarball
";
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, yaml);
        let err = Descriptor::load(&path, &Interpolator::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown package kind 'tarball' for 'dist'");
    }

    #[test]
    fn test_missing_kind() {
        let yaml = "
flowman:
  version: 0.30.0
projects:
  - flows
deployments:
  prod:
    package: dist
    location: /srv/releases
";
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, yaml);
        let err = Descriptor::load(&path, &Interpolator::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing field 'kind' in deployment 'prod'");
    }

    #[test]
    fn test_missing_flowman_version() {
        let yaml = "
flowman:
  plugins:
    - flowman-kafka
projects:
  - flows
";
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, yaml);
        let err = Descriptor::load(&path, &Interpolator::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing field 'flowman.version' in deployment descriptor");
    }

    #[test]
    fn test_missing_projects() {
        let yaml = "
flowman:
  version: 0.30.0
";
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, yaml);
        let err = Descriptor::load(&path, &Interpolator::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing field 'projects' in deployment descriptor");
    }

    #[test]
    fn test_flows_alias() {
        let yaml = "
flowman:
  version: 0.30.0
flows:
  - flows/main
";
        let (_dir, descriptor) = load(yaml);
        assert_eq!(descriptor.projects, vec!["flows/main"]);
    }

    #[test]
    fn test_unknown_top_level_keys_are_ignored() {
        let yaml = "
flowman:
  version: 0.30.0
projects:
  - flows
futureSetting: 42
";
        let (_dir, descriptor) = load(yaml);
        assert_eq!(descriptor.flowman.version, "0.30.0");
    }

    #[test]
    fn test_duplicate_project_basenames() {
        let yaml = "
flowman:
  version: 0.30.0
projects:
  - flows
  - legacy/Flows
";
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, yaml);
        let err = Descriptor::load(&path, &Interpolator::new()).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate project 'Flows' in deployment descriptor");
    }

    #[test]
    fn test_find_package() {
        let (_dir, descriptor) = load(DESCRIPTOR);

        // Empty name selects the first declared package
        assert_eq!(descriptor.find_package("").unwrap().name(), "dist");
        assert_eq!(descriptor.find_package("uberjar").unwrap().name(), "uberjar");

        let err = descriptor.find_package("missing").unwrap_err();
        assert_eq!(err.to_string(), "Package 'missing' not found in deployment descriptor");

        // Package lookup is case-sensitive
        assert!(descriptor.find_package("Uberjar").is_err());
    }

    #[test]
    fn test_find_package_without_packages() {
        let yaml = "
flowman:
  version: 0.30.0
projects:
  - flows
";
        let (_dir, descriptor) = load(yaml);
        let err = descriptor.find_package("").unwrap_err();
        assert_eq!(err.to_string(), "Missing field 'packages' in deployment descriptor");
    }

    #[test]
    fn test_find_deployment() {
        let (_dir, descriptor) = load(DESCRIPTOR);
        assert_eq!(descriptor.find_deployment("").unwrap().name(), "prod");
        assert_eq!(descriptor.find_deployment("prod").unwrap().package(), "dist");

        let err = descriptor.find_deployment("staging").unwrap_err();
        assert!(matches!(err, FlowpackError::DeploymentNotFound { .. }));
    }

    #[test]
    fn test_find_project_matches_basename_case_insensitively() {
        let yaml = "
flowman:
  version: 0.30.0
projects:
  - pipelines/daily
  - pipelines/hourly
";
        let (_dir, descriptor) = load(yaml);

        assert_eq!(descriptor.find_project("DAILY").unwrap(), "pipelines/daily");
        assert_eq!(descriptor.find_project("hourly").unwrap(), "pipelines/hourly");

        // Empty name selects the first declared project
        assert_eq!(descriptor.find_project("").unwrap(), "pipelines/daily");

        let err = descriptor.find_project("weekly").unwrap_err();
        assert_eq!(err.to_string(), "Project 'weekly' not found in deployment descriptor");
    }

    #[test]
    fn test_effective_settings() {
        let (_dir, descriptor) = load(DESCRIPTOR);
        let package = descriptor.find_package("dist").unwrap();

        let flowman = descriptor.effective_flowman_settings(package);
        assert_eq!(flowman.version, "0.30.0");
        assert_eq!(flowman.plugins, vec!["flowman-kafka", "flowman-avro"]);

        let build = descriptor.effective_build_settings(package);
        assert_eq!(build.dependencies, vec!["org.postgresql:postgresql:42.5.0"]);

        let execution = descriptor.effective_execution_settings(package);
        assert_eq!(execution.profiles, vec!["integration"]);
    }

    #[test]
    fn test_load_applies_interpolation() {
        let yaml = "
flowman:
  version: ${flowman.version}
projects:
  - flows
";
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, yaml);
        let interpolator =
            Interpolator::new().with_defines(&["flowman.version=0.31.0".to_string()]);
        let descriptor = Descriptor::load(&path, &interpolator).unwrap();
        assert_eq!(descriptor.flowman.version, "0.31.0");
    }

    #[test]
    fn test_identity_and_artifact_name() {
        let yaml = "
name: shipping
version: 1.2.0
flowman:
  version: 0.30.0
projects:
  - flows
";
        let (_dir, descriptor) = load(yaml);
        assert_eq!(descriptor.identity(), "shipping-1.2.0");
        assert_eq!(descriptor.artifact_name("dist"), "shipping-1.2.0-dist");
    }

    #[test]
    fn test_name_defaults_to_descriptor_directory() {
        let (dir, descriptor) = load(DESCRIPTOR);
        let dir_name = dir
            .path()
            .canonicalize()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(descriptor.name, dir_name);
        assert_eq!(descriptor.artifact_name("dist"), format!("{dir_name}-dist"));
    }

    #[test]
    fn test_similar_names() {
        let candidates = ["dist", "uberjar", "nightly"];
        assert_eq!(similar_names("dost", candidates), vec!["dist"]);
        assert_eq!(similar_names("disk", candidates), vec!["dist"]);
        assert!(similar_names("zzzzz", candidates).is_empty());
    }
}
