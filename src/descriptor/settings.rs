//! Settings blocks of the deployment descriptor and their override merge.
//!
//! A descriptor declares three kinds of settings: [`FlowmanSettings`] (which
//! framework release and plugins to bundle), [`BuildSettings`] (extra
//! dependencies and shading rules) and [`ExecutionSettings`] (flags for the
//! spawned Flowman process). Each block exists once at descriptor level and
//! optionally again per package or deployment; the entity-level block is
//! merged on top of the descriptor-level block to form the effective
//! settings.
//!
//! The merge follows exactly two strategies, implemented once and reused by
//! every [`Merge`] implementation:
//!
//! - [`merge_list`] concatenates base before override. Nothing is
//!   de-duplicated: an entry present in both blocks appears twice, which is
//!   what allows a package to deliberately repeat a flag some tool needs to
//!   see again.
//! - [`merge_scalar`] lets a non-empty override replace the base value.
//!   Only `version` and `distribution` use it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, expand_plugin_shorthand};
use crate::constants::{
    FLOWMAN_DIST_ARTIFACT, FLOWMAN_GROUP_ID, FLOWMAN_PARENT_ARTIFACT,
    FLOWMAN_SPARK_DEPENDENCIES_ARTIFACT, FLOWMAN_TOOLS_ARTIFACT,
};
use crate::core::FlowpackError;

/// Override merge of a settings block.
///
/// `base` is the descriptor-level block, `overrides` the entity-level one.
/// Implementations combine the two field by field using [`merge_list`] and
/// [`merge_scalar`], never anything else.
pub trait Merge {
    /// Merge `overrides` on top of `base` into an effective block.
    #[must_use]
    fn merge(base: &Self, overrides: &Self) -> Self;
}

/// List merge strategy: base entries first, override entries appended.
///
/// Order is preserved and duplicates are retained.
#[must_use]
pub fn merge_list(base: &[String], overrides: &[String]) -> Vec<String> {
    base.iter().chain(overrides).cloned().collect()
}

/// Scalar merge strategy: a non-empty override wins, else the base survives.
#[must_use]
pub fn merge_scalar(base: &str, overrides: &str) -> String {
    if overrides.is_empty() { base.to_string() } else { overrides.to_string() }
}

/// Which Flowman release to bundle and how it is configured.
///
/// `version` is required and non-empty at descriptor level; an entity-level
/// block may leave it empty to inherit. The list fields accept a lone string
/// in place of a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowmanSettings {
    /// Flowman release version, e.g. `0.30.0`.
    pub version: String,

    /// Optional distribution flavor. Merged like `version` but not consumed
    /// by the artifact resolvers, which always address the standard
    /// distribution.
    pub distribution: String,

    /// Plugins to bundle, as coordinates or built-in shorthand names.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub plugins: Vec<String>,

    /// Flowman profiles to activate.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub profiles: Vec<String>,

    /// `key=value` environment entries for the namespace.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub environment: Vec<String>,

    /// `key=value` Flowman configuration entries for the namespace.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub config: Vec<String>,
}

impl FlowmanSettings {
    fn flowman_artifact(&self, artifact_id: &str) -> Artifact {
        Artifact::new(FLOWMAN_GROUP_ID, artifact_id, self.version.as_str())
    }

    /// Coordinates of the Flowman binary distribution tarball.
    #[must_use]
    pub fn resolve_dist(&self) -> Artifact {
        self.flowman_artifact(FLOWMAN_DIST_ARTIFACT)
            .with_packaging("tar.gz")
            .with_classifier("bin")
    }

    /// Coordinates of the Flowman tools jar carrying the CLI entry points.
    #[must_use]
    pub fn resolve_tools(&self) -> Artifact {
        self.flowman_artifact(FLOWMAN_TOOLS_ARTIFACT)
    }

    /// Coordinates of the Spark dependencies POM.
    #[must_use]
    pub fn resolve_spark_dependencies(&self) -> Artifact {
        self.flowman_artifact(FLOWMAN_SPARK_DEPENDENCIES_ARTIFACT).with_packaging("pom")
    }

    /// Coordinates of the parent POM of the resolved release.
    #[must_use]
    pub fn resolve_parent(&self) -> Artifact {
        self.flowman_artifact(FLOWMAN_PARENT_ARTIFACT).with_packaging("pom")
    }

    /// Resolve the plugin list to jar artifacts.
    pub fn resolve_plugin_jars(&self) -> Result<Vec<Artifact>, FlowpackError> {
        self.resolve_plugins("jar", None)
    }

    /// Resolve the plugin list to binary distribution tarballs.
    pub fn resolve_plugin_dists(&self) -> Result<Vec<Artifact>, FlowpackError> {
        self.resolve_plugins("tar.gz", Some("bin"))
    }

    /// Resolve each plugin entry through the shorthand rewrite and the
    /// coordinate parser. A plugin without its own version inherits this
    /// block's `version`.
    fn resolve_plugins(
        &self,
        packaging: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<Artifact>, FlowpackError> {
        self.plugins
            .iter()
            .map(|plugin| {
                let coords = expand_plugin_shorthand(plugin);
                Artifact::parse(&coords, packaging, classifier, Some(&self.version))
            })
            .collect()
    }

    /// Plugin entries named by their bare name rather than coordinates.
    ///
    /// These are the plugins shipped inside the Flowman distribution; they
    /// are listed in the namespace file and packaged from the unpacked
    /// distribution's `plugins/` directory.
    #[must_use]
    pub fn short_plugin_names(&self) -> Vec<String> {
        self.plugins.iter().filter(|plugin| !plugin.contains(':')).cloned().collect()
    }
}

impl Merge for FlowmanSettings {
    fn merge(base: &Self, overrides: &Self) -> Self {
        Self {
            version: merge_scalar(&base.version, &overrides.version),
            distribution: merge_scalar(&base.distribution, &overrides.distribution),
            plugins: merge_list(&base.plugins, &overrides.plugins),
            profiles: merge_list(&base.profiles, &overrides.profiles),
            environment: merge_list(&base.environment, &overrides.environment),
            config: merge_list(&base.config, &overrides.config),
        }
    }
}

/// Extra artifacts and shading rules applied while packaging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// `key=value` build properties.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub properties: Vec<String>,

    /// Coordinates of extra artifacts to bundle alongside Flowman.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub dependencies: Vec<String>,

    /// Coordinate glob patterns excluded from the shaded jar.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub exclusions: Vec<String>,
}

impl BuildSettings {
    /// Parse `properties` into a key/value map.
    ///
    /// Entries that do not have both a key and a value are skipped. Values
    /// keep their exact text.
    #[must_use]
    pub fn properties_map(&self) -> BTreeMap<String, String> {
        self.properties
            .iter()
            .filter_map(|entry| entry.split_once('='))
            .filter(|(key, value)| !key.is_empty() && !value.is_empty())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    /// Parse `dependencies` into artifact coordinates.
    ///
    /// Extra dependencies always carry their own version, so the two-segment
    /// coordinate form fails with [`FlowpackError::MissingVersion`].
    pub fn resolve_dependencies(&self) -> Result<Vec<Artifact>, FlowpackError> {
        self.dependencies.iter().map(|dep| Artifact::parse(dep, "jar", None, None)).collect()
    }
}

impl Merge for BuildSettings {
    fn merge(base: &Self, overrides: &Self) -> Self {
        Self {
            properties: merge_list(&base.properties, &overrides.properties),
            dependencies: merge_list(&base.dependencies, &overrides.dependencies),
            exclusions: merge_list(&base.exclusions, &overrides.exclusions),
        }
    }
}

/// Flags passed to the spawned Flowman process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Flowman profiles to activate, passed as `-P`.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub profiles: Vec<String>,

    /// `key=value` environment entries, passed as `-D`.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub environment: Vec<String>,

    /// `key=value` configuration entries, passed as `--conf`.
    #[serde(deserialize_with = "super::de::string_or_seq")]
    pub config: Vec<String>,

    /// Extra JVM flags.
    #[serde(rename = "javaOptions", deserialize_with = "super::de::string_or_seq")]
    pub java_options: Vec<String>,

    /// Extra flags for the Flowman tool itself.
    #[serde(rename = "flowmanOptions", deserialize_with = "super::de::string_or_seq")]
    pub flowman_options: Vec<String>,

    /// `key=value` entries added to the process environment.
    #[serde(rename = "systemEnvironment", deserialize_with = "super::de::string_or_seq")]
    pub system_environment: Vec<String>,
}

impl Merge for ExecutionSettings {
    fn merge(base: &Self, overrides: &Self) -> Self {
        Self {
            profiles: merge_list(&base.profiles, &overrides.profiles),
            environment: merge_list(&base.environment, &overrides.environment),
            config: merge_list(&base.config, &overrides.config),
            java_options: merge_list(&base.java_options, &overrides.java_options),
            flowman_options: merge_list(&base.flowman_options, &overrides.flowman_options),
            system_environment: merge_list(&base.system_environment, &overrides.system_environment),
        }
    }
}
