//! Maven-style artifact coordinates.
//!
//! Flowman framework releases, plugins and extra build dependencies are all
//! addressed by colon-delimited Maven coordinates. This module parses those
//! strings into a structured [`Artifact`] and knows the canonical layout of an
//! artifact inside a Maven repository.
//!
//! # Coordinate Forms
//!
//! Three shapes are accepted:
//!
//! | Form | Example | Notes |
//! |------|---------|-------|
//! | `group:artifact` | `com.dimajix.flowman:flowman-plugin-kafka` | needs a default version |
//! | `group:artifact:version` | `org.postgresql:postgresql:42.5.0` | |
//! | `group:artifact:classifier:version` | `org.acme:lib:bin:1.2.3` | |
//!
//! The packaging (`jar`, `tar.gz`, `pom`) is never part of the coordinate
//! string; callers pass a default according to what they are resolving, and
//! likewise a default classifier that applies unless the coordinate carries
//! its own.
//!
//! # Built-in Plugin Shorthand
//!
//! Plugin lists additionally accept bare built-in plugin names. A name like
//! `flowman-kafka` (no colon, lowercase alphanumeric suffix) expands to
//! `com.dimajix.flowman:flowman-plugin-kafka` before coordinate parsing, see
//! [`expand_plugin_shorthand`].
//!
//! # Examples
//!
//! ```rust
//! use flowpack_cli::artifact::Artifact;
//!
//! let artifact = Artifact::parse("org.postgresql:postgresql:42.5.0", "jar", None, None)?;
//! assert_eq!(artifact.file_name(), "postgresql-42.5.0.jar");
//!
//! // The version falls back to the surrounding settings
//! let plugin = Artifact::parse(
//!     "com.dimajix.flowman:flowman-plugin-kafka",
//!     "jar",
//!     None,
//!     Some("1.0.0"),
//! )?;
//! assert_eq!(plugin.version, "1.0.0");
//! # Ok::<(), flowpack_cli::core::FlowpackError>(())
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::constants::{FLOWMAN_GROUP_ID, PLUGIN_ARTIFACT_PREFIX, PLUGIN_SHORTHAND_PREFIX};
use crate::core::FlowpackError;

/// Structured Maven coordinates of a single artifact.
///
/// An `Artifact` identifies one file in a Maven repository: the coordinate
/// fields select the directory, while packaging and classifier select the
/// file within it. Instances are built by [`Artifact::parse`] or by the
/// settings resolvers for the well-known Flowman artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    /// Maven group id, e.g. `com.dimajix.flowman`
    pub group_id: String,
    /// Maven artifact id, e.g. `flowman-dist`
    pub artifact_id: String,
    /// Version string, never empty
    pub version: String,
    /// Packaging, also used as the file extension (`jar`, `tar.gz`, `pom`)
    pub packaging: String,
    /// Optional classifier, e.g. `bin` for binary distributions
    pub classifier: Option<String>,
}

impl Artifact {
    /// Create an artifact with `jar` packaging and no classifier.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: "jar".to_string(),
            classifier: None,
        }
    }

    /// Parse colon-delimited coordinates into an [`Artifact`].
    ///
    /// Accepts two, three or four segments:
    /// - `group:artifact` uses `default_version`, failing with
    ///   [`FlowpackError::MissingVersion`] when none applies
    /// - `group:artifact:version`
    /// - `group:artifact:classifier:version`
    ///
    /// Any other segment count fails with
    /// [`FlowpackError::InvalidCoordinate`]. Trailing colons do not add
    /// segments. The packaging is always `default_packaging`; the classifier
    /// is `default_classifier` unless the coordinate carries its own.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flowpack_cli::artifact::Artifact;
    ///
    /// let a = Artifact::parse("org.acme:lib:1.2.3", "jar", None, None)?;
    /// assert_eq!(a.group_id, "org.acme");
    /// assert_eq!(a.version, "1.2.3");
    ///
    /// let b = Artifact::parse("org.acme:lib:bin:1.2.3", "jar", None, None)?;
    /// assert_eq!(b.classifier.as_deref(), Some("bin"));
    /// # Ok::<(), flowpack_cli::core::FlowpackError>(())
    /// ```
    pub fn parse(
        coords: &str,
        default_packaging: &str,
        default_classifier: Option<&str>,
        default_version: Option<&str>,
    ) -> Result<Self, FlowpackError> {
        let mut parts: Vec<&str> = coords.split(':').collect();
        while parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }

        let (group, artifact, classifier, version) = match parts.as_slice() {
            [group, artifact] => {
                let version = default_version.filter(|v| !v.is_empty()).ok_or_else(|| {
                    FlowpackError::MissingVersion {
                        coords: coords.to_string(),
                    }
                })?;
                (*group, *artifact, default_classifier, version)
            }
            [group, artifact, version] => (*group, *artifact, default_classifier, *version),
            [group, artifact, classifier, version] => {
                (*group, *artifact, Some(*classifier), *version)
            }
            _ => {
                return Err(FlowpackError::InvalidCoordinate {
                    coords: coords.to_string(),
                });
            }
        };

        Ok(Self {
            group_id: group.to_string(),
            artifact_id: artifact.to_string(),
            version: version.to_string(),
            packaging: default_packaging.to_string(),
            classifier: classifier.map(str::to_string),
        })
    }

    /// Return the artifact with a different packaging.
    #[must_use]
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    /// Return the artifact with a classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// File name of the artifact inside its repository directory.
    ///
    /// `artifact-version[-classifier].packaging`, e.g.
    /// `flowman-dist-1.0.0-bin.tar.gz`.
    #[must_use]
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => {
                format!("{}-{}-{}.{}", self.artifact_id, self.version, classifier, self.packaging)
            }
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// Path of the artifact file relative to a Maven repository root.
    ///
    /// Follows the standard repository layout:
    /// `group/as/dirs/artifact/version/file_name`.
    #[must_use]
    pub fn repository_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.group_id.split('.') {
            path.push(segment);
        }
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.file_name());
        path
    }

    /// Whether an exclusion pattern covers this artifact.
    ///
    /// Patterns are glob-style coordinates: `group:artifact` matches any
    /// version, `group:artifact:version` matches exactly, and `*` is a
    /// wildcard within any segment. Malformed patterns match nothing.
    #[must_use]
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        let target = if pattern.split(':').count() <= 2 {
            format!("{}:{}", self.group_id, self.artifact_id)
        } else {
            format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
        };
        glob::Pattern::new(pattern).is_ok_and(|pattern| pattern.matches(&target))
    }
}

impl fmt::Display for Artifact {
    /// Formats as `group:artifact:packaging[:classifier]:version`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(classifier) => write!(
                f,
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.packaging, classifier, self.version
            ),
            None => write!(
                f,
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.packaging, self.version
            ),
        }
    }
}

/// Expand a built-in plugin shorthand into full coordinates.
///
/// A bare name of the form `flowman-<suffix>` with a non-empty lowercase
/// alphanumeric suffix becomes `com.dimajix.flowman:flowman-plugin-<suffix>`.
/// Names containing a `:` are already coordinates and pass through unchanged,
/// as does anything that doesn't match the shorthand pattern.
///
/// # Examples
///
/// ```rust
/// use flowpack_cli::artifact::expand_plugin_shorthand;
///
/// assert_eq!(
///     expand_plugin_shorthand("flowman-kafka"),
///     "com.dimajix.flowman:flowman-plugin-kafka"
/// );
/// assert_eq!(
///     expand_plugin_shorthand("org.acme:custom-plugin:1.0"),
///     "org.acme:custom-plugin:1.0"
/// );
/// ```
#[must_use]
pub fn expand_plugin_shorthand(name: &str) -> String {
    if name.contains(':') {
        return name.to_string();
    }
    let Some(suffix) = name.strip_prefix(PLUGIN_SHORTHAND_PREFIX) else {
        return name.to_string();
    };
    if suffix.is_empty()
        || !suffix.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    {
        return name.to_string();
    }
    format!("{FLOWMAN_GROUP_ID}:{PLUGIN_ARTIFACT_PREFIX}{suffix}")
}
