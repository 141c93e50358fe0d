//! The packaged `default-namespace.yml`.
//!
//! Both package kinds render a namespace file into the packaged
//! configuration directory. A namespace shipped in the project's own `conf/`
//! directory is taken as the base; the descriptor's effective `config`,
//! `environment` and plugin lists are merged on top with set-like
//! de-duplication, so re-running a build never duplicates entries.
//!
//! This merge deliberately differs from the effective-settings merge: the
//! in-memory settings merge concatenates and keeps duplicates, while this
//! on-disk merge is idempotent across builds.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::core::FlowpackError;
use crate::utils::fs::{atomic_write, file_error};

/// An in-memory namespace document.
#[derive(Debug, Clone, Default)]
pub struct NamespaceFile {
    tree: Mapping,
}

impl NamespaceFile {
    /// An empty namespace, `{}`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fresh namespace carrying only `name: default`.
    #[must_use]
    pub fn named_default() -> Self {
        let mut tree = Mapping::new();
        tree.insert(
            Value::String("name".to_string()),
            Value::String("default".to_string()),
        );
        Self { tree }
    }

    /// Read a namespace file.
    ///
    /// Returns `None` when the file does not exist or does not hold a
    /// mapping; a file that fails to parse is an error.
    pub fn read(path: &Path) -> Result<Option<Self>, FlowpackError> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|err| file_error(path, &err))?;
        let value: Value =
            serde_yaml::from_str(&content).map_err(|err| FlowpackError::FileError {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        match value {
            Value::Mapping(tree) => Ok(Some(Self { tree })),
            _ => Ok(None),
        }
    }

    /// Merge values into the array under `key`, skipping values already
    /// present.
    ///
    /// An empty incoming list leaves the document untouched, even when the
    /// key is missing. A missing key is created with the incoming values.
    /// An existing scalar under the key is replaced by the incoming values.
    pub fn merge_distinct(&mut self, key: &str, values: &[String]) {
        if values.is_empty() {
            return;
        }

        let has_key = self.tree.iter().any(|(k, _)| k.as_str() == Some(key));
        if !has_key {
            let seq: Vec<Value> =
                values.iter().map(|value| Value::String(value.clone())).collect();
            self.tree.insert(Value::String(key.to_string()), Value::Sequence(seq));
            return;
        }

        if let Some((_, existing)) =
            self.tree.iter_mut().find(|(k, _)| k.as_str() == Some(key))
        {
            match existing {
                Value::Sequence(seq) => {
                    let current: Vec<String> = seq
                        .iter()
                        .filter_map(|value| value.as_str().map(str::to_string))
                        .collect();
                    for value in values {
                        if !current.contains(value) {
                            seq.push(Value::String(value.clone()));
                        }
                    }
                }
                other => {
                    let seq: Vec<Value> =
                        values.iter().map(|value| Value::String(value.clone())).collect();
                    *other = Value::Sequence(seq);
                }
            }
        }
    }

    /// Drop a top-level key, if present.
    pub fn remove(&mut self, key: &str) {
        let filtered: Mapping = std::mem::take(&mut self.tree)
            .into_iter()
            .filter(|(k, _)| k.as_str() != Some(key))
            .collect();
        self.tree = filtered;
    }

    /// The string entries of the array under `key`. Missing or non-array
    /// keys yield an empty list.
    #[must_use]
    pub fn string_values(&self, key: &str) -> Vec<String> {
        self.tree
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .and_then(|(_, value)| value.as_sequence())
            .map(|seq| {
                seq.iter().filter_map(|value| value.as_str().map(str::to_string)).collect()
            })
            .unwrap_or_default()
    }

    /// Write the namespace to a file, creating parent directories.
    ///
    /// The write is atomic, so an interrupted build never leaves a
    /// half-rendered namespace behind as the base of the next merge.
    pub fn store(&self, path: &Path) -> Result<(), FlowpackError> {
        let content =
            serde_yaml::to_string(&self.tree).map_err(|err| FlowpackError::FileError {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        debug!("writing namespace to {}", path.display());
        atomic_write(path, content.as_bytes())
    }

    #[must_use]
    pub fn tree(&self) -> &Mapping {
        &self.tree
    }
}
