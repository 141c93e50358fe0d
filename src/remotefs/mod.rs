//! Deployment target filesystems, keyed by URI scheme.
//!
//! Deployment locations are URIs like `file:///srv/flowman` or plain local
//! paths. A [`FileSystemRegistry`] maps the scheme to a [`FileSystem`]
//! implementation; locations without a scheme are treated as local paths.
//! Only the local filesystem ships by default, additional schemes can be
//! registered by embedders.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::FlowpackError;
use crate::utils::fs::{copy_dir, ensure_dir, file_error};

/// A deployment target reachable under one URI scheme.
///
/// Targets are the scheme-stripped remainder of the location URI; sources are
/// always local paths.
pub trait FileSystem {
    /// URI scheme this filesystem serves, e.g. `file`.
    fn scheme(&self) -> &str;

    /// Copy a single local file to the target.
    ///
    /// When the target already exists as a directory the file is copied into
    /// it under its own name.
    fn put(&self, target: &str, source: &Path) -> Result<(), FlowpackError>;

    /// Copy a local directory tree to the target.
    fn put_all(&self, target: &str, source: &Path) -> Result<(), FlowpackError>;

    /// Delete the target. Deleting something that does not exist is not an
    /// error.
    fn delete(&self, target: &str, recursive: bool) -> Result<(), FlowpackError>;
}

/// The local filesystem, serving the `file` scheme and bare paths.
#[derive(Debug, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn scheme(&self) -> &str {
        "file"
    }

    fn put(&self, target: &str, source: &Path) -> Result<(), FlowpackError> {
        let mut target = PathBuf::from(target);
        if target.is_dir() {
            if let Some(name) = source.file_name() {
                target.push(name);
            }
        } else if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        debug!("copying {} to {}", source.display(), target.display());
        fs::copy(source, &target).map_err(|err| file_error(source, &err))?;
        Ok(())
    }

    fn put_all(&self, target: &str, source: &Path) -> Result<(), FlowpackError> {
        debug!("copying directory {} to {}", source.display(), target);
        copy_dir(source, Path::new(target))
    }

    fn delete(&self, target: &str, recursive: bool) -> Result<(), FlowpackError> {
        let target = Path::new(target);
        if target.is_dir() {
            if recursive {
                fs::remove_dir_all(target).map_err(|err| file_error(target, &err))?;
            } else {
                fs::remove_dir(target).map_err(|err| file_error(target, &err))?;
            }
        } else if target.is_file() {
            fs::remove_file(target).map_err(|err| file_error(target, &err))?;
        }
        Ok(())
    }
}

/// Registry of deployment filesystems, keyed by scheme.
pub struct FileSystemRegistry {
    filesystems: HashMap<String, Box<dyn FileSystem>>,
}

impl FileSystemRegistry {
    /// Registry with the local filesystem registered for `file`.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            filesystems: HashMap::new(),
        };
        registry.register(Box::new(LocalFileSystem));
        registry
    }

    /// Register a filesystem under its own scheme, replacing any previous
    /// registration.
    pub fn register(&mut self, filesystem: Box<dyn FileSystem>) {
        self.filesystems.insert(filesystem.scheme().to_string(), filesystem);
    }

    /// Resolve a location into its filesystem and scheme-stripped target.
    ///
    /// Locations without a `scheme://` prefix resolve to the local
    /// filesystem with the location taken verbatim as the target path.
    pub fn resolve<'a>(
        &'a self,
        location: &str,
    ) -> Result<(&'a dyn FileSystem, String), FlowpackError> {
        match split_scheme(location) {
            Some((scheme, target)) => {
                let filesystem = self.filesystems.get(scheme).ok_or_else(|| {
                    FlowpackError::UnknownScheme {
                        scheme: scheme.to_string(),
                        location: location.to_string(),
                    }
                })?;
                Ok((filesystem.as_ref(), target.to_string()))
            }
            None => {
                // A bare path is always local, whatever is registered
                let filesystem = self.filesystems.get("file").ok_or_else(|| {
                    FlowpackError::UnknownScheme {
                        scheme: "file".to_string(),
                        location: location.to_string(),
                    }
                })?;
                Ok((filesystem.as_ref(), location.to_string()))
            }
        }
    }
}

impl Default for FileSystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn split_scheme(location: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = location.split_once("://")?;
    if scheme.is_empty()
        || !scheme.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
    {
        return None;
    }
    Some((scheme, rest))
}
