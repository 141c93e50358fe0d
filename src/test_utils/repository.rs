//! Fake Maven repository for tests.
//!
//! Builds a temporary directory in standard repository layout and installs
//! synthetic artifacts into it: plain stub files where only resolution
//! matters, real tarballs for the Flowman distribution and plugin dists,
//! and real (if tiny) jars where tests read archive contents.

use std::fs::{self, File};
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::artifact::{Artifact, expand_plugin_shorthand};

/// A throwaway local repository populated with synthetic artifacts.
pub struct FakeRepository {
    dir: TempDir,
}

impl FakeRepository {
    /// An empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create repository directory"),
        }
    }

    /// Repository root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Install a placeholder file for an artifact.
    ///
    /// The content is the artifact's coordinates; sufficient for tests that
    /// only resolve paths or build classpaths.
    pub fn install_stub(&self, artifact: &Artifact) -> PathBuf {
        let path = self.dir.path().join(artifact.repository_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create artifact directory");
        }
        fs::write(&path, artifact.to_string()).expect("failed to write artifact stub");
        path
    }

    /// Install a real jar with the given `(name, content)` entries.
    pub fn install_jar(&self, artifact: &Artifact, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.dir.path().join(artifact.repository_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create artifact directory");
        }
        let file = File::create(&path).expect("failed to create jar");
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).expect("failed to add jar entry");
            writer
                .write_all(content.as_bytes())
                .expect("failed to write jar entry");
        }
        writer.finish().expect("failed to finish jar");
        path
    }

    /// Install a Flowman binary distribution tarball.
    ///
    /// The tarball unpacks to `flowman-<version>/` with executable launcher
    /// scripts, a default configuration, core libraries, the requested
    /// plugins and a bundled example project.
    pub fn install_flowman_dist(&self, version: &str, plugins: &[&str]) -> PathBuf {
        let dist = Artifact::new(
            crate::constants::FLOWMAN_GROUP_ID,
            crate::constants::FLOWMAN_DIST_ARTIFACT,
            version,
        )
        .with_packaging("tar.gz")
        .with_classifier("bin");
        let home = format!("flowman-{version}");
        let mut entries = vec![
            (format!("{home}/bin/flowexec"), 0o755, "#!/bin/sh\n".to_string()),
            (format!("{home}/bin/flowshell"), 0o755, "#!/bin/sh\n".to_string()),
            (
                format!("{home}/conf/flowman-env.sh.template"),
                0o644,
                "# flowman environment\n".to_string(),
            ),
            (
                format!("{home}/lib/flowman-core-{version}.jar"),
                0o644,
                "core".to_string(),
            ),
            (
                format!("{home}/examples/weather/project.yml"),
                0o644,
                "name: weather\n".to_string(),
            ),
        ];
        for plugin in plugins {
            entries.push((
                format!("{home}/plugins/{plugin}/{plugin}-{version}.jar"),
                0o644,
                format!("plugin {plugin}"),
            ));
        }

        let path = self.dir.path().join(dist.repository_path());
        write_tar_gz(&path, &entries);
        path
    }

    /// Install a plugin distribution tarball for a short plugin name.
    ///
    /// The tarball unpacks to `plugins/<name>/` below a Flowman home.
    pub fn install_plugin_dist(&self, name: &str, version: &str) -> PathBuf {
        let coords = expand_plugin_shorthand(name);
        let plugin = Artifact::parse(&coords, "tar.gz", Some("bin"), Some(version))
            .expect("invalid plugin coordinates");
        let entries = vec![(
            format!("plugins/{name}/{name}-{version}.jar"),
            0o644,
            format!("plugin {name}"),
        )];

        let path = self.dir.path().join(plugin.repository_path());
        write_tar_gz(&path, &entries);
        path
    }
}

impl Default for FakeRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn write_tar_gz(path: &Path, entries: &[(String, u32, String)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create artifact directory");
    }
    let file = File::create(path).expect("failed to create tarball");
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, mode, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .expect("failed to append tar entry");
    }
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .expect("failed to finish tarball");
}
