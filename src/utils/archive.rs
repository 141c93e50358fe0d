//! Archive handling: tar.gz unpack and assembly, jar build and shading.
//!
//! Dist packages are assembled from [`FileSet`]s the way a release archive is
//! laid out (forced file modes, ant-style include/exclude patterns, a common
//! base directory). Fatjar packages are first collected into a plain jar and
//! then shaded together with their dependency jars into a single executable
//! jar.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use glob::Pattern;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::FlowpackError;
use crate::utils::fs::file_error;

const MANIFEST_NAME: &str = "META-INF/MANIFEST.MF";
const SERVICES_PREFIX: &str = "META-INF/services/";

/// Unpack a `.tar.gz` archive into a directory, preserving entry paths and
/// permissions.
pub fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<(), FlowpackError> {
    debug!("unpacking {} into {}", archive.display(), dest.display());
    fs::create_dir_all(dest).map_err(|err| file_error(dest, &err))?;

    let file = File::open(archive).map_err(|err| file_error(archive, &err))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut tar = tar::Archive::new(decoder);
    tar.unpack(dest).map_err(|err| file_error(archive, &err))?;
    Ok(())
}

/// One source directory of a tar.gz assembly.
///
/// Patterns are ant-style globs matched against paths relative to the source
/// directory: `*` stays within one path component, `**` crosses components.
/// Empty includes select everything. File and directory modes are forced
/// onto the archive entries regardless of the modes on disk.
#[derive(Debug, Clone)]
pub struct FileSet {
    source: PathBuf,
    prefix: String,
    file_mode: u32,
    dir_mode: u32,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl FileSet {
    /// A fileset rooted at `source`, placed under `prefix` inside the
    /// archive. Modes default to 0644 for files and 0755 for directories.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            prefix: prefix.into(),
            file_mode: 0o644,
            dir_mode: 0o755,
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Restrict the fileset to paths matching any of the patterns.
    #[must_use]
    pub fn with_includes(mut self, patterns: &[&str]) -> Self {
        self.includes = patterns.iter().map(|pattern| Pattern::new(pattern).unwrap()).collect();
        self
    }

    /// Drop paths matching any of the patterns.
    #[must_use]
    pub fn with_excludes(mut self, patterns: &[&str]) -> Self {
        self.excludes = patterns.iter().map(|pattern| Pattern::new(pattern).unwrap()).collect();
        self
    }

    fn matches(&self, rel: &Path) -> bool {
        let options = match_options();
        let included = self.includes.is_empty()
            || self.includes.iter().any(|pattern| pattern.matches_path_with(rel, options));
        included
            && !self.excludes.iter().any(|pattern| pattern.matches_path_with(rel, options))
    }

    fn archive_path(&self, base_dir: &str, rel: &Path) -> String {
        let mut segments = Vec::new();
        if !base_dir.is_empty() {
            segments.push(base_dir.to_string());
        }
        if !self.prefix.is_empty() {
            segments.push(self.prefix.clone());
        }
        for component in rel.components() {
            segments.push(component.as_os_str().to_string_lossy().into_owned());
        }
        segments.join("/")
    }
}

const fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Assemble a `.tar.gz` archive from filesets, all placed under `base_dir`.
///
/// Filesets with a missing source directory are skipped with a warning; the
/// remaining sets are walked in order and appended deterministically.
pub fn pack_tar_gz(
    archive: &Path,
    base_dir: &str,
    filesets: &[FileSet],
) -> Result<(), FlowpackError> {
    debug!("assembling {}", archive.display());
    let file = File::create(archive).map_err(|err| file_error(archive, &err))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for fileset in filesets {
        if !fileset.source.is_dir() {
            warn!("skipping missing directory {}", fileset.source.display());
            continue;
        }
        append_fileset(&mut builder, archive, base_dir, fileset)?;
    }

    let encoder = builder.into_inner().map_err(|err| file_error(archive, &err))?;
    let mut inner = encoder.finish().map_err(|err| file_error(archive, &err))?;
    inner.flush().map_err(|err| file_error(archive, &err))?;
    Ok(())
}

fn append_fileset(
    builder: &mut tar::Builder<GzEncoder<BufWriter<File>>>,
    archive: &Path,
    base_dir: &str,
    fileset: &FileSet,
) -> Result<(), FlowpackError> {
    for entry in WalkDir::new(&fileset.source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|err| FlowpackError::FileError {
            path: fileset.source.display().to_string(),
            reason: err.to_string(),
        })?;
        let Ok(rel) = entry.path().strip_prefix(&fileset.source) else {
            continue;
        };
        if rel.as_os_str().is_empty() || !fileset.matches(rel) {
            continue;
        }

        let target = fileset.archive_path(base_dir, rel);
        let metadata = entry.metadata().map_err(|err| FlowpackError::FileError {
            path: entry.path().display().to_string(),
            reason: err.to_string(),
        })?;

        if entry.file_type().is_dir() {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(fileset.dir_mode);
            header.set_mtime(mtime_of(&metadata));
            builder
                .append_data(&mut header, format!("{target}/"), std::io::empty())
                .map_err(|err| file_error(archive, &err))?;
        } else if entry.file_type().is_file() {
            let mut file =
                File::open(entry.path()).map_err(|err| file_error(entry.path(), &err))?;
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(metadata.len());
            header.set_mode(fileset.file_mode);
            header.set_mtime(mtime_of(&metadata));
            builder
                .append_data(&mut header, &target, &mut file)
                .map_err(|err| file_error(archive, &err))?;
        }
    }
    Ok(())
}

fn mtime_of(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |duration| duration.as_secs())
}

/// Build a jar from the contents of a directory.
///
/// Entry names are the paths relative to `source_dir`; anything under one of
/// the `excludes` directories is left out. A minimal manifest is written, the
/// final manifest comes from the shading step.
pub fn build_jar(
    jar: &Path,
    source_dir: &Path,
    excludes: &[PathBuf],
) -> Result<(), FlowpackError> {
    debug!("building jar {}", jar.display());
    let file = File::create(jar).map_err(|err| file_error(jar, &err))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    writer
        .start_file(MANIFEST_NAME, options)
        .and_then(|()| writer.write_all(b"Manifest-Version: 1.0\n").map_err(Into::into))
        .map_err(|err| zip_error(jar, &err))?;

    for entry in WalkDir::new(source_dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|err| FlowpackError::FileError {
            path: source_dir.display().to_string(),
            reason: err.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        if excludes.iter().any(|exclude| rel.starts_with(exclude)) {
            continue;
        }

        writer
            .start_file(entry_name(rel), options)
            .map_err(|err| zip_error(jar, &err))?;
        let mut file = File::open(entry.path()).map_err(|err| file_error(entry.path(), &err))?;
        std::io::copy(&mut file, &mut writer).map_err(|err| file_error(entry.path(), &err))?;
    }

    writer.finish().map_err(|err| zip_error(jar, &err))?;
    Ok(())
}

/// Shade a base jar and its dependency jars into a single executable jar.
///
/// The output manifest carries `Main-Class: {main_class}`.
/// `META-INF/services/*` entries are concatenated across all inputs; for any
/// other duplicate entry the first occurrence wins. Jar signature files are
/// dropped, as are the input manifests.
pub fn shade_jar(
    output: &Path,
    base_jar: &Path,
    dependency_jars: &[PathBuf],
    main_class: &str,
) -> Result<(), FlowpackError> {
    debug!("shading {} jars into {}", dependency_jars.len() + 1, output.display());
    let file = File::create(output).map_err(|err| file_error(output, &err))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    writer
        .start_file(MANIFEST_NAME, options)
        .and_then(|()| {
            writer
                .write_all(format!("Manifest-Version: 1.0\nMain-Class: {main_class}\n").as_bytes())
                .map_err(Into::into)
        })
        .map_err(|err| zip_error(output, &err))?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut services: Vec<(String, Vec<u8>)> = Vec::new();

    let mut inputs = vec![base_jar.to_path_buf()];
    inputs.extend_from_slice(dependency_jars);

    for input in &inputs {
        let file = File::open(input).map_err(|err| file_error(input, &err))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|err| zip_error(input, &err))?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|err| zip_error(input, &err))?;
            let name = entry.name().to_string();

            if entry.is_dir() || name == MANIFEST_NAME || is_signature_file(&name) {
                continue;
            }
            if let Some(service) = name.strip_prefix(SERVICES_PREFIX) {
                if !service.is_empty() && !service.contains('/') {
                    append_service(&mut services, &name, &mut entry)
                        .map_err(|err| file_error(input, &err))?;
                    continue;
                }
            }
            if !seen.insert(name.clone()) {
                continue;
            }

            writer.start_file(&name, options).map_err(|err| zip_error(output, &err))?;
            std::io::copy(&mut entry, &mut writer).map_err(|err| file_error(input, &err))?;
        }
    }

    for (name, content) in &services {
        writer.start_file(name, options).map_err(|err| zip_error(output, &err))?;
        writer.write_all(content).map_err(|err| file_error(output, &err))?;
    }

    writer.finish().map_err(|err| zip_error(output, &err))?;
    Ok(())
}

fn append_service(
    services: &mut Vec<(String, Vec<u8>)>,
    name: &str,
    entry: &mut impl Read,
) -> std::io::Result<()> {
    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;

    if let Some((_, existing)) = services.iter_mut().find(|(n, _)| n == name) {
        if !existing.is_empty() && !existing.ends_with(b"\n") {
            existing.push(b'\n');
        }
        existing.extend_from_slice(&content);
    } else {
        services.push((name.to_string(), content));
    }
    Ok(())
}

fn is_signature_file(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("META-INF/") else {
        return false;
    };
    !rest.contains('/')
        && (rest.ends_with(".SF") || rest.ends_with(".DSA") || rest.ends_with(".RSA"))
}

fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn zip_error(path: &Path, err: &zip::result::ZipError) -> FlowpackError {
    FlowpackError::FileError {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn jar_entries(jar: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(jar).unwrap()).unwrap();
        (0..archive.len()).map(|i| archive.by_index(i).unwrap().name().to_string()).collect()
    }

    fn jar_entry(jar: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(File::open(jar).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_fileset_matching() {
        let fileset = FileSet::new("/src", "")
            .with_includes(&["**/*"])
            .with_excludes(&["bin/*", "conf/*", "plugins/**", "examples/**"]);

        assert!(fileset.matches(Path::new("lib/flowman-core.jar")));
        assert!(fileset.matches(Path::new("README.md")));
        assert!(!fileset.matches(Path::new("bin/flowexec")));
        assert!(!fileset.matches(Path::new("conf/flowman-env.sh")));
        assert!(!fileset.matches(Path::new("plugins/mysql/plugin.yml")));
        assert!(!fileset.matches(Path::new("examples/weather/project.yml")));
    }

    #[test]
    fn test_fileset_star_stays_within_component() {
        let fileset = FileSet::new("/src", "").with_includes(&["bin/*"]);
        assert!(fileset.matches(Path::new("bin/flowexec")));
        assert!(!fileset.matches(Path::new("bin/extra/helper")));
        assert!(!fileset.matches(Path::new("lib/flowman-core.jar")));
    }

    #[test]
    fn test_pack_and_unpack_filesets() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        write_file(&home.join("lib/core.jar"), b"core");
        write_file(&home.join("bin/flowexec"), b"#!/bin/sh\n");
        write_file(&home.join("conf/flowman-env.sh"), b"# stale");

        let conf = dir.path().join("conf-out");
        write_file(&conf.join("default-namespace.yml"), b"name: default\n");

        let archive = dir.path().join("pkg.tar.gz");
        let filesets = vec![
            FileSet::new(&home, "")
                .with_includes(&["**/*"])
                .with_excludes(&["bin/*", "conf/*"]),
            FileSet::new(&home, "").with_includes(&["bin/*"]).with_file_mode(0o755),
            FileSet::new(&conf, "conf"),
        ];
        pack_tar_gz(&archive, "demo-1.0", &filesets).unwrap();

        let unpacked = dir.path().join("unpacked");
        unpack_tar_gz(&archive, &unpacked).unwrap();

        let base = unpacked.join("demo-1.0");
        assert!(base.join("lib/core.jar").is_file());
        assert!(base.join("bin/flowexec").is_file());
        assert!(base.join("conf/default-namespace.yml").is_file());
        // The stale home conf was excluded in favor of the rendered one
        assert_eq!(
            fs::read(base.join("conf/default-namespace.yml")).unwrap(),
            b"name: default\n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(base.join("bin/flowexec")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
            let mode = fs::metadata(base.join("lib/core.jar")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn test_pack_skips_missing_fileset_source() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present");
        write_file(&present.join("file.txt"), b"content");

        let archive = dir.path().join("pkg.tar.gz");
        let filesets = vec![
            FileSet::new(dir.path().join("absent"), "gone"),
            FileSet::new(&present, "kept"),
        ];
        pack_tar_gz(&archive, "base", &filesets).unwrap();

        let unpacked = dir.path().join("unpacked");
        unpack_tar_gz(&archive, &unpacked).unwrap();
        assert!(unpacked.join("base/kept/file.txt").is_file());
        assert!(!unpacked.join("base/gone").exists());
    }

    #[test]
    fn test_build_jar_excludes_directories() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("out");
        write_file(&source.join("META-INF/flowman/conf/default-namespace.yml"), b"{}");
        write_file(&source.join("META-INF/flowman/flows/project.yml"), b"name: test");

        let jar = dir.path().join("app.jar");
        build_jar(&jar, &source, &[PathBuf::from("META-INF/flowman/flows")]).unwrap();

        let entries = jar_entries(&jar);
        assert!(entries.contains(&"META-INF/MANIFEST.MF".to_string()));
        assert!(entries.contains(&"META-INF/flowman/conf/default-namespace.yml".to_string()));
        assert!(!entries.iter().any(|name| name.contains("flows")));
    }

    #[test]
    fn test_shade_jar_merges_services_and_keeps_first() {
        let dir = TempDir::new().unwrap();

        let base_src = dir.path().join("base");
        write_file(&base_src.join("app/Main.class"), b"base-main");
        write_file(&base_src.join("shared.txt"), b"from-base");
        let base = dir.path().join("base.jar");
        build_jar(&base, &base_src, &[]).unwrap();

        let dep_src = dir.path().join("dep");
        write_file(&dep_src.join("shared.txt"), b"from-dep");
        write_file(
            &dep_src.join("META-INF/services/org.example.Codec"),
            b"org.example.JsonCodec\n",
        );
        let dep = dir.path().join("dep.jar");
        build_jar(&dep, &dep_src, &[]).unwrap();

        let dep2_src = dir.path().join("dep2");
        write_file(
            &dep2_src.join("META-INF/services/org.example.Codec"),
            b"org.example.AvroCodec\n",
        );
        write_file(&dep2_src.join("META-INF/FAKE.SF"), b"signature");
        let dep2 = dir.path().join("dep2.jar");
        build_jar(&dep2, &dep2_src, &[]).unwrap();

        let output = dir.path().join("shaded.jar");
        shade_jar(&output, &base, &[dep.clone(), dep2.clone()], "org.example.Main").unwrap();

        let manifest = jar_entry(&output, "META-INF/MANIFEST.MF");
        assert!(manifest.contains("Main-Class: org.example.Main"));

        // First occurrence wins for ordinary duplicates
        assert_eq!(jar_entry(&output, "shared.txt"), "from-base");

        // Service entries are concatenated across jars
        let services = jar_entry(&output, "META-INF/services/org.example.Codec");
        assert!(services.contains("org.example.JsonCodec"));
        assert!(services.contains("org.example.AvroCodec"));

        // Signature files are dropped
        assert!(!jar_entries(&output).contains(&"META-INF/FAKE.SF".to_string()));
    }
}
