//! Directory creation and recursive copying.
//!
//! All functions report failures as [`FlowpackError::FileError`] carrying the
//! path that was being worked on, so lifecycle steps surface actionable
//! messages instead of bare IO errors.

use std::fs;
use std::path::Path;

use crate::core::FlowpackError;

pub(crate) fn file_error(path: &Path, err: &std::io::Error) -> FlowpackError {
    FlowpackError::FileError {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Ensure a directory exists, creating it and all parents if necessary.
///
/// Fails when the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<(), FlowpackError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| file_error(path, &err))?;
    } else if !path.is_dir() {
        return Err(FlowpackError::FileError {
            path: path.display().to_string(),
            reason: "exists but is not a directory".to_string(),
        });
    }
    Ok(())
}

/// Create a directory, removing any previous contents first.
pub fn recreate_dir(path: &Path) -> Result<(), FlowpackError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|err| file_error(path, &err))?;
    }
    fs::create_dir_all(path).map_err(|err| file_error(path, &err))
}

/// Write a file atomically: the content goes to a `.tmp` sibling first,
/// gets synced to disk and is then renamed over the target. Readers never
/// see a partially written file. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FlowpackError> {
    use std::io::Write as _;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file =
            fs::File::create(&temp_path).map_err(|err| file_error(&temp_path, &err))?;
        file.write_all(content).map_err(|err| file_error(&temp_path, &err))?;
        file.sync_all().map_err(|err| file_error(&temp_path, &err))?;
    }
    fs::rename(&temp_path, path).map_err(|err| file_error(path, &err))
}

/// Recursively copy a directory tree.
///
/// Files and directories are copied; symlinks and other special file types
/// are skipped.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<(), FlowpackError> {
    ensure_dir(dst)?;

    for entry in fs::read_dir(src).map_err(|err| file_error(src, &err))? {
        let entry = entry.map_err(|err| file_error(src, &err))?;
        let file_type = entry.file_type().map_err(|err| file_error(&entry.path(), &err))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dst_path).map_err(|err| file_error(&src_path, &err))?;
        }
    }

    Ok(())
}

/// Copy a directory tree when the source exists.
///
/// Returns whether anything was copied; a missing source is not an error.
pub fn copy_dir_if_exists(src: &Path, dst: &Path) -> Result<bool, FlowpackError> {
    if !src.is_dir() {
        return Ok(false);
    }
    copy_dir(src, dst)?;
    Ok(true)
}
