//! Shared utilities for file handling and settings parsing.
//!
//! # Modules
//!
//! - [`archive`] - tar.gz and jar assembly, unpacking, and shading
//! - [`fs`] - directory creation and recursive copying
//!
//! Settings helpers live at the module root: descriptor lists frequently
//! carry `key=value` strings whose values may be quoted, and
//! [`split_settings`] turns them into pairs the way the Flowman tooling
//! expects.

pub mod archive;
pub mod fs;

pub use fs::{atomic_write, copy_dir, copy_dir_if_exists, ensure_dir, recreate_dir};

/// Split a list of `key=value` settings into pairs, preserving order.
///
/// See [`split_setting`] for the handling of a single entry.
#[must_use]
pub fn split_settings(settings: &[String]) -> Vec<(String, String)> {
    settings.iter().map(|setting| split_setting(setting)).collect()
}

/// Split a single `key=value` setting into a pair.
///
/// The value is split at the first `=`, trimmed, and stripped of one pair of
/// surrounding double quotes. An entry without `=` becomes a key with an
/// empty value. Keys are taken verbatim.
#[must_use]
pub fn split_setting(setting: &str) -> (String, String) {
    match setting.split_once('=') {
        Some((key, value)) => (key.to_string(), unquote(value.trim()).to_string()),
        None => (setting.to_string(), String::new()),
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
