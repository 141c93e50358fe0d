//! `${name}` variable interpolation over the raw descriptor tree.
//!
//! Descriptors are interpolated before they are deserialized into the typed
//! model, so placeholders work in every string-valued position. References
//! are resolved against an ordered list of named value sources; the first
//! source that knows a name wins. Unresolved references are left verbatim,
//! which keeps half-authored descriptors loadable.
//!
//! Substitution is a single pass: text produced by a substitution is not
//! scanned again, so a value can itself contain a literal `${...}`.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

fn placeholder_regex() -> Regex {
    Regex::new(r"\$\{([^}]+)\}").unwrap()
}

/// Ordered named-value sources for `${name}` references.
///
/// Sources are consulted in the order the `with_*` builder calls add them.
/// The conventional order is local repository, command-line defines,
/// environment variables, project metadata.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    sources: Vec<HashMap<String, String>>,
}

impl Interpolator {
    /// An interpolator without any sources; every reference stays verbatim.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the `localRepository` source.
    #[must_use]
    pub fn with_local_repository(mut self, path: &Path) -> Self {
        let mut source = HashMap::new();
        source.insert("localRepository".to_string(), path.display().to_string());
        self.sources.push(source);
        self
    }

    /// Add command-line defines, each entry a `key=value` pair.
    ///
    /// A bare key maps to the empty string. When a key is given twice, the
    /// first occurrence wins.
    #[must_use]
    pub fn with_defines(mut self, defines: &[String]) -> Self {
        let mut source = HashMap::new();
        for define in defines {
            let (key, value) = match define.split_once('=') {
                Some((key, value)) => (key, value),
                None => (define.as_str(), ""),
            };
            source.entry(key.to_string()).or_insert_with(|| value.to_string());
        }
        self.sources.push(source);
        self
    }

    /// Add all current environment variables under the `env.` prefix.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        let source =
            std::env::vars().map(|(key, value)| (format!("env.{key}"), value)).collect();
        self.sources.push(source);
        self
    }

    /// Add project metadata under the `project.` prefix.
    ///
    /// `project.basedir` is the descriptor's directory and
    /// `project.build.directory` is `<basedir>/target`.
    #[must_use]
    pub fn with_project(mut self, basedir: &Path) -> Self {
        let mut source = HashMap::new();
        source.insert("project.basedir".to_string(), basedir.display().to_string());
        source.insert(
            "project.build.directory".to_string(),
            basedir.join("target").display().to_string(),
        );
        self.sources.push(source);
        self
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.sources.iter().find_map(|source| source.get(name)).map(String::as_str)
    }

    /// Substitute `${name}` references in a single string.
    #[must_use]
    pub fn interpolate(&self, text: &str) -> String {
        self.substitute(&placeholder_regex(), text)
    }

    /// Substitute `${name}` references in every string value of a YAML tree.
    ///
    /// Mapping keys are left untouched; only values are rewritten.
    pub fn interpolate_tree(&self, value: &mut serde_yaml::Value) {
        let regex = placeholder_regex();
        self.walk(&regex, value);
    }

    fn walk(&self, regex: &Regex, value: &mut serde_yaml::Value) {
        match value {
            serde_yaml::Value::String(text) => *text = self.substitute(regex, text),
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    self.walk(regex, item);
                }
            }
            serde_yaml::Value::Mapping(mapping) => {
                for (_, item) in mapping.iter_mut() {
                    self.walk(regex, item);
                }
            }
            serde_yaml::Value::Tagged(tagged) => self.walk(regex, &mut tagged.value),
            _ => {}
        }
    }

    fn substitute(&self, regex: &Regex, text: &str) -> String {
        regex
            .replace_all(text, |caps: &regex::Captures<'_>| match self.lookup(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
