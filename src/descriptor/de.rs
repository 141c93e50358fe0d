//! Deserialization helpers for hand-written descriptor YAML.
//!
//! Deployment descriptors are authored by hand, so the typed model accepts a
//! couple of shorthand notations: a lone scalar where a list is expected, and
//! `null` (or an empty string) where a nested settings block is expected.

use serde::{Deserialize, Deserializer, de};

/// Deserialize a single string or a sequence of strings into a `Vec<String>`.
///
/// `plugins: flowman-kafka` and `plugins: [flowman-kafka]` are equivalent,
/// and an explicit `null` becomes the empty list.
pub(crate) fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Empty,
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
        OneOrMany::Empty => Vec::new(),
    })
}

/// Deserialize `null` or an empty string as `T::default()`.
///
/// Lets an author keep a settings key with nothing under it, e.g. a `build:`
/// block whose entries are all commented out.
pub(crate) fn null_as_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + Default,
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Maybe<T> {
        Value(T),
        Text(String),
        Empty,
    }

    match Maybe::<T>::deserialize(deserializer)? {
        Maybe::Value(value) => Ok(value),
        Maybe::Text(text) if text.is_empty() => Ok(T::default()),
        Maybe::Text(text) => {
            Err(de::Error::custom(format!("expected a mapping, found string \"{text}\"")))
        }
        Maybe::Empty => Ok(T::default()),
    }
}
