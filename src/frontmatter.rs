//! Splits a source file into its YAML front matter and its body. Front matter
//! is optional; a file that doesn't open with a `---` fence is all body.

use serde_yaml::{Mapping, Value};
use std::fmt;

/// The result of splitting a source file: the parsed metadata mapping and the
/// remaining body text.
pub struct Parsed {
    pub metadata: Mapping,
    pub body: String,
}

/// Parses a raw source file into its front matter and body. The front matter
/// block, when present, must open and close with a `---` fence on its own:
///
/// ```md
/// ---
/// title: Hello, world!
/// ---
/// body text
/// ```
pub fn parse(input: &str) -> Result<Parsed> {
    const FENCE: &str = "---";

    if !input.starts_with(FENCE) {
        return Ok(Parsed {
            metadata: Mapping::new(),
            body: input.to_owned(),
        });
    }

    match input[FENCE.len()..].find(FENCE) {
        None => Err(Error::MissingEndFence),
        Some(offset) => {
            let yaml = &input[FENCE.len()..FENCE.len() + offset];
            let body = &input[FENCE.len() + offset + FENCE.len()..];
            let metadata = match yaml.trim().is_empty() {
                true => Mapping::new(),
                false => serde_yaml::from_str(yaml)?,
            };
            Ok(Parsed {
                metadata,
                body: body.trim_start_matches('\n').to_owned(),
            })
        }
    }
}

/// Looks up a string value in a metadata mapping.
pub fn str_value(metadata: &Mapping, key: &str) -> Option<String> {
    metadata
        .get(&Value::String(key.to_owned()))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Looks up a boolean value in a metadata mapping.
pub fn bool_value(metadata: &Mapping, key: &str) -> Option<bool> {
    metadata
        .get(&Value::String(key.to_owned()))
        .and_then(Value::as_bool)
}

/// Looks up a sequence of strings in a metadata mapping. Non-string entries
/// are skipped.
pub fn seq_value(metadata: &Mapping, key: &str) -> Vec<String> {
    match metadata.get(&Value::String(key.to_owned())) {
        Some(Value::Sequence(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error splitting front matter from a source file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the opening `---` fence was found but the closing one
    /// was missing.
    MissingEndFence,

    /// Returned when there was an error parsing the front matter as YAML.
    DeserializeYaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingEndFence => write!(f, "Missing closing `---`"),
            Error::DeserializeYaml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}
