//! Defines the [`Page`] type. A page is either backed by a source file under
//! the pages root (its output mirrors its position in that tree) or
//! synthesized during the build — every listing page and feed page is a
//! synthesized [`Page`] with no source path.

use crate::config::Config;
use crate::frontmatter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Page {
    pub source_path: Option<PathBuf>,
    pub title: Option<String>,
    pub body: String,
    pub layout: Option<String>,

    /// The output file name without its extension. Defaults to `index` for
    /// synthesized pages; file-backed pages keep their source base name.
    pub filename: String,

    pub extension: String,
    pub markdown: bool,
}

impl Page {
    /// Parses a [`Page`] from a source file under the pages root.
    pub fn from_file(path: &Path, config: &Config) -> Result<Page> {
        let raw = fs::read_to_string(path)?;
        let parsed = frontmatter::parse(&raw)?;

        let filename = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_owned)
            .unwrap_or_else(|| "index".to_owned());

        Ok(Page {
            title: frontmatter::str_value(&parsed.metadata, "title"),
            layout: Some(
                frontmatter::str_value(&parsed.metadata, "layout")
                    .unwrap_or_else(|| config.layouts.page.clone()),
            ),
            markdown: matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("markdown")
            ),
            source_path: Some(path.to_owned()),
            body: parsed.body,
            filename,
            extension: config.file_extensions.pages.clone(),
        })
    }

    /// A synthesized page with no source file, as used for listing and feed
    /// pages. The output file name defaults to `index`.
    pub fn synthetic(layout: &str, extension: &str) -> Page {
        Page {
            source_path: None,
            title: None,
            body: String::new(),
            layout: Some(layout.to_owned()),
            filename: "index".to_owned(),
            extension: extension.to_owned(),
            markdown: false,
        }
    }

    /// The directory this page's output file belongs in. A file-backed page
    /// mirrors its position in the source tree relative to `pages_root`; a
    /// synthesized page is written directly at `output_base`.
    pub fn output_directory(&self, pages_root: &Path, output_base: &Path) -> PathBuf {
        match &self.source_path {
            None => output_base.to_owned(),
            Some(source) => {
                let parent = source.parent().unwrap_or_else(|| Path::new(""));
                match parent.strip_prefix(pages_root) {
                    Ok(relative) => output_base.join(relative),
                    Err(_) => output_base.to_owned(),
                }
            }
        }
    }

    /// The output file name, extension included.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.filename, self.extension)
    }

    /// A human-readable identifier for error messages: the source path when
    /// there is one, the output file name otherwise.
    pub fn describe(&self) -> String {
        match &self.source_path {
            Some(path) => path.display().to_string(),
            None => self.output_file_name(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Page`] from a source file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the front matter block is malformed.
    Frontmatter(frontmatter::Error),

    /// Returned for I/O errors reading the source file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Frontmatter(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frontmatter(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<frontmatter::Error> for Error {
    fn from(err: frontmatter::Error) -> Error {
        Error::Frontmatter(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
