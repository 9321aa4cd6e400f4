//! Defines the [`Post`] type and the logic for parsing posts from source
//! files. Post source files are named `YYYY-MM-DD-slug.ext`; the date and
//! slug come from the file name, and the front matter can override the date
//! and supply a title, categories, a layout, and a draft flag:
//!
//! ```md
//! ---
//! title: Hello, world!
//! categories: [greetings]
//! ---
//! # Hello
//!
//! World
//! ```

use crate::config::Config;
use crate::frontmatter;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A dated content item. Posts are ordered newest-first throughout a build
/// and are the inputs to the archive, category, listing, and feed scopes.
pub struct Post {
    pub source_path: PathBuf,
    pub title: String,
    pub body: String,
    pub date: NaiveDate,
    pub slug: String,

    /// Slugified category identifiers in declaration order. Duplicates are
    /// preserved; the indexer appends the post once per occurrence.
    pub categories: Vec<String>,

    pub draft: bool,
    pub layout: String,
    pub markdown: bool,

    /// The rendered body, populated once per build before any listing or
    /// feed consumes it. `None` until rendered, and again if the render
    /// failed.
    pub content: Option<String>,
}

impl Post {
    /// Parses a single [`Post`] from a source file.
    pub fn from_file(path: &Path, config: &Config) -> Result<Post> {
        let raw = fs::read_to_string(path)?;
        let parsed = frontmatter::parse(&raw)?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;
        let (file_date, slug) = parse_file_name(stem)
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;

        let date = match frontmatter::str_value(&parsed.metadata, "date") {
            Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")?,
            None => file_date,
        };

        Ok(Post {
            title: frontmatter::str_value(&parsed.metadata, "title")
                .unwrap_or_else(|| slug.clone()),
            categories: frontmatter::seq_value(&parsed.metadata, "categories")
                .iter()
                .map(|name| slug::slugify(name))
                .collect(),
            draft: frontmatter::bool_value(&parsed.metadata, "draft")
                .unwrap_or(false),
            layout: frontmatter::str_value(&parsed.metadata, "layout")
                .unwrap_or_else(|| config.layouts.post.clone()),
            markdown: is_markdown(path),
            source_path: path.to_owned(),
            body: parsed.body,
            date,
            slug,
            content: None,
        })
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// The post's root-relative URL: `/{posts_path}/{slug}/`.
    pub fn url(&self, posts_path: &str) -> String {
        format!("/{}/{}/", posts_path, self.slug)
    }
}

/// Splits a file stem of the form `YYYY-MM-DD-slug` into its date and slug.
fn parse_file_name(stem: &str) -> Option<(NaiveDate, String)> {
    const DATE_LEN: usize = "0000-00-00".len();
    if stem.len() <= DATE_LEN || !stem.is_char_boundary(DATE_LEN) {
        return None;
    }
    let (date_part, rest) = stem.split_at(DATE_LEN);
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let slug = rest.strip_prefix('-')?;
    if slug.is_empty() {
        return None;
    }
    Some((date, slug.to_owned()))
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    )
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] from a source file.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post file name isn't of the form `YYYY-MM-DD-slug.ext`.
    InvalidFileName(PathBuf),

    /// Returned when a front-matter `date` value can't be parsed.
    DateParse(chrono::ParseError),

    /// Returned when the front matter block is malformed.
    Frontmatter(frontmatter::Error),

    /// Returned for I/O errors reading the source file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFileName(path) => write!(
                f,
                "Post file name `{}` isn't of the form `YYYY-MM-DD-slug`",
                path.display()
            ),
            Error::DateParse(err) => err.fmt(f),
            Error::Frontmatter(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidFileName(_) => None,
            Error::DateParse(err) => Some(err),
            Error::Frontmatter(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Error {
        Error::DateParse(err)
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

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_file_name() {
        let (date, slug) = parse_file_name("2021-06-14-hello-world").unwrap();
        assert_eq!(date, NaiveDate::from_ymd(2021, 6, 14));
        assert_eq!(slug, "hello-world");
    }

    #[test]
    fn test_parse_file_name_rejects_invalid() {
        assert!(parse_file_name("hello-world").is_none());
        assert!(parse_file_name("2021-06-14").is_none());
        assert!(parse_file_name("2021-06-14-").is_none());
        assert!(parse_file_name("2021-13-40-bad-date").is_none());
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("2021-06-14-hello.md");
        fs::write(
            &path,
            "---\ntitle: Hello\ncategories: [Greetings, Small Talk]\n---\nBody\n",
        )?;

        let config = Config::defaults(dir.path());
        let post = Post::from_file(&path, &config)?;
        assert_eq!(post.title, "Hello");
        assert_eq!(post.slug, "hello");
        assert_eq!(post.date, NaiveDate::from_ymd(2021, 6, 14));
        assert_eq!(post.categories, vec!["greetings", "small-talk"]);
        assert_eq!(post.layout, "post");
        assert!(post.markdown);
        assert!(!post.draft);
        assert_eq!(post.url("posts"), "/posts/hello/");
        Ok(())
    }

    #[test]
    fn test_front_matter_date_overrides_file_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("2021-06-14-hello.md");
        fs::write(&path, "---\ndate: 2020-01-02\n---\nBody\n")?;

        let config = Config::defaults(dir.path());
        let post = Post::from_file(&path, &config)?;
        assert_eq!(post.date, NaiveDate::from_ymd(2020, 1, 2));
        Ok(())
    }
}
