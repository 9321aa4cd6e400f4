//! Support for generating syndication feed pages. Feeds are ordinary
//! synthesized pages: one `feed.<format>` file per configured feed format,
//! rendered through a `feeds/<format>` layout. A format whose layout isn't
//! registered is skipped silently — each feed format is optional.
//!
//! The site-wide feed is written at the output root; each category gets its
//! own feed in its output subdirectory.

use crate::config::Config;
use crate::hook::{Event, Hooks, ItemKind, Payload};
use crate::page::Page;
use crate::post::Post;
use crate::template::Registry;
use crate::value;
use crate::write;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// The layout slug consulted for a feed format.
pub fn layout_for(format: &str) -> String {
    format!("feeds/{}", format)
}

/// Generates the feed pages for one scope. `posts` is already newest-first;
/// the first `limit` entries are taken as-is. `base` is the template context
/// shared by every format (the `site` object plus any scope extras, e.g. the
/// category). Formats fail independently; the returned list holds whatever
/// went wrong.
pub fn generate(
    registry: &Registry,
    config: &Config,
    posts: &[&Post],
    limit: usize,
    segments: &[String],
    base: &HashMap<String, Value>,
    hooks: &Hooks,
) -> Vec<Error> {
    let recent = &posts[..posts.len().min(limit)];
    let mut errors = Vec::new();

    for format in &config.feed_formats {
        let layout = layout_for(format);
        if !registry.contains(&layout) {
            continue;
        }
        if let Err(err) =
            generate_format(registry, config, recent, segments, base, hooks, format, &layout)
        {
            errors.push(err);
        }
    }

    errors
}

fn generate_format(
    registry: &Registry,
    config: &Config,
    posts: &[&Post],
    segments: &[String],
    base: &HashMap<String, Value>,
    hooks: &Hooks,
    format: &str,
    layout: &str,
) -> Result<()> {
    let mut feed_page = Page::synthetic(layout, format);
    feed_page.filename = "feed".to_owned();

    let url = format!("{}{}", scope_url(segments), feed_page.output_file_name());

    let mut context = base.clone();
    context.insert(
        "posts".to_owned(),
        Value::Array(
            posts
                .iter()
                .map(|post| value::post_summary(post, config))
                .collect(),
        ),
    );
    context.insert(
        "page".to_owned(),
        value::page(Some(&config.title), &url),
    );

    let rendered = registry
        .render_chain(feed_page.layout.as_deref(), String::new(), &context)
        .map_err(|err| Error::Render {
            scope: url.clone(),
            err: err.to_string(),
        })?;

    let mut path = config.output_directory.clone();
    for segment in segments {
        path.push(segment);
    }
    path.push(feed_page.output_file_name());

    let payload = Payload {
        kind: ItemKind::Feed,
        source: None,
        output: &path,
    };
    hooks
        .fire(Event::BeforeWrite, &payload)
        .map_err(|err| Error::Hook {
            scope: url.clone(),
            err,
        })?;
    write::write_file(&path, &rendered).map_err(|err| Error::Write {
        path: path.clone(),
        err,
    })?;
    hooks
        .fire(Event::AfterWrite, &payload)
        .map_err(|err| Error::Hook { scope: url, err })?;

    Ok(())
}

fn scope_url(segments: &[String]) -> String {
    match segments.is_empty() {
        true => "/".to_owned(),
        false => format!("/{}/", segments.join("/")),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error generating a feed page for one format.
#[derive(Debug)]
pub enum Error {
    /// Returned when rendering the feed layout fails.
    Render { scope: String, err: String },

    /// Returned when writing the feed file fails.
    Write { path: PathBuf, err: io::Error },

    /// Returned when a write hook rejects the feed page.
    Hook { scope: String, err: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Render { scope, err } => {
                write!(f, "Failed to render feed '{}' ({})", scope, err)
            }
            Error::Write { path, err } => {
                write!(f, "Failed to write feed '{}' ({})", path.display(), err)
            }
            Error::Hook { scope, err } => {
                write!(f, "Hook failed for feed '{}' ({})", scope, err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write { path: _, err } => Some(err),
            _ => None,
        }
    }
}
