//! Exports the [`Site`] type, which owns one build: the scanned templates,
//! posts, and pages, the indices over the posts, and the list of recoverable
//! errors. Calling [`Site::generate`] runs the stages in a fixed order —
//! scan, index, prepare the output directory, render posts and pages, write
//! every paginated listing scope, write feeds, copy assets.
//!
//! Only output-directory preparation can abort a build. Every other failure
//! is recorded with the offending item's path or slug and the build carries
//! on, so one broken post never sinks the other ninety-nine. The recorded
//! list is reset at the start of each `generate` call and reported in a
//! batch by the caller when the build completes.

use crate::archive::ArchiveIndex;
use crate::config::Config;
use crate::feed;
use crate::hook::{Event, Hook, Hooks, ItemKind, Payload};
use crate::markdown;
use crate::page::Page;
use crate::pagination::{paginate, Pagination};
use crate::post::Post;
use crate::scan;
use crate::template::{self, Registry, Template};
use crate::value;
use crate::write;
use gtmpl_value::Value;
use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One paginated listing scope: all posts, one archive bucket, or one
/// category.
struct Scope {
    layout: String,
    segments: Vec<String>,
    title: Option<String>,
    extra: HashMap<String, Value>,
}

#[derive(Clone, Copy)]
enum Granularity {
    Year,
    Month,
    Day,
}

pub struct Site {
    pub config: Config,
    pub templates: Registry,

    /// Published posts, newest first. Drafts never make it in.
    pub posts: Vec<Post>,

    pub pages: Vec<Page>,
    pub archive: ArchiveIndex,

    /// Recoverable failures recorded during the current build.
    pub errors: Vec<Error>,

    hooks: Hooks,
}

impl Site {
    pub fn new(config: Config) -> Site {
        Site {
            config,
            templates: Registry::default(),
            posts: Vec::new(),
            pages: Vec::new(),
            archive: ArchiveIndex::default(),
            errors: Vec::new(),
            hooks: Hooks::default(),
        }
    }

    /// Registers a callback fired around every output write. Hooks survive
    /// across builds; everything else on the site is rebuilt per call to
    /// [`Site::generate`].
    pub fn add_hook(&mut self, event: Event, hook: Hook) {
        self.hooks.register(event, hook);
    }

    /// Runs one full build. Returns `Err` only when the output directory
    /// can't be prepared; every other failure lands in [`Site::errors`] and
    /// the build runs to completion.
    pub fn generate(&mut self) -> Result<()> {
        self.reset();
        self.scan();
        self.archive =
            ArchiveIndex::index(&self.posts, &self.config.category_names);
        self.prepare_output()?;

        self.render_post_bodies();
        self.publish_posts();
        self.publish_pages();
        self.publish_post_listing();
        self.publish_archives();
        self.publish_categories();
        self.publish_site_feed();
        self.copy_assets();
        Ok(())
    }

    fn reset(&mut self) {
        self.templates = Registry::default();
        self.posts.clear();
        self.pages.clear();
        self.archive = ArchiveIndex::default();
        self.errors.clear();
    }

    fn record(&mut self, err: Error) {
        warn!("{}", err);
        self.errors.push(err);
    }

    fn scan(&mut self) {
        let templates_root = self.config.templates_source_directory.clone();
        match scan::recursive(&templates_root) {
            Err(err) => self.record(Error::Scan {
                path: templates_root.clone(),
                err,
            }),
            Ok(paths) => {
                for path in paths {
                    let slug = match path.strip_prefix(&templates_root) {
                        Ok(relative) => template::slug_for(relative),
                        Err(_) => template::slug_for(&path),
                    };
                    match fs::read_to_string(&path) {
                        Err(err) => {
                            self.record(Error::Scan { path: path.clone(), err })
                        }
                        Ok(raw) => match Template::compile(&slug, &raw) {
                            Err(err) => self.record(Error::Parse {
                                path: path.clone(),
                                err: err.to_string(),
                            }),
                            Ok(compiled) => self.templates.insert(compiled),
                        },
                    }
                }
            }
        }

        let posts_root = self.config.posts_source_directory.clone();
        match scan::flat(&posts_root) {
            Err(err) => self.record(Error::Scan {
                path: posts_root,
                err,
            }),
            Ok(paths) => {
                for path in paths {
                    match Post::from_file(&path, &self.config) {
                        Err(err) => self.record(Error::Parse {
                            path: path.clone(),
                            err: err.to_string(),
                        }),
                        Ok(post) => {
                            if !post.draft {
                                self.posts.push(post);
                            }
                        }
                    }
                }
            }
        }

        // Scanning yields name-ascending order; post file names lead with
        // their date, so reversing gives newest-first. The stable re-sort
        // keeps that order while honoring front-matter date overrides.
        self.posts.reverse();
        self.posts.sort_by(|a, b| b.date.cmp(&a.date));

        let pages_root = self.config.pages_source_directory.clone();
        match scan::recursive(&pages_root) {
            Err(err) => self.record(Error::Scan {
                path: pages_root,
                err,
            }),
            Ok(paths) => {
                for path in paths {
                    match Page::from_file(&path, &self.config) {
                        Err(err) => self.record(Error::Parse {
                            path: path.clone(),
                            err: err.to_string(),
                        }),
                        Ok(page) => self.pages.push(page),
                    }
                }
            }
        }

        info!(
            "Scanned {} posts and {} pages",
            self.posts.len(),
            self.pages.len()
        );
    }

    fn prepare_output(&self) -> Result<()> {
        write::clean_dir(&self.config.output_directory).map_err(|err| {
            Error::DirectoryPreparation {
                path: self.config.output_directory.clone(),
                err,
            }
        })
    }

    /// Renders every post's body once, ahead of the post pages and the
    /// listing and feed scopes that all consume it. A body that fails to
    /// render is recorded here and its post page is skipped later.
    fn render_post_bodies(&mut self) {
        let site_value = value::site(&self.config, &self.posts);
        let markdown_enabled = self.config.markdown;

        for at in 0..self.posts.len() {
            let rendered = {
                let post = &self.posts[at];
                let mut context: HashMap<String, Value> = HashMap::new();
                context.insert("site".to_owned(), site_value.clone());
                context.insert(
                    "page".to_owned(),
                    value::page(
                        Some(&post.title),
                        &post.url(&self.config.posts_path),
                    ),
                );
                context.insert(
                    "post".to_owned(),
                    value::post_summary(post, &self.config),
                );
                template::render_str(&post.body, Value::Object(context)).map(
                    |out| match markdown_enabled && post.markdown {
                        true => markdown::to_html(&out),
                        false => out,
                    },
                )
            };
            match rendered {
                Ok(content) => self.posts[at].content = Some(content),
                Err(err) => {
                    let item = self.posts[at].slug.clone();
                    self.record(Error::Render { item, err });
                }
            }
        }
    }

    fn publish_posts(&mut self) {
        info!("Writing {} posts", self.posts.len());
        for at in 0..self.posts.len() {
            if let Err(err) = self.publish_post(at) {
                self.record(err);
            }
        }
    }

    fn publish_post(&self, at: usize) -> Result<()> {
        let post = &self.posts[at];
        let content = match &post.content {
            Some(content) => content.clone(),
            // The body render already failed and was recorded.
            None => return Ok(()),
        };

        let mut context = self.base_context();
        let previous = self.posts.get(at + 1);
        let next = match at {
            0 => None,
            _ => self.posts.get(at - 1),
        };
        context.insert(
            "post".to_owned(),
            value::post_page(post, &self.config, previous, next),
        );
        context.insert(
            "page".to_owned(),
            value::page(Some(&post.title), &post.url(&self.config.posts_path)),
        );

        let rendered = self
            .templates
            .render_chain(Some(&post.layout), content, &context)
            .map_err(|err| Error::Render {
                item: post.slug.clone(),
                err: err.to_string(),
            })?;

        let path = self
            .config
            .output_directory
            .join(&self.config.posts_path)
            .join(&post.slug)
            .join(format!("index.{}", self.config.file_extensions.posts));
        self.write_item(
            ItemKind::Post,
            Some(&post.source_path),
            &path,
            &rendered,
            &post.slug,
        )
    }

    fn publish_pages(&mut self) {
        info!("Writing {} pages", self.pages.len());
        for at in 0..self.pages.len() {
            if let Err(err) = self.publish_page(at) {
                self.record(err);
            }
        }
    }

    fn publish_page(&self, at: usize) -> Result<()> {
        let page = &self.pages[at];
        let item = page.describe();

        let directory = page.output_directory(
            &self.config.pages_source_directory,
            &self.config.output_directory,
        );
        let url = self.page_url(&directory, page);

        let mut context = self.base_context();
        context.insert(
            "page".to_owned(),
            value::page(page.title.as_deref(), &url),
        );

        let body = template::render_str(
            &page.body,
            Value::Object(context.clone()),
        )
        .map(|out| match self.config.markdown && page.markdown {
            true => markdown::to_html(&out),
            false => out,
        })
        .map_err(|err| Error::Render {
            item: item.clone(),
            err,
        })?;

        let rendered = self
            .templates
            .render_chain(page.layout.as_deref(), body, &context)
            .map_err(|err| Error::Render {
                item: item.clone(),
                err: err.to_string(),
            })?;

        let path = directory.join(page.output_file_name());
        self.write_item(
            ItemKind::Page,
            page.source_path.as_deref(),
            &path,
            &rendered,
            &item,
        )
    }

    /// The root-relative URL of a page's output file. Pages named `index`
    /// get their directory's URL.
    fn page_url(&self, directory: &Path, page: &Page) -> String {
        let relative = directory
            .strip_prefix(&self.config.output_directory)
            .unwrap_or_else(|_| Path::new(""));
        let mut url = String::from("/");
        for component in relative.components() {
            url.push_str(&component.as_os_str().to_string_lossy());
            url.push('/');
        }
        if page.filename != "index" {
            url.push_str(&page.output_file_name());
        }
        url
    }

    fn publish_post_listing(&mut self) {
        if !self.config.generation.paginated_posts || self.posts.is_empty() {
            return;
        }
        let posts: Vec<usize> = (0..self.posts.len()).collect();
        let scope = Scope {
            layout: self.config.layouts.posts.clone(),
            segments: Vec::new(),
            title: None,
            extra: HashMap::new(),
        };
        self.publish_scope(&scope, &posts);
    }

    fn publish_archives(&mut self) {
        if !self.config.generation.year_archives || self.archive.years.is_empty()
        {
            return;
        }
        info!("Writing archive pages");
        self.publish_date_archive(Granularity::Year);
        if self.config.generation.month_archives {
            self.publish_date_archive(Granularity::Month);
            if self.config.generation.day_archives {
                self.publish_date_archive(Granularity::Day);
            }
        }
    }

    fn publish_date_archive(&mut self, granularity: Granularity) {
        let (layout, format) = match granularity {
            Granularity::Year => (
                self.config.layouts.year.clone(),
                self.config.date_formats.year.clone(),
            ),
            Granularity::Month => (
                self.config.layouts.month.clone(),
                self.config.date_formats.month.clone(),
            ),
            Granularity::Day => (
                self.config.layouts.day.clone(),
                self.config.date_formats.day.clone(),
            ),
        };

        let buckets: Vec<(String, Vec<usize>)> = match granularity {
            Granularity::Year => &self.archive.years,
            Granularity::Month => &self.archive.months,
            Granularity::Day => &self.archive.days,
        }
        .iter()
        .map(|(key, posts)| (key.to_owned(), posts.to_vec()))
        .collect();

        for (key, posts) in buckets {
            // The bucket key's components double as output path segments:
            // `2021-6` becomes `<posts>/2021/6/`.
            let mut segments = vec![self.config.posts_path.clone()];
            segments.extend(key.split('-').map(str::to_owned));

            let newest = &self.posts[posts[0]];
            let title = newest.date.format(&format).to_string();

            let mut archive_value: HashMap<String, Value> = HashMap::new();
            archive_value.insert(
                "type".to_owned(),
                Value::String(
                    match granularity {
                        Granularity::Year => "year",
                        Granularity::Month => "month",
                        Granularity::Day => "day",
                    }
                    .to_owned(),
                ),
            );
            archive_value.insert(
                "date".to_owned(),
                Value::String(newest.date.format("%Y-%m-%d").to_string()),
            );
            let mut extra = HashMap::new();
            extra.insert("archive".to_owned(), Value::Object(archive_value));

            let scope = Scope {
                layout: layout.clone(),
                segments,
                title: Some(title),
                extra,
            };
            self.publish_scope(&scope, &posts);
        }
    }

    fn publish_categories(&mut self) {
        if !self.config.generation.categories || !self.archive.has_categories()
        {
            return;
        }
        info!("Writing category pages");

        let categories: Vec<(String, String, Vec<usize>)> = self
            .archive
            .categories()
            .map(|category| {
                (
                    category.slug.clone(),
                    category.name.clone(),
                    category.posts.clone(),
                )
            })
            .collect();

        for (slug, name, posts) in categories {
            let segments =
                vec![self.config.posts_path.clone(), slug.clone()];
            let url = format!("/{}/{}/", self.config.posts_path, slug);
            let mut extra = HashMap::new();
            extra.insert(
                "category".to_owned(),
                value::category(&slug, &name, &url),
            );

            if self.config.generation.category_feeds {
                self.publish_feed_scope(&segments, &posts, extra.clone());
            }

            let scope = Scope {
                layout: self.config.layouts.category.clone(),
                segments,
                title: Some(name),
                extra,
            };
            self.publish_scope(&scope, &posts);
        }
    }

    fn publish_site_feed(&mut self) {
        if !self.config.generation.feed || self.posts.is_empty() {
            return;
        }
        let posts: Vec<usize> = (0..self.posts.len()).collect();
        self.publish_feed_scope(&[], &posts, HashMap::new());
    }

    fn publish_feed_scope(
        &mut self,
        segments: &[String],
        posts: &[usize],
        extra: HashMap<String, Value>,
    ) {
        let errors = {
            let mut base = self.base_context();
            for (key, value) in extra {
                base.insert(key, value);
            }
            let refs: Vec<&Post> =
                posts.iter().map(|&at| &self.posts[at]).collect();
            feed::generate(
                &self.templates,
                &self.config,
                &refs,
                self.config.per_page,
                segments,
                &base,
                &self.hooks,
            )
        };
        for err in errors {
            self.record(err.into());
        }
    }

    /// Writes every page of one listing scope. The scope's layout is checked
    /// up front: an unregistered layout aborts the whole scope before any of
    /// its pages is written, so a scope is either absent or complete-modulo
    /// per-page failures.
    fn publish_scope(&mut self, scope: &Scope, posts: &[usize]) {
        for err in self.render_scope(scope, posts) {
            self.record(err);
        }
    }

    fn render_scope(&self, scope: &Scope, posts: &[usize]) -> Vec<Error> {
        if !self.templates.contains(&scope.layout) {
            return vec![Error::TemplateNotFound {
                layout: scope.layout.clone(),
            }];
        }

        let mut errors = Vec::new();
        for page in paginate(posts, self.config.per_page, &scope.segments) {
            if let Err(err) = self.render_listing_page(scope, &page) {
                errors.push(err);
            }
        }
        errors
    }

    fn render_listing_page(
        &self,
        scope: &Scope,
        page: &Pagination<usize>,
    ) -> Result<()> {
        let layout_title = self
            .templates
            .get(&scope.layout)
            .and_then(|template| template.title.clone());
        let mut title = scope.title.clone().or(layout_title);
        if page.index > 1 {
            title = Some(match title {
                Some(title) => format!("{} (Page {})", title, page.index),
                None => format!("Page {}", page.index),
            });
        }

        let mut context = self.base_context();
        context.insert(
            "posts".to_owned(),
            Value::Array(
                page.items
                    .iter()
                    .map(|&at| {
                        value::post_summary(&self.posts[at], &self.config)
                    })
                    .collect(),
            ),
        );
        context.insert("pagination".to_owned(), value::pagination(page));
        context
            .insert("page".to_owned(), value::page(title.as_deref(), &page.url));
        for (key, value) in &scope.extra {
            context.insert(key.clone(), value.clone());
        }

        let rendered = self
            .templates
            .render_chain(Some(&scope.layout), String::new(), &context)
            .map_err(|err| Error::Render {
                item: page.url.clone(),
                err: err.to_string(),
            })?;

        let mut path = self.config.output_directory.clone();
        for segment in &page.segments {
            path.push(segment);
        }
        path.push(format!("index.{}", self.config.file_extensions.pages));

        self.write_item(ItemKind::Page, None, &path, &rendered, &page.url)
    }

    fn copy_assets(&mut self) {
        let public = self.config.public_source_directory.clone();
        if !public.is_dir() {
            return;
        }
        info!("Copying assets");
        if let Err(err) =
            write::copy_dir(&public, &self.config.output_directory)
        {
            self.record(Error::AssetCopy { err });
        }
    }

    /// Fires the write hooks around one output write. A failing before-hook
    /// skips the write; a failing after-hook is reported but the file is
    /// already on disk.
    fn write_item(
        &self,
        kind: ItemKind,
        source: Option<&Path>,
        path: &Path,
        contents: &str,
        item: &str,
    ) -> Result<()> {
        let payload = Payload {
            kind,
            source,
            output: path,
        };
        self.hooks
            .fire(Event::BeforeWrite, &payload)
            .map_err(|err| Error::Hook {
                item: item.to_owned(),
                err,
            })?;
        write::write_file(path, contents).map_err(|err| Error::Write {
            path: path.to_owned(),
            err,
        })?;
        self.hooks
            .fire(Event::AfterWrite, &payload)
            .map_err(|err| Error::Hook {
                item: item.to_owned(),
                err,
            })
    }

    fn base_context(&self) -> HashMap<String, Value> {
        let mut context: HashMap<String, Value> = HashMap::new();
        context
            .insert("site".to_owned(), value::site(&self.config, &self.posts));
        context
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a build failure. Only [`Error::DirectoryPreparation`] aborts a
/// build; every other variant is recorded on the site and reported when the
/// build completes.
#[derive(Debug)]
pub enum Error {
    /// Returned when the output directory can't be cleared and recreated.
    DirectoryPreparation { path: PathBuf, err: io::Error },

    /// Returned when a source directory or file can't be read.
    Scan { path: PathBuf, err: io::Error },

    /// Returned when a source file can't be parsed.
    Parse { path: PathBuf, err: String },

    /// Returned when a listing scope's layout isn't registered. The whole
    /// scope is skipped before any of its pages is written.
    TemplateNotFound { layout: String },

    /// Returned when rendering a single item fails.
    Render { item: String, err: String },

    /// Returned when a write hook rejects a single item.
    Hook { item: String, err: String },

    /// Returned when writing a single output file fails.
    Write { path: PathBuf, err: io::Error },

    /// Returned when copying the static assets fails.
    AssetCopy { err: io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DirectoryPreparation { path, err } => write!(
                f,
                "Couldn't prepare the output directory '{}' ({})",
                path.display(),
                err
            ),
            Error::Scan { path, err } => {
                write!(f, "Failed to scan '{}' ({})", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Failed to parse '{}' ({})", path.display(), err)
            }
            Error::TemplateNotFound { layout } => {
                write!(f, "'{}' template not found", layout)
            }
            Error::Render { item, err } => {
                write!(f, "Failed to render '{}' ({})", item, err)
            }
            Error::Hook { item, err } => {
                write!(f, "Hook failed for '{}' ({})", item, err)
            }
            Error::Write { path, err } => {
                write!(f, "Failed to write '{}' ({})", path.display(), err)
            }
            Error::AssetCopy { err } => {
                write!(f, "Failed to copy site assets ({})", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DirectoryPreparation { path: _, err } => Some(err),
            Error::Scan { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::AssetCopy { err } => Some(err),
            _ => None,
        }
    }
}

impl From<feed::Error> for Error {
    /// Converts [`feed::Error`]s into [`Error`]. This allows feed failures
    /// to be recorded alongside every other per-item failure.
    fn from(err: feed::Error) -> Error {
        match err {
            feed::Error::Render { scope, err } => {
                Error::Render { item: scope, err }
            }
            feed::Error::Write { path, err } => Error::Write { path, err },
            feed::Error::Hook { scope, err } => {
                Error::Hook { item: scope, err }
            }
        }
    }
}
