use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

const PROJECT_FILE: &str = "halite.yaml";

#[derive(Deserialize, Default)]
#[serde(default)]
struct ProjectFile {
    title: Option<String>,
    description: Option<String>,
    base_url: Option<Url>,
    paths: Paths,
    file_extensions: FileExtensions,
    layouts: Layouts,
    pagination: Pagination,
    generation: Generation,
    date_formats: DateFormats,
    feed_formats: Option<Vec<String>>,
    category_names: HashMap<String, String>,
    markdown: Markdown,
}

#[derive(Deserialize)]
#[serde(default)]
struct Paths {
    site: String,
    posts: String,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            site: "site".to_owned(),
            posts: "posts".to_owned(),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct FileExtensions {
    pub pages: String,
    pub posts: String,
}

impl Default for FileExtensions {
    fn default() -> Self {
        FileExtensions {
            pages: "html".to_owned(),
            posts: "html".to_owned(),
        }
    }
}

/// The layout identifiers consulted per scope. `page` and `post` wrap single
/// items; the rest drive the paginated listing scopes.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct Layouts {
    pub page: String,
    pub post: String,
    pub posts: String,
    pub category: String,
    pub year: String,
    pub month: String,
    pub day: String,
}

impl Default for Layouts {
    fn default() -> Self {
        Layouts {
            page: "page".to_owned(),
            post: "post".to_owned(),
            posts: "posts".to_owned(),
            category: "category".to_owned(),
            year: "year".to_owned(),
            month: "month".to_owned(),
            day: "day".to_owned(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Pagination {
    per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { per_page: 10 }
    }
}

/// Feature gates for the generated listing scopes. Month archives are only
/// generated when year archives are, and day archives only when month
/// archives are.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct Generation {
    pub paginated_posts: bool,
    pub year_archives: bool,
    pub month_archives: bool,
    pub day_archives: bool,
    pub categories: bool,
    pub category_feeds: bool,
    pub feed: bool,
}

impl Default for Generation {
    fn default() -> Self {
        Generation {
            paginated_posts: true,
            year_archives: true,
            month_archives: true,
            day_archives: true,
            categories: true,
            category_feeds: true,
            feed: true,
        }
    }
}

/// `strftime`-style formats used for archive page titles, one per
/// granularity.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct DateFormats {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        DateFormats {
            year: "%Y".to_owned(),
            month: "%B %Y".to_owned(),
            day: "%d %B %Y".to_owned(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Markdown {
    enabled: bool,
}

impl Default for Markdown {
    fn default() -> Self {
        Markdown { enabled: true }
    }
}

/// A fully resolved configuration: source and output locations plus every
/// recognized setting, defaulted where the project file is silent.
pub struct Config {
    pub root_directory: PathBuf,
    pub output_directory: PathBuf,
    pub posts_source_directory: PathBuf,
    pub pages_source_directory: PathBuf,
    pub templates_source_directory: PathBuf,
    pub public_source_directory: PathBuf,

    pub title: String,
    pub description: String,
    pub base_url: Option<Url>,

    /// The output subdirectory under which posts, date archives, and category
    /// pages are written.
    pub posts_path: String,

    pub file_extensions: FileExtensions,
    pub layouts: Layouts,
    pub per_page: usize,
    pub generation: Generation,
    pub date_formats: DateFormats,
    pub feed_formats: Vec<String>,
    pub category_names: HashMap<String, String>,
    pub markdown: bool,
}

impl Config {
    /// Searches `dir` and its parent directories for a `halite.yaml` project
    /// file and loads the configuration from the first one found.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the configuration from a specific project file. The project root
    /// is the file's parent directory.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: ProjectFile = serde_yaml::from_reader(file)
            .map_err(|e| anyhow!("Loading configuration: {}", e))?;
        let root = path
            .parent()
            .ok_or_else(|| {
                anyhow!(
                    "Can't get parent directory for provided project file path '{}'",
                    path.display()
                )
            })?
            .to_owned();
        Ok(Config::resolve(project, root, output_directory))
    }

    /// A configuration with every setting defaulted, rooted at `root`. Source
    /// directories are the conventional `posts`, `pages`, `templates`, and
    /// `public` subdirectories.
    pub fn defaults(root: &Path) -> Config {
        Config::resolve(ProjectFile::default(), root.to_owned(), None)
    }

    fn resolve(
        project: ProjectFile,
        root: PathBuf,
        output_directory: Option<&Path>,
    ) -> Config {
        let output = match output_directory {
            Some(path) => path.to_owned(),
            None => root.join(&project.paths.site),
        };
        Config {
            posts_source_directory: root.join("posts"),
            pages_source_directory: root.join("pages"),
            templates_source_directory: root.join("templates"),
            public_source_directory: root.join("public"),
            root_directory: root,
            output_directory: output,
            title: project.title.unwrap_or_else(|| "An example site".to_owned()),
            description: project.description.unwrap_or_default(),
            base_url: project.base_url,
            posts_path: project.paths.posts,
            file_extensions: project.file_extensions,
            layouts: project.layouts,
            per_page: project.pagination.per_page,
            generation: project.generation,
            date_formats: project.date_formats,
            feed_formats: project
                .feed_formats
                .unwrap_or_else(|| vec!["atom".to_owned()]),
            category_names: project.category_names,
            markdown: project.markdown.enabled,
        }
    }
}
