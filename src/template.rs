//! Defines the [`Template`] type and the [`Registry`] of templates keyed by
//! slug. A template's slug is its path relative to the templates root with
//! the extension stripped and the components `/`-joined, so
//! `templates/feeds/atom.xml` registers as `feeds/atom`.
//!
//! Templates can nest: a template whose front matter names a `layout` is
//! wrapped by that layout when rendered, and the chain is followed
//! iteratively until a template with no parent is reached. The rendered
//! output of each step is exposed to the next template as `content`.

use crate::frontmatter;
use gtmpl_value::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// A compiled template plus the metadata halite reads from its front matter:
/// an optional title (used as a default page title) and an optional parent
/// layout.
pub struct Template {
    pub slug: String,
    pub title: Option<String>,
    pub layout: Option<String>,
    template: gtmpl::Template,
}

impl Template {
    /// Splits front matter from `source` and compiles the remainder.
    pub fn compile(slug: &str, source: &str) -> Result<Template> {
        let parsed = frontmatter::parse(source)?;
        let mut template = gtmpl::Template::default();
        template.parse(&parsed.body).map_err(|err| Error::Parse {
            slug: slug.to_owned(),
            err,
        })?;
        Ok(Template {
            slug: slug.to_owned(),
            title: frontmatter::str_value(&parsed.metadata, "title"),
            layout: frontmatter::str_value(&parsed.metadata, "layout"),
            template,
        })
    }

    /// Renders the template against a context value.
    pub fn render(&self, context: Value) -> Result<String> {
        execute(&self.template, context).map_err(|err| Error::Render {
            slug: self.slug.clone(),
            err,
        })
    }
}

/// Compiles and renders a one-off template source, as used for post and page
/// bodies (which may themselves contain template directives).
pub fn render_str(source: &str, context: Value) -> std::result::Result<String, String> {
    let mut template = gtmpl::Template::default();
    template.parse(source)?;
    execute(&template, context)
}

fn execute(
    template: &gtmpl::Template,
    context: Value,
) -> std::result::Result<String, String> {
    let context = gtmpl::Context::from(context)?;
    let mut buf = Vec::new();
    template.execute(&mut buf, &context)?;
    String::from_utf8(buf).map_err(|err| err.to_string())
}

/// Derives a template slug from its path relative to the templates root.
pub fn slug_for(relative_path: &Path) -> String {
    relative_path
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// The set of templates known to a build, keyed by slug.
#[derive(Default)]
pub struct Registry {
    templates: HashMap<String, Template>,
}

impl Registry {
    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.slug.clone(), template);
    }

    pub fn get(&self, slug: &str) -> Option<&Template> {
        self.templates.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.templates.contains_key(slug)
    }

    /// Renders `content` through the layout chain starting at `layout`. Each
    /// step re-exposes the accumulated output as `content` alongside the
    /// caller's base context. A layout that appears twice in one chain is a
    /// cycle and fails the render.
    pub fn render_chain(
        &self,
        layout: Option<&str>,
        content: String,
        base: &HashMap<String, Value>,
    ) -> Result<String> {
        let mut rendered = content;
        let mut seen: HashSet<String> = HashSet::new();
        let mut next = layout.map(str::to_owned);

        while let Some(name) = next {
            if !seen.insert(name.clone()) {
                return Err(Error::LayoutCycle(name));
            }
            let template = self
                .get(&name)
                .ok_or_else(|| Error::MissingLayout(name.clone()))?;
            let mut context = base.clone();
            context.insert("content".to_owned(), Value::String(rendered));
            rendered = template.render(Value::Object(context))?;
            next = template.layout.clone();
        }

        Ok(rendered)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error compiling or rendering templates.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template's front matter block is malformed.
    Frontmatter(frontmatter::Error),

    /// Returned when a template body fails to compile.
    Parse { slug: String, err: String },

    /// Returned when rendering a compiled template fails.
    Render { slug: String, err: String },

    /// Returned when a layout chain names a template that isn't registered.
    MissingLayout(String),

    /// Returned when a layout chain revisits a template.
    LayoutCycle(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Frontmatter(err) => err.fmt(f),
            Error::Parse { slug, err } => {
                write!(f, "Compiling template '{}': {}", slug, err)
            }
            Error::Render { slug, err } => {
                write!(f, "Rendering template '{}': {}", slug, err)
            }
            Error::MissingLayout(slug) => {
                write!(f, "'{}' template not found", slug)
            }
            Error::LayoutCycle(slug) => {
                write!(f, "Layout chain revisits template '{}'", slug)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frontmatter(err) => Some(err),
            _ => None,
        }
    }
}

impl From<frontmatter::Error> for Error {
    fn from(err: frontmatter::Error) -> Error {
        Error::Frontmatter(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn registry(sources: &[(&str, &str)]) -> Registry {
        let mut registry = Registry::default();
        for (slug, source) in sources {
            registry.insert(Template::compile(slug, source).unwrap());
        }
        registry
    }

    #[test]
    fn test_slug_for_nested_directories() {
        assert_eq!(slug_for(Path::new("post.html")), "post");
        assert_eq!(slug_for(Path::new("feeds/atom.xml")), "feeds/atom");
    }

    #[test]
    fn test_render_chain_wraps_content() -> Result<()> {
        let registry = registry(&[
            ("outer", "<html>{{.content}}</html>"),
            ("inner", "---\nlayout: outer\n---\n<p>{{.content}}</p>"),
        ]);
        let rendered = registry.render_chain(
            Some("inner"),
            "hello".to_owned(),
            &HashMap::new(),
        )?;
        assert_eq!(rendered, "<html><p>hello</p></html>");
        Ok(())
    }

    #[test]
    fn test_render_chain_missing_layout() {
        let registry = registry(&[]);
        assert!(matches!(
            registry.render_chain(Some("ghost"), String::new(), &HashMap::new()),
            Err(Error::MissingLayout(slug)) if slug == "ghost"
        ));
    }

    #[test]
    fn test_render_chain_detects_cycles() {
        let registry = registry(&[
            ("a", "---\nlayout: b\n---\n{{.content}}"),
            ("b", "---\nlayout: a\n---\n{{.content}}"),
        ]);
        assert!(matches!(
            registry.render_chain(Some("a"), String::new(), &HashMap::new()),
            Err(Error::LayoutCycle(_))
        ));
    }

    #[test]
    fn test_template_title_from_front_matter() -> Result<()> {
        let template =
            Template::compile("posts", "---\ntitle: All Posts\n---\nbody")?;
        assert_eq!(template.title, Some("All Posts".to_owned()));
        Ok(())
    }
}
