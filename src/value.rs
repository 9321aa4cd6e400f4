//! Conversions from build entities into [`gtmpl_value::Value`] objects for
//! templating. Every template sees a `site` object; item and listing pages
//! layer `post`, `posts`, `page`, `pagination`, `category`, and `archive`
//! objects on top as appropriate.

use crate::archive;
use crate::config::Config;
use crate::pagination::Pagination;
use crate::post::Post;
use gtmpl_value::Value;
use std::collections::HashMap;

/// The `site` object: global values available to every render.
pub fn site(config: &Config, posts: &[Post]) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), Value::String(config.title.clone()));
    m.insert(
        "description".to_owned(),
        Value::String(config.description.clone()),
    );
    m.insert(
        "url".to_owned(),
        match &config.base_url {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        },
    );
    m.insert("posts_total".to_owned(), Value::from(posts.len() as i64));
    m.insert(
        "latest_post".to_owned(),
        match posts.first() {
            Some(post) => post_summary(post, config),
            None => Value::Nil,
        },
    );
    Value::Object(m)
}

/// The `page` object: the title (when resolved) and URL of the page being
/// rendered.
pub fn page(title: Option<&str>, url: &str) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "title".to_owned(),
        match title {
            Some(title) => Value::String(title.to_owned()),
            None => Value::Nil,
        },
    );
    m.insert("url".to_owned(), Value::String(url.to_owned()));
    Value::Object(m)
}

/// A post as listing and feed templates see it.
pub fn post_summary(post: &Post, config: &Config) -> Value {
    Value::Object(summary_map(post, config))
}

/// A post as its own page template sees it: the summary fields plus
/// `previous` and `next` links to the chronologically adjacent posts.
pub fn post_page(
    post: &Post,
    config: &Config,
    previous: Option<&Post>,
    next: Option<&Post>,
) -> Value {
    let mut m = summary_map(post, config);
    m.insert("previous".to_owned(), adjacent(previous, config));
    m.insert("next".to_owned(), adjacent(next, config));
    Value::Object(m)
}

fn summary_map(post: &Post, config: &Config) -> HashMap<String, Value> {
    let url = post.url(&config.posts_path);
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), Value::String(post.title.clone()));
    m.insert("url".to_owned(), Value::String(url.clone()));
    m.insert("absolute_url".to_owned(), absolute_url(config, &url));
    m.insert(
        "date".to_owned(),
        Value::String(post.date.format("%Y-%m-%d").to_string()),
    );
    m.insert("year".to_owned(), Value::from(post.year() as i64));
    m.insert("month".to_owned(), Value::from(post.month() as i64));
    m.insert("day".to_owned(), Value::from(post.day() as i64));
    m.insert(
        "categories".to_owned(),
        Value::Array(
            post.categories
                .iter()
                .map(|slug| {
                    category(
                        slug,
                        &archive::display_name(slug, &config.category_names),
                        &format!("/{}/{}/", config.posts_path, slug),
                    )
                })
                .collect(),
        ),
    );
    m.insert(
        "content".to_owned(),
        Value::String(post.content.clone().unwrap_or_default()),
    );
    m
}

fn adjacent(post: Option<&Post>, config: &Config) -> Value {
    match post {
        None => Value::Nil,
        Some(post) => {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("title".to_owned(), Value::String(post.title.clone()));
            m.insert(
                "url".to_owned(),
                Value::String(post.url(&config.posts_path)),
            );
            Value::Object(m)
        }
    }
}

/// The `category` object for category pages and per-post category lists.
pub fn category(slug: &str, name: &str, url: &str) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("slug".to_owned(), Value::String(slug.to_owned()));
    m.insert("name".to_owned(), Value::String(name.to_owned()));
    m.insert("url".to_owned(), Value::String(url.to_owned()));
    Value::Object(m)
}

/// The `pagination` object for listing pages.
pub fn pagination<T>(page: &Pagination<T>) -> Value {
    let option_to_value = |opt: &Option<String>| match opt {
        Some(url) => Value::String(url.clone()),
        None => Value::Nil,
    };

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("page".to_owned(), Value::from(page.index as i64));
    m.insert("pages".to_owned(), Value::from(page.total_pages as i64));
    m.insert("total".to_owned(), Value::from(page.total_items as i64));
    m.insert("url".to_owned(), Value::String(page.url.clone()));
    m.insert("base_url".to_owned(), Value::String(page.base_url.clone()));
    m.insert(
        "previous_page_url".to_owned(),
        option_to_value(&page.previous_url),
    );
    m.insert("next_page_url".to_owned(), option_to_value(&page.next_url));
    Value::Object(m)
}

/// Joins a root-relative URL path onto the configured base URL, when one is
/// configured.
pub fn absolute_url(config: &Config, relative: &str) -> Value {
    match &config.base_url {
        Some(base) => match base.join(relative) {
            Ok(url) => Value::String(url.to_string()),
            Err(_) => Value::Nil,
        },
        None => Value::Nil,
    }
}
