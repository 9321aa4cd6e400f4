//! Builds the in-memory indices over a build's posts: one bucket list per
//! year, per year-month, and per year-month-day, plus one [`Category`] per
//! category slug the posts declare.
//!
//! Posts are referenced by their position in the build's newest-first post
//! list, never owned; the whole index is discarded and rebuilt on every
//! build. Buckets and categories appear in first-seen order, which — because
//! the input is newest-first — means reverse-chronological order for date
//! buckets and "order of most recent use" for categories.

use crate::post::Post;
use std::collections::HashMap;

/// An insertion-ordered set of keyed bucket lists. Buckets are created on
/// first use; no year or month is pre-declared.
#[derive(Default)]
pub struct Buckets {
    order: Vec<String>,
    posts: HashMap<String, Vec<usize>>,
}

impl Buckets {
    fn push(&mut self, key: String, post: usize) {
        match self.posts.get_mut(&key) {
            Some(bucket) => bucket.push(post),
            None => {
                self.order.push(key.clone());
                self.posts.insert(key, vec![post]);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[usize]> {
        self.posts.get(key).map(Vec::as_slice)
    }

    /// Iterates buckets in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.order
            .iter()
            .map(move |key| (key.as_str(), self.posts[key].as_slice()))
    }
}

/// A category indexes the posts that declare its slug. It never owns them.
pub struct Category {
    pub slug: String,
    pub name: String,
    pub posts: Vec<usize>,
}

/// The three date indices plus the category index for one build.
#[derive(Default)]
pub struct ArchiveIndex {
    /// Keyed by `{year}`.
    pub years: Buckets,

    /// Keyed by `{year}-{month}`, components unpadded.
    pub months: Buckets,

    /// Keyed by `{year}-{month}-{day}`, components unpadded.
    pub days: Buckets,

    categories: Vec<Category>,
    category_slugs: HashMap<String, usize>,
}

impl ArchiveIndex {
    /// Indexes `posts`, which the caller has already filtered to non-draft
    /// and ordered newest-first; that order is preserved within every bucket.
    /// Category display names come from `category_names` when present, and
    /// default to the capitalized slug. A post that declares the same
    /// category slug twice is appended to that category twice.
    pub fn index(
        posts: &[Post],
        category_names: &HashMap<String, String>,
    ) -> ArchiveIndex {
        let mut index = ArchiveIndex::default();

        for (position, post) in posts.iter().enumerate() {
            let year = post.year().to_string();
            let month = format!("{}-{}", post.year(), post.month());
            let day = format!("{}-{}-{}", post.year(), post.month(), post.day());

            index.years.push(year, position);
            index.months.push(month, position);
            index.days.push(day, position);

            for slug in &post.categories {
                index.categorize(slug, category_names, position);
            }
        }

        index
    }

    fn categorize(
        &mut self,
        slug: &str,
        category_names: &HashMap<String, String>,
        position: usize,
    ) {
        let at = match self.category_slugs.get(slug) {
            Some(at) => *at,
            None => {
                self.category_slugs.insert(slug.to_owned(), self.categories.len());
                self.categories.push(Category {
                    slug: slug.to_owned(),
                    name: display_name(slug, category_names),
                    posts: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        self.categories[at].posts.push(position);
    }

    /// Iterates categories in first-seen order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.category_slugs
            .get(slug)
            .map(|at| &self.categories[*at])
    }

    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// The display name for a category slug: the configured override when one
/// exists, the capitalized slug otherwise.
pub fn display_name(slug: &str, names: &HashMap<String, String>) -> String {
    names
        .get(slug)
        .cloned()
        .unwrap_or_else(|| capitalize(slug))
}

fn capitalize(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use chrono::NaiveDate;
    use std::path::{Path, PathBuf};

    fn post(date: (i32, u32, u32), slug: &str, categories: &[&str]) -> Post {
        let config = Config::defaults(Path::new("/tmp/example"));
        Post {
            source_path: PathBuf::from(format!("posts/{}.md", slug)),
            title: slug.to_owned(),
            body: String::new(),
            date: NaiveDate::from_ymd(date.0, date.1, date.2),
            slug: slug.to_owned(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            draft: false,
            layout: config.layouts.post.clone(),
            markdown: true,
            content: None,
        }
    }

    #[test]
    fn test_posts_land_in_one_bucket_per_granularity() {
        let posts = vec![
            post((2021, 6, 15), "newer", &[]),
            post((2021, 6, 14), "older", &[]),
            post((2020, 1, 2), "oldest", &[]),
        ];
        let index = ArchiveIndex::index(&posts, &HashMap::new());

        assert_eq!(index.years.get("2021"), Some(&[0usize, 1][..]));
        assert_eq!(index.years.get("2020"), Some(&[2usize][..]));
        assert_eq!(index.months.get("2021-6"), Some(&[0usize, 1][..]));
        assert_eq!(index.days.get("2021-6-15"), Some(&[0usize][..]));
        assert_eq!(index.days.get("2021-6-14"), Some(&[1usize][..]));
        assert_eq!(index.days.get("2020-1-2"), Some(&[2usize][..]));

        // First-seen order follows the newest-first input.
        let years: Vec<&str> = index.years.iter().map(|(key, _)| key).collect();
        assert_eq!(years, vec!["2021", "2020"]);
    }

    #[test]
    fn test_posts_land_in_every_declared_category() {
        let posts = vec![
            post((2021, 6, 15), "first", &["rust", "tools"]),
            post((2021, 6, 14), "second", &["tools"]),
        ];
        let index = ArchiveIndex::index(&posts, &HashMap::new());

        assert_eq!(index.category("rust").unwrap().posts, vec![0]);
        assert_eq!(index.category("tools").unwrap().posts, vec![0, 1]);

        let order: Vec<&str> =
            index.categories().map(|c| c.slug.as_str()).collect();
        assert_eq!(order, vec!["rust", "tools"]);
    }

    #[test]
    fn test_category_display_names() {
        let posts = vec![post((2021, 6, 15), "only", &["rust", "misc"])];
        let mut names = HashMap::new();
        names.insert("misc".to_owned(), "Odds & Ends".to_owned());

        let index = ArchiveIndex::index(&posts, &names);
        assert_eq!(index.category("rust").unwrap().name, "Rust");
        assert_eq!(index.category("misc").unwrap().name, "Odds & Ends");
    }

    // A post that lists the same category slug twice is indexed twice into
    // that bucket. Deliberate: deduplication would silently change published
    // category counts, so the behavior is pinned here instead.
    #[test]
    fn test_duplicate_category_slugs_append_twice() {
        let posts = vec![post((2021, 6, 15), "dup", &["rust", "rust"])];
        let index = ArchiveIndex::index(&posts, &HashMap::new());
        assert_eq!(index.category("rust").unwrap().posts, vec![0, 0]);
    }
}
