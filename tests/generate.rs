//! End-to-end build tests over a real site fixture in a temporary directory.

use halite::config::Config;
use halite::site::{Error, Site};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Lays down a complete fixture site: five published posts across two years,
/// one draft, one nested page, a full template set, and a public asset.
fn fixture(root: &Path) {
    write(
        &root.join("halite.yaml"),
        "title: Fixture Site\n\
         base_url: https://example.org\n\
         feed_formats: [atom, rss]\n\
         pagination:\n  per_page: 2\n",
    );

    let templates = root.join("templates");
    write(
        &templates.join("default.html"),
        "<html><body>{{.content}}</body></html>",
    );
    write(
        &templates.join("post.html"),
        "---\nlayout: default\n---\n<article>{{.content}}</article>",
    );
    write(
        &templates.join("page.html"),
        "---\nlayout: default\n---\n<main>{{.content}}</main>",
    );
    write(
        &templates.join("posts.html"),
        "---\nlayout: default\ntitle: All Posts\n---\n\
         <title>{{.page.title}}</title>\
         {{range .posts}}<li>{{.title}}</li>{{end}}\
         <nav>{{.pagination.page}}/{{.pagination.pages}}</nav>",
    );
    write(
        &templates.join("category.html"),
        "---\nlayout: default\n---\n\
         <h1>{{.category.name}}</h1>\
         {{range .posts}}<li>{{.title}}</li>{{end}}",
    );
    for granularity in ["year", "month", "day"] {
        write(
            &templates.join(format!("{}.html", granularity)),
            "---\nlayout: default\n---\n\
             <title>{{.page.title}}</title>\
             {{range .posts}}<li>{{.title}}</li>{{end}}",
        );
    }
    write(
        &templates.join("feeds").join("atom.xml"),
        "<feed>{{range .posts}}<entry>{{.title}} {{.absolute_url}}</entry>{{end}}</feed>",
    );

    let posts = root.join("posts");
    write(
        &posts.join("2021-06-15-emerald.md"),
        "---\ntitle: Emerald\ncategories: [rust]\n---\n# Emerald\n",
    );
    write(
        &posts.join("2021-06-14-diamond.md"),
        "---\ntitle: Diamond\ncategories: [rust, tools]\n---\nDiamond body\n",
    );
    write(
        &posts.join("2021-05-01-coal.md"),
        "---\ntitle: Coal\n---\nCoal body\n",
    );
    write(
        &posts.join("2020-01-02-basalt.md"),
        "---\ntitle: Basalt\n---\nBasalt body\n",
    );
    write(
        &posts.join("2020-01-01-amber.md"),
        "---\ntitle: Amber\n---\nAmber body\n",
    );
    write(
        &posts.join("2022-01-01-unfinished.md"),
        "---\ntitle: Unfinished\ndraft: true\n---\nNot yet\n",
    );

    write(
        &root.join("pages").join("docs").join("about.md"),
        "---\ntitle: About\n---\nAbout the site\n",
    );

    write(&root.join("public").join("robots.txt"), "User-agent: *\n");
}

fn generate(root: &Path) -> Site {
    let config =
        Config::from_project_file(&root.join("halite.yaml"), None).unwrap();
    let mut site = Site::new(config);
    site.generate().unwrap();
    site
}

fn read(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
}

#[test]
fn test_paginated_post_listing() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let site = generate(dir.path());
    assert!(site.errors.is_empty(), "{:?}", site.errors);

    let out = dir.path().join("site");

    // Five posts at two per page: three pages, page 1 with no suffix.
    let first = read(&out.join("index.html"));
    assert!(first.contains("<li>Emerald</li><li>Diamond</li>"));
    assert!(first.contains("<nav>1/3</nav>"));
    assert!(first.contains("<title>All Posts</title>"));

    let second = read(&out.join("page2").join("index.html"));
    assert!(second.contains("<li>Coal</li><li>Basalt</li>"));
    assert!(second.contains("<title>All Posts (Page 2)</title>"));

    let third = read(&out.join("page3").join("index.html"));
    assert!(third.contains("<li>Amber</li>"));
    assert!(third.contains("<nav>3/3</nav>"));

    assert!(!out.join("page1").exists());
    assert!(!out.join("page4").exists());
}

#[test]
fn test_posts_render_through_layout_chain() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    generate(dir.path());

    let emerald = read(
        &dir.path()
            .join("site")
            .join("posts")
            .join("emerald")
            .join("index.html"),
    );
    assert!(emerald.contains("<html><body><article>"));
    assert!(emerald.contains("<h1>Emerald</h1>"));
}

#[test]
fn test_date_archives() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    generate(dir.path());
    let posts = dir.path().join("site").join("posts");

    let year = read(&posts.join("2021").join("index.html"));
    assert!(year.contains("<title>2021</title>"));
    assert!(year.contains("<li>Emerald</li><li>Diamond</li>"));

    let month = read(&posts.join("2021").join("6").join("index.html"));
    assert!(month.contains("<title>June 2021</title>"));
    assert!(month.contains("Emerald"));
    assert!(!month.contains("Coal"));

    let day =
        read(&posts.join("2021").join("6").join("15").join("index.html"));
    assert!(day.contains("Emerald"));
    assert!(!day.contains("Diamond"));

    // 2021 has three posts: at two per page the year archive paginates.
    assert!(posts.join("2021").join("page2").join("index.html").exists());
    assert!(read(&posts.join("2021").join("page2").join("index.html"))
        .contains("<title>2021 (Page 2)</title>"));

    let old = read(&posts.join("2020").join("index.html"));
    assert!(old.contains("<li>Basalt</li><li>Amber</li>"));
}

#[test]
fn test_category_pages_and_feeds() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    generate(dir.path());
    let posts = dir.path().join("site").join("posts");

    let rust = read(&posts.join("rust").join("index.html"));
    assert!(rust.contains("<h1>Rust</h1>"));
    assert!(rust.contains("<li>Emerald</li><li>Diamond</li>"));

    let tools = read(&posts.join("tools").join("index.html"));
    assert!(tools.contains("<li>Diamond</li>"));
    assert!(!tools.contains("Emerald"));

    let feed = read(&posts.join("rust").join("feed.atom"));
    assert!(feed.contains("<entry>Emerald"));
    assert!(feed.contains("https://example.org/posts/emerald/"));
}

#[test]
fn test_site_feed_is_bounded_and_skips_drafts() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    generate(dir.path());

    let feed = read(&dir.path().join("site").join("feed.atom"));
    // Limit is per_page (2): only the two newest posts appear.
    assert!(feed.contains("Emerald"));
    assert!(feed.contains("Diamond"));
    assert!(!feed.contains("Coal"));
    assert!(!feed.contains("Unfinished"));

    // No `feeds/rss` template is registered, so the rss format is skipped
    // silently rather than failing the build.
    assert!(!dir.path().join("site").join("feed.rss").exists());
}

#[test]
fn test_drafts_are_not_published() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let site = generate(dir.path());

    assert_eq!(site.posts.len(), 5);
    assert!(!dir
        .path()
        .join("site")
        .join("posts")
        .join("unfinished")
        .exists());
}

#[test]
fn test_pages_mirror_source_tree() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    generate(dir.path());

    let about =
        read(&dir.path().join("site").join("docs").join("about.html"));
    assert!(about.contains("<main>"));
    assert!(about.contains("About the site"));
}

#[test]
fn test_assets_are_copied() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    generate(dir.path());

    assert_eq!(
        read(&dir.path().join("site").join("robots.txt")),
        "User-agent: *\n"
    );
}

fn tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            files.insert(
                entry
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned(),
                fs::read(entry.path()).unwrap(),
            );
        }
    }
    files
}

#[test]
fn test_generate_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let config =
        Config::from_project_file(&dir.path().join("halite.yaml"), None)
            .unwrap();
    let mut site = Site::new(config);

    site.generate().unwrap();
    let first = tree(&dir.path().join("site"));
    site.generate().unwrap();
    let second = tree(&dir.path().join("site"));

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_missing_nested_layout_fails_only_that_post() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    write(
        &dir.path().join("templates").join("broken.html"),
        "---\nlayout: ghost\n---\n{{.content}}",
    );
    write(
        &dir.path().join("posts").join("2021-07-01-cracked.md"),
        "---\ntitle: Cracked\nlayout: broken\n---\nBody\n",
    );

    let site = generate(dir.path());
    let out = dir.path().join("site").join("posts");

    assert!(!out.join("cracked").join("index.html").exists());
    assert!(out.join("emerald").join("index.html").exists());
    assert_eq!(site.errors.len(), 1);
    assert!(matches!(
        &site.errors[0],
        Error::Render { item, .. } if item == "cracked"
    ));
}

#[test]
fn test_unregistered_scope_layout_writes_no_pages_for_that_scope() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    fs::remove_file(dir.path().join("templates").join("posts.html")).unwrap();

    let site = generate(dir.path());
    let out = dir.path().join("site");

    // The whole main-listing scope is absent, first page included.
    assert!(!out.join("index.html").exists());
    assert!(!out.join("page2").exists());
    assert!(site.errors.iter().any(|err| matches!(
        err,
        Error::TemplateNotFound { layout } if layout == "posts"
    )));

    // Other scopes are untouched.
    assert!(out.join("posts").join("2021").join("index.html").exists());
    assert!(out.join("posts").join("rust").join("index.html").exists());
}

#[test]
fn test_empty_site_builds_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("halite.yaml"), "title: Empty\n");
    write(
        &dir.path().join("templates").join("posts.html"),
        "{{range .posts}}{{.title}}{{end}}",
    );

    let site = generate(dir.path());
    assert!(site.errors.is_empty(), "{:?}", site.errors);

    // No posts: no listing pages, no feed, no archives.
    let out = dir.path().join("site");
    assert!(out.is_dir());
    assert!(!out.join("index.html").exists());
    assert!(!out.join("feed.atom").exists());
}
