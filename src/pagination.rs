//! Splits an ordered collection into listing pages. Every listing scope (the
//! main post list, each archive bucket, each category) goes through
//! [`paginate`].
//!
//! The logical path segments of a scope are carried end-to-end: both the
//! output directory and the URL of each page are derived from the same
//! segment list, so the two can never drift apart. Page 1 lives at the
//! scope's own directory with no extra segment; page `k > 1` appends a
//! `page{k}` segment. That asymmetry keeps the canonical URL of a scope
//! stable no matter how many pages it spans.

/// One listing page: a slice of the scope's items plus the navigation
/// metadata and output location derived for it.
///
/// Invariants: `previous_url` is present iff `index > 1`; `next_url` is
/// present iff `index < total_pages`; `items` holds exactly `per_page` items
/// except possibly on the last page.
pub struct Pagination<'a, T> {
    /// 1-based page number.
    pub index: usize,

    pub total_pages: usize,
    pub total_items: usize,
    pub items: &'a [T],

    /// The scope's base URL: the URL of page 1.
    pub base_url: String,

    /// This page's own URL.
    pub url: String,

    pub previous_url: Option<String>,
    pub next_url: Option<String>,

    /// The output path segments for this page, relative to the output root.
    pub segments: Vec<String>,
}

/// Splits `items` into pages of `per_page`, rooted at `base_segments`. An
/// empty collection produces no pages at all — a scope with no posts emits
/// nothing rather than an empty listing.
pub fn paginate<'a, T>(
    items: &'a [T],
    per_page: usize,
    base_segments: &[String],
) -> Vec<Pagination<'a, T>> {
    let per_page = per_page.max(1);
    let total_pages = match items.len() % per_page {
        0 => items.len() / per_page,
        _ => items.len() / per_page + 1,
    };

    let base_url = url_for(base_segments);

    items
        .chunks(per_page)
        .enumerate()
        .map(|(chunk, slice)| {
            let index = chunk + 1;
            let mut segments = base_segments.to_vec();
            if index > 1 {
                segments.push(format!("page{}", index));
            }
            Pagination {
                index,
                total_pages,
                total_items: items.len(),
                items: slice,
                url: page_url(&base_url, index),
                previous_url: match index > 1 {
                    true => Some(page_url(&base_url, index - 1)),
                    false => None,
                },
                next_url: match index < total_pages {
                    true => Some(page_url(&base_url, index + 1)),
                    false => None,
                },
                base_url: base_url.clone(),
                segments,
            }
        })
        .collect()
}

/// The root-relative, trailing-slash-terminated URL for a segment list.
fn url_for(segments: &[String]) -> String {
    match segments.is_empty() {
        true => "/".to_owned(),
        false => format!("/{}/", segments.join("/")),
    }
}

fn page_url(base_url: &str, index: usize) -> String {
    match index {
        1 => base_url.to_owned(),
        _ => format!("{}page{}/", base_url, index),
    }
}
