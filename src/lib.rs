//! The library code for the `halite` static site generator. A build can be
//! generally broken down into three distinct steps:
//!
//! 1. Scanning source files into templates, posts, and pages
//!    ([`crate::scan`], [`crate::post`], [`crate::page`], [`crate::template`])
//! 2. Indexing the posts into date archives and categories
//!    ([`crate::archive`])
//! 3. Rendering everything into output files on disk ([`crate::site`])
//!
//! Of the three, the third step is the more involved. It is itself composed
//! of several sub-steps: rendering each post and page through its layout
//! chain, splitting every listing scope (all posts, each archive bucket, each
//! category) into groups of pages based on a configurable number of posts per
//! page ([`crate::pagination`]), and synthesizing a bounded feed page per
//! configured feed format ([`crate::feed`]).
//!
//! The first page of every listing scope lands at the scope's own directory
//! (`index.html`), while subsequent pages land in `page2/`, `page3/`, and so
//! on. Other components depend on this asymmetry for canonical URLs, so it is
//! load-bearing rather than cosmetic.
//!
//! Failures while rendering or writing a single item are collected on the
//! [`crate::site::Site`] rather than aborting the build; only a failure to
//! prepare the output directory is fatal.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod hook;
pub mod markdown;
pub mod page;
pub mod pagination;
pub mod post;
pub mod scan;
pub mod site;
pub mod template;
pub mod value;
pub mod write;
