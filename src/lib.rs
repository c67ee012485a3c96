//! # makesite
//!
//! A small static site generator for blogs and archive-exported fiction
//! collections. The content directory is the data source: each top-level
//! folder becomes a section with a listing page, each source file becomes a
//! page, and the listing can be sorted, grouped by any attribute, and
//! threaded into series.
//!
//! # Pipeline
//!
//! ```text
//! scan      content/ → ContentTree          (which files exist)
//! extract   file     → ContentRecord        (headers, archive tags, chapters)
//! group     records  → Vec<GroupNode>       (flatten, sort, partition)
//! series    records  → prev/next links
//! generate  records  → _site/               (render + write, md5 per page)
//! ```
//!
//! Everything up to `generate` is pure over in-memory records, so the
//! ordering, grouping and series logic is tested without touching the disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the content root: home page, root pages, folders, sources |
//! | [`extract`] | One source file → one [`types::ContentRecord`]; tagged documents and archive HTML |
//! | [`tags`] | Taxonomy label classification: media, excluded, merged |
//! | [`flatten`] | Explodes a multi-valued attribute into one record per value |
//! | [`group`] | `order_by` sorting, fandom collapsing, recursive grouping |
//! | [`series`] | Series prev/next linking and series-aware ordering |
//! | [`render`] | Renderer trait, placeholder templates, themes, HTML fragments |
//! | [`generate`] | Orchestrates the build and writes the site |
//! | [`config`] | Layered `config.toml` / `params.json` loading and validation |
//! | [`naming`] | `YYYY-MM-DD-slug.ext` file name convention |
//! | [`types`] | Shared record types and the `Groupable` attribute seam |
//! | [`output`] | CLI output formatting for build and check reports |
//!
//! # Design Decisions
//!
//! ## Typed Fields Plus an Open Map
//!
//! Sources declare arbitrary keys (`<!-- mood: tired -->`, archive tag
//! lists), so a record keeps its fixed fields typed and everything else in a
//! `BTreeMap<String, FieldValue>`. Grouping and sorting only ever see an
//! attribute through [`types::Groupable::value_at`], which reports its shape
//! (absent, scalar, sequence, series list) rather than its Rust type.
//!
//! ## Grouping Is a Flat Pre-Order Sequence
//!
//! [`group::group_recursive`] returns headings and leaf runs as one flat list
//! annotated with depth. A listing template walks it once; nothing has to
//! recurse at render time.
//!
//! ## Config Cascading (Root → Folder)
//!
//! ```text
//! stock defaults
//! content/config.toml          ← root (overrides stock defaults)
//! content/works/config.toml    ← folder (overrides root)
//! ```
//!
//! The merge happens on raw TOML values before deserialization, so a folder
//! file only needs the keys it changes.
//!
//! ## Optional Parsers
//!
//! Markdown (`pulldown-cmark`) and archive HTML (`scraper`) sit behind the
//! `markdown` and `archive-html` features. Without them the affected sources
//! are still built, unconverted, with a warning.

pub mod config;
pub mod extract;
pub mod flatten;
pub mod generate;
pub mod group;
pub mod naming;
pub mod output;
pub mod render;
pub mod scan;
pub mod series;
pub mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
