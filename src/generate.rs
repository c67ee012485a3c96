//! Site assembly.
//!
//! Takes the discovered content tree and writes the final static site:
//! every source becomes a page, every folder gets a listing.
//!
//! ## Generated Pages
//!
//! - **Home page** (`/index.html`): from `content/_index.*`
//! - **Root pages** (`/{slug}/index.html`): sources directly under `content/`
//! - **Record pages**: each folder source, at its rendered permalink
//! - **Folder listings** (`/{folder}/index.html`): sorted, optionally grouped
//!
//! ## Per-Folder Pipeline
//!
//! ```text
//! extract ─→ locate (uri, dst_path) ─→ duplicate policy ─→ link series
//!         ─→ render + write pages (md5) ─→ order_by ─→ series sort
//!         ─→ fandom pre-pass + group ─→ render + write listing
//! ```
//!
//! Series links and `uri`s are final before anything is rendered. A source
//! that fails to extract is skipped with a warning and reported; it never
//! stops the build.
//!
//! ## Output Structure
//!
//! ```text
//! _site/
//! ├── index.html                 # Home page
//! ├── css/style.css              # Theme static assets
//! ├── about/index.html           # Root page
//! ├── blog/
//! │   ├── index.html             # Listing
//! │   ├── a/index.html           # Record pages (permalink "{{ folder }}/{{ slug }}/")
//! │   └── b/index.html
//! └── works/
//!     └── ...
//! ```

use crate::config::{self, ConfigError, DuplicatePolicy, SiteConfig, TemplateScope};
use crate::extract::{self, ExtractError, tagged};
use crate::group::{group_fandoms, group_recursive, order_records};
use crate::naming::folder_title;
use crate::render::{
    self, Environment, LIST, PAGE, RenderError, Renderer, SINGLE, SUMMARY, Theme,
    folder_links, group_heading, record_environment, render_template, truncate_words,
};
use crate::scan::{self, ContentTree, Folder, ScanError};
use crate::series::{link_series, series_sort};
use crate::types::ContentRecord;
use md5::{Digest, Md5};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Duplicate output path {} in folder '{folder}' (slug '{slug}')", .path.display())]
    DuplicateSlug {
        folder: String,
        slug: String,
        path: PathBuf,
    },
}

/// Where to read content and themes from, and where to write the site.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub source: PathBuf,
    pub output: PathBuf,
    pub themes: PathBuf,
}

/// A source that could not be extracted.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of building one folder.
#[derive(Debug, Serialize)]
pub struct FolderReport {
    pub name: String,
    /// Written records in source order, with `md5` and series links attached.
    pub records: Vec<ContentRecord>,
    /// Listed records in listing order, before grouping.
    pub listing: Vec<ContentRecord>,
    /// Group headings emitted on the listing page.
    pub headings: usize,
    pub list_path: PathBuf,
    pub skipped: Vec<SkippedFile>,
}

/// Result of a full build.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub output: PathBuf,
    /// Home page and root pages.
    pub pages: Vec<ContentRecord>,
    pub folders: Vec<FolderReport>,
    /// Root-level sources that could not be extracted.
    pub skipped: Vec<SkippedFile>,
    pub static_files: usize,
}

/// Result of a check: what a build would produce, without writing.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub source: PathBuf,
    pub pages: usize,
    pub folders: Vec<FolderCheck>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Serialize)]
pub struct FolderCheck {
    pub name: String,
    pub records: usize,
    pub unlisted: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Build the whole site.
///
/// With `clean`, the output directory is removed first.
pub fn build_site(paths: &SitePaths, clean: bool) -> Result<BuildReport, GenerateError> {
    let tree = scan::scan(&paths.source)?;
    debug!(
        folders = tree.folders.len(),
        sources = tree.source_count(),
        "scanned content"
    );
    let root_value = config::load_root_value(&paths.source)?;
    let root_config = config::resolve_config(root_value.clone(), None)?;

    if clean && paths.output.exists() {
        info!(output = %paths.output.display(), "cleaning output directory");
        fs::remove_dir_all(&paths.output)?;
    }
    fs::create_dir_all(&paths.output)?;

    let folder_names = tree.folder_names();
    let theme = Theme::load(&paths.themes, &root_config.theme, &folder_names)?;
    let static_files = theme.copy_static(&paths.output)?;
    debug!(theme = theme.name(), static_files, "theme loaded");

    let site_env = site_environment(&root_config, &folder_names);

    let (pages, skipped) = build_pages(&tree, &root_config, &theme, &site_env, &paths.output)?;

    let mut folders = Vec::with_capacity(tree.folders.len());
    for folder in &tree.folders {
        let folder_config = config::load_folder_config(&root_value, &folder.path)?;
        folders.push(build_folder(
            folder,
            &folder_config,
            &theme,
            &site_env,
            &paths.output,
        )?);
    }

    Ok(BuildReport {
        output: paths.output.clone(),
        pages,
        folders,
        skipped,
        static_files,
    })
}

/// Extract everything and apply the duplicate policy, writing nothing.
pub fn check_site(source: &Path) -> Result<CheckReport, GenerateError> {
    let tree = scan::scan(source)?;
    let root_value = config::load_root_value(source)?;
    let root_config = config::resolve_config(root_value.clone(), None)?;

    let root_sources: Vec<PathBuf> = tree.home.iter().chain(&tree.pages).cloned().collect();
    let (pages, skipped) = extract_all(&root_sources, &root_config, "");

    let mut folders = Vec::with_capacity(tree.folders.len());
    for folder in &tree.folders {
        let folder_config = config::load_folder_config(&root_value, &folder.path)?;
        let (mut records, skipped) = extract_all(&folder.sources, &folder_config, &folder.name);
        for record in &mut records {
            locate(record, &folder_config, Path::new(""));
        }
        let records = apply_duplicate_policy(records, folder_config.duplicate_slugs, &folder.name)?;
        folders.push(FolderCheck {
            name: folder.name.clone(),
            records: records.len(),
            unlisted: records.iter().filter(|r| !r.is_listed()).count(),
            skipped,
        });
    }

    Ok(CheckReport {
        source: source.to_path_buf(),
        pages: pages.len(),
        folders,
        skipped,
    })
}

/// Site parameters, `current_year` and `folder_links`.
fn site_environment(config: &SiteConfig, folder_names: &[String]) -> Environment {
    let mut env = render::site_environment(&config.params);
    let base_path = env.get("base_path").cloned().unwrap_or_default();
    env.insert("folder_links".into(), folder_links(folder_names, &base_path));
    env
}

// =============================================================================
// Pages
// =============================================================================

/// Home page and root pages, rendered with the bare page layout.
fn build_pages(
    tree: &ContentTree,
    config: &SiteConfig,
    renderer: &impl Renderer,
    env: &Environment,
    output: &Path,
) -> Result<(Vec<ContentRecord>, Vec<SkippedFile>), GenerateError> {
    let mut pages = Vec::new();
    let mut skipped = Vec::new();

    if let Some(home) = &tree.home {
        match extract::extract(home, config, "") {
            Ok(mut record) => {
                record.uri = String::new();
                record.dst_path = output.join("index.html");
                pages.push(record);
            }
            Err(e) => skipped.push(skip(home, &e)),
        }
    }

    let (root_pages, root_skipped) = extract_all(&tree.pages, config, "");
    skipped.extend(root_skipped);
    for mut record in root_pages {
        let dir = clean_segments(&record.slug);
        record.uri = format!("{dir}/");
        record.dst_path = output.join(&dir).join("index.html");
        pages.push(record);
    }

    for record in &mut pages {
        write_record(record, config, renderer, env, PAGE)?;
    }
    Ok((pages, skipped))
}

// =============================================================================
// Folders
// =============================================================================

fn build_folder(
    folder: &Folder,
    config: &SiteConfig,
    renderer: &impl Renderer,
    site_env: &Environment,
    output: &Path,
) -> Result<FolderReport, GenerateError> {
    let env = folder_environment(folder, config, site_env)?;

    let (mut records, skipped) = extract_all(&folder.sources, config, &folder.name);
    for record in &mut records {
        locate(record, config, output);
    }
    let mut records = apply_duplicate_policy(records, config.duplicate_slugs, &folder.name)?;
    link_series(&mut records);

    let single = renderer.layout_id(&folder.name, SINGLE);
    for record in &mut records {
        write_record(record, config, renderer, &env, &single)?;
    }

    let mut listing: Vec<ContentRecord> = records.iter().filter(|r| r.is_listed()).cloned().collect();
    order_records(&mut listing, &config.listing.order_by);
    if config.listing.series_sort {
        listing = series_sort(listing);
    }

    let (body, headings) = render_listing(&listing, &folder.name, config, renderer, &env)?;
    let mut list_env = env.clone();
    list_env.insert("content".into(), body);
    let list_path = output.join(&folder.name).join("index.html");
    write_file(&list_path, &renderer.render(LIST, &list_env)?)?;

    info!(
        folder = %folder.name,
        records = records.len(),
        listed = listing.len(),
        skipped = skipped.len(),
        "built folder"
    );

    Ok(FolderReport {
        name: folder.name.clone(),
        records,
        listing,
        headings,
        list_path,
        skipped,
    })
}

/// Site environment plus folder params, `title`, `path` and `_index` headers.
fn folder_environment(
    folder: &Folder,
    config: &SiteConfig,
    site_env: &Environment,
) -> Result<Environment, GenerateError> {
    let mut env = site_env.clone();
    for (key, value) in &config.params {
        env.insert(key.to_lowercase(), value.clone());
    }
    env.insert("folder".into(), folder.name.clone());
    env.insert("path".into(), folder.name.clone());
    env.insert("title".into(), folder_title(&folder.name));

    if let Some(index) = &folder.index {
        let text = fs::read_to_string(index)?;
        let (headers, _) = tagged::read_headers(&text);
        for (key, value) in headers {
            env.insert(key.to_lowercase(), value);
        }
    }
    Ok(env)
}

/// Extract every source, collecting the ones that fail.
fn extract_all(
    sources: &[PathBuf],
    config: &SiteConfig,
    folder: &str,
) -> (Vec<ContentRecord>, Vec<SkippedFile>) {
    let mut records = Vec::with_capacity(sources.len());
    let mut skipped = Vec::new();
    for source in sources {
        match extract::extract(source, config, folder) {
            Ok(record) => records.push(record),
            Err(e) => skipped.push(skip(source, &e)),
        }
    }
    (records, skipped)
}

fn skip(path: &Path, error: &ExtractError) -> SkippedFile {
    warn!(path = %path.display(), error = %error, "skipping source");
    SkippedFile {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

/// Compute `uri` and `dst_path` from the permalink pattern.
///
/// A `uri` ending in `/` (or empty) is written as `index.html` inside it.
fn locate(record: &mut ContentRecord, config: &SiteConfig, output: &Path) {
    let env = location_environment(record);
    let rendered = render_template(&config.permalink, &env);
    if rendered.contains("{{") {
        warn!(slug = %record.slug, permalink = %config.permalink, "permalink has unresolved placeholders");
    }
    let uri = clean_segments(&rendered);
    let is_dir = rendered.ends_with('/') || uri.is_empty();

    record.dst_path = if is_dir {
        output.join(&uri).join("index.html")
    } else {
        output.join(&uri)
    };
    record.uri = if is_dir && !uri.is_empty() {
        format!("{uri}/")
    } else {
        uri
    };
}

/// Join the non-empty path segments, dropping `.` and `..` so header
/// values cannot point outside the output directory.
fn clean_segments(path: &str) -> String {
    path.split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}

/// Values a permalink pattern can use.
fn location_environment(record: &ContentRecord) -> Environment {
    let mut env = Environment::new();
    for (key, value) in &record.fields {
        if let Some(text) = value.as_text() {
            env.insert(key.to_lowercase(), text.to_string());
        }
    }
    env.insert("slug".into(), record.slug.clone());
    env.insert("folder".into(), record.folder.clone());
    env.insert("content_type".into(), record.content_type.clone());
    if let Some(date) = &record.date {
        env.insert("date".into(), date.clone());
        let mut parts = date.splitn(3, '-');
        for key in ["year", "month", "day"] {
            if let Some(part) = parts.next() {
                env.insert(key.into(), part.to_string());
            }
        }
    }
    env
}

/// Resolve records of one folder that land on the same `dst_path`.
///
/// Records must be located first. Under [`DuplicatePolicy::Warn`] the later
/// record wins and the earlier one is dropped. Under
/// [`DuplicatePolicy::Error`] the folder fails.
fn apply_duplicate_policy(
    records: Vec<ContentRecord>,
    policy: DuplicatePolicy,
    folder: &str,
) -> Result<Vec<ContentRecord>, GenerateError> {
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    let mut kept: Vec<Option<ContentRecord>> = Vec::with_capacity(records.len());

    for record in records {
        if let Some(&earlier) = seen.get(&record.dst_path) {
            match policy {
                DuplicatePolicy::Error => {
                    return Err(GenerateError::DuplicateSlug {
                        folder: folder.to_string(),
                        slug: record.slug,
                        path: record.dst_path,
                    });
                }
                DuplicatePolicy::Warn => {
                    warn!(
                        folder,
                        slug = %record.slug,
                        path = %record.dst_path.display(),
                        "duplicate output path, later source wins"
                    );
                    kept[earlier] = None;
                }
            }
        }
        seen.insert(record.dst_path.clone(), kept.len());
        kept.push(Some(record));
    }
    Ok(kept.into_iter().flatten().collect())
}

/// Render one record with `layout`, write it, and attach its `md5`.
///
/// With `render = true` placeholders inside the content are expanded first
/// and the expanded content is kept on the record.
fn write_record(
    record: &mut ContentRecord,
    config: &SiteConfig,
    renderer: &impl Renderer,
    env: &Environment,
    layout: &str,
) -> Result<(), GenerateError> {
    let mut record_env = record_environment(record, env, &config.formatters, TemplateScope::Single);
    if config.render {
        let expanded = render_template(&record.content, &record_env);
        record_env.insert("content".into(), expanded.clone());
        record.content = expanded;
    }

    let html = renderer.render(layout, &record_env)?;
    record.md5 = Some(format!("{:x}", Md5::digest(html.as_bytes())));
    write_file(&record.dst_path, &html)?;
    debug!(slug = %record.slug, dst = %record.dst_path.display(), "wrote page");
    Ok(())
}

/// Listing body: group headings and rendered summaries.
///
/// Returns the body and the number of headings emitted.
fn render_listing(
    listing: &[ContentRecord],
    folder: &str,
    config: &SiteConfig,
    renderer: &impl Renderer,
    env: &Environment,
) -> Result<(String, usize), GenerateError> {
    let summary = renderer.layout_id(folder, SUMMARY);
    let render_item = |record: &ContentRecord| -> Result<String, GenerateError> {
        let mut item_env = record_environment(record, env, &config.formatters, TemplateScope::Summary);
        if !record.fields.contains_key("summary") {
            item_env.insert(
                "summary".into(),
                truncate_words(&record.content, config.listing.summary_words),
            );
        }
        Ok(renderer.render(&summary, &item_env)?)
    };

    let group_by = &config.listing.group_by;
    let mut items = Vec::new();
    let mut headings = 0;

    if group_by.is_empty() {
        for record in listing {
            items.push(render_item(record)?);
        }
        return Ok((items.join("\n"), headings));
    }

    let fandom_attribute = &config.listing.fandom_attribute;
    let prepared = if group_by.contains(fandom_attribute) {
        group_fandoms(listing, fandom_attribute, &config.taxonomy.fandom_groups)
    } else {
        listing.to_vec()
    };

    for node in group_recursive(&prepared, group_by, 0) {
        if !node.key.is_empty() {
            items.push(group_heading(&node.key, node.depth));
            headings += 1;
        }
        for record in &node.records {
            items.push(render_item(record)?);
        }
    }
    Ok((items.join("\n"), headings))
}

fn write_file(path: &Path, text: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}
