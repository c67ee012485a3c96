//! Template rendering.
//!
//! Templates are plain text with `{{ key }}` placeholders. A placeholder is
//! replaced by the environment value under its lowercased key; unknown keys
//! are left in place, so a later pass (or the reader) can still see them.
//!
//! ## Layouts
//!
//! A theme provides four files under `themes/<theme>/templates/`:
//!
//! | file | used for |
//! |------|----------|
//! | `base.html` | page shell; `{{ content }}` is the page body |
//! | `single.html` | one record, composed into `base.html` |
//! | `list.html` | folder listing, composed into `base.html` |
//! | `summary.html` | one listing item |
//!
//! Missing files fall back to the built-in default theme, compiled into the
//! binary. `templates/<folder>/single.html` and `summary.html` override the
//! layout for one folder.
//!
//! ## Fragments
//!
//! Series navigation, chapter index, group headings and folder links are
//! generated with maud and handed to templates as ready-made HTML.

use crate::config::{Formatter, TemplateScope};
use crate::naming::{folder_title, sanitize_slug};
use crate::types::{ContentRecord, FieldValue, SeriesEntry};
use chrono::Datelike;
use maud::{PreEscaped, html};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Placeholder values, keyed by lowercase name.
pub type Environment = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("static asset copy failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Renders a named template against an environment.
pub trait Renderer {
    fn render(&self, template: &str, env: &Environment) -> Result<String, RenderError>;

    /// Template id for `layout` when rendering inside `folder`.
    fn layout_id(&self, _folder: &str, layout: &str) -> String {
        layout.to_string()
    }
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^}\s]+)\s*\}\}").expect("placeholder pattern must compile")
});
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("tag pattern must compile"));

/// Replace every `{{ key }}` in `text` with its environment value.
pub fn render_template(text: &str, env: &Environment) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            env.get(&caps[1].to_lowercase())
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Strip markup and keep the first `words` words.
pub fn truncate_words(html: &str, words: usize) -> String {
    MARKUP_TAG
        .replace_all(html, " ")
        .split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Themes
// =============================================================================

/// Template id of the bare page shell.
pub const PAGE: &str = "page";
/// Template id of a single record page.
pub const SINGLE: &str = "single";
/// Template id of a folder listing page.
pub const LIST: &str = "list";
/// Template id of one listing item.
pub const SUMMARY: &str = "summary";

const BUILTIN_THEME: &str = "default";

fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "base" => Some(include_str!("../themes/default/templates/base.html")),
        "single" => Some(include_str!("../themes/default/templates/single.html")),
        "list" => Some(include_str!("../themes/default/templates/list.html")),
        "summary" => Some(include_str!("../themes/default/templates/summary.html")),
        _ => None,
    }
}

const BUILTIN_STATIC: &[(&str, &str)] = &[(
    "css/style.css",
    include_str!("../themes/default/static/css/style.css"),
)];

/// A loaded theme: composed layouts keyed by template id.
#[derive(Debug, Clone)]
pub struct Theme {
    name: String,
    dir: PathBuf,
    templates: BTreeMap<String, String>,
}

impl Theme {
    /// Load `themes_root/<name>`, composing `single` and `list` into `base`.
    ///
    /// `folders` are checked for per-folder `single`/`summary` overrides.
    pub fn load(themes_root: &Path, name: &str, folders: &[String]) -> Result<Self, RenderError> {
        let dir = themes_root.join(name);
        if !dir.is_dir() && name != BUILTIN_THEME {
            warn!(theme = name, "theme not found, using the built-in default");
        }
        let templates_dir = dir.join("templates");

        let base = read_layout(&templates_dir, "base")?;
        let single = read_layout(&templates_dir, "single")?;
        let list = read_layout(&templates_dir, "list")?;
        let summary = read_layout(&templates_dir, "summary")?;

        let mut templates = BTreeMap::new();
        templates.insert(PAGE.to_string(), base.clone());
        templates.insert(SINGLE.to_string(), compose(&base, &single));
        templates.insert(LIST.to_string(), compose(&base, &list));
        templates.insert(SUMMARY.to_string(), summary);

        for folder in folders {
            let folder_dir = templates_dir.join(folder);
            if let Some(single) = read_optional(&folder_dir.join("single.html"))? {
                debug!(folder, "folder single layout");
                templates.insert(format!("{folder}/{SINGLE}"), compose(&base, &single));
            }
            if let Some(summary) = read_optional(&folder_dir.join("summary.html"))? {
                debug!(folder, "folder summary layout");
                templates.insert(format!("{folder}/{SUMMARY}"), summary);
            }
        }

        Ok(Self {
            name: name.to_string(),
            dir,
            templates,
        })
    }

    /// The built-in default theme with no disk overrides.
    #[cfg(test)]
    pub(crate) fn builtin() -> Self {
        let layout = |name: &str| builtin_template(name).unwrap_or_default().to_string();
        let base = layout("base");
        let mut templates = BTreeMap::new();
        templates.insert(SINGLE.to_string(), compose(&base, &layout("single")));
        templates.insert(LIST.to_string(), compose(&base, &layout("list")));
        templates.insert(SUMMARY.to_string(), layout("summary"));
        templates.insert(PAGE.to_string(), base);
        Self {
            name: BUILTIN_THEME.to_string(),
            dir: PathBuf::new(),
            templates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy the theme's `static/` tree into `output`.
    ///
    /// Themes without one get the built-in assets. Returns the number of
    /// files written.
    pub fn copy_static(&self, output: &Path) -> Result<usize, RenderError> {
        let static_dir = self.dir.join("static");
        let mut count = 0;
        if !self.dir.as_os_str().is_empty() && static_dir.is_dir() {
            for entry in WalkDir::new(&static_dir) {
                let entry = entry?;
                let Ok(relative) = entry.path().strip_prefix(&static_dir) else {
                    continue;
                };
                let target = output.join(relative);
                if entry.file_type().is_dir() {
                    fs::create_dir_all(&target)?;
                } else {
                    fs::copy(entry.path(), &target)?;
                    count += 1;
                }
            }
        } else {
            for (relative, text) in BUILTIN_STATIC {
                let target = output.join(relative);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, text)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

impl Renderer for Theme {
    fn render(&self, template: &str, env: &Environment) -> Result<String, RenderError> {
        let text = self
            .templates
            .get(template)
            .ok_or_else(|| RenderError::UnknownTemplate(template.to_string()))?;
        Ok(render_template(text, env))
    }

    /// Prefers a folder override when the theme has one.
    fn layout_id(&self, folder: &str, layout: &str) -> String {
        let folder_id = format!("{folder}/{layout}");
        if self.templates.contains_key(&folder_id) {
            folder_id
        } else {
            layout.to_string()
        }
    }
}

fn read_layout(templates_dir: &Path, name: &str) -> Result<String, RenderError> {
    match read_optional(&templates_dir.join(format!("{name}.html")))? {
        Some(text) => Ok(text),
        None => builtin_template(name)
            .map(str::to_string)
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string())),
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, RenderError> {
    if path.is_file() {
        Ok(Some(fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}

/// Insert `inner` as the `{{ content }}` of `base`, leaving other
/// placeholders for the page render.
fn compose(base: &str, inner: &str) -> String {
    let env = Environment::from([("content".to_string(), inner.to_string())]);
    render_template(base, &env)
}

// =============================================================================
// Environments
// =============================================================================

const DEFAULT_SEPARATOR: &str = ", ";

/// Site-wide values: lowercased `params` plus `current_year`.
pub fn site_environment(params: &BTreeMap<String, String>) -> Environment {
    let mut env: Environment = params
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();
    env.insert("current_year".into(), chrono::Utc::now().year().to_string());
    env
}

/// Environment for rendering one record.
///
/// Starts from `base`, then adds every record field formatted through the
/// formatters active for `scope`. `series` defaults to empty; `series_nav`
/// and `chapter_index` carry the maud fragments.
pub fn record_environment(
    record: &ContentRecord,
    base: &Environment,
    formatters: &[Formatter],
    scope: TemplateScope,
) -> Environment {
    let active: BTreeMap<&str, &Formatter> = formatters
        .iter()
        .filter(|f| !f.key.is_empty())
        .filter(|f| f.template == TemplateScope::All || f.template == scope)
        .map(|f| (f.key.as_str(), f))
        .collect();
    let format = |key: &str, value: &FieldValue| format_field(value, active.get(key).copied());

    let mut env = base.clone();
    env.insert("series".into(), String::new());
    env.insert("title".into(), record.display_title().to_string());

    let typed = [
        ("slug", record.slug.clone()),
        ("date", record.date.clone().unwrap_or_default()),
        ("content", record.content.clone()),
        ("content_type", record.content_type.clone()),
        ("folder", record.folder.clone()),
        ("uri", record.uri.clone()),
        ("rfc_2822_date", record.rfc_2822_date.clone().unwrap_or_default()),
        ("md5", record.md5.clone().unwrap_or_default()),
    ];
    for (key, value) in typed {
        env.insert(key.to_string(), format(key, &FieldValue::Text(value)));
    }
    for (key, value) in &record.fields {
        let key = key.to_lowercase();
        let formatted = format(&key, value);
        env.insert(key, formatted);
    }

    let base_path = base.get("base_path").map_or("", String::as_str);
    env.insert("series_nav".into(), series_nav(record, base_path));
    env.insert("chapter_index".into(), chapter_index(record));
    env
}

/// Render one field value for a template.
///
/// Lists are joined with the formatter's separator (`, ` without one) and
/// the optional wrapper is applied to the joined text.
pub fn format_field(value: &FieldValue, formatter: Option<&Formatter>) -> String {
    let format = formatter.map(|f| f.format.as_str());
    let separator = formatter.map_or(DEFAULT_SEPARATOR, |f| f.separator.as_str());
    let item = |text: &str| format.map_or_else(|| text.to_string(), |f| f.replace("{}", text));

    let joined = match value {
        FieldValue::Text(text) => item(text),
        FieldValue::List(items) => items
            .iter()
            .map(|i| item(i))
            .collect::<Vec<_>>()
            .join(separator),
        FieldValue::Series(entries) => entries
            .iter()
            .map(|e| format_series_entry(format.unwrap_or("{title}"), e))
            .collect::<Vec<_>>()
            .join(separator),
    };

    match formatter.and_then(|f| f.wrapper.as_deref()) {
        Some(wrapper) => wrapper.replace("{}", &joined),
        None => joined,
    }
}

fn format_series_entry(format: &str, entry: &SeriesEntry) -> String {
    format
        .replace("{title}", &entry.title)
        .replace("{index}", &entry.index)
        .replace("{}", &entry.title)
}

// =============================================================================
// Fragments
// =============================================================================

/// Previous/next links for each series the record belongs to.
pub fn series_nav(record: &ContentRecord, base_path: &str) -> String {
    let entries = record.series();
    if entries.is_empty() {
        return String::new();
    }
    html! {
        @for entry in entries {
            nav.series-nav {
                span.series-prev {
                    @if let Some(prev) = &entry.prev {
                        a href={ (base_path) "/" (prev.uri) } rel="prev" { "← " (prev.title) }
                    }
                }
                span.series-part { "Part " (entry.index) " of " (entry.title) }
                span.series-next {
                    @if let Some(next) = &entry.next {
                        a href={ (base_path) "/" (next.uri) } rel="next" { (next.title) " →" }
                    }
                }
            }
        }
    }
    .into_string()
}

/// Chapter titles and summaries of a multi-chapter work.
pub fn chapter_index(record: &ContentRecord) -> String {
    if record.chapters.len() < 2 {
        return String::new();
    }
    html! {
        ol.chapter-index {
            @for (n, chapter) in record.chapters.iter().enumerate() {
                li {
                    span.chapter-title {
                        @match &chapter.title {
                            Some(title) => { (title) }
                            None => { "Chapter " (n + 1) }
                        }
                    }
                    @if let Some(summary) = &chapter.summary {
                        div.chapter-summary { (PreEscaped(summary)) }
                    }
                }
            }
        }
    }
    .into_string()
}

/// Heading for a group node; depth 1 is `h2`, capped at `h6`.
pub fn group_heading(key: &str, depth: usize) -> String {
    let id = sanitize_slug(key);
    let class = format!("group-heading depth-{depth}");
    let markup = match depth {
        0 | 1 => html! { h2 id=(id) class=(class) { (key) } },
        2 => html! { h3 id=(id) class=(class) { (key) } },
        3 => html! { h4 id=(id) class=(class) { (key) } },
        4 => html! { h5 id=(id) class=(class) { (key) } },
        _ => html! { h6 id=(id) class=(class) { (key) } },
    };
    markup.into_string()
}

/// Space-separated links to every content folder.
pub fn folder_links(folders: &[String], base_path: &str) -> String {
    html! {
        @for (i, folder) in folders.iter().enumerate() {
            @if i > 0 { " " }
            a href={ (base_path) "/" (folder) "/" } { (folder_title(folder)) }
        }
    }
    .into_string()
}
