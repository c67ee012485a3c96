//! Site configuration module.
//!
//! Handles loading, validating, and merging site configuration. Configuration
//! is layered: stock defaults are overridden by the content root's config
//! file, which is in turn overridden by a config file inside a content folder
//! for that folder only.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Root config (overrides stock defaults)
//! ├── blog/
//! │   └── ...
//! └── works/
//!     ├── config.toml          # Folder config (overrides root, for works/ only)
//!     └── ...
//! ```
//!
//! A `params.json` with the same schema is accepted wherever `config.toml`
//! is; when both exist the TOML file wins.
//!
//! ## Configuration Options
//!
//! ```toml
//! theme = "default"                     # themes/<theme>/ (built-in if missing)
//! render = true                         # expand {{ placeholders }} inside content
//! permalink = "{{ folder }}/{{ slug }}/" # output location of each record
//! content_type = "page"                 # default for records without one
//! duplicate_slugs = "warn"              # or "error"
//!
//! [params]                              # free-form template parameters
//! subtitle = "Site Title"
//! author = "Author"
//! site_url = "http://localhost:8000"
//! base_path = ""
//!
//! [taxonomy]
//! media_tags = ["Podfic", "Fanart"]
//! media_type_default = "Fic"
//! excluded_tags = ["Angst"]
//! merge_tags = [["Fluff", "Tooth-Rotting Fluff"]]
//! fandom_groups = [["Marvel", "Iron Man (Movies)", "Avengers (Marvel Movies)"]]
//! exclude_series = ["Drabble Collection"]
//!
//! [listing]
//! order_by = [["date", true], ["title", false]]
//! group_by = ["fandom", "subfandom", "series"]
//! series_sort = false
//! fandom_attribute = "fandom"
//! summary_words = 25
//!
//! [field_aliases]
//! Fandoms = "Fandom"
//!
//! [[formatters]]
//! key = "series"
//! format = "{title} (part {index})"
//! separator = " / "
//! template = "summary"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml` or `params.json`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Free-form template parameters available to every template.
    pub params: BTreeMap<String, String>,
    /// Theme directory name under the themes root.
    pub theme: String,
    /// Expand `{{ key }}` placeholders inside record content before layout.
    pub render: bool,
    /// Output location pattern, relative to the output root.
    pub permalink: String,
    /// `content_type` for records that do not declare one.
    pub content_type: String,
    /// What to do when two records in a folder resolve to the same output.
    pub duplicate_slugs: DuplicatePolicy,
    /// Tag classification and merging rules.
    pub taxonomy: TagTaxonomy,
    /// Sorting and grouping of folder listings.
    pub listing: ListingConfig,
    /// Archive tag-list terms renamed before storage (matched case-insensitively).
    pub field_aliases: BTreeMap<String, String>,
    /// Per-field display formatting applied when building template environments.
    pub formatters: Vec<Formatter>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            params: default_params(),
            theme: "default".to_string(),
            render: true,
            permalink: "{{ folder }}/{{ slug }}/".to_string(),
            content_type: "page".to_string(),
            duplicate_slugs: DuplicatePolicy::default(),
            taxonomy: TagTaxonomy::default(),
            listing: ListingConfig::default(),
            field_aliases: default_field_aliases(),
            formatters: Vec::new(),
        }
    }
}

fn default_params() -> BTreeMap<String, String> {
    [
        ("subtitle", "Site Title"),
        ("author", "Author"),
        ("site_url", "http://localhost:8000"),
        ("base_path", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_field_aliases() -> BTreeMap<String, String> {
    [
        ("Fandoms", "Fandom"),
        ("Categories", "Category"),
        ("Relationships", "Relationship"),
        ("Characters", "Character"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.permalink.trim().is_empty() {
            return Err(ConfigError::Validation("permalink must not be empty".into()));
        }
        if self.content_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_type must not be empty".into(),
            ));
        }
        if self.listing.summary_words == 0 {
            return Err(ConfigError::Validation(
                "listing.summary_words must be at least 1".into(),
            ));
        }
        if self
            .listing
            .order_by
            .iter()
            .any(|key| key.attribute.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "listing.order_by attributes must not be empty".into(),
            ));
        }
        if self.listing.group_by.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "listing.group_by attributes must not be empty".into(),
            ));
        }
        if self.taxonomy.merge_tags.iter().any(Vec::is_empty) {
            return Err(ConfigError::Validation(
                "taxonomy.merge_tags groups must not be empty".into(),
            ));
        }
        if self.taxonomy.fandom_groups.iter().any(Vec::is_empty) {
            return Err(ConfigError::Validation(
                "taxonomy.fandom_groups groups must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Policy for two records of one folder landing on the same output path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Log a warning; the file processed last overwrites the earlier output.
    #[default]
    Warn,
    /// Abort the folder with an error.
    Error,
}

/// Tag taxonomy: how free-form archive tags are classified and merged.
///
/// All label matching is case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagTaxonomy {
    /// Labels routed into `media_type` instead of the general tag list.
    pub media_tags: Vec<String>,
    /// `media_type` for works that carry none of the media tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type_default: Option<String>,
    /// Labels dropped entirely.
    pub excluded_tags: Vec<String>,
    /// Synonym groups; every member is replaced by the group's first element.
    pub merge_tags: Vec<Vec<String>>,
    /// Alias groups; members are listed under the first element, keeping the
    /// original label as a sub-attribute.
    pub fandom_groups: Vec<Vec<String>>,
    /// Series titles never recorded on a work.
    pub exclude_series: Vec<String>,
}

/// Listing settings for folder index pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Sort keys, highest priority first.
    #[serde(deserialize_with = "deserialize_order_by")]
    pub order_by: Vec<OrderKey>,
    /// Attributes for recursive grouping, outermost first. Empty = flat list.
    pub group_by: Vec<String>,
    /// Gather series members together, ordered by their index.
    pub series_sort: bool,
    /// Attribute rewritten by `taxonomy.fandom_groups` before grouping.
    pub fandom_attribute: String,
    /// Word count for summaries derived from content.
    pub summary_words: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            order_by: vec![OrderKey::descending("date")],
            group_by: Vec::new(),
            series_sort: false,
            fandom_attribute: "fandom".to_string(),
            summary_words: 25,
        }
    }
}

/// One `order_by` entry: `["attribute", descending]`.
///
/// Accepted spellings: `"date"`, `["date"]`, `["date", true]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub attribute: String,
    pub descending: bool,
}

impl OrderKey {
    pub fn ascending(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            descending: false,
        }
    }

    pub fn descending(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            descending: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOrderKey {
    Pair(String, bool),
    Single((String,)),
    Name(String),
}

impl From<RawOrderKey> for OrderKey {
    fn from(raw: RawOrderKey) -> Self {
        match raw {
            RawOrderKey::Pair(attribute, descending) => Self {
                attribute,
                descending,
            },
            RawOrderKey::Single((attribute,)) | RawOrderKey::Name(attribute) => Self {
                attribute,
                descending: false,
            },
        }
    }
}

impl<'de> Deserialize<'de> for OrderKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawOrderKey::deserialize(deserializer).map(Into::into)
    }
}

impl Serialize for OrderKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.attribute, self.descending).serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOrderBy {
    One(OrderKey),
    Many(Vec<OrderKey>),
}

/// `order_by` is either a single key or a list of keys.
fn deserialize_order_by<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<OrderKey>, D::Error> {
    Ok(match RawOrderBy::deserialize(deserializer)? {
        RawOrderBy::One(key) => vec![key],
        RawOrderBy::Many(keys) => keys,
    })
}

/// Display formatting for one record field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Formatter {
    /// Field the formatter applies to (folded key, e.g. `series`).
    pub key: String,
    /// Per-item format. `{}` is the value; series entries expose `{title}`
    /// and `{index}` (`{}` is the title).
    pub format: String,
    /// Format wrapped around the joined value (`{}` is the joined text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<String>,
    /// Separator between list items.
    pub separator: String,
    /// Which templates the formatter is active for.
    pub template: TemplateScope,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            key: String::new(),
            format: "{}".to_string(),
            wrapper: None,
            separator: ", ".to_string(),
            template: TemplateScope::All,
        }
    }
}

/// Templates a [`Formatter`] is active for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateScope {
    #[default]
    All,
    Single,
    Summary,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load the config file of a directory as a raw value tree.
///
/// Looks for `config.toml`, then `params.json`. Returns `Ok(None)` if
/// neither exists and `Err` if the file exists but does not parse.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let toml_path = dir.join("config.toml");
    if toml_path.is_file() {
        let content = fs::read_to_string(&toml_path)?;
        let value: toml::Value = toml::from_str(&content)?;
        return Ok(Some(value));
    }
    let json_path = dir.join("params.json");
    if json_path.is_file() {
        let content = fs::read_to_string(&json_path)?;
        let value: toml::Value = serde_json::from_str(&content)?;
        return Ok(Some(value));
    }
    Ok(None)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
///
/// Used to resolve a fully-merged config at any level of the content tree.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Stock defaults with the content root's config file merged on top.
///
/// Kept as a raw value so folder configs can be layered over it.
pub fn load_root_value(root: &Path) -> Result<toml::Value, ConfigError> {
    let base = stock_defaults_value();
    Ok(match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    })
}

/// Load config for the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
#[cfg(test)]
pub(crate) fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_root_value(root)?, None)
}

/// Resolve the config of one content folder on top of the root value.
pub fn load_folder_config(root_value: &toml::Value, dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(root_value.clone(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# makesite configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Config files can be placed at two levels:
#   content/config.toml        -> root (overrides stock defaults)
#   content/works/config.toml  -> folder (overrides root, for works/ only)
#
# Each level only needs the keys it wants to override.
# Unknown keys will cause an error.

# Theme directory under the themes root. The built-in theme is used for any
# template the directory does not provide.
theme = "default"

# Expand {{ placeholders }} inside content before it is placed in a layout.
render = true

# Output location of every record, relative to the output directory.
# Available: {{ folder }}, {{ slug }}, {{ date }} and any record field.
permalink = "{{ folder }}/{{ slug }}/"

# content_type for records that do not declare one in their headers.
content_type = "page"

# Two records resolving to the same output path: "warn" (last one wins)
# or "error" (abort the folder).
duplicate_slugs = "warn"

# ---------------------------------------------------------------------------
# Template parameters (any string key is allowed)
# ---------------------------------------------------------------------------
[params]
subtitle = "Site Title"
author = "Author"
site_url = "http://localhost:8000"
base_path = ""

# ---------------------------------------------------------------------------
# Tag taxonomy for archive-exported works (case-insensitive)
# ---------------------------------------------------------------------------
[taxonomy]
# Tags that describe the medium; collected into media_type.
media_tags = []

# media_type when a work carries none of the media tags.
# media_type_default = "Fic"

# Tags dropped entirely.
excluded_tags = []

# Synonym groups: every member becomes the first element.
merge_tags = []

# Alias groups: members are listed under the first element and keep their
# own name as the sub-attribute (e.g. subfandom).
fandom_groups = []

# Series titles never recorded on a work.
exclude_series = []

# ---------------------------------------------------------------------------
# Folder listings
# ---------------------------------------------------------------------------
[listing]
# [attribute, descending] pairs, highest priority first. A single pair is
# also accepted: order_by = ["date", true]
order_by = [["date", true]]

# Attributes for nested grouping, outermost first. Empty = flat list.
group_by = []

# Keep members of a series together, ordered by their part number.
series_sort = false

# Attribute rewritten by taxonomy.fandom_groups before grouping.
fandom_attribute = "fandom"

# Word count for summaries derived from content.
summary_words = 25

# ---------------------------------------------------------------------------
# Archive tag-list terms renamed before storage
# ---------------------------------------------------------------------------
[field_aliases]
Categories = "Category"
Characters = "Character"
Fandoms = "Fandom"
Relationships = "Relationship"

# ---------------------------------------------------------------------------
# Field formatters (repeat the table for more keys)
# ---------------------------------------------------------------------------
# [[formatters]]
# key = "series"
# format = "{title} (part {index})"
# wrapper = "<span class=\"series\">{}</span>"
# separator = ", "
# template = "all"          # all | single | summary
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_params() {
        let config = SiteConfig::default();
        assert_eq!(config.params["subtitle"], "Site Title");
        assert_eq!(config.params["base_path"], "");
        assert_eq!(config.content_type, "page");
    }

    #[test]
    fn default_listing_orders_by_date_descending() {
        let config = SiteConfig::default();
        assert_eq!(config.listing.order_by, vec![OrderKey::descending("date")]);
        assert!(config.listing.group_by.is_empty());
        assert_eq!(config.listing.summary_words, 25);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[params]
subtitle = "My Blog"
"#;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
            .unwrap();
        // Overridden value
        assert_eq!(config.params["subtitle"], "My Blog");
        // Default values preserved
        assert_eq!(config.params["author"], "Author");
        assert_eq!(config.theme, "default");
    }

    #[test]
    fn order_by_single_pair() {
        let config: SiteConfig = toml::from_str(
            r#"
[listing]
order_by = ["date", true]
"#,
        )
        .unwrap();
        assert_eq!(config.listing.order_by, vec![OrderKey::descending("date")]);
    }

    #[test]
    fn order_by_list_of_pairs() {
        let config: SiteConfig = toml::from_str(
            r#"
[listing]
order_by = [["fandom", false], ["date", true]]
"#,
        )
        .unwrap();
        assert_eq!(
            config.listing.order_by,
            vec![OrderKey::ascending("fandom"), OrderKey::descending("date")]
        );
    }

    #[test]
    fn order_by_bare_names_are_ascending() {
        let config: SiteConfig = toml::from_str(
            r#"
[listing]
order_by = ["title", ["date"]]
"#,
        )
        .unwrap();
        assert_eq!(
            config.listing.order_by,
            vec![OrderKey::ascending("title"), OrderKey::ascending("date")]
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("colour = \"red\"");
        assert!(result.is_err());
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(parsed.params, defaults.params);
        assert_eq!(parsed.permalink, defaults.permalink);
        assert_eq!(parsed.listing.order_by, defaults.listing.order_by);
        assert_eq!(parsed.field_aliases, defaults.field_aliases);
        assert_eq!(parsed.duplicate_slugs, DuplicatePolicy::Warn);
    }

    #[test]
    fn stock_defaults_round_trip() {
        let config: SiteConfig = stock_defaults_value().try_into().unwrap();
        assert_eq!(config.listing.order_by, vec![OrderKey::descending("date")]);
        assert!(config.taxonomy.media_type_default.is_none());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.params["site_url"], "http://localhost:8000");
    }

    #[test]
    fn load_config_reads_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[taxonomy]
media_tags = ["Podfic"]
media_type_default = "Fic"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.taxonomy.media_tags, vec!["Podfic"]);
        assert_eq!(config.taxonomy.media_type_default.as_deref(), Some("Fic"));
        assert!(config.render);
    }

    #[test]
    fn load_config_reads_params_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("params.json"),
            r#"{ "params": { "author": "Jane" }, "listing": { "group_by": ["fandom"] } }"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.params["author"], "Jane");
        assert_eq!(config.listing.group_by, vec!["fandom"]);
    }

    #[test]
    fn toml_wins_over_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "theme = \"dark\"").unwrap();
        fs::write(tmp.path().join("params.json"), r#"{ "theme": "light" }"#).unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn folder_config_overrides_root() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[params]\nauthor = \"Root\"\n",
        )
        .unwrap();
        let works = tmp.path().join("works");
        fs::create_dir_all(&works).unwrap();
        fs::write(
            works.join("config.toml"),
            "[listing]\ngroup_by = [\"fandom\", \"series\"]\n",
        )
        .unwrap();

        let root_value = load_root_value(tmp.path()).unwrap();
        let folder = load_folder_config(&root_value, &works).unwrap();
        assert_eq!(folder.params["author"], "Root");
        assert_eq!(folder.listing.group_by, vec!["fandom", "series"]);

        let root = resolve_config(root_value, None).unwrap();
        assert!(root.listing.group_by.is_empty());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn empty_merge_group_is_invalid() {
        let mut config = SiteConfig::default();
        config.taxonomy.merge_tags = vec![vec![]];
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_summary_words_is_invalid() {
        let mut config = SiteConfig::default();
        config.listing.summary_words = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn duplicate_policy_parses() {
        let config: SiteConfig = toml::from_str("duplicate_slugs = \"error\"").unwrap();
        assert_eq!(config.duplicate_slugs, DuplicatePolicy::Error);
    }

    #[test]
    fn formatter_defaults_fill_in() {
        let config: SiteConfig = toml::from_str(
            r#"
[[formatters]]
key = "author"
"#,
        )
        .unwrap();
        let formatter = &config.formatters[0];
        assert_eq!(formatter.format, "{}");
        assert_eq!(formatter.separator, ", ");
        assert_eq!(formatter.template, TemplateScope::All);
    }
}
