//! Shared types used across all pipeline stages.
//!
//! A [`ContentRecord`] carries a fixed set of typed fields that every record
//! has, plus an open map of [`FieldValue`]s for everything a source declares
//! itself (headers, archive tag lists). The grouping engine never inspects
//! either directly; it goes through [`Groupable::value_at`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Extension-map key holding a record's series memberships.
pub const SERIES_KEY: &str = "series";
/// Key added next to `series` when a record is flattened by series.
pub const SERIES_INDEX_KEY: &str = "series_index";
/// Key naming a record's display title.
pub const TITLE_KEY: &str = "title";
/// Header that opts a record out of its folder listing (`list: no`).
pub const LIST_KEY: &str = "list";

/// A value in a record's extension map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Series(Vec<SeriesEntry>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Membership of a record in an ordered series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    /// Position within the series, an integer kept in its source spelling.
    pub index: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<SeriesLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<SeriesLink>,
}

impl SeriesEntry {
    pub fn new(index: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            title: title.into(),
            prev: None,
            next: None,
        }
    }

    /// Integer position, if the index parses as one.
    pub fn position(&self) -> Option<i64> {
        self.index.trim().parse().ok()
    }
}

/// Link to a neighbouring series member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesLink {
    pub uri: String,
    pub title: String,
}

/// One chapter of an archive-exported work.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chapter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_notes: Option<String>,
    pub content: String,
}

/// A normalized unit of site content derived from one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentRecord {
    /// Filename-derived identifier, unique within its folder by convention only.
    pub slug: String,
    /// ISO calendar date, if the source has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Body markup, already HTML.
    pub content: String,
    /// Discriminator: `page`, `ao3_work`, or a site-specific value.
    pub content_type: String,
    /// Source folder name; empty for pages at the content root.
    pub folder: String,
    pub source_path: PathBuf,
    /// Canonical site-relative path.
    pub uri: String,
    pub dst_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rfc_2822_date: Option<String>,
    /// Hex MD5 of the rendered page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<Chapter>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl ContentRecord {
    /// Set a field by name, routing the typed names to their fields.
    ///
    /// `slug`, `date`, `content` and `content_type` only accept text; any
    /// other value is stored in the extension map under that name.
    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        match (name, value) {
            ("slug", FieldValue::Text(s)) => self.slug = s,
            ("date", FieldValue::Text(s)) => self.date = Some(s),
            ("content", FieldValue::Text(s)) => self.content = s,
            ("content_type", FieldValue::Text(s)) => self.content_type = s,
            (name, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }

    /// Shallow copy with one attribute replaced.
    pub fn with_field(&self, name: &str, value: FieldValue) -> Self {
        let mut copy = self.clone();
        copy.set_field(name, value);
        copy
    }

    /// Text value of an extension field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    /// Title for links and headings: the `title` field, else the slug.
    pub fn display_title(&self) -> &str {
        self.text(TITLE_KEY)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.slug)
    }

    pub fn series(&self) -> &[SeriesEntry] {
        match self.fields.get(SERIES_KEY) {
            Some(FieldValue::Series(entries)) => entries,
            _ => &[],
        }
    }

    pub fn series_mut(&mut self) -> Option<&mut Vec<SeriesEntry>> {
        match self.fields.get_mut(SERIES_KEY) {
            Some(FieldValue::Series(entries)) => Some(entries),
            _ => None,
        }
    }

    /// Whether the record appears on its folder's listing page.
    ///
    /// Opted out with a `list: no` (or `false`) header.
    pub fn is_listed(&self) -> bool {
        !matches!(
            self.text(LIST_KEY).map(|v| v.trim().to_lowercase()).as_deref(),
            Some("no" | "false")
        )
    }
}

/// Shape of a record attribute as seen by the flattener and grouping engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue<'a> {
    Absent,
    Scalar(&'a str),
    Sequence(&'a [String]),
    SeriesList(&'a [SeriesEntry]),
}

impl AttrValue<'_> {
    /// Group key for a flattened value. Sequences only reach here unflattened.
    pub fn key(&self) -> String {
        match self {
            AttrValue::Absent => String::new(),
            AttrValue::Scalar(s) => s.to_string(),
            AttrValue::Sequence(items) => items.join(", "),
            AttrValue::SeriesList(entries) => entries
                .iter()
                .map(|e| e.title.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Attribute lookup by runtime name.
pub trait Groupable {
    fn value_at(&self, name: &str) -> AttrValue<'_>;
}

impl Groupable for ContentRecord {
    fn value_at(&self, name: &str) -> AttrValue<'_> {
        match name {
            "slug" => AttrValue::Scalar(&self.slug),
            "date" => self
                .date
                .as_deref()
                .map_or(AttrValue::Absent, AttrValue::Scalar),
            "content" => AttrValue::Scalar(&self.content),
            "content_type" => AttrValue::Scalar(&self.content_type),
            "folder" => AttrValue::Scalar(&self.folder),
            "uri" => AttrValue::Scalar(&self.uri),
            _ => match self.fields.get(name) {
                None => AttrValue::Absent,
                Some(FieldValue::Text(s)) => AttrValue::Scalar(s),
                Some(FieldValue::List(items)) => AttrValue::Sequence(items),
                Some(FieldValue::Series(entries)) => AttrValue::SeriesList(entries),
            },
        }
    }
}

/// One node of a grouped listing.
///
/// Heading nodes have a key and no records; leaf runs carry records and may
/// have an empty key (rendered without a heading).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub key: String,
    pub records: Vec<ContentRecord>,
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_routes_typed_names() {
        let mut record = ContentRecord::default();
        record.set_field("date", FieldValue::Text("2020-01-01".into()));
        record.set_field("content_type", FieldValue::Text("post".into()));
        record.set_field("title", FieldValue::Text("Hello".into()));

        assert_eq!(record.date.as_deref(), Some("2020-01-01"));
        assert_eq!(record.content_type, "post");
        assert_eq!(record.text("title"), Some("Hello"));
        assert!(!record.fields.contains_key("date"));
    }

    #[test]
    fn with_field_leaves_original_untouched() {
        let mut record = ContentRecord::default();
        record.set_field("tags", FieldValue::List(vec!["a".into(), "b".into()]));

        let copy = record.with_field("tags", FieldValue::Text("a".into()));
        assert_eq!(copy.value_at("tags"), AttrValue::Scalar("a"));
        assert_eq!(
            record.value_at("tags"),
            AttrValue::Sequence(&["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn value_at_reports_shapes() {
        let mut record = ContentRecord {
            slug: "a".into(),
            ..Default::default()
        };
        record.set_field(
            SERIES_KEY,
            FieldValue::Series(vec![SeriesEntry::new("1", "Foo")]),
        );

        assert_eq!(record.value_at("slug"), AttrValue::Scalar("a"));
        assert_eq!(record.value_at("date"), AttrValue::Absent);
        assert_eq!(record.value_at("missing"), AttrValue::Absent);
        assert!(matches!(record.value_at(SERIES_KEY), AttrValue::SeriesList(e) if e.len() == 1));
    }

    #[test]
    fn display_title_falls_back_to_slug() {
        let mut record = ContentRecord {
            slug: "hello".into(),
            ..Default::default()
        };
        assert_eq!(record.display_title(), "hello");
        record.set_field(TITLE_KEY, FieldValue::Text("Hello!".into()));
        assert_eq!(record.display_title(), "Hello!");
    }

    #[test]
    fn list_header_opts_out() {
        let mut record = ContentRecord::default();
        assert!(record.is_listed());
        record.set_field(LIST_KEY, FieldValue::Text("No".into()));
        assert!(!record.is_listed());
    }

    #[test]
    fn series_position_parses_integer() {
        assert_eq!(SeriesEntry::new(" 3 ", "Foo").position(), Some(3));
        assert_eq!(SeriesEntry::new("three", "Foo").position(), None);
    }
}
