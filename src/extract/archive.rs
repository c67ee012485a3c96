//! Archive-exported works: structured HTML with a preface, chapters and
//! afterword.
//!
//! ```text
//! div#preface
//! ├── p.message                   → top_message
//! └── div.meta
//!     ├── dl.tags                 → one field per <dt>/<dd> pair
//!     ├── h1                      → title
//!     ├── a[rel=author]           → author
//!     └── p "Summary" / "Notes" + blockquote.userstuff
//! div#chapters                    → content, chapters
//! div#afterword
//! ├── p "End Notes" + blockquote.userstuff
//! └── p.message                   → bottom_message
//! ```
//!
//! Link lists other than `Additional Tags` still go through the merge
//! groups, so spelling variants of a fandom or character collapse.
//!
//! Tag-list terms become lowercase keys with spaces replaced by underscores
//! (`Archive Warning` → `archive_warning`), after field aliases are applied.

use super::ExtractError;
use crate::config::TagTaxonomy;
use crate::tags::{merge_labels, normalize_tags};
use crate::types::{Chapter, FieldValue, SERIES_KEY, SeriesEntry, TITLE_KEY};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static PREFACE: LazyLock<Selector> = LazyLock::new(|| selector("#preface"));
static CHAPTERS: LazyLock<Selector> = LazyLock::new(|| selector("#chapters"));
static AFTERWORD: LazyLock<Selector> = LazyLock::new(|| selector("#afterword"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[rel="author"]"#));
static TAG_LIST: LazyLock<Selector> = LazyLock::new(|| selector("dl.tags"));
static TERM: LazyLock<Selector> = LazyLock::new(|| selector("dt"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static LABEL: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static MESSAGE: LazyLock<Selector> = LazyLock::new(|| selector("p.message"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4, h5, h6"));

static STAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Words|Chapters|Published):\s*([0-9][0-9,./\-]*)")
        .expect("stats pattern must compile")
});
static SERIES_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("series index pattern must compile"));

const SERIES_TERM: &str = "Series";
const ADDITIONAL_TAGS_TERM: &str = "Additional Tags";
const STATS_TERM: &str = "Stats";

/// Everything extracted from one archive export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Work {
    /// `Published` stat, if present.
    pub date: Option<String>,
    /// Inner HTML of the chapters region.
    pub content: String,
    pub chapters: Vec<Chapter>,
    pub fields: BTreeMap<String, FieldValue>,
}

/// Extract a work from archive HTML.
///
/// `aliases` renames tag-list terms (case-insensitive) before they become
/// keys.
pub fn read_work(
    text: &str,
    taxonomy: &TagTaxonomy,
    aliases: &BTreeMap<String, String>,
) -> Result<Work, ExtractError> {
    let document = Html::parse_document(text);

    let preface = document
        .select(&PREFACE)
        .next()
        .ok_or(ExtractError::Malformed("missing preface"))?;
    let title = preface
        .select(&TITLE)
        .next()
        .ok_or(ExtractError::Malformed("missing title"))?;
    let tag_list = preface
        .select(&TAG_LIST)
        .next()
        .ok_or(ExtractError::Malformed("missing tag list"))?;
    let chapters_region = document
        .select(&CHAPTERS)
        .next()
        .ok_or(ExtractError::Malformed("missing chapters"))?;

    let mut fields = BTreeMap::new();
    let mut date = None;
    let mut put = |key: &str, value: FieldValue| {
        fields.insert(field_key(key), value);
    };

    put(TITLE_KEY, FieldValue::Text(text_of(title)));
    let authors: Vec<String> = preface.select(&AUTHOR).map(text_of).collect();
    if !authors.is_empty() {
        put("author", FieldValue::List(authors));
    }
    if let Some(summary) = labelled_block(preface, &["Summary"]) {
        put("summary", FieldValue::Text(summary));
    }
    if let Some(notes) = labelled_block(preface, &["Notes"]) {
        put("notes", FieldValue::Text(notes));
    }
    if let Some(message) = preface.select(&MESSAGE).next() {
        put("top_message", FieldValue::Text(message.inner_html().trim().to_string()));
    }
    if let Some(afterword) = document.select(&AFTERWORD).next() {
        if let Some(end_notes) = labelled_block(afterword, &["End Notes"]) {
            put("end_notes", FieldValue::Text(end_notes));
        }
        if let Some(message) = afterword.select(&MESSAGE).next() {
            put("bottom_message", FieldValue::Text(message.inner_html().trim().to_string()));
        }
    }

    let mut media: Vec<String> = Vec::new();
    let mut stats: Option<String> = None;
    for term in tag_list.select(&TERM) {
        let Some(definition) = next_element(term, "dd") else {
            continue;
        };
        let name = text_of(term).trim_end_matches(':').trim().to_string();
        let links: Vec<ElementRef<'_>> = definition.select(&LINK).collect();

        let value = if name == SERIES_TERM {
            let entries = series_entries(&links, &taxonomy.exclude_series);
            if entries.is_empty() {
                continue;
            }
            FieldValue::Series(entries)
        } else if name == ADDITIONAL_TAGS_TERM {
            let labels: Vec<String> = links.iter().map(|l| text_of(*l)).collect();
            let tags = normalize_tags(labels.iter().map(String::as_str), taxonomy);
            media.extend(tags.media);
            FieldValue::List(tags.kept)
        } else if links.is_empty() {
            let text = text_of(definition);
            if name == STATS_TERM {
                stats = Some(text.clone());
            }
            FieldValue::Text(text)
        } else {
            let labels: Vec<String> = links.iter().map(|l| text_of(*l)).collect();
            FieldValue::List(merge_labels(labels.iter().map(String::as_str), taxonomy))
        };

        let key = aliases
            .iter()
            .find(|(from, _)| from.to_lowercase() == name.to_lowercase())
            .map_or(name.as_str(), |(_, to)| to.as_str());
        put(key, value);
    }

    if !media.is_empty() {
        put("media_type", FieldValue::List(media));
    } else if let Some(default) = &taxonomy.media_type_default {
        put("media_type", FieldValue::List(vec![default.clone()]));
    }

    if let Some(stats) = stats {
        for caps in STAT.captures_iter(&stats) {
            let value = caps[2].to_string();
            match &caps[1] {
                "Words" => put("words", FieldValue::Text(locale_integer(&value))),
                "Chapters" => put("chapters", FieldValue::Text(value)),
                "Published" => date = Some(value),
                _ => {}
            }
        }
    }

    let chapters = read_chapters(chapters_region);
    debug!(chapters = chapters.len(), "read archive work");
    Ok(Work {
        date,
        content: chapters_region.inner_html().trim().to_string(),
        chapters,
        fields,
    })
}

/// Extension-map key for a tag-list term.
fn field_key(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Element text with whitespace runs collapsed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn is_heading(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// First following sibling element with the given tag name.
fn next_element<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == name)
}

/// Inner HTML of the `blockquote.userstuff` following a `<p>` label.
fn labelled_block(scope: ElementRef<'_>, labels: &[&str]) -> Option<String> {
    scope
        .select(&LABEL)
        .filter(|p| {
            let text = text_of(*p);
            labels.iter().any(|label| label.eq_ignore_ascii_case(&text))
        })
        .find_map(|p| {
            p.next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| sibling.value().name() == "blockquote" && has_class(*sibling, "userstuff"))
        })
        .map(|block| block.inner_html().trim().to_string())
}

/// Series memberships from the links of a `Series` definition.
///
/// The index is the first number in the text preceding each link
/// (`Part 2 of <a>Foo</a>`), `0` when there is none.
fn series_entries(links: &[ElementRef<'_>], exclude: &[String]) -> Vec<SeriesEntry> {
    links
        .iter()
        .filter_map(|link| {
            let title = text_of(*link);
            if exclude.iter().any(|ex| ex.trim().eq_ignore_ascii_case(&title)) {
                debug!(series = %title, "skipping excluded series");
                return None;
            }
            let index = link
                .prev_siblings()
                .find_map(|node| node.value().as_text().map(|t| t.to_string()))
                .and_then(|text| SERIES_INDEX.find(&text).map(|m| m.as_str().to_string()))
                .unwrap_or_else(|| "0".to_string());
            Some(SeriesEntry::new(index, title))
        })
        .collect()
}

/// Digits of a number written with locale grouping (`1,234` or `1.234`).
fn locale_integer(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Split the chapters region into chapters.
///
/// Walks the direct children: a block that is or contains a heading opens a
/// new chapter and supplies its summary and notes. A `userstuff` block
/// supplies its inner HTML as content. A `meta` block supplies end notes;
/// any other element (a bare `<p>`) is content as-is. Content before the
/// first heading opens an untitled chapter.
fn read_chapters(region: ElementRef<'_>) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut current: Option<Chapter> = None;

    for child in region.children().filter_map(ElementRef::wrap) {
        if has_class(child, "userstuff") && !is_heading(child) {
            let chapter = current.get_or_insert_with(Chapter::default);
            chapter.content.push_str(child.inner_html().trim());
            continue;
        }

        let heading = if is_heading(child) {
            Some(child)
        } else {
            child.select(&HEADING).next()
        };
        match heading {
            Some(heading) => {
                if let Some(done) = current.take() {
                    chapters.push(done);
                }
                current = Some(Chapter {
                    title: Some(text_of(heading)),
                    summary: labelled_block(child, &["Summary", "Chapter Summary"]),
                    notes: labelled_block(child, &["Notes", "Chapter Notes"]),
                    ..Default::default()
                });
            }
            None => {
                if let Some(end_notes) = labelled_block(child, &["End Notes", "Chapter End Notes"]) {
                    current.get_or_insert_with(Chapter::default).end_notes = Some(end_notes);
                } else if !has_class(child, "meta") {
                    let chapter = current.get_or_insert_with(Chapter::default);
                    chapter.content.push_str(child.html().trim());
                }
            }
        }
    }

    chapters.extend(current);
    chapters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    const ONE_SHOT: &str = r#"<html><body>
<div id="preface">
  <p class="message">Posted originally on the archive.</p>
  <div class="meta">
    <dl class="tags">
      <dt>Rating:</dt><dd><a href="/r">Teen And Up Audiences</a></dd>
      <dt>Fandoms:</dt><dd><a href="/f1">Iron Man (Movies)</a>, <a href="/f2">Star Trek</a></dd>
      <dt>Additional Tags:</dt><dd><a>Podfic</a>, <a>Angst</a>, <a>Tooth-Rotting Fluff</a>, <a>Slow Burn</a></dd>
      <dt>Series:</dt><dd>Part 2 of <a href="/s1">Foo</a>, Part 1 of <a href="/s2">Drabbles</a></dd>
      <dt>Language:</dt><dd>English</dd>
      <dt>Stats:</dt><dd>Published: 2021-03-04
        Words: 12,345
        Chapters: 1/1</dd>
    </dl>
    <h1>A Work Title</h1>
    <div class="byline">by <a rel="author" href="/a">alice</a>, <a rel="author" href="/b">bob</a></div>
    <p>Summary</p>
    <blockquote class="userstuff"><p>What happens.</p></blockquote>
    <p>Notes</p>
    <blockquote class="userstuff"><p>Thanks to my beta.</p></blockquote>
  </div>
</div>
<div id="chapters" class="userstuff">
  <div class="userstuff"><p>Once upon a time.</p></div>
</div>
<div id="afterword">
  <div class="meta"><p>End Notes</p><blockquote class="userstuff"><p>The end.</p></blockquote></div>
  <div id="endnotes"><p class="message">Please leave kudos.</p></div>
</div>
</body></html>"#;

    const TWO_CHAPTERS: &str = r#"<html><body>
<div id="preface"><div class="meta">
  <dl class="tags"><dt>Fandom:</dt><dd><a>Star Trek</a></dd></dl>
  <h1>Two Parts</h1>
</div></div>
<div id="chapters" class="userstuff">
  <div class="meta group"><h2 class="heading">Chapter 1: Start</h2></div>
  <div class="userstuff"><p>First.</p></div>
  <div class="meta group">
    <h2 class="heading">Chapter 2: Finish</h2>
    <p>Chapter Summary</p><blockquote class="userstuff"><p>It ends.</p></blockquote>
  </div>
  <div class="userstuff"><p>Second.</p></div>
  <div class="meta group"><p>Chapter End Notes</p><blockquote class="userstuff"><p>Bye.</p></blockquote></div>
</div>
</body></html>"#;

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.taxonomy = TagTaxonomy {
            media_tags: vec!["Podfic".into()],
            media_type_default: Some("Fic".into()),
            excluded_tags: vec!["Angst".into()],
            merge_tags: vec![vec!["Fluff".into(), "Tooth-Rotting Fluff".into()]],
            fandom_groups: vec![],
            exclude_series: vec!["Drabbles".into()],
        };
        config
    }

    fn read(text: &str) -> Work {
        let config = config();
        read_work(text, &config.taxonomy, &config.field_aliases).unwrap()
    }

    fn text<'a>(work: &'a Work, key: &str) -> Option<&'a str> {
        work.fields.get(key).and_then(FieldValue::as_text)
    }

    fn list<'a>(work: &'a Work, key: &str) -> &'a [String] {
        match work.fields.get(key) {
            Some(FieldValue::List(items)) => items,
            other => panic!("expected list under '{key}', got {other:?}"),
        }
    }

    #[test]
    fn preface_fields() {
        let work = read(ONE_SHOT);
        assert_eq!(text(&work, "title"), Some("A Work Title"));
        assert_eq!(list(&work, "author"), ["alice", "bob"]);
        assert_eq!(text(&work, "summary"), Some("<p>What happens.</p>"));
        assert_eq!(text(&work, "notes"), Some("<p>Thanks to my beta.</p>"));
        assert_eq!(text(&work, "top_message"), Some("Posted originally on the archive."));
    }

    #[test]
    fn afterword_fields() {
        let work = read(ONE_SHOT);
        assert_eq!(text(&work, "end_notes"), Some("<p>The end.</p>"));
        assert_eq!(text(&work, "bottom_message"), Some("Please leave kudos."));
    }

    #[test]
    fn tag_terms_become_folded_keys() {
        let work = read(ONE_SHOT);
        assert_eq!(list(&work, "rating"), ["Teen And Up Audiences"]);
        // Fandoms is aliased to Fandom by default
        assert_eq!(list(&work, "fandom"), ["Iron Man (Movies)", "Star Trek"]);
        assert!(!work.fields.contains_key("fandoms"));
        assert_eq!(text(&work, "language"), Some("English"));
    }

    #[test]
    fn additional_tags_are_normalized() {
        let work = read(ONE_SHOT);
        assert_eq!(list(&work, "additional_tags"), ["Fluff", "Slow Burn"]);
        assert_eq!(list(&work, "media_type"), ["Podfic"]);
    }

    #[test]
    fn media_default_when_no_media_tag() {
        let work = read(TWO_CHAPTERS);
        assert_eq!(list(&work, "media_type"), ["Fic"]);
    }

    #[test]
    fn series_index_from_preceding_text() {
        let work = read(ONE_SHOT);
        match work.fields.get(SERIES_KEY) {
            Some(FieldValue::Series(entries)) => {
                // Drabbles is excluded
                assert_eq!(entries, &vec![SeriesEntry::new("2", "Foo")]);
            }
            other => panic!("expected series, got {other:?}"),
        }
    }

    #[test]
    fn series_without_number_defaults_to_zero() {
        let html = ONE_SHOT.replace("Part 2 of <a href=\"/s1\">Foo</a>", "<a href=\"/s1\">Foo</a>");
        let work = read(&html);
        assert_eq!(work.fields.get(SERIES_KEY), Some(&FieldValue::Series(vec![SeriesEntry::new("0", "Foo")])));
    }

    #[test]
    fn stats_are_parsed() {
        let work = read(ONE_SHOT);
        assert_eq!(work.date.as_deref(), Some("2021-03-04"));
        assert_eq!(text(&work, "words"), Some("12345"));
        assert_eq!(text(&work, "chapters"), Some("1/1"));
    }

    #[test]
    fn single_chapter_work() {
        let work = read(ONE_SHOT);
        assert_eq!(work.chapters.len(), 1);
        assert_eq!(work.chapters[0].title, None);
        assert_eq!(work.chapters[0].content, "<p>Once upon a time.</p>");
        assert!(work.content.contains("Once upon a time."));
    }

    #[test]
    fn two_chapter_work() {
        let work = read(TWO_CHAPTERS);
        assert_eq!(work.chapters.len(), 2);

        let first = &work.chapters[0];
        assert_eq!(first.title.as_deref(), Some("Chapter 1: Start"));
        assert_eq!(first.summary, None);
        assert_eq!(first.content, "<p>First.</p>");

        let second = &work.chapters[1];
        assert_eq!(second.title.as_deref(), Some("Chapter 2: Finish"));
        assert_eq!(second.summary.as_deref(), Some("<p>It ends.</p>"));
        assert_eq!(second.content, "<p>Second.</p>");
        assert_eq!(second.end_notes.as_deref(), Some("<p>Bye.</p>"));
    }

    #[test]
    fn missing_regions_are_malformed() {
        let config = config();
        let no_chapters = ONE_SHOT.replace("id=\"chapters\"", "id=\"body\"");
        assert!(matches!(
            read_work(&no_chapters, &config.taxonomy, &config.field_aliases),
            Err(ExtractError::Malformed("missing chapters"))
        ));

        let no_title = TWO_CHAPTERS.replace("<h1>Two Parts</h1>", "");
        assert!(matches!(
            read_work(&no_title, &config.taxonomy, &config.field_aliases),
            Err(ExtractError::Malformed("missing title"))
        ));

        let no_tags = TWO_CHAPTERS.replace("class=\"tags\"", "class=\"other\"");
        assert!(matches!(
            read_work(&no_tags, &config.taxonomy, &config.field_aliases),
            Err(ExtractError::Malformed("missing tag list"))
        ));
    }

    #[test]
    fn co_authored_work_groups_under_each_author() {
        use crate::flatten::flatten;
        use crate::types::{ContentRecord, Groupable};

        let work = read(ONE_SHOT);
        let mut record = ContentRecord::default();
        for (key, value) in work.fields {
            record.set_field(&key, value);
        }
        let keys: Vec<String> = flatten(&[record], "author")
            .iter()
            .map(|r| r.value_at("author").key())
            .collect();
        assert_eq!(keys, ["alice", "bob"]);
    }

    #[test]
    fn link_terms_use_merge_groups() {
        let mut config = config();
        config.taxonomy.merge_tags.push(vec!["Iron Man".into(), "IronMan".into()]);
        let html = ONE_SHOT.replace(
            r#"<a href="/f2">Star Trek</a>"#,
            r#"<a href="/f2">IronMan</a>, <a href="/f3">Iron Man</a>"#,
        );
        let html = html.replace("Iron Man (Movies)", "Star Trek");
        let work = read_work(&html, &config.taxonomy, &config.field_aliases).unwrap();
        assert_eq!(list(&work, "fandom"), ["Star Trek", "Iron Man"]);
    }

    #[test]
    fn bare_paragraphs_are_chapter_content() {
        let html = r#"<div id="preface"><div class="meta">
  <dl class="tags"><dt>Fandom:</dt><dd><a>Star Trek</a></dd></dl>
  <h1>Plain</h1>
</div></div>
<div id="chapters"><p>One.</p><p>Two.</p></div>"#;
        let work = read(html);
        assert_eq!(work.chapters.len(), 1);
        assert_eq!(work.chapters[0].content, "<p>One.</p><p>Two.</p>");
    }

    #[test]
    fn locale_integer_strips_separators() {
        assert_eq!(locale_integer("1,234,567"), "1234567");
        assert_eq!(locale_integer("1.234"), "1234");
    }
}
