//! Source extraction: one source file in, one [`ContentRecord`] out.
//!
//! Two source formats are recognised:
//!
//! | format | detected by | module |
//! |--------|-------------|--------|
//! | archive HTML | `.html`/`.htm`/`.xhtml` containing `<div id="preface">` | [`archive`] |
//! | tagged document | everything else | [`tagged`] |
//!
//! Both share the filename convention from [`crate::naming`]: the date
//! prefix and slug come from the file name, and headers or archive stats may
//! override the date.

#[cfg(feature = "archive-html")]
pub mod archive;
pub mod tagged;

use crate::config::SiteConfig;
use crate::naming::parse_source_name;
use crate::types::{ContentRecord, FieldValue};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// `content_type` of records read from archive exports.
pub const ARCHIVE_CONTENT_TYPE: &str = "ao3_work";

const ARCHIVE_MARKER: &str = r#"<div id="preface">"#;
const ARCHIVE_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed archive export: {0}")]
    Malformed(&'static str),
}

/// Whether a file should be read as an archive export.
pub fn is_archive_html(extension: &str, text: &str) -> bool {
    ARCHIVE_EXTENSIONS.contains(&extension) && text.contains(ARCHIVE_MARKER)
}

/// Read one source file into a record.
///
/// `folder` is the record's folder name, empty for pages at the content root.
pub fn extract(path: &Path, config: &SiteConfig, folder: &str) -> Result<ContentRecord, ExtractError> {
    let text = fs::read_to_string(path)?;
    extract_str(path, &text, config, folder)
}

/// [`extract`] over text already in memory. `path` supplies the file name.
pub fn extract_str(
    path: &Path,
    text: &str,
    config: &SiteConfig,
    folder: &str,
) -> Result<ContentRecord, ExtractError> {
    let name = parse_source_name(path);
    let mut record = ContentRecord {
        slug: name.slug,
        date: name.date,
        folder: folder.to_string(),
        source_path: path.to_path_buf(),
        ..Default::default()
    };

    if is_archive_html(&name.extension, text) {
        read_archive(&mut record, path, text, config)?;
    } else {
        read_tagged(&mut record, path, &name.extension, text);
    }

    if record.content_type.is_empty() {
        record.content_type = config.content_type.clone();
    }
    record.rfc_2822_date = record.date.as_deref().and_then(rfc_2822_date);
    Ok(record)
}

fn read_tagged(record: &mut ContentRecord, path: &Path, extension: &str, text: &str) {
    let (headers, end) = tagged::read_headers(text);
    let header_count = headers.len();
    for (key, value) in headers {
        record.set_field(&key, FieldValue::Text(value));
    }

    let body = &text[end..];
    record.content = if tagged::is_markdown(extension) {
        tagged::markdown_to_html(body).unwrap_or_else(|| {
            warn!(path = %path.display(), "built without Markdown support; content left unconverted");
            body.to_string()
        })
    } else {
        body.to_string()
    };
    debug!(path = %path.display(), headers = header_count, "read tagged document");
}

#[cfg(feature = "archive-html")]
fn read_archive(
    record: &mut ContentRecord,
    path: &Path,
    text: &str,
    config: &SiteConfig,
) -> Result<(), ExtractError> {
    let work = archive::read_work(text, &config.taxonomy, &config.field_aliases)?;
    for (key, value) in work.fields {
        record.set_field(&key, value);
    }
    if work.date.is_some() {
        record.date = work.date;
    }
    record.content = work.content;
    record.chapters = work.chapters;
    record.content_type = ARCHIVE_CONTENT_TYPE.to_string();
    debug!(path = %path.display(), "read archive work");
    Ok(())
}

#[cfg(not(feature = "archive-html"))]
fn read_archive(
    record: &mut ContentRecord,
    path: &Path,
    text: &str,
    _config: &SiteConfig,
) -> Result<(), ExtractError> {
    warn!(path = %path.display(), "built without archive HTML support; reading as a tagged document");
    read_tagged(record, path, "html", text);
    Ok(())
}

/// RFC 2822 form of a `YYYY-MM-DD` date at midnight UTC.
pub fn rfc_2822_date(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%a, %d %b %Y %H:%M:%S +0000").to_string())
}
