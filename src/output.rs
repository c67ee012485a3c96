//! CLI output formatting for `build` and `check`.
//!
//! Output is information-first: each record leads with its positional index
//! and display title, and the written file follows as `→ path`. Skipped
//! sources are listed under their folder with the reason.
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 About → about/index.html
//!
//! Blog → blog/index.html (3 records, 2 listed)
//!     001 Second → blog/b/index.html
//!     002 First → blog/a/index.html
//!     003 Draft → blog/draft/index.html (unlisted)
//!
//! Works → works/index.html (2 records, 2 listed, 4 headings)
//!     001 Part One → works/one/index.html
//!     002 Part Two → works/two/index.html
//!     Skipped: 2021-03-01-broken.html (malformed archive export: ...)
//!
//! Generated 2 folders, 5 record pages, 2 pages, 1 static file
//! ```
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::generate::{BuildReport, CheckReport, FolderReport, SkippedFile};
use crate::naming::folder_title;
use crate::types::ContentRecord;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Path of a written file relative to the output root.
fn relative(path: &Path, output: &Path) -> String {
    path.strip_prefix(output)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

fn skipped_line(skipped: &SkippedFile) -> String {
    let name = skipped
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("    Skipped: {} ({})", name, skipped.reason)
}

fn record_line(index: usize, record: &ContentRecord, output: &Path) -> String {
    let mut line = format!(
        "    {} {} \u{2192} {}",
        format_index(index),
        record.display_title(),
        relative(&record.dst_path, output)
    );
    if !record.is_listed() {
        line.push_str(" (unlisted)");
    }
    line
}

fn folder_header(folder: &FolderReport, output: &Path) -> String {
    let mut detail = format!(
        "{} records, {} listed",
        folder.records.len(),
        folder.listing.len()
    );
    if folder.headings > 0 {
        detail.push_str(&format!(", {} headings", folder.headings));
    }
    format!(
        "{} \u{2192} {} ({})",
        folder_title(&folder.name),
        relative(&folder.list_path, output),
        detail
    )
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the result of a full build.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    let output = &report.output;

    let mut position = 0;
    for page in &report.pages {
        if page.uri.is_empty() {
            lines.push(format!("Home \u{2192} {}", relative(&page.dst_path, output)));
        } else {
            position += 1;
            lines.push(format!(
                "{} {} \u{2192} {}",
                format_index(position),
                page.display_title(),
                relative(&page.dst_path, output)
            ));
        }
    }
    lines.extend(report.skipped.iter().map(skipped_line));

    let mut record_pages = 0;
    for folder in &report.folders {
        lines.push(String::new());
        lines.push(folder_header(folder, output));

        // Listed records in listing order, then the unlisted ones
        let unlisted = folder.records.iter().filter(|r| !r.is_listed());
        for (i, record) in folder.listing.iter().chain(unlisted).enumerate() {
            lines.push(record_line(i + 1, record, output));
        }
        lines.extend(folder.skipped.iter().map(skipped_line));
        record_pages += folder.records.len();
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}, {}",
        plural(report.folders.len(), "folder"),
        plural(record_pages, "record page"),
        plural(report.pages.len(), "page"),
        plural(report.static_files, "static file")
    ));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of `check`.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!("Pages: {}", report.pages)];
    lines.extend(report.skipped.iter().map(skipped_line));

    for folder in &report.folders {
        lines.push(format!(
            "{}: {} ({} unlisted)",
            folder_title(&folder.name),
            plural(folder.records, "record"),
            folder.unlisted
        ));
        lines.extend(folder.skipped.iter().map(skipped_line));
    }

    let skipped = report.skipped.len() + report.folders.iter().map(|f| f.skipped.len()).sum::<usize>();
    if skipped > 0 {
        lines.push(format!("{} could not be read", plural(skipped, "source")));
    }
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::FolderCheck;
    use crate::test_helpers::record;
    use crate::types::{FieldValue, LIST_KEY, TITLE_KEY};
    use std::path::PathBuf;

    fn written(slug: &str, title: &str) -> ContentRecord {
        let mut r = record(slug).with_field(TITLE_KEY, FieldValue::Text(title.into()));
        r.uri = format!("blog/{slug}/");
        r.dst_path = PathBuf::from(format!("/out/blog/{slug}/index.html"));
        r
    }

    fn report() -> BuildReport {
        let mut home = record("_index");
        home.dst_path = PathBuf::from("/out/index.html");
        let mut about = record("about");
        about.uri = "about/".into();
        about.dst_path = PathBuf::from("/out/about/index.html");

        let a = written("a", "First");
        let b = written("b", "Second");
        let draft = written("draft", "Draft").with_field(LIST_KEY, FieldValue::Text("no".into()));

        BuildReport {
            output: PathBuf::from("/out"),
            pages: vec![home, about],
            folders: vec![FolderReport {
                name: "blog".into(),
                records: vec![a.clone(), b.clone(), draft],
                listing: vec![b, a],
                headings: 0,
                list_path: PathBuf::from("/out/blog/index.html"),
                skipped: vec![SkippedFile {
                    path: PathBuf::from("/src/blog/bad.html"),
                    reason: "malformed archive export: missing tag list".into(),
                }],
            }],
            skipped: Vec::new(),
            static_files: 1,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn build_output_lists_pages_and_folders() {
        let lines = format_build_output(&report());
        assert_eq!(lines[0], "Home \u{2192} index.html");
        assert_eq!(lines[1], "001 about \u{2192} about/index.html");
        assert_eq!(lines[3], "Blog \u{2192} blog/index.html (3 records, 2 listed)");
    }

    #[test]
    fn build_output_follows_listing_order() {
        let lines = format_build_output(&report());
        assert_eq!(lines[4], "    001 Second \u{2192} blog/b/index.html");
        assert_eq!(lines[5], "    002 First \u{2192} blog/a/index.html");
        assert_eq!(lines[6], "    003 Draft \u{2192} blog/draft/index.html (unlisted)");
    }

    #[test]
    fn build_output_reports_skipped_and_totals() {
        let lines = format_build_output(&report());
        assert!(lines.contains(&"    Skipped: bad.html (malformed archive export: missing tag list)".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 1 folder, 3 record pages, 2 pages, 1 static file"
        );
    }

    #[test]
    fn headings_shown_when_grouped() {
        let mut r = report();
        r.folders[0].headings = 4;
        let lines = format_build_output(&r);
        assert!(lines[3].ends_with("(3 records, 2 listed, 4 headings)"));
    }

    #[test]
    fn check_output_counts() {
        let report = CheckReport {
            source: PathBuf::from("content"),
            pages: 2,
            folders: vec![FolderCheck {
                name: "short-stories".into(),
                records: 1,
                unlisted: 0,
                skipped: Vec::new(),
            }],
            skipped: vec![SkippedFile {
                path: PathBuf::from("content/x.html"),
                reason: "IO error".into(),
            }],
        };
        let lines = format_check_output(&report);
        assert_eq!(lines[0], "Pages: 2");
        assert_eq!(lines[1], "    Skipped: x.html (IO error)");
        assert_eq!(lines[2], "Short Stories: 1 record (0 unlisted)");
        assert_eq!(lines[3], "1 source could not be read");
    }
}
