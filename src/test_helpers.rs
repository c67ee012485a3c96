//! Shared test utilities for the makesite test suite.
//!
//! Provides record builders, lookup helpers, and fixture setup that work with
//! the pipeline's data structures (`ContentRecord`, `BuildReport`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let paths = SitePaths {
//!     source: tmp.path().to_path_buf(),
//!     output: tmp.path().join("_site"),
//!     themes: tmp.path().join("themes"),
//! };
//! let report = build_site(&paths, false).unwrap();
//!
//! let blog = find_folder(&report, "blog");
//! let post = find_record(&blog.records, "a");
//! assert_eq!(post.uri, "blog/a/");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::generate::{BuildReport, FolderReport};
use crate::types::ContentRecord;

// =========================================================================
// Record builders
// =========================================================================

/// A bare `page` record in the `blog` folder.
pub fn record(slug: &str) -> ContentRecord {
    ContentRecord {
        slug: slug.to_string(),
        content_type: "page".to_string(),
        folder: "blog".to_string(),
        ..Default::default()
    }
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups (panic with the available names on miss)
// =========================================================================

/// Find a record by slug. Panics if not found.
pub fn find_record<'a>(records: &'a [ContentRecord], slug: &str) -> &'a ContentRecord {
    records.iter().find(|r| r.slug == slug).unwrap_or_else(|| {
        let available = slugs(records);
        panic!("record '{slug}' not found. Available: {available:?}")
    })
}

/// Find a folder report by folder name. Panics if not found.
pub fn find_folder<'a>(report: &'a BuildReport, name: &str) -> &'a FolderReport {
    report
        .folders
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = report.folders.iter().map(|f| f.name.as_str()).collect();
            panic!("folder '{name}' not found. Available: {names:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All slugs in record order.
pub fn slugs(records: &[ContentRecord]) -> Vec<String> {
    records.iter().map(|r| r.slug.clone()).collect()
}
