//! Content directory discovery.
//!
//! Walks the content root and classifies what it finds. Nothing is parsed
//! here; extraction happens per file in [`crate::generate`].
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── config.toml                  # Site configuration (optional)
//! ├── _index.html                  # Home page → index.html
//! ├── about.html                   # Root page → about/index.html
//! ├── blog/                        # Folder → blog/index.html listing
//! │   ├── _index.html              # Folder headers (optional)
//! │   ├── 2020-01-01-a.html        # Source file
//! │   └── 2020-01-02-b.md
//! └── works/
//!     ├── config.toml              # Folder config (overrides root)
//!     └── 2021-06-01-fic.html      # Archive export
//! ```
//!
//! ## Naming Conventions
//!
//! - **Sources** match `[!_]*.*`: a dot somewhere, no leading underscore
//! - **`_index.*`**: home page at the root, folder headers inside a folder
//! - **Hidden entries** (leading `.`) and config files are skipped
//! - Folders with a leading `_` (such as `_site`) are skipped
//! - Folders nested deeper than one level are ignored

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Content directory not found: {0}")]
    MissingRoot(PathBuf),
}

const CONFIG_FILES: &[&str] = &["config.toml", "params.json"];
const INDEX_PREFIX: &str = "_index.";

/// Everything discovered under the content root.
#[derive(Debug, Serialize)]
pub struct ContentTree {
    pub root: PathBuf,
    /// `_index.*` at the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    /// Source files directly under the root.
    pub pages: Vec<PathBuf>,
    /// Top-level folders, sorted by name.
    pub folders: Vec<Folder>,
}

/// A top-level content folder.
#[derive(Debug, Serialize)]
pub struct Folder {
    pub name: String,
    pub path: PathBuf,
    /// `_index.*` whose headers become folder parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<PathBuf>,
    /// Source files, sorted by name.
    pub sources: Vec<PathBuf>,
}

impl ContentTree {
    pub fn folder_names(&self) -> Vec<String> {
        self.folders.iter().map(|f| f.name.clone()).collect()
    }

    pub fn source_count(&self) -> usize {
        self.pages.len() + self.folders.iter().map(|f| f.sources.len()).sum::<usize>()
    }
}

pub fn scan(root: &Path) -> Result<ContentTree, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let mut home = None;
    let mut pages = Vec::new();
    let mut folders: BTreeMap<String, Folder> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path().to_path_buf();

        if entry.file_type().is_dir() {
            if entry.depth() == 1 {
                folders.insert(
                    name.clone(),
                    Folder {
                        name,
                        path,
                        index: None,
                        sources: Vec::new(),
                    },
                );
            } else {
                debug!(path = %path.display(), "ignoring nested folder");
            }
            continue;
        }

        let kind = classify_file(&name);
        if entry.depth() == 1 {
            match kind {
                FileKind::Index => home = Some(path),
                FileKind::Source => pages.push(path),
                FileKind::Other => {}
            }
            continue;
        }

        let Some(folder_name) = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
        else {
            continue;
        };
        let Some(folder) = folders.get_mut(&folder_name) else {
            continue;
        };
        match kind {
            FileKind::Index => folder.index = Some(path),
            FileKind::Source => folder.sources.push(path),
            FileKind::Other => {}
        }
    }

    Ok(ContentTree {
        root: root.to_path_buf(),
        home,
        pages,
        folders: folders.into_values().collect(),
    })
}

#[derive(Debug, PartialEq)]
enum FileKind {
    Index,
    Source,
    Other,
}

fn classify_file(name: &str) -> FileKind {
    if name.starts_with(INDEX_PREFIX) {
        FileKind::Index
    } else if name.starts_with('_') || !name.contains('.') || CONFIG_FILES.contains(&name) {
        FileKind::Other
    } else {
        FileKind::Source
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.depth() > 0
        && (name.starts_with('.') || (entry.file_type().is_dir() && name.starts_with('_')))
}
