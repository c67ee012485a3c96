//! Tag classification, merging, and fandom aliasing.
//!
//! Archive exports carry free-form tags. Before they are stored, each one is
//! put into exactly one bucket:
//!
//! 1. **Media**: listed in `taxonomy.media_tags`; collected into `media_type`.
//! 2. **Excluded**: listed in `taxonomy.excluded_tags`; dropped.
//! 3. **Kept**: everything else, after synonym merging via `taxonomy.merge_tags`.
//!
//! Matching is case-insensitive everywhere. Labels nobody configured pass
//! through unchanged (apart from surrounding whitespace).

use crate::config::TagTaxonomy;
use tracing::trace;

/// Bucket a single label falls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagClass {
    /// A media label, spelled as configured.
    Media(String),
    Excluded,
    /// Canonical labels for a kept tag: the tag itself, or the representative
    /// of every merge group that lists it.
    Kept(Vec<String>),
}

/// Tags of one work after classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTags {
    pub media: Vec<String>,
    pub kept: Vec<String>,
}

fn same_label(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn find_label<'a>(list: &'a [String], label: &str) -> Option<&'a String> {
    list.iter().find(|candidate| same_label(candidate, label))
}

/// Classify one raw label against the taxonomy.
pub fn classify(label: &str, taxonomy: &TagTaxonomy) -> TagClass {
    if let Some(media) = find_label(&taxonomy.media_tags, label) {
        return TagClass::Media(media.trim().to_string());
    }
    if find_label(&taxonomy.excluded_tags, label).is_some() {
        return TagClass::Excluded;
    }
    TagClass::Kept(merged(label, taxonomy))
}

/// The label itself, or the representative of every merge group listing it.
fn merged(label: &str, taxonomy: &TagTaxonomy) -> Vec<String> {
    let representatives: Vec<String> = taxonomy
        .merge_tags
        .iter()
        .filter(|group| find_label(group, label).is_some())
        .filter_map(|group| group.first())
        .map(|first| first.trim().to_string())
        .collect();

    if representatives.is_empty() {
        vec![label.trim().to_string()]
    } else {
        representatives
    }
}

fn push_unique(list: &mut Vec<String>, label: String) {
    if !list.iter().any(|existing| same_label(existing, &label)) {
        list.push(label);
    }
}

/// Classify every label of a tag list, preserving first-seen order.
///
/// Duplicates are suppressed within each output list, so two synonyms of
/// the same merge group yield the representative once.
pub fn normalize_tags<'a, I>(labels: I, taxonomy: &TagTaxonomy) -> NormalizedTags
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = NormalizedTags::default();
    for label in labels {
        if label.trim().is_empty() {
            continue;
        }
        match classify(label, taxonomy) {
            TagClass::Media(media) => push_unique(&mut out.media, media),
            TagClass::Excluded => trace!(label, "dropping excluded tag"),
            TagClass::Kept(canonical) => {
                for tag in canonical {
                    push_unique(&mut out.kept, tag);
                }
            }
        }
    }
    out
}

/// Apply merge groups to a label list without media or exclusion handling.
///
/// Used for tag terms other than the general tag list (fandoms,
/// relationships, characters), so spelling variants collapse there too.
/// Duplicates are suppressed and first-seen order is kept.
pub fn merge_labels<'a, I>(labels: I, taxonomy: &TagTaxonomy) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Vec::new();
    for label in labels {
        if label.trim().is_empty() {
            continue;
        }
        for tag in merged(label, taxonomy) {
            push_unique(&mut out, tag);
        }
    }
    out
}

/// Representative of the first fandom group listing `label`.
pub fn fandom_parent<'a>(label: &str, fandom_groups: &'a [Vec<String>]) -> Option<&'a str> {
    fandom_groups
        .iter()
        .find(|group| find_label(group, label).is_some())
        .and_then(|group| group.first())
        .map(|first| first.trim())
}
