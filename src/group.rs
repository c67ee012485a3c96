//! Sorting and recursive grouping of record sets.
//!
//! ## Ordering
//!
//! Attribute values are compared through [`sort_key`]: integers compare
//! numerically (`"10"` after `"9"`), text compares case-insensitively, and
//! an absent attribute sorts like an empty one. [`order_records`] applies a
//! list of `order_by` keys as repeated stable sorts in reverse key order, so
//! the first configured key dominates and ties keep their previous order.
//!
//! ## Grouping
//!
//! [`group_recursive`] turns a record set and a list of attributes into a
//! flat, pre-order sequence of [`GroupNode`]s annotated with depth:
//!
//! ```text
//! group_by = ["fandom", "series"]
//!
//! ("Marvel", [],        1)   heading
//! ("",       [a, b],    2)   works in no series
//! ("Foo",    [c, d],    2)   series Foo
//! ("Star Trek", [],     1)
//! ("",       [e],       2)
//! ```
//!
//! Each level flattens its attribute first (see [`crate::flatten`]), so a
//! record with two fandoms is listed under both. Empty keys never produce a
//! heading node; their records are still emitted.

use crate::config::OrderKey;
use crate::flatten::flatten;
use crate::tags::fandom_parent;
use crate::types::{AttrValue, ContentRecord, FieldValue, GroupNode, Groupable};
use std::cmp::Ordering;

/// One comparable component of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyPart {
    Number(i64),
    /// Lowercased text first, original spelling as tie-break.
    Text(String, String),
}

fn key_part(value: &str) -> KeyPart {
    let trimmed = value.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => KeyPart::Number(n),
        Err(_) => KeyPart::Text(trimmed.to_lowercase(), trimmed.to_string()),
    }
}

/// Comparable form of an attribute value.
pub fn sort_key(value: AttrValue<'_>) -> Vec<KeyPart> {
    match value {
        AttrValue::Absent => Vec::new(),
        AttrValue::Scalar(s) if s.trim().is_empty() => Vec::new(),
        AttrValue::Scalar(s) => vec![key_part(s)],
        AttrValue::Sequence(items) => items.iter().map(|s| key_part(s)).collect(),
        AttrValue::SeriesList(entries) => entries
            .iter()
            .flat_map(|e| [key_part(&e.title), key_part(&e.index)])
            .collect(),
    }
}

/// Compare two records by one attribute.
pub fn compare_by(a: &ContentRecord, b: &ContentRecord, attribute: &str) -> Ordering {
    sort_key(a.value_at(attribute)).cmp(&sort_key(b.value_at(attribute)))
}

/// Sort records by the configured keys, first key dominating.
pub fn order_records(records: &mut [ContentRecord], order_by: &[OrderKey]) {
    for key in order_by.iter().rev() {
        records.sort_by(|a, b| {
            let ord = compare_by(a, b, &key.attribute);
            if key.descending { ord.reverse() } else { ord }
        });
    }
}

/// Rewrite `attribute` through the fandom alias groups.
///
/// The attribute is flattened first. A value belonging to a group becomes
/// the group's representative; the original label is kept under
/// `sub<attribute>` (e.g. `subfandom`) unless it already is the
/// representative.
pub fn group_fandoms(
    records: &[ContentRecord],
    attribute: &str,
    fandom_groups: &[Vec<String>],
) -> Vec<ContentRecord> {
    if fandom_groups.is_empty() {
        return records.to_vec();
    }
    let sub_attribute = format!("sub{attribute}");
    flatten(records, attribute)
        .into_iter()
        .map(|mut record| {
            let label = record.value_at(attribute).key();
            if let Some(parent) = fandom_parent(&label, fandom_groups) {
                if parent.to_lowercase() != label.trim().to_lowercase() {
                    record.set_field(&sub_attribute, FieldValue::Text(label.trim().to_string()));
                }
                record.set_field(attribute, FieldValue::Text(parent.to_string()));
            }
            record
        })
        .collect()
}

/// Recursively group `records` by `attributes`, outermost first.
///
/// Concatenating the `records` of all returned nodes yields the flattened,
/// sorted input exactly once.
pub fn group_recursive(
    records: &[ContentRecord],
    attributes: &[String],
    depth: usize,
) -> Vec<GroupNode> {
    let Some((attribute, rest)) = attributes.split_first() else {
        if records.is_empty() {
            return Vec::new();
        }
        return vec![GroupNode {
            key: String::new(),
            records: records.to_vec(),
            depth: depth + 1,
        }];
    };

    let mut working = flatten(records, attribute);
    working.sort_by(|a, b| compare_by(a, b, attribute));

    let mut out = Vec::new();
    for (key, run) in contiguous_runs(working, attribute) {
        if rest.is_empty() {
            out.push(GroupNode {
                key,
                records: run,
                depth: depth + 1,
            });
            continue;
        }
        if !key.is_empty() {
            out.push(GroupNode {
                key,
                records: Vec::new(),
                depth: depth + 1,
            });
        }
        out.extend(group_recursive(&run, rest, depth + 1));
    }
    out
}

/// Split sorted records into runs of equal key.
fn contiguous_runs(records: Vec<ContentRecord>, attribute: &str) -> Vec<(String, Vec<ContentRecord>)> {
    let mut runs: Vec<(String, Vec<ContentRecord>)> = Vec::new();
    for record in records {
        let key = record.value_at(attribute).key();
        match runs.last_mut() {
            Some((last_key, members)) if *last_key == key => members.push(record),
            _ => runs.push((key, vec![record])),
        }
    }
    runs
}
