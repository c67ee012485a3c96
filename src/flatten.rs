//! Attribute flattening: one record per value of a multi-valued attribute.
//!
//! Grouping by an attribute that holds several values (a work in two
//! fandoms, a post with three tags) lists the record under each value. The
//! flattener produces that by emitting one shallow copy per value:
//!
//! | value of `attribute` | output |
//! |----------------------|--------|
//! | series list          | one copy per entry: `series` = entry title, `series_index` = entry index |
//! | sequence             | one copy per element, attribute = that element |
//! | absent / empty       | one copy, attribute = `""` |
//! | scalar               | the record, unchanged |
//!
//! Input records are never modified.

use crate::types::{AttrValue, ContentRecord, FieldValue, Groupable, SERIES_INDEX_KEY};

/// Flatten `records` by `attribute`, preserving input order.
pub fn flatten(records: &[ContentRecord], attribute: &str) -> Vec<ContentRecord> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        flatten_one(record, attribute, &mut out);
    }
    out
}

fn flatten_one(record: &ContentRecord, attribute: &str, out: &mut Vec<ContentRecord>) {
    match record.value_at(attribute) {
        AttrValue::SeriesList(entries) if !entries.is_empty() => {
            for entry in entries {
                let mut copy = record.with_field(attribute, FieldValue::Text(entry.title.clone()));
                copy.set_field(SERIES_INDEX_KEY, FieldValue::Text(entry.index.clone()));
                out.push(copy);
            }
        }
        AttrValue::Sequence(items) if !items.is_empty() => {
            for item in items {
                out.push(record.with_field(attribute, FieldValue::Text(item.clone())));
            }
        }
        AttrValue::Absent | AttrValue::Sequence(_) | AttrValue::SeriesList(_) => {
            out.push(record.with_field(attribute, FieldValue::Text(String::new())));
        }
        AttrValue::Scalar(_) => out.push(record.clone()),
    }
}
