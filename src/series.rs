//! Series navigation: prev/next links between members of the same series.
//!
//! Runs over one folder's records after every `uri` is final. A record can
//! belong to several series; each [`SeriesEntry`] is linked independently.
//! Adjacency is integer arithmetic on the entry index, so a series with a
//! gap (1, 2, 4) leaves `2.next` and `4.prev` unset. Entries whose index is
//! not an integer are neither registered nor linked.

use crate::types::{ContentRecord, SeriesEntry, SeriesLink};
use std::collections::HashMap;
use tracing::debug;

/// Attach `prev`/`next` links to every series entry in `records`.
///
/// When two records claim the same index in a series, the later one wins.
pub fn link_series(records: &mut [ContentRecord]) {
    let mut registry: HashMap<String, HashMap<i64, SeriesLink>> = HashMap::new();
    for record in records.iter() {
        for entry in record.series() {
            let Some(position) = entry.position() else {
                debug!(slug = %record.slug, index = %entry.index, "series index is not an integer");
                continue;
            };
            let link = SeriesLink {
                uri: record.uri.clone(),
                title: record.display_title().to_string(),
            };
            registry
                .entry(entry.title.clone())
                .or_default()
                .insert(position, link);
        }
    }

    for record in records.iter_mut() {
        let Some(entries) = record.series_mut() else {
            continue;
        };
        for entry in entries.iter_mut() {
            let Some(position) = entry.position() else {
                continue;
            };
            let members = registry.get(&entry.title);
            let neighbour = |offset: i64| {
                let target = position.checked_add(offset)?;
                members.and_then(|m| m.get(&target)).cloned()
            };
            entry.prev = neighbour(-1);
            entry.next = neighbour(1);
        }
    }
}

/// Gather the members of each series at the position of its first member.
///
/// Members are ordered by integer index; ties and non-integer indices keep
/// their incoming order, the latter after all numbered members. Records not
/// in a series stay where they are relative to the series blocks. A record
/// in several series is gathered with the first one it lists.
pub fn series_sort(records: Vec<ContentRecord>) -> Vec<ContentRecord> {
    let mut slots: Vec<Vec<ContentRecord>> = Vec::new();
    let mut slot_of: HashMap<String, usize> = HashMap::new();

    for record in records {
        match record.series().first().map(|entry| entry.title.clone()) {
            Some(title) => {
                let slot = *slot_of.entry(title).or_insert_with(|| {
                    slots.push(Vec::new());
                    slots.len() - 1
                });
                slots[slot].push(record);
            }
            None => slots.push(vec![record]),
        }
    }

    slots
        .into_iter()
        .flat_map(|mut slot| {
            slot.sort_by_key(|r| {
                r.series()
                    .first()
                    .and_then(SeriesEntry::position)
                    .unwrap_or(i64::MAX)
            });
            slot
        })
        .collect()
}
