//! Day-grouping of history entries for display.
//!
//! Groups are derived on every read and never persisted or cached; the
//! grouping is a pure function of the entry collection.

use crate::entry::HistoryEntry;
use chrono::{Local, NaiveDate, TimeZone};

/// Entries sharing one local calendar day, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryGroup {
    pub day: NaiveDate,
    pub entries: Vec<HistoryEntry>,
}

/// The local calendar day a Unix-millisecond timestamp falls on.
pub fn local_day(timestamp_millis: i64) -> NaiveDate {
    Local
        .timestamp_millis_opt(timestamp_millis)
        .earliest()
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// Partition entries into day buckets ordered most-recent-day-first,
/// each bucket sorted newest-first. No entry is dropped or duplicated.
pub fn group_by_day(entries: &[HistoryEntry]) -> Vec<HistoryGroup> {
    let mut sorted: Vec<HistoryEntry> = entries.to_vec();
    sorted.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));

    // Sorted by timestamp descending, entries of one local day are contiguous.
    let mut groups: Vec<HistoryGroup> = Vec::new();
    for entry in sorted {
        let day = local_day(entry.timestamp);
        match groups.last_mut() {
            Some(group) if group.day == day => group.entries.push(entry),
            _ => groups.push(HistoryGroup {
                day,
                entries: vec![entry],
            }),
        }
    }
    groups
}
