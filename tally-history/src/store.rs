use super::*;

/// The in-memory collection of past calculations.
///
/// Pure model with no I/O; durability is layered on top by the caller.
/// Entries are immutable except for the memo field.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    pub entries: Vec<HistoryEntry>,
    pub changed: bool,
}

impl HistoryStore {
    /// Insert an entry carrying its identity and timestamp.
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        self.changed = true;
    }

    /// The next free identity for callers without an external id source.
    pub fn next_id(&self) -> i64 {
        self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    /// Remove all but the newest `keep` entries (by timestamp, id as tiebreak).
    pub fn truncate(&mut self, keep: usize) {
        if self.entries.len() <= keep {
            return;
        }
        let mut sorted = self.sorted();
        sorted.truncate(keep);
        self.entries = sorted;
        self.changed = true;
    }

    /// Delete an entry by identity; no-op when absent.
    pub fn delete(&mut self, id: i64) {
        if let Some(idx) = self.entries.iter().position(|e| e.id == id) {
            self.entries.remove(idx);
            self.changed = true;
        }
    }

    /// Set the memo on the matching entry. Returns false when the id is unknown.
    pub fn update_memo(&mut self, id: i64, memo: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.memo = memo.to_string();
                self.changed = true;
                true
            }
            None => false,
        }
    }

    /// Snapshot of all entries, newest first.
    pub fn sorted(&self) -> Vec<HistoryEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, timestamp: i64) -> HistoryEntry {
        HistoryEntry::new(id, "1+1", "2", timestamp)
    }

    #[test]
    fn test_sorted_newest_first() {
        let mut store = HistoryStore::default();
        store.add(entry(1, 100));
        store.add(entry(2, 300));
        store.add(entry(3, 200));

        let sorted = store.sorted();
        let ids: Vec<i64> = sorted.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sorted_same_instant_uses_id() {
        let mut store = HistoryStore::default();
        store.add(entry(1, 100));
        store.add(entry(2, 100));

        let sorted = store.sorted();
        assert_eq!(sorted[0].id, 2);
        assert_eq!(sorted[1].id, 1);
    }

    #[test]
    fn test_truncate_drops_oldest() {
        let mut store = HistoryStore::default();
        for i in 0..=RETENTION_LIMIT as i64 {
            store.add(entry(i + 1, i));
        }
        assert_eq!(store.len(), RETENTION_LIMIT + 1);

        store.truncate(RETENTION_LIMIT);
        assert_eq!(store.len(), RETENTION_LIMIT);
        // The entry with the earliest timestamp is gone
        assert!(!store.entries.iter().any(|e| e.id == 1));
    }

    #[test]
    fn test_truncate_below_limit_is_noop() {
        let mut store = HistoryStore::default();
        store.add(entry(1, 100));
        store.changed = false;

        store.truncate(RETENTION_LIMIT);
        assert_eq!(store.len(), 1);
        assert!(!store.changed);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = HistoryStore::default();
        store.add(entry(1, 100));

        store.delete(1);
        assert!(store.is_empty());
        store.delete(1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_memo() {
        let mut store = HistoryStore::default();
        store.add(entry(1, 100));

        assert!(store.update_memo(1, "groceries"));
        assert_eq!(store.entries[0].memo, "groceries");
        // Only the memo changes
        assert_eq!(store.entries[0].expression, "1+1");
        assert_eq!(store.entries[0].timestamp, 100);
    }

    #[test]
    fn test_update_memo_unknown_id() {
        let mut store = HistoryStore::default();
        store.add(entry(1, 100));
        store.changed = false;

        assert!(!store.update_memo(42, "nope"));
        assert_eq!(store.entries[0].memo, "");
        assert!(!store.changed);
    }

    #[test]
    fn test_next_id() {
        let mut store = HistoryStore::default();
        assert_eq!(store.next_id(), 1);
        store.add(entry(7, 100));
        assert_eq!(store.next_id(), 8);
    }
}
