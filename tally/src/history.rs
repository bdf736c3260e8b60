//! Durable calculation history.
//!
//! [`History`] layers SQLite persistence over the pure in-memory
//! [`HistoryStore`]. All writes are synchronous: once a mutation returns,
//! any later read (in this process or after a restart) observes it.

use crate::db::Db;
use crate::environment;
use crate::errors::CalcError;
use anyhow::Result;
use rusqlite::params;
use tally_history::{
    HistoryEntry, HistoryGroup, HistoryStore, RETENTION_LIMIT, current_time_millis, group_by_day,
};
use tracing::debug;

#[derive(Debug)]
pub struct History {
    db: Option<Db>,
    store: HistoryStore,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// In-memory only history, used by tests and one-shot evaluation fallbacks.
    pub fn new() -> Self {
        History {
            db: None,
            store: HistoryStore::default(),
        }
    }

    pub fn from_file(name: &str) -> Result<Self> {
        let file_path = environment::get_data_file(format!("{}.db", name).as_str())?;
        Self::from_path(file_path)
    }

    pub fn from_path(path: std::path::PathBuf) -> Result<Self> {
        let db = Db::new(path)?;
        let mut history = History {
            db: Some(db),
            store: HistoryStore::default(),
        };
        let loaded = history.load()?;
        debug!("loaded {} history entries", loaded);
        Ok(history)
    }

    /// Reload the newest entries from disk, newest first.
    pub fn load(&mut self) -> Result<usize> {
        if let Some(db) = &self.db {
            let conn = db.get_connection();
            let mut stmt = conn.prepare(
                "SELECT id, expression, result, memo, timestamp
                 FROM calc_history
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt.query_map(params![RETENTION_LIMIT as i64], |row| {
                Ok(HistoryEntry {
                    id: row.get(0)?,
                    expression: row.get(1)?,
                    result: row.get(2)?,
                    memo: row.get(3)?,
                    timestamp: row.get(4)?,
                })
            })?;

            self.store.entries.clear();
            for r in rows.flatten() {
                self.store.entries.push(r);
            }
            self.store.changed = false;
        }
        Ok(self.store.len())
    }

    /// Record a completed calculation and prune to the retention limit,
    /// all before returning.
    pub fn record(&mut self, expression: &str, result: &str) -> Result<HistoryEntry, CalcError> {
        let timestamp = current_time_millis();

        let id = if let Some(db) = &self.db {
            let conn = db.get_connection();
            conn.execute(
                "INSERT INTO calc_history (expression, result, memo, timestamp)
                 VALUES (?1, ?2, '', ?3)",
                params![expression, result, timestamp],
            )?;
            conn.last_insert_rowid()
        } else {
            self.store.next_id()
        };

        let entry = HistoryEntry::new(id, expression, result, timestamp);
        self.store.add(entry.clone());
        self.prune()?;

        Ok(entry)
    }

    fn prune(&mut self) -> Result<(), CalcError> {
        if self.store.len() <= RETENTION_LIMIT {
            return Ok(());
        }
        if let Some(db) = &self.db {
            let conn = db.get_connection();
            conn.execute(
                "DELETE FROM calc_history WHERE id NOT IN (
                    SELECT id FROM calc_history
                    ORDER BY timestamp DESC, id DESC
                    LIMIT ?1
                 )",
                params![RETENTION_LIMIT as i64],
            )?;
        }
        self.store.truncate(RETENTION_LIMIT);
        Ok(())
    }

    /// Delete an entry by identity; idempotent when already absent.
    pub fn delete(&mut self, id: i64) -> Result<(), CalcError> {
        if let Some(db) = &self.db {
            let conn = db.get_connection();
            conn.execute("DELETE FROM calc_history WHERE id = ?1", params![id])?;
        }
        self.store.delete(id);
        Ok(())
    }

    /// Set the memo on an entry. Returns false when the id is unknown;
    /// persistence errors propagate for the caller to log.
    pub fn update_memo(&mut self, id: i64, memo: &str) -> Result<bool, CalcError> {
        if !self.store.update_memo(id, memo) {
            return Ok(false);
        }
        if let Some(db) = &self.db {
            let conn = db.get_connection();
            conn.execute(
                "UPDATE calc_history SET memo = ?1 WHERE id = ?2",
                params![memo, id],
            )?;
        }
        Ok(true)
    }

    /// Snapshot of all entries, newest first.
    pub fn sorted(&self) -> Vec<HistoryEntry> {
        self.store.sorted()
    }

    /// Day-grouped view, re-derived from the current contents on every call.
    pub fn grouped(&self) -> Vec<HistoryGroup> {
        group_by_day(&self.store.entries)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    fn temp_history() -> (tempfile::TempDir, History) {
        let dir = tempfile::tempdir().unwrap();
        let history = History::from_path(dir.path().join("calc.db")).unwrap();
        (dir, history)
    }

    #[test]
    fn test_record_and_reload() -> Result<()> {
        init();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("calc.db");

        let mut history = History::from_path(path.clone())?;
        let entry = history.record("2+3×4", "14")?;
        assert_eq!(entry.expression, "2+3×4");
        assert_eq!(entry.memo, "");

        // A fresh open observes the write
        let reopened = History::from_path(path)?;
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.sorted()[0].result, "14");
        Ok(())
    }

    #[test]
    fn test_prune_keeps_newest_hundred() -> Result<()> {
        init();
        let (_dir, mut history) = temp_history();

        let mut first_id = None;
        for i in 0..=RETENTION_LIMIT {
            let entry = history.record(&format!("{}+0", i), &format!("{}", i))?;
            if i == 0 {
                first_id = Some(entry.id);
            }
        }

        assert_eq!(history.len(), RETENTION_LIMIT);
        let first_id = first_id.unwrap();
        assert!(!history.sorted().iter().any(|e| e.id == first_id));
        Ok(())
    }

    #[test]
    fn test_prune_durable() -> Result<()> {
        init();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("calc.db");

        let mut history = History::from_path(path.clone())?;
        for i in 0..=RETENTION_LIMIT {
            history.record(&format!("{}+0", i), &format!("{}", i))?;
        }

        let reopened = History::from_path(path)?;
        assert_eq!(reopened.len(), RETENTION_LIMIT);
        Ok(())
    }

    #[test]
    fn test_delete_idempotent() -> Result<()> {
        init();
        let (_dir, mut history) = temp_history();
        let entry = history.record("1+1", "2")?;

        history.delete(entry.id)?;
        assert!(history.is_empty());
        history.delete(entry.id)?;
        assert!(history.is_empty());
        Ok(())
    }

    #[test]
    fn test_update_memo_roundtrip() -> Result<()> {
        init();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("calc.db");

        let mut history = History::from_path(path.clone())?;
        let entry = history.record("5-3", "2")?;
        assert!(history.update_memo(entry.id, "change due")?);

        let reopened = History::from_path(path)?;
        assert_eq!(reopened.sorted()[0].memo, "change due");
        Ok(())
    }

    #[test]
    fn test_update_memo_unknown_id() -> Result<()> {
        init();
        let (_dir, mut history) = temp_history();
        let entry = history.record("1+1", "2")?;

        assert!(!history.update_memo(entry.id + 99, "nope")?);
        assert_eq!(history.sorted()[0].memo, "");
        Ok(())
    }

    #[test]
    fn test_grouped_reflects_mutations() -> Result<()> {
        init();
        let (_dir, mut history) = temp_history();
        let entry = history.record("1+1", "2")?;
        assert_eq!(history.grouped().len(), 1);

        history.delete(entry.id)?;
        assert!(history.grouped().is_empty());
        Ok(())
    }
}
