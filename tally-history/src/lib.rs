mod entry;
mod group;
mod store;

/// How many entries the history keeps; older ones are pruned.
pub const RETENTION_LIMIT: usize = 100;

/// Return the current time as Unix milliseconds.
pub fn current_time_millis() -> i64 {
    match std::time::SystemTime::now().duration_since(std::time::SystemTime::UNIX_EPOCH) {
        Ok(n) => n.as_millis() as i64,
        Err(e) => {
            tracing::error!("invalid system time: {}", e);
            std::process::exit(1);
        }
    }
}

pub use crate::entry::HistoryEntry;
pub use crate::group::HistoryGroup;
pub use crate::group::group_by_day;
pub use crate::group::local_day;
pub use crate::store::HistoryStore;
