//! Entry structure for the calculation history.
//!
//! Represents a single completed calculation with its display expression,
//! formatted result, user memo and creation time.

use serde::{Deserialize, Serialize};

/// A single completed calculation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Stable identity, distinct from the timestamp. Assigned by the store.
    pub id: i64,
    /// The display text at the moment "=" was pressed, operator glyphs as typed.
    pub expression: String,
    /// The formatted numeric result.
    pub result: String,
    /// User-editable annotation, empty by default.
    pub memo: String,
    /// Unix milliseconds at creation, immutable afterwards.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(id: i64, expression: &str, result: &str, timestamp: i64) -> Self {
        HistoryEntry {
            id,
            expression: expression.to_string(),
            result: result.to_string(),
            memo: String::new(),
            timestamp,
        }
    }
}
