//! Per-kind size summary of a unified data object.

use super::record::UnifiedRecord;
use std::collections::BTreeMap;

/// Per-kind byte sizes of an object's records. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    /// Cumulative size per type identifier.
    pub summary: BTreeMap<String, u64>,
    /// Cumulative size over all records.
    pub total_size: u64,
}

impl Summary {
    /// Accumulates the sizes of `records`.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a UnifiedRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.add(record);
        }
        summary
    }

    /// Adds one record's size.
    pub fn add(&mut self, record: &UnifiedRecord) {
        let size = record.size() as u64;
        *self
            .summary
            .entry(record.kind().as_str().to_string())
            .or_insert(0) += size;
        self.total_size += size;
    }
}
