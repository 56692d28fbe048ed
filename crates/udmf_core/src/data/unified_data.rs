//! A unified data object: one runtime block plus its records.

use super::record::UnifiedRecord;
use super::runtime::Runtime;
use crate::types::UdType;

/// A logical unified data object: one runtime block plus ordered records.
///
/// An object read back from an empty scan has no runtime and no records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnifiedData {
    /// Runtime metadata.
    pub runtime: Option<Runtime>,
    /// Records in insertion order.
    pub records: Vec<UnifiedRecord>,
}

impl UnifiedData {
    /// Creates an object with the given runtime and no records.
    pub fn new(runtime: Runtime) -> Self {
        Self {
            runtime: Some(runtime),
            records: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn add_record(&mut self, record: UnifiedRecord) {
        self.records.push(record);
    }

    /// Builder form of [`UnifiedData::add_record`].
    #[must_use]
    pub fn with_record(mut self, record: UnifiedRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Returns the runtime block, if any.
    #[must_use]
    pub fn runtime(&self) -> Option<&Runtime> {
        self.runtime.as_ref()
    }

    /// Returns true if the object has neither runtime nor records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runtime.is_none() && self.records.is_empty()
    }

    /// Returns the kinds of the records, in order.
    #[must_use]
    pub fn types(&self) -> Vec<UdType> {
        self.records.iter().map(UnifiedRecord::kind).collect()
    }

    /// Returns the summed size of all records.
    #[must_use]
    pub fn size(&self) -> usize {
        self.records.iter().map(UnifiedRecord::size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PlainText, RecordValue, UnifiedKey};

    #[test]
    fn default_is_empty() {
        assert!(UnifiedData::default().is_empty());
        assert!(!UnifiedData::new(Runtime::default()).is_empty());
    }

    #[test]
    fn records_keep_order() {
        let data = UnifiedData::new(Runtime::new(UnifiedKey::new("drag", "b", "g")))
            .with_record(UnifiedRecord::with_uid(
                "z",
                RecordValue::PlainText(PlainText::new("ab")),
            ))
            .with_record(UnifiedRecord::with_uid(
                "a",
                RecordValue::PlainText(PlainText::new("c")),
            ));
        let uids: Vec<&str> = data.records.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, ["z", "a"]);
        assert_eq!(data.size(), 3);
        assert_eq!(data.types(), [UdType::PlainText, UdType::PlainText]);
    }
}
