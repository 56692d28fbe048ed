//! Free-form key/value details attached to records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single details value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailValue {
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Boolean flag.
    Bool(bool),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl DetailValue {
    /// Returns the byte footprint of the value.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Int(_) => std::mem::size_of::<i32>(),
            Self::Long(_) => std::mem::size_of::<i64>(),
            Self::Bool(_) => std::mem::size_of::<bool>(),
            Self::Text(s) => s.len(),
            Self::Bytes(b) => b.len(),
        }
    }
}

/// Details map. Ordered so that encoding is deterministic.
pub type UdDetails = BTreeMap<String, DetailValue>;

/// Returns the byte footprint of a details map: every key plus every value.
#[must_use]
pub fn details_size(details: &UdDetails) -> usize {
    details.iter().map(|(k, v)| k.len() + v.size()).sum()
}
