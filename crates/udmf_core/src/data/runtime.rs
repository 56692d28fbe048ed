//! Runtime metadata block and the unified key.

use crate::key::DATA_PREFIX;
use crate::types::DataStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one unified data object.
///
/// The textual form is `udmf://<intention>/<bundle_name>/<group_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnifiedKey {
    /// Cached textual key. Empty until built or parsed.
    pub key: String,
    /// Data intention (e.g. `drag`).
    pub intention: String,
    /// Bundle that created the data.
    pub bundle_name: String,
    /// Unique group id within the bundle.
    pub group_id: String,
}

impl UnifiedKey {
    /// Creates a key from its segments and caches the textual form.
    pub fn new(
        intention: impl Into<String>,
        bundle_name: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Self {
        let mut key = Self {
            key: String::new(),
            intention: intention.into(),
            bundle_name: bundle_name.into(),
            group_id: group_id.into(),
        };
        key.key = key.build();
        key
    }

    /// Returns the textual key, building it from the segments when no
    /// cached form is present.
    #[must_use]
    pub fn unified_key(&self) -> String {
        if self.key.is_empty() {
            self.build()
        } else {
            self.key.clone()
        }
    }

    /// Parses `udmf://<intention>/<bundle_name>/<group_id>`.
    ///
    /// Returns `None` if the prefix is missing, a segment is empty, or the
    /// key does not have exactly three segments after the prefix.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(DATA_PREFIX)?;
        let mut parts = rest.split('/');
        let intention = parts.next()?;
        let bundle_name = parts.next()?;
        let group_id = parts.next()?;
        if parts.next().is_some() || [intention, bundle_name, group_id].iter().any(|s| s.is_empty())
        {
            return None;
        }
        Some(Self {
            key: key.to_string(),
            intention: intention.to_string(),
            bundle_name: bundle_name.to_string(),
            group_id: group_id.to_string(),
        })
    }

    /// Returns true if the textual key parses back as a group key.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Self::parse(&self.unified_key()).is_some()
    }

    fn build(&self) -> String {
        format!(
            "{DATA_PREFIX}{}/{}/{}",
            self.intention, self.bundle_name, self.group_id
        )
    }
}

impl fmt::Display for UnifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unified_key())
    }
}

/// Access grant for one caller token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Privilege {
    /// Caller token id.
    pub token_id: u32,
    /// Permission required to read.
    pub read_permission: String,
    /// Permission required to write.
    pub write_permission: String,
}

/// Runtime metadata of a unified data object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Runtime {
    /// Group key of the object.
    pub key: UnifiedKey,
    /// Whether the object is private to its creator.
    pub is_private: bool,
    /// Access grants.
    pub privileges: Vec<Privilege>,
    /// Creation time, milliseconds since the Unix epoch.
    pub create_time: i64,
    /// Last modification time, milliseconds since the Unix epoch.
    pub last_modified_time: i64,
    /// Package the data originates from.
    pub source_package: String,
    /// Package that created the object.
    pub create_package: String,
    /// Device that created the object.
    pub device_id: String,
    /// Number of records at write time.
    pub record_total_num: u32,
    /// Lifecycle status.
    pub data_status: DataStatus,
    /// Version of the object.
    pub data_version: i32,
}

impl Runtime {
    /// Creates runtime metadata for the given key.
    pub fn new(key: UnifiedKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_built_from_segments() {
        let key = UnifiedKey::new("drag", "com.example.notes", "A1b2");
        assert_eq!(key.key, "udmf://drag/com.example.notes/A1b2");
        assert_eq!(key.unified_key(), key.key);
        assert!(key.is_valid());
    }

    #[test]
    fn cached_key_wins_over_segments() {
        let key = UnifiedKey {
            key: "udmf://drag/x/y".into(),
            ..UnifiedKey::default()
        };
        assert_eq!(key.unified_key(), "udmf://drag/x/y");
    }

    #[test]
    fn parse_accepts_group_key() {
        let key = UnifiedKey::parse("udmf://drag/com.x/g1").unwrap();
        assert_eq!(key.intention, "drag");
        assert_eq!(key.bundle_name, "com.x");
        assert_eq!(key.group_id, "g1");
        assert_eq!(key.to_string(), "udmf://drag/com.x/g1");
    }

    #[test]
    fn parse_rejects_other_shapes() {
        for bad in [
            "drag/com.x/g1",
            "udmf://drag/com.x",
            "udmf://drag/com.x/g1/uid",
            "udmf://drag//g1",
            "udmf://",
        ] {
            assert!(UnifiedKey::parse(bad).is_none(), "{bad}");
        }
    }

    #[test]
    fn segment_with_slash_is_invalid() {
        let key = UnifiedKey::new("drag", "com/x", "g1");
        assert!(!key.is_valid());
    }
}
