//! Key scheme.
//!
//! One unified data object is stored as `1 + records` entries:
//!
//! ```text
//! udmf://<intention>/<bundle>/<group_id>          runtime block (group key)
//! udmf://<intention>/<bundle>/<group_id>/<uid>    one record (member key)
//! ```
//!
//! The number of `/` characters is the only thing that tells the runtime
//! entry apart from a record entry inside a flat prefix scan, so record uids
//! must never contain `/`.

use crate::data::{Runtime, UnifiedKey};
use crate::error::{CoreError, CoreResult};

/// Namespace prefix of every key. Clearing this prefix clears the store.
pub const DATA_PREFIX: &str = "udmf://";

/// Number of `/` characters in a group key.
pub const GROUP_KEY_SLASH_COUNT: usize = 4;

/// Separator between key segments.
pub const SEPARATOR: char = '/';

/// Returns the group key of an object.
#[must_use]
pub fn group_key(runtime: &Runtime) -> String {
    runtime.key.unified_key()
}

/// Returns the key of a record inside a group.
#[must_use]
pub fn member_key(group_key: &str, uid: &str) -> String {
    format!("{group_key}{SEPARATOR}{uid}")
}

/// Counts `/` characters in a key.
#[must_use]
pub fn slash_count(key: &str) -> usize {
    key.bytes().filter(|b| *b == b'/').count()
}

/// Returns true if the key has the group-key shape.
#[must_use]
pub fn is_group_key(key: &str) -> bool {
    slash_count(key) == GROUP_KEY_SLASH_COUNT
}

/// Returns true if `key` is the group key itself or one of its member keys.
///
/// A plain prefix test would also match `G1` when scanning `G`; this checks
/// the segment boundary.
#[must_use]
pub fn belongs_to_group(key: &[u8], group_key: &str) -> bool {
    let group = group_key.as_bytes();
    match key.strip_prefix(group) {
        Some(rest) => rest.is_empty() || rest.first() == Some(&b'/'),
        None => false,
    }
}

/// Checks that a group key has the `udmf://a/b/c` shape with no empty
/// segment, i.e. that [`UnifiedKey::parse`] accepts it.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameters`] otherwise.
pub fn validate_group_key(key: &str) -> CoreResult<()> {
    if UnifiedKey::parse(key).is_none() {
        return Err(CoreError::invalid_parameters(format!(
            "not a group key: {key}"
        )));
    }
    Ok(())
}

/// Checks that a record uid can be used as the last key segment.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameters`] for an empty uid or one containing `/`.
pub fn validate_uid(uid: &str) -> CoreResult<()> {
    if uid.is_empty() {
        return Err(CoreError::invalid_parameters("record uid is empty"));
    }
    if uid.contains(SEPARATOR) {
        return Err(CoreError::invalid_parameters(format!(
            "record uid contains '{SEPARATOR}': {uid}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_and_member_keys() {
        let runtime = Runtime::new(UnifiedKey::new("drag", "com.x", "g1"));
        let group = group_key(&runtime);
        assert_eq!(group, "udmf://drag/com.x/g1");
        assert!(is_group_key(&group));

        let member = member_key(&group, "r1");
        assert_eq!(member, "udmf://drag/com.x/g1/r1");
        assert_eq!(slash_count(&member), GROUP_KEY_SLASH_COUNT + 1);
        assert!(!is_group_key(&member));
    }

    #[test]
    fn prefix_is_not_a_group() {
        assert!(!is_group_key(DATA_PREFIX));
        assert!(validate_group_key(DATA_PREFIX).is_err());
        assert!(validate_group_key("udmf://drag/com.x/g1").is_ok());
        assert!(validate_group_key("file://drag/com.x/g1").is_err());
    }

    #[test]
    fn empty_segments_are_not_group_keys() {
        for bad in ["udmf:////", "udmf:///a/b", "udmf://a//b", "udmf://a/b/"] {
            assert!(is_group_key(bad), "{bad}");
            assert!(validate_group_key(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn group_boundary() {
        let group = "udmf://drag/com.x/g1";
        assert!(belongs_to_group(b"udmf://drag/com.x/g1", group));
        assert!(belongs_to_group(b"udmf://drag/com.x/g1/r1", group));
        assert!(!belongs_to_group(b"udmf://drag/com.x/g10", group));
        assert!(!belongs_to_group(b"udmf://drag/com.x/g10/r1", group));
        assert!(!belongs_to_group(b"udmf://drag/com.x", group));
    }

    #[test]
    fn uid_validation() {
        assert!(validate_uid("abc").is_ok());
        assert!(validate_uid("").is_err());
        assert!(matches!(
            validate_uid("a/b"),
            Err(CoreError::InvalidParameters { .. })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sibling_groups_never_overlap(
                group in "[a-z0-9]{1,8}",
                suffix in "[a-z0-9]{1,4}",
                uid in "[a-z0-9]{1,8}",
            ) {
                let own = format!("udmf://drag/com.x/{group}");
                let sibling = format!("{own}{suffix}");

                prop_assert!(belongs_to_group(member_key(&own, &uid).as_bytes(), &own));
                prop_assert!(!belongs_to_group(sibling.as_bytes(), &own));
                prop_assert!(!belongs_to_group(member_key(&sibling, &uid).as_bytes(), &own));
            }
        }
    }
}
