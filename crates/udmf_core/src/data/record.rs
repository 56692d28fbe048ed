//! Unified records: one typed payload plus its uid.

use super::kinds::{
    AppItem, ApplicationDefined, FileRef, Form, Html, Link, PixelMap, PlainText, SystemDefined,
    Text,
};
use crate::types::UdType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of record payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordValue {
    /// Generic text.
    Text(Text),
    /// Plain text.
    PlainText(PlainText),
    /// HTML.
    Html(Html),
    /// Hyperlink.
    Hyperlink(Link),
    /// Generic file.
    File(FileRef),
    /// Image file.
    Image(FileRef),
    /// Video file.
    Video(FileRef),
    /// Audio file.
    Audio(FileRef),
    /// Folder.
    Folder(FileRef),
    /// System-defined record.
    SystemDefinedRecord(SystemDefined),
    /// Service form.
    SystemDefinedForm(Form),
    /// Application item.
    SystemDefinedAppItem(AppItem),
    /// Pixel map.
    SystemDefinedPixelMap(PixelMap),
    /// Application-defined payload.
    ApplicationDefined(ApplicationDefined),
}

impl RecordValue {
    /// Returns the kind tag of the payload.
    #[must_use]
    pub const fn kind(&self) -> UdType {
        match self {
            Self::Text(_) => UdType::Text,
            Self::PlainText(_) => UdType::PlainText,
            Self::Html(_) => UdType::Html,
            Self::Hyperlink(_) => UdType::Hyperlink,
            Self::File(_) => UdType::File,
            Self::Image(_) => UdType::Image,
            Self::Video(_) => UdType::Video,
            Self::Audio(_) => UdType::Audio,
            Self::Folder(_) => UdType::Folder,
            Self::SystemDefinedRecord(_) => UdType::SystemDefinedRecord,
            Self::SystemDefinedForm(_) => UdType::SystemDefinedForm,
            Self::SystemDefinedAppItem(_) => UdType::SystemDefinedAppItem,
            Self::SystemDefinedPixelMap(_) => UdType::SystemDefinedPixelMap,
            Self::ApplicationDefined(_) => UdType::ApplicationDefined,
        }
    }

    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Text(v) => v.size(),
            Self::PlainText(v) => v.size(),
            Self::Html(v) => v.size(),
            Self::Hyperlink(v) => v.size(),
            Self::File(v) | Self::Image(v) | Self::Video(v) | Self::Audio(v) | Self::Folder(v) => {
                v.size()
            }
            Self::SystemDefinedRecord(v) => v.size(),
            Self::SystemDefinedForm(v) => v.size(),
            Self::SystemDefinedAppItem(v) => v.size(),
            Self::SystemDefinedPixelMap(v) => v.size(),
            Self::ApplicationDefined(v) => v.size(),
        }
    }
}

/// A record of a unified data object.
///
/// The uid names the record's physical entry, so it must be unique within
/// its object and must not contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    /// Unique id within the owning object.
    pub uid: String,
    /// Typed payload.
    pub value: RecordValue,
}

impl UnifiedRecord {
    /// Creates a record with a freshly generated uid.
    pub fn new(value: RecordValue) -> Self {
        Self {
            uid: Uuid::new_v4().simple().to_string(),
            value,
        }
    }

    /// Creates a record with the given uid.
    pub fn with_uid(uid: impl Into<String>, value: RecordValue) -> Self {
        Self {
            uid: uid.into(),
            value,
        }
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> UdType {
        self.value.kind()
    }

    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        self.value.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_uids_are_unique_and_slash_free() {
        let a = UnifiedRecord::new(RecordValue::Text(Text::default()));
        let b = UnifiedRecord::new(RecordValue::Text(Text::default()));
        assert_ne!(a.uid, b.uid);
        assert!(!a.uid.contains('/'));
    }

    #[test]
    fn file_variants_share_payload_but_not_kind() {
        let file = FileRef::new("file://data/a.png");
        let image = UnifiedRecord::with_uid("1", RecordValue::Image(file.clone()));
        let folder = UnifiedRecord::with_uid("2", RecordValue::Folder(file));
        assert_eq!(image.kind(), UdType::Image);
        assert_eq!(folder.kind(), UdType::Folder);
        assert_eq!(image.size(), folder.size());
    }

    #[test]
    fn kind_and_size_follow_payload() {
        let record = UnifiedRecord::with_uid("r1", RecordValue::PlainText(PlainText::new("hey")));
        assert_eq!(record.kind(), UdType::PlainText);
        assert_eq!(record.size(), 3);
    }
}
