//! Concrete record payloads.

use super::details::{details_size, UdDetails};
use serde::{Deserialize, Serialize};

/// Generic text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Text {
    /// Details.
    pub details: UdDetails,
}

impl Text {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details)
    }
}

/// Plain text with an optional abstract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlainText {
    /// Details.
    pub details: UdDetails,
    /// Text content.
    pub content: String,
    /// Short abstract of the content.
    pub abstract_text: String,
}

impl PlainText {
    /// Creates plain text with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details) + self.content.len() + self.abstract_text.len()
    }
}

/// HTML fragment with its plain-text rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Html {
    /// Details.
    pub details: UdDetails,
    /// HTML source.
    pub html_content: String,
    /// Plain-text rendering.
    pub plain_content: String,
}

impl Html {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details) + self.html_content.len() + self.plain_content.len()
    }
}

/// Hyperlink with a description.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Details.
    pub details: UdDetails,
    /// Target URL.
    pub url: String,
    /// Link description.
    pub description: String,
}

impl Link {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details) + self.url.len() + self.description.len()
    }
}

/// File-like payload (file, image, video, audio, folder).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileRef {
    /// Details.
    pub details: UdDetails,
    /// Location of the file.
    pub uri: String,
}

impl FileRef {
    /// Creates a file reference to `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            details: UdDetails::new(),
            uri: uri.into(),
        }
    }

    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details) + self.uri.len()
    }
}

/// System-defined record carrying details only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemDefined {
    /// Details.
    pub details: UdDetails,
}

impl SystemDefined {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details)
    }
}

/// Service form card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Form {
    /// Details.
    pub details: UdDetails,
    /// Form id.
    pub form_id: i32,
    /// Form name.
    pub form_name: String,
    /// Owning bundle.
    pub bundle_name: String,
    /// Owning ability.
    pub ability_name: String,
    /// Owning module.
    pub module: String,
}

impl Form {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details)
            + std::mem::size_of::<i32>()
            + self.form_name.len()
            + self.bundle_name.len()
            + self.ability_name.len()
            + self.module.len()
    }
}

/// Application item (launcher entry).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppItem {
    /// Details.
    pub details: UdDetails,
    /// Application id.
    pub app_id: String,
    /// Application name.
    pub app_name: String,
    /// Icon resource id.
    pub app_icon_id: String,
    /// Label resource id.
    pub app_label_id: String,
    /// Bundle name.
    pub bundle_name: String,
    /// Ability name.
    pub ability_name: String,
}

impl AppItem {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details)
            + self.app_id.len()
            + self.app_name.len()
            + self.app_icon_id.len()
            + self.app_label_id.len()
            + self.bundle_name.len()
            + self.ability_name.len()
    }
}

/// Raw pixel map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelMap {
    /// Details.
    pub details: UdDetails,
    /// Raw pixel bytes.
    pub raw_data: Vec<u8>,
}

impl PixelMap {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        details_size(&self.details) + self.raw_data.len()
    }
}

/// Application-defined opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplicationDefined {
    /// Application-chosen type name.
    pub application_defined_type: String,
    /// Raw bytes.
    pub raw_data: Vec<u8>,
}

impl ApplicationDefined {
    /// Returns the byte size of the payload.
    #[must_use]
    pub fn size(&self) -> usize {
        self.application_defined_type.len() + self.raw_data.len()
    }
}
