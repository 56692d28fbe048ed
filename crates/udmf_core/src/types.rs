//! Core type definitions for udmf.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind tag of a unified record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UdType {
    /// Generic text.
    Text,
    /// Plain text.
    PlainText,
    /// HTML fragment.
    Html,
    /// Hyperlink.
    Hyperlink,
    /// Generic file.
    File,
    /// Image file.
    Image,
    /// Video file.
    Video,
    /// Audio file.
    Audio,
    /// Folder.
    Folder,
    /// System-defined record with free-form details.
    SystemDefinedRecord,
    /// System-defined service form.
    SystemDefinedForm,
    /// System-defined application item.
    SystemDefinedAppItem,
    /// System-defined pixel map.
    SystemDefinedPixelMap,
    /// Application-defined opaque payload.
    ApplicationDefined,
}

impl UdType {
    /// Every kind, in declaration order.
    pub const ALL: [UdType; 14] = [
        UdType::Text,
        UdType::PlainText,
        UdType::Html,
        UdType::Hyperlink,
        UdType::File,
        UdType::Image,
        UdType::Video,
        UdType::Audio,
        UdType::Folder,
        UdType::SystemDefinedRecord,
        UdType::SystemDefinedForm,
        UdType::SystemDefinedAppItem,
        UdType::SystemDefinedPixelMap,
        UdType::ApplicationDefined,
    ];

    /// Returns the type identifier used in summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UdType::Text => "general.text",
            UdType::PlainText => "general.plain-text",
            UdType::Html => "general.html",
            UdType::Hyperlink => "general.hyperlink",
            UdType::File => "general.file",
            UdType::Image => "general.image",
            UdType::Video => "general.video",
            UdType::Audio => "general.audio",
            UdType::Folder => "general.folder",
            UdType::SystemDefinedRecord => "openharmony.system-defined-record",
            UdType::SystemDefinedForm => "openharmony.form",
            UdType::SystemDefinedAppItem => "openharmony.app-item",
            UdType::SystemDefinedPixelMap => "openharmony.pixel-map",
            UdType::ApplicationDefined => "ApplicationDefinedType",
        }
    }
}

impl fmt::Display for UdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UdType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown type identifier: {s}"))
    }
}

/// Kind of a data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UdStoreType {
    /// Short-lived shared data (drag, clipboard-like exchanges).
    Runtime,
    /// Long-lived data.
    Persistent,
}

/// Lifecycle status of a unified data object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataStatus {
    /// Live data.
    #[default]
    Working,
    /// Superseded by a newer version.
    History,
    /// Marked for deletion.
    Deleted,
}
