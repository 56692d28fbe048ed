//! Unified data model.
//!
//! A [`UnifiedData`] is one [`Runtime`] block plus an ordered sequence of
//! [`UnifiedRecord`]s. Each record carries one payload from the closed
//! [`RecordValue`] union.

mod details;
mod kinds;
mod record;
mod runtime;
mod summary;
mod unified_data;

pub use details::{details_size, DetailValue, UdDetails};
pub use kinds::{
    AppItem, ApplicationDefined, FileRef, Form, Html, Link, PixelMap, PlainText, SystemDefined,
    Text,
};
pub use record::{RecordValue, UnifiedRecord};
pub use runtime::{Privilege, Runtime, UnifiedKey};
pub use summary::Summary;
pub use unified_data::UnifiedData;
