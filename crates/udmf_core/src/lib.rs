//! # udmf Core
//!
//! Unified data model and the runtime store that persists it.
//!
//! A [`UnifiedData`] object is one [`Runtime`] metadata block plus an ordered
//! sequence of typed [`UnifiedRecord`]s. The [`RuntimeStore`] maps each object
//! onto `1 + records` entries of an ordered key-value engine:
//!
//! - the runtime block under the group key `udmf://<intention>/<bundle>/<group>`
//! - each record under the member key `<group key>/<uid>`
//!
//! and reassembles objects from prefix scans.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use udmf_core::{DataStore, RuntimeStore, StoreConfig};
//! use udmf_storage::StoreManager;
//!
//! let manager = Arc::new(StoreManager::new("distributeddata", "default"));
//! let store = RuntimeStore::new("drag", manager)
//!     .with_config(StoreConfig::new().memory_db(true));
//! store.init().unwrap();
//! assert!(store.get("udmf://drag/com.x/missing").unwrap().is_empty());
//! store.close();
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [`CoreResult`]. [`CoreError::status`]
//! flattens an error into the [`Status`] code reported across process
//! boundaries.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod config;
mod data;
mod error;
pub mod key;
mod store;
mod types;

pub use codec::{CborDataCodec, DataCodec};
pub use config::{StoreConfig, DEFAULT_APP_ID, DEFAULT_BASE_DIR, DEFAULT_USER_ID};
pub use data::{
    details_size, AppItem, ApplicationDefined, DetailValue, FileRef, Form, Html, Link, PixelMap,
    PlainText, Privilege, RecordValue, Runtime, Summary, SystemDefined, Text, UdDetails,
    UnifiedData, UnifiedKey, UnifiedRecord,
};
pub use error::{CoreError, CoreResult, Status};
pub use store::{DataStore, RuntimeStore, StoreState};
pub use types::{DataStatus, UdStoreType, UdType};
