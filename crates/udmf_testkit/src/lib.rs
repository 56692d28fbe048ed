//! # udmf Testkit
//!
//! Test utilities for udmf.
//!
//! This crate provides:
//! - Store fixtures (in-memory and temp-dir backed)
//! - Property-based test generators using proptest
//! - A fault-injecting engine and codec for error-path tests
//!
//! ## Usage
//!
//! ```rust
//! use udmf_core::DataStore;
//! use udmf_testkit::prelude::*;
//!
//! let store = TestStore::memory();
//! let data = sample_data("g1", 2);
//! store.put(&data).unwrap();
//! assert_eq!(store.get(&group_key_of(&data)).unwrap(), data);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
