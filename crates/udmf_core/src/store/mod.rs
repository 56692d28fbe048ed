//! Data stores.

mod handle;
mod runtime_store;
mod traits;

pub use runtime_store::RuntimeStore;
pub use traits::DataStore;

use std::fmt;

/// Lifecycle state of a store.
///
/// ```text
/// Uninitialized --init--> Ready --close--> Closed --init--> Ready
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreState {
    /// Constructed, no engine handle yet.
    Uninitialized,
    /// Engine handle acquired; operations are allowed.
    Ready,
    /// Engine handle released.
    Closed,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
