//! Cache store API for the Stowaway router.
//!
//! The router never talks to a concrete cache. It opens named stores through
//! a [`Storage`] and reads and writes [`Snapshot`](stowaway_core::Snapshot)s
//! through [`CacheStore`]. If you want to plug in your own storage, you are
//! in the right place.
mod backend;
mod error;
pub mod format;
mod memory;

pub use backend::{BackendResult, CacheStore, Storage, Store};
pub use error::BackendError;
pub use format::{Format, FormatError, JsonFormat};
pub use memory::{MemoryStorage, MemoryStore};
