//! Storage traits and utilities.
//!
//! This module re-exports types from `stowaway-backend` for implementing
//! custom cache storage:
//!
//! - `Storage` - Collection of named stores (open, delete, list)
//! - `Store` - A single named store moving serialized snapshots
//! - `CacheStore` - Typed snapshot helpers over any `Store`
//! - `BackendError` - Error type for storage operations
//!
//! ## Built-in Storage
//!
//! | Storage | Crate | Use Case |
//! |---------|-------|----------|
//! | `MemoryStorage` | [`stowaway-backend`] | Unbounded, tests and small apps |
//! | `MokaStorage` | [`stowaway-moka`] | Bounded in-memory stores |
//!
//! [`stowaway-backend`]: https://docs.rs/stowaway-backend
//! [`stowaway-moka`]: https://docs.rs/stowaway-moka

pub use stowaway_backend::{
    BackendError, BackendResult, CacheStore, MemoryStorage, MemoryStore, Storage, Store,
};
