#![warn(missing_docs)]
//! # stowaway-core
//!
//! Core traits and types for the Stowaway offline request cache router.
//!
//! This crate provides the vocabulary shared by the router, the storage
//! backends and the HTTP integrations:
//!
//! - **Identify** a request ([`RequestKey`])
//! - **Capture** a response ([`Snapshot`])
//! - **Call** the network ([`Upstream`])
//! - **Execute** background cache writes ([`Offload`])

pub mod key;
pub mod offload;
pub mod snapshot;
pub mod upstream;

pub use key::{KeyError, RequestKey};
pub use offload::Offload;
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use snapshot::{OFFLINE_ERROR_MESSAGE, Snapshot};
pub use upstream::Upstream;

/// Raw byte data type used for serialized store values.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
