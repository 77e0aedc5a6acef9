//! Value formats used to persist [`Snapshot`]s in a store.
//!
//! Stores hold raw bytes. A [`Format`] turns a snapshot into those bytes and
//! back. JSON is the default and is what every built-in store uses.

use stowaway_core::{Raw, Snapshot};
use thiserror::Error;

mod json;

pub use json::JsonFormat;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Object-safe format trait.
///
/// This trait can be used with `&dyn Format` for dynamic dispatch.
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Encode a snapshot into store bytes.
    fn serialize(&self, snapshot: &Snapshot) -> Result<Raw, FormatError>;

    /// Decode store bytes into a snapshot.
    fn deserialize(&self, data: &[u8]) -> Result<Snapshot, FormatError>;
}
