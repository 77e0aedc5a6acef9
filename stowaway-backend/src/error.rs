//! Error types for backend operations.

use crate::format::FormatError;
use http::StatusCode;
use thiserror::Error;

/// Error type for backend operations.
///
/// This enum categorizes errors that can occur during cache store
/// interactions into distinct groups for appropriate handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote storage services.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] FormatError),

    /// Only `200 OK` snapshots may be written to a store.
    #[error("refusing to store a response with status {0}")]
    NotStorable(StatusCode),
}
