//! Error types for cache operations

use thiserror::Error;

use crate::codec::CodecError;

/// Centralized error type for cache controller operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem read/write/delete failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A non-nullable accessor was called while no cache is present
    #[error("No cache present")]
    NotPresent,

    /// The calling thread is inside this cache's own update callback
    #[error("Illegal reentrant access: this thread is inside an update callback of the same cache")]
    IllegalReentrantAccess,
}

impl CacheError {
    /// Whether this error is an I/O-class failure.
    ///
    /// Codec truncation counts as I/O: the entry ended before a value was complete.
    pub fn is_io(&self) -> bool {
        match self {
            CacheError::Io(_) => true,
            CacheError::Codec(err) => err.is_io(),
            CacheError::NotPresent | CacheError::IllegalReentrantAccess => false,
        }
    }
}

/// Result alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
