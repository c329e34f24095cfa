//! Error types for codec operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    /// The stream ended before a fixed-width value or a declared payload was complete
    #[error("Truncated input: needed {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i32),

    #[error("Payload too large for a 32-bit length prefix: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Invalid UTF-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid char code unit: {0:#06x}")]
    InvalidChar(u16),

    #[error("Char {0:?} does not fit in a single 16-bit code unit")]
    UnencodableChar(char),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CodecError {
    /// Whether this error is an I/O-class failure (truncation or underlying I/O)
    pub fn is_io(&self) -> bool {
        matches!(self, CodecError::Truncated { .. } | CodecError::Io(_))
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}
