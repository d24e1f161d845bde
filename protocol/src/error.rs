//! Error types for transaction construction and encoding.
//!
//! Every fallible operation in the crate returns a [`TxError`]. Failures are
//! reported at the call that caused them and never leave a builder half
//! mutated. The foreign-call boundary flattens these into an error context
//! using the stable numeric codes of [`ErrorKind`].

use std::fmt;

use thiserror::Error;

/// Errors that can occur while building, encoding or decoding a transaction,
/// or while managing boundary handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// A public key is not exactly 32 bytes (or not valid hex at the boundary).
    #[error("invalid public key: {reason}")]
    InvalidPublicKey { reason: String },

    /// A fee rate string is not an exact decimal fraction in `[0, 1]`.
    #[error("invalid {field} fee rate {value:?}: {reason}")]
    InvalidFeeRate {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Asset quantity must be > 0.
    #[error("invalid quantity for asset {name:?}: must be > 0")]
    InvalidQuantity { name: String },

    /// Asset name is empty or longer than the configured limit.
    #[error("invalid asset name: {reason}")]
    InvalidAssetName { reason: String },

    /// An asset with this name is already in the transaction.
    #[error("duplicate asset name: {name:?}")]
    DuplicateAssetName { name: String },

    /// An asset with this id is already in the transaction.
    #[error("duplicate asset id: {id}")]
    DuplicateAsset { id: String },

    /// The transaction already holds the maximum number of entries.
    #[error("too many assets: limit is {max}")]
    TooManyAssets { max: usize },

    /// Encoding was requested for a transaction with no entries.
    #[error("transaction has no entries")]
    EmptyTransaction,

    /// The encoded transaction would exceed the configured maximum size.
    #[error("encoded size {size} exceeds maximum {max}")]
    EncodingOverflow { size: usize, max: usize },

    /// Bytes handed to the decoder are not a canonical encoding.
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// A handle or buffer was released a second time.
    #[error("double release of {what}")]
    DoubleRelease { what: String },

    /// A handle was used after it was released.
    #[error("use after release of {what}")]
    UseAfterRelease { what: String },

    /// A handle or buffer that was never issued.
    #[error("invalid handle: {what}")]
    InvalidHandle { what: String },

    /// An argument was null or otherwise malformed.
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Something that should not happen (e.g. a caught panic).
    #[error("internal error: {0}")]
    Internal(String),
}

impl TxError {
    /// Shorthand for [`TxError::MalformedPayload`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    /// Returns the discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPublicKey { .. } => ErrorKind::InvalidPublicKey,
            Self::InvalidFeeRate { .. } => ErrorKind::InvalidFeeRate,
            Self::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            Self::InvalidAssetName { .. } => ErrorKind::InvalidAssetName,
            Self::DuplicateAssetName { .. } => ErrorKind::DuplicateAssetName,
            Self::DuplicateAsset { .. } => ErrorKind::DuplicateAsset,
            Self::TooManyAssets { .. } => ErrorKind::TooManyAssets,
            Self::EmptyTransaction => ErrorKind::EmptyTransaction,
            Self::EncodingOverflow { .. } => ErrorKind::EncodingOverflow,
            Self::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            Self::DoubleRelease { .. } => ErrorKind::DoubleRelease,
            Self::UseAfterRelease { .. } => ErrorKind::UseAfterRelease,
            Self::InvalidHandle { .. } => ErrorKind::InvalidHandle,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Result alias used throughout the crate.
pub type TxResult<T> = Result<T, TxError>;

/// Stable, `Copy` discriminant of a [`TxError`].
///
/// The numeric values are part of the C API and must never be reused.
/// `0` is reserved for "no error".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorKind {
    InvalidPublicKey = 1,
    InvalidFeeRate = 2,
    InvalidQuantity = 3,
    DuplicateAssetName = 4,
    EmptyTransaction = 5,
    EncodingOverflow = 6,
    DoubleRelease = 7,
    UseAfterRelease = 8,
    InvalidAssetName = 9,
    DuplicateAsset = 10,
    TooManyAssets = 11,
    MalformedPayload = 12,
    InvalidHandle = 13,
    InvalidArgument = 14,
    Internal = 15,
}

impl ErrorKind {
    /// Numeric code exposed across the boundary.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
