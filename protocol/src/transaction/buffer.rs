//! The immutable output of the canonical encoder.

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

use super::types::TransactionKind;

/// Canonical bytes of one transaction, ready to be signed.
///
/// Immutable once produced. Cloning is cheap (reference-counted `Bytes`),
/// and the buffer is freed when the last clone is dropped, so there is no
/// way to release it twice from Rust.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedBuffer {
    kind: TransactionKind,
    bytes: Bytes,
}

impl EncodedBuffer {
    pub(crate) fn new(kind: TransactionKind, bytes: Bytes) -> Self {
        Self { kind, bytes }
    }

    /// Which transaction these bytes encode.
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Copies the bytes out into an owned vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Consumes the buffer, returning the underlying `Bytes`.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl Deref for EncodedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for EncodedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for EncodedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedBuffer({}, {} bytes)", self.kind, self.bytes.len())
    }
}
