//! Signing canonical transaction bytes with Ed25519 keypairs.
//!
//! Signing is a separate step from building because the keypair may not be
//! available where the transaction is assembled (remote signer, hardware
//! wallet). The message is always the exact output of the canonical
//! encoder; nothing is hashed or re-serialized in between.
//!
//! A signed payload on the wire is the encoded transaction followed by the
//! 64-byte signature. The signer key is already part of the header, so it is
//! not repeated.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use super::buffer::EncodedBuffer;
use super::encoding::peek_kind;
use super::types::TransactionKind;
use crate::config::{HEADER_SIZE, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::{TxError, TxResult};

/// Offset of the signer key inside the header (right after the kind tag).
const SIGNER_OFFSET: usize = 2;

/// Signs encoded transaction bytes.
///
/// The caller is responsible for the keypair matching the signer key in the
/// header; [`SignedPayload::verify`] checks against the header key.
pub fn sign_encoded(keypair: &Keypair, encoded: &EncodedBuffer) -> Signature {
    let signature = keypair.sign(encoded.as_bytes());
    debug!(
        kind = %encoded.kind(),
        size = encoded.len(),
        "signed encoded transaction"
    );
    signature
}

/// Checks a detached signature over encoded bytes.
pub fn verify_encoded(public_key: &PublicKey, bytes: &[u8], signature: &Signature) -> bool {
    public_key.verify(bytes, signature)
}

/// Encoded transaction plus its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    payload: EncodedBuffer,
    signature: Signature,
}

impl SignedPayload {
    /// Signs `payload` with `keypair`.
    ///
    /// Fails with [`TxError::InvalidArgument`] if the keypair is not the
    /// signer named in the header.
    pub fn sign(payload: EncodedBuffer, keypair: &Keypair) -> TxResult<Self> {
        let signer = signer_of(payload.as_bytes())?;
        if signer != keypair.public_key() {
            return Err(TxError::InvalidArgument {
                name: "keypair",
                reason: "keypair does not match the transaction signer".to_string(),
            });
        }
        let signature = sign_encoded(keypair, &payload);
        Ok(Self { payload, signature })
    }

    /// Splits `payload || signature` bytes. The payload must start with a
    /// known kind tag; its body is not decoded here.
    pub fn from_bytes(bytes: &[u8]) -> TxResult<Self> {
        if bytes.len() < HEADER_SIZE + SIGNATURE_LENGTH {
            return Err(TxError::malformed(format!(
                "signed payload is {} bytes, minimum is {}",
                bytes.len(),
                HEADER_SIZE + SIGNATURE_LENGTH
            )));
        }
        let (body, sig) = bytes.split_at(bytes.len() - SIGNATURE_LENGTH);
        let kind = peek_kind(body)?;
        let signature =
            Signature::try_from_slice(sig).map_err(|e| TxError::malformed(e.to_string()))?;
        Ok(Self {
            payload: EncodedBuffer::new(kind, Bytes::copy_from_slice(body)),
            signature,
        })
    }

    /// Concatenated `payload || signature`.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.payload.len() + SIGNATURE_LENGTH);
        buf.put_slice(self.payload.as_bytes());
        buf.put_slice(self.signature.as_bytes());
        buf.freeze()
    }

    pub fn kind(&self) -> TransactionKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &EncodedBuffer {
        &self.payload
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Signer key taken from the payload header.
    pub fn signer(&self) -> TxResult<PublicKey> {
        signer_of(self.payload.as_bytes())
    }

    /// `true` if the signature is valid for the signer named in the header.
    pub fn verify(&self) -> bool {
        match self.signer() {
            Ok(signer) => verify_encoded(&signer, self.payload.as_bytes(), &self.signature),
            Err(_) => false,
        }
    }
}

fn signer_of(bytes: &[u8]) -> TxResult<PublicKey> {
    let key = bytes
        .get(SIGNER_OFFSET..SIGNER_OFFSET + PUBLIC_KEY_LENGTH)
        .ok_or_else(|| TxError::malformed("payload too short for a signer key"))?;
    PublicKey::try_from_slice(key).map_err(|e| TxError::malformed(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
