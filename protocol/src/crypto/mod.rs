//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers around audited implementations:
//!
//! - **Ed25519** (`ed25519-dalek`) for signer/recipient keys and signatures.
//! - **SHA-256** (`sha2`) for asset identifiers.
//!
//! We don't roll our own. The encoder never looks inside a signature; these
//! types exist so callers can sign the exact encoded bytes without pulling
//! in a second key representation.

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_concat};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
