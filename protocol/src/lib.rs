// Copyright (c) 2026 Assetchain Contributors. MIT License.
// See LICENSE for details.

//! # Assetchain Protocol
//!
//! Client-side construction of asset-ledger transactions: issuing assets
//! with attached fee schedules, transferring them to other keys, and
//! deleting previously issued ones. The
//! output is a canonical byte string that a keypair signs and a node
//! verifies, and the whole point of this crate is that the same inputs
//! always produce the same bytes.
//!
//! ## Architecture
//!
//! - **config**: wire constants and encoder limits.
//! - **error**: the error taxonomy and stable numeric error kinds.
//! - **crypto**: Ed25519 keys and signatures, SHA-256.
//! - **assets**: exact decimal rates, fee schedules, asset entries and ids.
//! - **transaction**: builders, the canonical encoder/decoder, signing.
//!
//! ## Design Philosophy
//!
//! 1. Determinism first. No floats, no maps, no platform-dependent widths
//!    anywhere in the signed bytes.
//! 2. Validate at the door. A builder either accepts an entry completely or
//!    is left untouched.
//! 3. No unsafe code here. The C boundary lives in `assetchain-capi`.

pub mod assets;
pub mod config;
pub mod crypto;
pub mod error;
pub mod transaction;

pub use error::{ErrorKind, TxError, TxResult};
