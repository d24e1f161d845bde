//! # Transaction Module
//!
//! Construction, canonical encoding, and signing of asset transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    : TransactionKind and AssetAmount
//! builder.rs  : AddAssetsBuilder, DeleteAssetsBuilder and TransferBuilder
//! encoding.rs : canonical little-endian encoder and the matching strict decoder
//! buffer.rs   : EncodedBuffer, the immutable encoder output
//! signing.rs  : Ed25519 signatures over encoded bytes, SignedPayload
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: add entries to a builder under a signer key and seed.
//! 2. **Encode**: [`AddAssetsBuilder::encode`] produces the canonical bytes.
//! 3. **Sign**: [`sign_encoded`] or [`SignedPayload::sign`] over those bytes.
//! 4. **Verify**: anyone holding the payload can decode and check it.
//!
//! ## Design Decisions
//!
//! - All integers are fixed-width little-endian. No varints, so the length
//!   of a transaction is a pure function of its entries.
//! - Fee rates are exact decimals, normalized before encoding, so `"0.1"`
//!   and `"0.10"` sign the same bytes.
//! - The seed is part of the header: two otherwise identical transactions
//!   with different seeds have different signatures.

pub mod buffer;
pub mod builder;
pub mod encoding;
pub mod signing;
pub mod types;

pub use buffer::EncodedBuffer;
pub use builder::{
    parse_public_key, parse_public_key_hex, random_seed, AddAssetsBuilder, DeleteAssetsBuilder,
    TransferBuilder,
};
pub use encoding::{
    decode_add_assets, decode_add_assets_with_limits, decode_delete_assets,
    decode_delete_assets_with_limits, decode_transfer, decode_transfer_with_limits, peek_kind,
};
pub use signing::{sign_encoded, verify_encoded, SignedPayload};
pub use types::{AssetAmount, TransactionKind};
