//! # Protocol Configuration & Constants
//!
//! Every magic number in the encoder lives here. The wire format is a
//! signing contract: two independent implementations must produce the same
//! bytes for the same transaction, so none of these values may change
//! without bumping the transaction kind tags.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 public (verifying) key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Length of a derived [`AssetId`](crate::assets::AssetId) in bytes.
pub const ASSET_ID_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Transaction Kind Tags
// ---------------------------------------------------------------------------

/// Wire tag of the `transfer` transaction.
pub const TRANSFER_TAG: u16 = 200;

/// Wire tag of the `add_assets` transaction.
pub const ADD_ASSETS_TAG: u16 = 300;

/// Wire tag of the `delete_assets` transaction.
pub const DELETE_ASSETS_TAG: u16 = 400;

// ---------------------------------------------------------------------------
// Wire Layout
// ---------------------------------------------------------------------------

/// Header: kind tag (u16) + signer key + seed (u64) + entry count (u32).
pub const HEADER_SIZE: usize = 2 + PUBLIC_KEY_LENGTH + 8 + 4;

/// Encoded size of a single rate: mantissa (u64) + scale (u8).
pub const RATE_SIZE: usize = 8 + 1;

/// Encoded size of a single fee: share (u64) + rate.
pub const FEE_SIZE: usize = 8 + RATE_SIZE;

/// Encoded size of a fee schedule: recipient, trade, exchange.
pub const FEE_SCHEDULE_SIZE: usize = 3 * FEE_SIZE;

/// Fixed part of an `add_assets` entry: name length (u32) + quantity (u64)
/// + fee schedule + recipient key. The name bytes come on top of this.
pub const ADD_ASSETS_ENTRY_FIXED_SIZE: usize = 4 + 8 + FEE_SCHEDULE_SIZE + PUBLIC_KEY_LENGTH;

/// A `delete_assets` entry: asset id + quantity (u64).
pub const DELETE_ASSETS_ENTRY_SIZE: usize = ASSET_ID_LENGTH + 8;

/// Fixed part of a `transfer` body between the header and its entries:
/// recipient key + coin amount (u64) + memo length (u32). The memo bytes
/// come on top of this.
pub const TRANSFER_FIXED_SIZE: usize = PUBLIC_KEY_LENGTH + 8 + 4;

/// A `transfer` entry has the same layout as a `delete_assets` one.
pub const TRANSFER_ENTRY_SIZE: usize = DELETE_ASSETS_ENTRY_SIZE;

// ---------------------------------------------------------------------------
// Decimal Rates
// ---------------------------------------------------------------------------

/// Maximum number of fractional digits a fee rate may carry. 10^18 still
/// fits in a u64, which keeps the mantissa fixed-width on the wire.
pub const MAX_RATE_SCALE: u8 = 18;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum encoded transaction size in bytes. 256 KiB.
pub const MAX_ENCODED_SIZE: usize = 256 * 1024;

/// Maximum number of asset entries in a single transaction. Duplicate-name
/// detection is a linear scan, so this keeps `add_asset` bounded.
pub const MAX_ASSETS_PER_TX: usize = 1_024;

/// Maximum asset name length in bytes.
pub const MAX_ASSET_NAME_LENGTH: usize = 1_024;

/// Maximum `transfer` memo length in bytes.
pub const MAX_MEMO_LENGTH: usize = 256;

/// Runtime-tunable encoder limits.
///
/// Defaults come from the constants above. Every field is optional in the
/// JSON form, so a config that only sets `max_assets` keeps the other
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderLimits {
    /// Upper bound on the encoded buffer, in bytes.
    pub max_encoded_size: usize,
    /// Upper bound on entries per transaction.
    pub max_assets: usize,
    /// Upper bound on a single asset name, in bytes.
    pub max_name_length: usize,
}

impl Default for EncoderLimits {
    fn default() -> Self {
        Self {
            max_encoded_size: MAX_ENCODED_SIZE,
            max_assets: MAX_ASSETS_PER_TX,
            max_name_length: MAX_ASSET_NAME_LENGTH,
        }
    }
}

impl EncoderLimits {
    /// Parses limits from a JSON object. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Returns a friendly name for a transaction kind tag, mainly for logging.
pub fn kind_name(tag: u16) -> String {
    match tag {
        TRANSFER_TAG => "transfer".to_string(),
        ADD_ASSETS_TAG => "add_assets".to_string(),
        DELETE_ASSETS_TAG => "delete_assets".to_string(),
        other => format!("unknown({})", other),
    }
}
