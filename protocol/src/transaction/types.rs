//! Core type definitions for asset transactions.
//!
//! Small and `Copy` where possible: these are read on every encode and
//! decode.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assets::AssetId;
use crate::config::{ADD_ASSETS_TAG, DELETE_ASSETS_TAG, TRANSFER_TAG};

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// Discriminant for the operation a transaction represents.
///
/// The numeric tag is the first field of every encoded transaction, so a
/// signature over an `add_assets` payload can never be replayed as a
/// `delete_assets` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Issue new assets to recipients.
    AddAssets,
    /// Destroy assets held by the signer.
    DeleteAssets,
    /// Move assets (and optionally coins) from the signer to a recipient.
    Transfer,
}

impl TransactionKind {
    /// Wire tag of this kind.
    pub fn tag(self) -> u16 {
        match self {
            Self::AddAssets => ADD_ASSETS_TAG,
            Self::DeleteAssets => DELETE_ASSETS_TAG,
            Self::Transfer => TRANSFER_TAG,
        }
    }

    /// Looks up the kind for a wire tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            ADD_ASSETS_TAG => Some(Self::AddAssets),
            DELETE_ASSETS_TAG => Some(Self::DeleteAssets),
            TRANSFER_TAG => Some(Self::Transfer),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddAssets => write!(f, "AddAssets"),
            Self::DeleteAssets => write!(f, "DeleteAssets"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

// ---------------------------------------------------------------------------
// AssetAmount
// ---------------------------------------------------------------------------

/// A quantity of an already-issued asset, as referenced by `delete_assets`
/// and `transfer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetAmount {
    /// The asset being referenced.
    pub id: AssetId,
    /// Units of it. Always > 0 inside a builder.
    pub quantity: u64,
}

impl AssetAmount {
    pub fn new(id: AssetId, quantity: u64) -> Self {
        Self { id, quantity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_roundtrip() {
        for kind in [
            TransactionKind::AddAssets,
            TransactionKind::DeleteAssets,
            TransactionKind::Transfer,
        ] {
            assert_eq!(TransactionKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(TransactionKind::from_tag(0), None);
    }

    #[test]
    fn kind_display() {
        assert_eq!(TransactionKind::AddAssets.to_string(), "AddAssets");
        assert_eq!(TransactionKind::DeleteAssets.to_string(), "DeleteAssets");
    }

    #[test]
    fn asset_amount_serde_roundtrip() {
        let amount = AssetAmount::new(AssetId::from_bytes([3; 16]), 42);
        let json = serde_json::to_string(&amount).unwrap();
        let recovered: AssetAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, recovered);
    }
}
