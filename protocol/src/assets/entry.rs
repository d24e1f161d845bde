//! Asset entries and asset identifiers.

use std::fmt;
use std::sync::Arc;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::fees::SharedFees;
use crate::config::ASSET_ID_LENGTH;
use crate::crypto::{sha256_concat, PublicKey};
use crate::error::{TxError, TxResult};

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Ledger identifier of an asset.
///
/// Derived from the asset name and the key of the account that created it:
/// the first 16 bytes of `SHA-256(name || creator)`. The same name issued by
/// two different creators yields two different assets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId([u8; ASSET_ID_LENGTH]);

impl AssetId {
    /// Derives the id of `name` as created by `creator`.
    pub fn from_data(name: &str, creator: &PublicKey) -> Self {
        let digest = sha256_concat(&[name.as_bytes(), creator.as_bytes()]);
        let mut id = [0u8; ASSET_ID_LENGTH];
        id.copy_from_slice(&digest[..ASSET_ID_LENGTH]);
        Self(id)
    }

    pub fn from_bytes(bytes: [u8; ASSET_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ASSET_ID_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 32-character hex id.
    pub fn from_hex(s: &str) -> TxResult<Self> {
        let bytes = hex::decode(s).map_err(|e| TxError::InvalidArgument {
            name: "asset_id",
            reason: e.to_string(),
        })?;
        let id: [u8; ASSET_ID_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| TxError::InvalidArgument {
                    name: "asset_id",
                    reason: format!("expected {} bytes, got {}", ASSET_ID_LENGTH, bytes.len()),
                })?;
        Ok(Self(id))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.to_hex())
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AssetId::from_hex(&s).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// AssetEntry
// ---------------------------------------------------------------------------

/// One asset to be issued by an `add_assets` transaction.
///
/// The fee schedule is shared, not owned: cloning an entry bumps the
/// schedule's reference count. Serializable for JSON inspection, but not
/// deserializable: entries only come into being through [`AssetEntry::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    name: String,
    quantity: u64,
    fees: SharedFees,
    recipient: PublicKey,
}

impl AssetEntry {
    /// Builds an entry. `max_name_length` is in bytes.
    ///
    /// Checks, in order: name non-empty and within the limit, quantity > 0.
    pub fn new(
        name: &str,
        quantity: u64,
        fees: SharedFees,
        recipient: PublicKey,
        max_name_length: usize,
    ) -> TxResult<Self> {
        validate_name(name, max_name_length)?;
        if quantity == 0 {
            return Err(TxError::InvalidQuantity {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            quantity,
            fees,
            recipient,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn fees(&self) -> &SharedFees {
        &self.fees
    }

    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }

    /// Id this asset gets on the ledger when issued by `creator`.
    pub fn asset_id(&self, creator: &PublicKey) -> AssetId {
        AssetId::from_data(&self.name, creator)
    }

    /// `true` if both entries point at the very same fee schedule allocation.
    pub fn shares_fees_with(&self, other: &AssetEntry) -> bool {
        Arc::ptr_eq(&self.fees, &other.fees)
    }
}

pub(crate) fn validate_name(name: &str, max_name_length: usize) -> TxResult<()> {
    if name.is_empty() {
        return Err(TxError::InvalidAssetName {
            reason: "name is empty".to_string(),
        });
    }
    if name.len() > max_name_length {
        return Err(TxError::InvalidAssetName {
            reason: format!(
                "name is {} bytes, limit is {}",
                name.len(),
                max_name_length
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FeeSchedule;

    fn fees() -> SharedFees {
        FeeSchedule::new(10, "0.1", 20, "0.2", 9, "0.99999")
            .unwrap()
            .shared()
    }

    fn key(b: u8) -> PublicKey {
        PublicKey::from_bytes([b; 32])
    }

    #[test]
    fn asset_id_depends_on_name_and_creator() {
        let a = AssetId::from_data("asset0", &key(1));
        let b = AssetId::from_data("asset1", &key(1));
        let c = AssetId::from_data("asset0", &key(2));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, AssetId::from_data("asset0", &key(1)));
    }

    #[test]
    fn asset_id_hex_roundtrip() {
        let id = AssetId::from_data("asset", &key(7));
        assert_eq!(id.to_hex().len(), 32);
        assert_eq!(AssetId::from_hex(&id.to_hex()).unwrap(), id);
        assert!(AssetId::from_hex("abcd").is_err());
        assert!(AssetId::from_hex("zz").is_err());
    }

    #[test]
    fn entry_rejects_zero_quantity() {
        let err = AssetEntry::new("Asset#1", 0, fees(), key(1), 64).unwrap_err();
        assert!(matches!(err, TxError::InvalidQuantity { .. }));
    }

    #[test]
    fn entry_rejects_bad_names() {
        let err = AssetEntry::new("", 1, fees(), key(1), 64).unwrap_err();
        assert!(matches!(err, TxError::InvalidAssetName { .. }));

        let long = "x".repeat(65);
        let err = AssetEntry::new(&long, 1, fees(), key(1), 64).unwrap_err();
        assert!(matches!(err, TxError::InvalidAssetName { .. }));
    }

    #[test]
    fn name_limit_counts_bytes() {
        // Four 2-byte characters: 8 bytes.
        assert!(AssetEntry::new("éééé", 1, fees(), key(1), 8).is_ok());
        assert!(AssetEntry::new("éééé", 1, fees(), key(1), 7).is_err());
    }

    #[test]
    fn clones_share_the_schedule() {
        let entry = AssetEntry::new("Asset#1", 5, fees(), key(1), 64).unwrap();
        let copy = entry.clone();
        assert!(entry.shares_fees_with(&copy));
        assert_eq!(Arc::strong_count(entry.fees()), 2);
    }

    #[test]
    fn entry_asset_id_uses_name() {
        let entry = AssetEntry::new("Asset#1", 5, fees(), key(1), 64).unwrap();
        assert_eq!(
            entry.asset_id(&key(3)),
            AssetId::from_data("Asset#1", &key(3))
        );
    }
}
