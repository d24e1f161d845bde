//! Transaction construction.
//!
//! A builder accumulates entries under a signer key and a seed, then hands
//! its state to the canonical encoder. Every mutating call either succeeds
//! completely or leaves the builder exactly as it was.
//!
//! Entry order is preserved and is part of the signed payload: the same set
//! of assets added in a different order is a different transaction.
//!
//! Builders are plain owned values with no interior locking. Build one per
//! thread; fee schedules are the only thing meant to be shared.

use rand::Rng;
use tracing::debug;

use super::buffer::EncodedBuffer;
use super::encoding;
use super::types::AssetAmount;
use crate::assets::entry::validate_name;
use crate::assets::{AssetEntry, AssetId, SharedFees};
use crate::config::{EncoderLimits, MAX_MEMO_LENGTH};
use crate::crypto::PublicKey;
use crate::error::{TxError, TxResult};

/// Parses a signer or recipient key, mapping failures to
/// [`TxError::InvalidPublicKey`].
pub fn parse_public_key(bytes: &[u8]) -> TxResult<PublicKey> {
    PublicKey::try_from_slice(bytes).map_err(|e| TxError::InvalidPublicKey {
        reason: e.to_string(),
    })
}

/// Parses a hex-encoded key, mapping failures to [`TxError::InvalidPublicKey`].
pub fn parse_public_key_hex(hex_str: &str) -> TxResult<PublicKey> {
    PublicKey::from_hex(hex_str).map_err(|e| TxError::InvalidPublicKey {
        reason: e.to_string(),
    })
}

/// A fresh random seed, for callers that don't track their own.
pub fn random_seed() -> u64 {
    rand::thread_rng().gen()
}

// ---------------------------------------------------------------------------
// AddAssetsBuilder
// ---------------------------------------------------------------------------

/// Builder for an `add_assets` transaction.
///
/// # Usage
///
/// ```
/// use assetchain_protocol::assets::FeeSchedule;
/// use assetchain_protocol::crypto::Keypair;
/// use assetchain_protocol::transaction::AddAssetsBuilder;
///
/// let keypair = Keypair::generate();
/// let fees = FeeSchedule::new(10, "0.1", 20, "0.2", 9, "0.99999")
///     .unwrap()
///     .shared();
///
/// let mut tx = AddAssetsBuilder::new(keypair.public_key(), 123);
/// tx.add_asset("Asset#10", 10, &fees, keypair.public_key()).unwrap();
/// tx.add_asset("Asset#00", 10_000, &fees, keypair.public_key()).unwrap();
///
/// let bytes = tx.encode().unwrap();
/// assert_eq!(bytes.len(), tx.encoded_len());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddAssetsBuilder {
    signer: PublicKey,
    seed: u64,
    entries: Vec<AssetEntry>,
    limits: EncoderLimits,
}

impl AddAssetsBuilder {
    /// Creates an empty builder with the default limits.
    pub fn new(signer: PublicKey, seed: u64) -> Self {
        Self {
            signer,
            seed,
            entries: Vec::new(),
            limits: EncoderLimits::default(),
        }
    }

    /// Creates a builder from raw key bytes. Fails with
    /// [`TxError::InvalidPublicKey`] unless the key is exactly 32 bytes.
    pub fn from_key_bytes(signer: &[u8], seed: u64) -> TxResult<Self> {
        Ok(Self::new(parse_public_key(signer)?, seed))
    }

    /// Creates a builder with a random seed.
    pub fn with_random_seed(signer: PublicKey) -> Self {
        Self::new(signer, random_seed())
    }

    /// Replaces the limits. Entries already added are not re-checked.
    pub fn with_limits(mut self, limits: EncoderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Appends an asset.
    ///
    /// Fails with, in this order of checks: [`TxError::InvalidAssetName`],
    /// [`TxError::InvalidQuantity`], [`TxError::DuplicateAssetName`],
    /// [`TxError::TooManyAssets`]. The schedule is shared, not copied.
    pub fn add_asset(
        &mut self,
        name: &str,
        quantity: u64,
        fees: &SharedFees,
        recipient: PublicKey,
    ) -> TxResult<()> {
        let entry = AssetEntry::new(
            name,
            quantity,
            SharedFees::clone(fees),
            recipient,
            self.limits.max_name_length,
        )?;
        self.push(entry)
    }

    /// Same as [`add_asset`](Self::add_asset) with the recipient given as
    /// raw bytes. A malformed key is reported after the name and quantity
    /// checks and before the duplicate check.
    pub fn add_asset_from_slice(
        &mut self,
        name: &str,
        quantity: u64,
        fees: &SharedFees,
        recipient: &[u8],
    ) -> TxResult<()> {
        self.add_with_key(name, quantity, fees, || parse_public_key(recipient))
    }

    /// Same as [`add_asset_from_slice`](Self::add_asset_from_slice) with the
    /// recipient hex-encoded.
    pub fn add_asset_from_hex(
        &mut self,
        name: &str,
        quantity: u64,
        fees: &SharedFees,
        recipient_hex: &str,
    ) -> TxResult<()> {
        self.add_with_key(name, quantity, fees, || parse_public_key_hex(recipient_hex))
    }

    fn add_with_key(
        &mut self,
        name: &str,
        quantity: u64,
        fees: &SharedFees,
        recipient: impl FnOnce() -> TxResult<PublicKey>,
    ) -> TxResult<()> {
        validate_name(name, self.limits.max_name_length)?;
        if quantity == 0 {
            return Err(TxError::InvalidQuantity {
                name: name.to_string(),
            });
        }
        let recipient = recipient()?;
        self.add_asset(name, quantity, fees, recipient)
    }

    /// Appends a prebuilt entry, re-checking the name against this
    /// builder's limit.
    pub fn add_asset_value(&mut self, entry: AssetEntry) -> TxResult<()> {
        validate_name(entry.name(), self.limits.max_name_length)?;
        self.push(entry)
    }

    fn push(&mut self, entry: AssetEntry) -> TxResult<()> {
        if self.contains(entry.name()) {
            return Err(TxError::DuplicateAssetName {
                name: entry.name().to_string(),
            });
        }
        if self.entries.len() >= self.limits.max_assets {
            return Err(TxError::TooManyAssets {
                max: self.limits.max_assets,
            });
        }
        debug!(
            name = entry.name(),
            quantity = entry.quantity(),
            position = self.entries.len(),
            "asset added to add_assets transaction"
        );
        self.entries.push(entry);
        Ok(())
    }

    /// `true` if an entry with this name is already present. Linear scan.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name() == name)
    }

    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limits(&self) -> &EncoderLimits {
        &self.limits
    }

    /// Size [`encode`](Self::encode) would produce, in bytes.
    pub fn encoded_len(&self) -> usize {
        encoding::add_assets_len(&self.entries)
    }

    /// Serializes the builder into its canonical byte form.
    ///
    /// Idempotent: the builder is not modified, and encoding twice without
    /// an intervening `add_asset` yields identical bytes.
    pub fn encode(&self) -> TxResult<EncodedBuffer> {
        encoding::encode_add_assets(self)
    }
}

// ---------------------------------------------------------------------------
// DeleteAssetsBuilder
// ---------------------------------------------------------------------------

/// Builder for a `delete_assets` transaction: removes previously issued
/// assets from the signer's holdings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAssetsBuilder {
    signer: PublicKey,
    seed: u64,
    entries: Vec<AssetAmount>,
    limits: EncoderLimits,
}

impl DeleteAssetsBuilder {
    pub fn new(signer: PublicKey, seed: u64) -> Self {
        Self {
            signer,
            seed,
            entries: Vec::new(),
            limits: EncoderLimits::default(),
        }
    }

    /// Creates a builder from raw key bytes.
    pub fn from_key_bytes(signer: &[u8], seed: u64) -> TxResult<Self> {
        Ok(Self::new(parse_public_key(signer)?, seed))
    }

    pub fn with_limits(mut self, limits: EncoderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Appends an asset by id. Fails with [`TxError::InvalidQuantity`],
    /// [`TxError::DuplicateAsset`] or [`TxError::TooManyAssets`].
    pub fn add_asset(&mut self, id: AssetId, quantity: u64) -> TxResult<()> {
        push_amount(&mut self.entries, &self.limits, id, quantity)?;
        debug!(asset = %id, quantity, "asset added to delete_assets transaction");
        Ok(())
    }

    /// Appends an asset the signer created under `name`.
    pub fn add_asset_by_name(&mut self, name: &str, quantity: u64) -> TxResult<()> {
        validate_name(name, self.limits.max_name_length)?;
        let id = AssetId::from_data(name, &self.signer);
        self.add_asset(id, quantity)
    }

    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn entries(&self) -> &[AssetAmount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limits(&self) -> &EncoderLimits {
        &self.limits
    }

    pub fn encoded_len(&self) -> usize {
        encoding::delete_assets_len(self.entries.len())
    }

    pub fn encode(&self) -> TxResult<EncodedBuffer> {
        encoding::encode_delete_assets(self)
    }
}

// ---------------------------------------------------------------------------
// TransferBuilder
// ---------------------------------------------------------------------------

/// Builder for a `transfer` transaction: moves assets, and optionally a
/// coin amount, from the signer to a single recipient.
///
/// The memo is free-form UTF-8 carried in the signed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBuilder {
    signer: PublicKey,
    recipient: PublicKey,
    amount: u64,
    memo: String,
    seed: u64,
    entries: Vec<AssetAmount>,
    limits: EncoderLimits,
}

impl TransferBuilder {
    pub fn new(sender: PublicKey, recipient: PublicKey, amount: u64, seed: u64) -> Self {
        Self {
            signer: sender,
            recipient,
            amount,
            memo: String::new(),
            seed,
            entries: Vec::new(),
            limits: EncoderLimits::default(),
        }
    }

    /// Creates a builder from raw sender and recipient key bytes.
    pub fn from_key_bytes(
        sender: &[u8],
        recipient: &[u8],
        amount: u64,
        seed: u64,
    ) -> TxResult<Self> {
        Ok(Self::new(
            parse_public_key(sender)?,
            parse_public_key(recipient)?,
            amount,
            seed,
        ))
    }

    pub fn with_limits(mut self, limits: EncoderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the memo. Fails with [`TxError::InvalidArgument`] if it is
    /// longer than [`MAX_MEMO_LENGTH`] bytes; the previous memo is kept.
    pub fn set_memo(&mut self, memo: &str) -> TxResult<()> {
        if memo.len() > MAX_MEMO_LENGTH {
            return Err(TxError::InvalidArgument {
                name: "memo",
                reason: format!(
                    "memo is {} bytes, at most {} allowed",
                    memo.len(),
                    MAX_MEMO_LENGTH
                ),
            });
        }
        self.memo = memo.to_string();
        Ok(())
    }

    /// Appends an asset by id, with the same checks as
    /// [`DeleteAssetsBuilder::add_asset`].
    pub fn add_asset(&mut self, id: AssetId, quantity: u64) -> TxResult<()> {
        push_amount(&mut self.entries, &self.limits, id, quantity)?;
        debug!(asset = %id, quantity, "asset added to transfer transaction");
        Ok(())
    }

    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn entries(&self) -> &[AssetAmount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limits(&self) -> &EncoderLimits {
        &self.limits
    }

    pub fn encoded_len(&self) -> usize {
        encoding::transfer_len(self.memo.len(), self.entries.len())
    }

    pub fn encode(&self) -> TxResult<EncodedBuffer> {
        encoding::encode_transfer(self)
    }
}

/// Shared append path for id-referenced entries. Leaves `entries` untouched
/// on error.
fn push_amount(
    entries: &mut Vec<AssetAmount>,
    limits: &EncoderLimits,
    id: AssetId,
    quantity: u64,
) -> TxResult<()> {
    if quantity == 0 {
        return Err(TxError::InvalidQuantity { name: id.to_hex() });
    }
    if entries.iter().any(|e| e.id == id) {
        return Err(TxError::DuplicateAsset { id: id.to_hex() });
    }
    if entries.len() >= limits.max_assets {
        return Err(TxError::TooManyAssets {
            max: limits.max_assets,
        });
    }
    entries.push(AssetAmount::new(id, quantity));
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

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
    fn add_preserves_insertion_order() {
        let fees = fees();
        let mut tx = AddAssetsBuilder::new(key(1), 123);
        tx.add_asset("Asset#10", 10, &fees, key(2)).unwrap();
        tx.add_asset("Asset#00", 10_000, &fees, key(2)).unwrap();
        tx.add_asset("Asset#05", 5, &fees, key(2)).unwrap();

        let names: Vec<&str> = tx.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Asset#10", "Asset#00", "Asset#05"]);
    }

    #[test]
    fn duplicate_name_is_rejected_without_mutation() {
        let fees = fees();
        let mut tx = AddAssetsBuilder::new(key(1), 1);
        tx.add_asset("Asset#10", 10, &fees, key(2)).unwrap();

        let err = tx.add_asset("Asset#10", 99, &fees, key(3)).unwrap_err();
        assert!(matches!(err, TxError::DuplicateAssetName { .. }));
        assert_eq!(tx.len(), 1);
        assert_eq!(tx.entries()[0].quantity(), 10);
    }

    #[test]
    fn zero_quantity_is_rejected_without_mutation() {
        let fees = fees();
        let mut tx = AddAssetsBuilder::new(key(1), 1);
        let err = tx.add_asset("Asset#10", 0, &fees, key(2)).unwrap_err();
        assert!(matches!(err, TxError::InvalidQuantity { .. }));
        assert!(tx.is_empty());
    }

    #[test]
    fn malformed_signer_key_is_rejected() {
        let err = AddAssetsBuilder::from_key_bytes(&[0u8; 31], 1).unwrap_err();
        assert!(matches!(err, TxError::InvalidPublicKey { .. }));
        assert!(AddAssetsBuilder::from_key_bytes(&[0u8; 32], 1).is_ok());
    }

    #[test]
    fn malformed_recipient_key_is_rejected() {
        let fees = fees();
        let mut tx = AddAssetsBuilder::new(key(1), 1);
        let err = tx
            .add_asset_from_slice("Asset#10", 1, &fees, &[1, 2, 3])
            .unwrap_err();
        assert!(matches!(err, TxError::InvalidPublicKey { .. }));
        assert!(tx.is_empty());
    }

    #[test]
    fn check_order_quantity_before_key_before_duplicate() {
        let fees = fees();
        let mut tx = AddAssetsBuilder::new(key(1), 1);
        tx.add_asset("dup", 1, &fees, key(2)).unwrap();

        let err = tx.add_asset_from_slice("dup", 0, &fees, &[0]).unwrap_err();
        assert!(matches!(err, TxError::InvalidQuantity { .. }));

        let err = tx.add_asset_from_slice("dup", 1, &fees, &[0]).unwrap_err();
        assert!(matches!(err, TxError::InvalidPublicKey { .. }));

        let err = tx
            .add_asset_from_slice("dup", 1, &fees, &[2; 32])
            .unwrap_err();
        assert!(matches!(err, TxError::DuplicateAssetName { .. }));
    }

    #[test]
    fn hex_recipient_is_parsed() {
        let fees = fees();
        let mut tx = AddAssetsBuilder::new(key(1), 1);
        let err = tx
            .add_asset_from_hex("Asset#10", 1, &fees, "not-hex")
            .unwrap_err();
        assert!(matches!(err, TxError::InvalidPublicKey { .. }));

        tx.add_asset_from_hex("Asset#10", 1, &fees, &key(2).to_hex())
            .unwrap();
        assert_eq!(tx.entries()[0].recipient(), &key(2));
    }

    #[test]
    fn asset_limit_is_enforced() {
        let fees = fees();
        let limits = EncoderLimits {
            max_assets: 2,
            ..EncoderLimits::default()
        };
        let mut tx = AddAssetsBuilder::new(key(1), 1).with_limits(limits);
        tx.add_asset("a", 1, &fees, key(2)).unwrap();
        tx.add_asset("b", 1, &fees, key(2)).unwrap();
        let err = tx.add_asset("c", 1, &fees, key(2)).unwrap_err();
        assert_eq!(err, TxError::TooManyAssets { max: 2 });
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn entries_share_one_schedule() {
        let fees = fees();
        let mut tx = AddAssetsBuilder::new(key(1), 1);
        tx.add_asset("a", 1, &fees, key(2)).unwrap();
        tx.add_asset("b", 1, &fees, key(2)).unwrap();
        assert!(tx.entries()[0].shares_fees_with(&tx.entries()[1]));
        // One for the caller plus one per entry.
        assert_eq!(std::sync::Arc::strong_count(&fees), 3);

        drop(tx);
        assert_eq!(std::sync::Arc::strong_count(&fees), 1);
    }

    #[test]
    fn add_asset_value_rechecks_name_limit() {
        let fees = fees();
        let entry = AssetEntry::new("a-long-name", 1, fees, key(2), 64).unwrap();
        let limits = EncoderLimits {
            max_name_length: 4,
            ..EncoderLimits::default()
        };
        let mut tx = AddAssetsBuilder::new(key(1), 1).with_limits(limits);
        assert!(matches!(
            tx.add_asset_value(entry),
            Err(TxError::InvalidAssetName { .. })
        ));
    }

    #[test]
    fn random_seeds_differ() {
        let a = AddAssetsBuilder::with_random_seed(key(1));
        let b = AddAssetsBuilder::with_random_seed(key(1));
        // 2^-64 chance of a false failure.
        assert_ne!(a.seed(), b.seed());
    }

    #[test]
    fn delete_builder_checks() {
        let mut tx = DeleteAssetsBuilder::new(key(1), 7);
        let id = AssetId::from_data("Asset#10", &key(1));

        assert!(matches!(
            tx.add_asset(id, 0),
            Err(TxError::InvalidQuantity { .. })
        ));
        tx.add_asset(id, 3).unwrap();
        assert!(matches!(
            tx.add_asset(id, 4),
            Err(TxError::DuplicateAsset { .. })
        ));
        assert!(matches!(
            tx.add_asset_by_name("Asset#10", 4),
            Err(TxError::DuplicateAsset { .. })
        ));
        tx.add_asset_by_name("Asset#00", 4).unwrap();
        assert_eq!(tx.len(), 2);
        assert_eq!(tx.entries()[1].id, AssetId::from_data("Asset#00", &key(1)));
    }

    #[test]
    fn transfer_builder_checks() {
        let id = AssetId::from_data("Asset#10", &key(1));
        let mut tx = TransferBuilder::new(key(1), key(2), 50, 9);
        assert!(matches!(
            tx.add_asset(id, 0),
            Err(TxError::InvalidQuantity { .. })
        ));
        tx.add_asset(id, 3).unwrap();
        assert!(matches!(
            tx.add_asset(id, 1),
            Err(TxError::DuplicateAsset { .. })
        ));
        assert_eq!(tx.len(), 1);
        assert_eq!(tx.recipient(), &key(2));
        assert_eq!(tx.amount(), 50);
    }

    #[test]
    fn transfer_memo_is_bounded() {
        let mut tx = TransferBuilder::new(key(1), key(2), 0, 1);
        tx.set_memo("rent, march").unwrap();

        let long = "m".repeat(MAX_MEMO_LENGTH + 1);
        assert!(matches!(
            tx.set_memo(&long),
            Err(TxError::InvalidArgument { .. })
        ));
        assert_eq!(tx.memo(), "rent, march");
        tx.set_memo(&long[1..]).unwrap();
        assert_eq!(tx.memo().len(), MAX_MEMO_LENGTH);
    }

    #[test]
    fn transfer_keys_are_validated() {
        let err = TransferBuilder::from_key_bytes(&[0u8; 32], &[0u8; 5], 1, 1).unwrap_err();
        assert!(matches!(err, TxError::InvalidPublicKey { .. }));
        assert!(TransferBuilder::from_key_bytes(&[0u8; 32], &[1u8; 32], 1, 1).is_ok());
    }
}
