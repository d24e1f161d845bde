//! Canonical binary encoding of asset transactions.
//!
//! The output of this module is exactly what gets signed, so it has to be
//! boring: fixed-width little-endian integers, length-prefixed strings, and
//! fields in one documented order. No maps, no floats, no varints. A given
//! builder state has exactly one encoding and the decoder accepts nothing
//! else.
//!
//! ```text
//! header (46 bytes)
//!   kind tag        u16
//!   signer key      [u8; 32]
//!   seed            u64
//!   entry count     u32
//!
//! add_assets entry (95 + name bytes)
//!   name length     u32
//!   name            [u8; name length], UTF-8
//!   quantity        u64
//!   fees            recipient, trade, exchange; each
//!                     share u64, rate mantissa u64, rate scale u8
//!   recipient key   [u8; 32]
//!
//! delete_assets entry (24 bytes)
//!   asset id        [u8; 16]
//!   quantity        u64
//!
//! transfer body, between the header and its entries (44 + memo bytes)
//!   recipient key   [u8; 32]
//!   coin amount     u64
//!   memo length     u32
//!   memo            [u8; memo length], UTF-8
//!
//! transfer entry (24 bytes), laid out like a delete_assets entry
//! ```
//!
//! Sizes are computed before anything is allocated, so an oversized
//! transaction is rejected with [`TxError::EncodingOverflow`] without
//! touching the heap.

use bytes::{Buf, BufMut, BytesMut};
use tracing::debug;

use super::buffer::EncodedBuffer;
use super::builder::{AddAssetsBuilder, DeleteAssetsBuilder, TransferBuilder};
use super::types::TransactionKind;
use crate::assets::{AssetEntry, AssetId, Fee, FeeSchedule, Rate, SharedFees};
use crate::config::{
    kind_name, EncoderLimits, ADD_ASSETS_ENTRY_FIXED_SIZE, ASSET_ID_LENGTH, DELETE_ASSETS_ENTRY_SIZE,
    HEADER_SIZE, MAX_MEMO_LENGTH, PUBLIC_KEY_LENGTH, TRANSFER_ENTRY_SIZE, TRANSFER_FIXED_SIZE,
};
use crate::crypto::PublicKey;
use crate::error::{TxError, TxResult};

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// Encoded length of an `add_assets` transaction with these entries.
/// Saturates instead of overflowing so the size check still fires.
pub fn add_assets_len(entries: &[AssetEntry]) -> usize {
    entries.iter().fold(HEADER_SIZE, |acc, e| {
        acc.saturating_add(ADD_ASSETS_ENTRY_FIXED_SIZE)
            .saturating_add(e.name().len())
    })
}

/// Encoded length of a `delete_assets` transaction with `count` entries.
pub fn delete_assets_len(count: usize) -> usize {
    count
        .saturating_mul(DELETE_ASSETS_ENTRY_SIZE)
        .saturating_add(HEADER_SIZE)
}

/// Encoded length of a `transfer` transaction with a `memo_len`-byte memo
/// and `count` entries.
pub fn transfer_len(memo_len: usize, count: usize) -> usize {
    count
        .saturating_mul(TRANSFER_ENTRY_SIZE)
        .saturating_add(HEADER_SIZE + TRANSFER_FIXED_SIZE)
        .saturating_add(memo_len)
}

fn check_size(size: usize, limits: &EncoderLimits) -> TxResult<()> {
    if size > limits.max_encoded_size {
        return Err(TxError::EncodingOverflow {
            size,
            max: limits.max_encoded_size,
        });
    }
    Ok(())
}

fn wire_u32(value: usize, size: usize) -> TxResult<u32> {
    u32::try_from(value).map_err(|_| TxError::EncodingOverflow {
        size,
        max: u32::MAX as usize,
    })
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn put_header(
    buf: &mut BytesMut,
    kind: TransactionKind,
    signer: &PublicKey,
    seed: u64,
    count: u32,
) {
    buf.put_u16_le(kind.tag());
    buf.put_slice(signer.as_bytes());
    buf.put_u64_le(seed);
    buf.put_u32_le(count);
}

fn put_fee(buf: &mut BytesMut, fee: &Fee) {
    buf.put_u64_le(fee.share);
    buf.put_u64_le(fee.rate.mantissa());
    buf.put_u8(fee.rate.scale());
}

/// Encodes an `add_assets` builder.
///
/// Fails with [`TxError::EmptyTransaction`] if there are no entries and
/// [`TxError::EncodingOverflow`] if the result would exceed the builder's
/// `max_encoded_size`.
pub fn encode_add_assets(tx: &AddAssetsBuilder) -> TxResult<EncodedBuffer> {
    let entries = tx.entries();
    if entries.is_empty() {
        return Err(TxError::EmptyTransaction);
    }
    let size = add_assets_len(entries);
    check_size(size, tx.limits())?;
    let count = wire_u32(entries.len(), size)?;

    let mut buf = BytesMut::with_capacity(size);
    put_header(&mut buf, TransactionKind::AddAssets, tx.signer(), tx.seed(), count);
    for entry in entries {
        let name = entry.name().as_bytes();
        buf.put_u32_le(wire_u32(name.len(), size)?);
        buf.put_slice(name);
        buf.put_u64_le(entry.quantity());
        for fee in entry.fees().in_wire_order() {
            put_fee(&mut buf, fee);
        }
        buf.put_slice(entry.recipient().as_bytes());
    }
    debug_assert_eq!(buf.len(), size);

    debug!(
        entries = entries.len(),
        size,
        seed = tx.seed(),
        "encoded add_assets transaction"
    );
    Ok(EncodedBuffer::new(TransactionKind::AddAssets, buf.freeze()))
}

/// Encodes a `delete_assets` builder. Same failure modes as
/// [`encode_add_assets`].
pub fn encode_delete_assets(tx: &DeleteAssetsBuilder) -> TxResult<EncodedBuffer> {
    let entries = tx.entries();
    if entries.is_empty() {
        return Err(TxError::EmptyTransaction);
    }
    let size = delete_assets_len(entries.len());
    check_size(size, tx.limits())?;
    let count = wire_u32(entries.len(), size)?;

    let mut buf = BytesMut::with_capacity(size);
    put_header(
        &mut buf,
        TransactionKind::DeleteAssets,
        tx.signer(),
        tx.seed(),
        count,
    );
    for entry in entries {
        buf.put_slice(entry.id.as_bytes());
        buf.put_u64_le(entry.quantity);
    }
    debug_assert_eq!(buf.len(), size);

    debug!(
        entries = entries.len(),
        size,
        seed = tx.seed(),
        "encoded delete_assets transaction"
    );
    Ok(EncodedBuffer::new(TransactionKind::DeleteAssets, buf.freeze()))
}

/// Encodes a `transfer` builder. Same failure modes as
/// [`encode_add_assets`]; a transfer needs at least one asset entry even
/// when it also moves coins.
pub fn encode_transfer(tx: &TransferBuilder) -> TxResult<EncodedBuffer> {
    let entries = tx.entries();
    if entries.is_empty() {
        return Err(TxError::EmptyTransaction);
    }
    let memo = tx.memo().as_bytes();
    let size = transfer_len(memo.len(), entries.len());
    check_size(size, tx.limits())?;
    let count = wire_u32(entries.len(), size)?;

    let mut buf = BytesMut::with_capacity(size);
    put_header(&mut buf, TransactionKind::Transfer, tx.signer(), tx.seed(), count);
    buf.put_slice(tx.recipient().as_bytes());
    buf.put_u64_le(tx.amount());
    buf.put_u32_le(wire_u32(memo.len(), size)?);
    buf.put_slice(memo);
    for entry in entries {
        buf.put_slice(entry.id.as_bytes());
        buf.put_u64_le(entry.quantity);
    }
    debug_assert_eq!(buf.len(), size);

    debug!(
        entries = entries.len(),
        amount = tx.amount(),
        size,
        seed = tx.seed(),
        "encoded transfer transaction"
    );
    Ok(EncodedBuffer::new(TransactionKind::Transfer, buf.freeze()))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Cursor over untrusted bytes. Every read checks the remaining length
/// first, so truncated input is an error, never a panic.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize, what: &str) -> TxResult<()> {
        if self.buf.remaining() < n {
            return Err(TxError::malformed(format!(
                "truncated {}: need {} bytes, {} left",
                what,
                n,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    fn u8(&mut self, what: &str) -> TxResult<u8> {
        self.need(1, what)?;
        Ok(self.buf.get_u8())
    }

    fn u16(&mut self, what: &str) -> TxResult<u16> {
        self.need(2, what)?;
        Ok(self.buf.get_u16_le())
    }

    fn u32(&mut self, what: &str) -> TxResult<u32> {
        self.need(4, what)?;
        Ok(self.buf.get_u32_le())
    }

    fn u64(&mut self, what: &str) -> TxResult<u64> {
        self.need(8, what)?;
        Ok(self.buf.get_u64_le())
    }

    fn take(&mut self, n: usize, what: &str) -> TxResult<&'a [u8]> {
        self.need(n, what)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn public_key(&mut self, what: &str) -> TxResult<PublicKey> {
        let bytes = self.take(PUBLIC_KEY_LENGTH, what)?;
        PublicKey::try_from_slice(bytes).map_err(|e| TxError::malformed(e.to_string()))
    }

    fn rate(&mut self) -> TxResult<Rate> {
        let mantissa = self.u64("rate mantissa")?;
        let scale = self.u8("rate scale")?;
        Rate::from_parts(mantissa, scale).map_err(|e| TxError::malformed(e.to_string()))
    }

    fn fee(&mut self) -> TxResult<Fee> {
        let share = self.u64("fee share")?;
        Ok(Fee::new(share, self.rate()?))
    }

    fn finish(self) -> TxResult<()> {
        if self.buf.has_remaining() {
            return Err(TxError::malformed(format!(
                "{} trailing bytes",
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}

struct Header {
    signer: PublicKey,
    seed: u64,
    count: usize,
}

/// Reads and checks the header. `min_entry` is the smallest possible entry
/// size, used to reject counts the remaining bytes cannot hold before any
/// entry is read.
fn read_header(
    reader: &mut Reader<'_>,
    expected: TransactionKind,
    min_entry: usize,
) -> TxResult<Header> {
    let tag = reader.u16("kind tag")?;
    if tag != expected.tag() {
        return Err(TxError::malformed(format!(
            "expected {} transaction, found {}",
            kind_name(expected.tag()),
            kind_name(tag)
        )));
    }
    let signer = reader.public_key("signer key")?;
    let seed = reader.u64("seed")?;
    let count = reader.u32("entry count")? as usize;
    if count == 0 {
        return Err(TxError::malformed("entry count is zero"));
    }
    if count.saturating_mul(min_entry) > reader.remaining() {
        return Err(TxError::malformed(format!(
            "entry count {} does not fit in {} remaining bytes",
            count,
            reader.remaining()
        )));
    }
    Ok(Header {
        signer,
        seed,
        count,
    })
}

/// Reads the kind tag without decoding the rest.
pub fn peek_kind(bytes: &[u8]) -> TxResult<TransactionKind> {
    let tag = Reader::new(bytes).u16("kind tag")?;
    TransactionKind::from_tag(tag)
        .ok_or_else(|| TxError::malformed(format!("unknown kind tag {}", tag)))
}

/// Limits that admit anything the encoder could have produced at this
/// length, whatever limits the original builder carried.
fn admitting(len: usize) -> EncoderLimits {
    let defaults = EncoderLimits::default();
    EncoderLimits {
        max_encoded_size: defaults.max_encoded_size.max(len),
        max_assets: defaults.max_assets.max(len),
        max_name_length: defaults.max_name_length.max(len),
    }
}

/// Applies caller limits to a payload before its entries are read.
fn check_decode_limits(len: usize, count: usize, limits: &EncoderLimits) -> TxResult<()> {
    check_size(len, limits)?;
    if count > limits.max_assets {
        return Err(TxError::TooManyAssets {
            max: limits.max_assets,
        });
    }
    Ok(())
}

/// Rebuilds an `add_assets` builder from its canonical bytes.
///
/// Entries with equal fee schedules come back sharing one allocation.
/// Any deviation from what [`encode_add_assets`] would produce (truncation,
/// trailing bytes, a non-normalized rate, a zero quantity, a duplicate
/// name) is a [`TxError::MalformedPayload`].
///
/// Accepts any well-formed payload regardless of the limits it was built
/// under; the returned builder carries limits wide enough to re-encode it.
/// Use [`decode_add_assets_with_limits`] to enforce specific ones.
pub fn decode_add_assets(bytes: &[u8]) -> TxResult<AddAssetsBuilder> {
    decode_add_assets_with_limits(bytes, admitting(bytes.len()))
}

/// Like [`decode_add_assets`], but rejects payloads outside `limits`
/// ([`TxError::EncodingOverflow`], [`TxError::TooManyAssets`], or a
/// malformed-payload error for an over-long name). The returned builder
/// keeps `limits`.
pub fn decode_add_assets_with_limits(
    bytes: &[u8],
    limits: EncoderLimits,
) -> TxResult<AddAssetsBuilder> {
    let mut reader = Reader::new(bytes);
    let header = read_header(
        &mut reader,
        TransactionKind::AddAssets,
        ADD_ASSETS_ENTRY_FIXED_SIZE,
    )?;
    check_decode_limits(bytes.len(), header.count, &limits)?;
    let mut tx = AddAssetsBuilder::new(header.signer, header.seed).with_limits(limits);
    let mut schedules: Vec<SharedFees> = Vec::new();

    for _ in 0..header.count {
        let name_len = reader.u32("name length")? as usize;
        let name = std::str::from_utf8(reader.take(name_len, "name")?)
            .map_err(|e| TxError::malformed(format!("asset name is not UTF-8: {}", e)))?;
        let quantity = reader.u64("quantity")?;
        let schedule = FeeSchedule::from_fees(reader.fee()?, reader.fee()?, reader.fee()?);
        let recipient = reader.public_key("recipient key")?;

        let fees = match schedules.iter().find(|s| ***s == schedule) {
            Some(existing) => SharedFees::clone(existing),
            None => {
                let shared = schedule.shared();
                schedules.push(SharedFees::clone(&shared));
                shared
            }
        };
        tx.add_asset(name, quantity, &fees, recipient)
            .map_err(|e| TxError::malformed(e.to_string()))?;
    }
    reader.finish()?;
    Ok(tx)
}

fn read_amounts(
    reader: &mut Reader<'_>,
    count: usize,
    mut add: impl FnMut(AssetId, u64) -> TxResult<()>,
) -> TxResult<()> {
    for _ in 0..count {
        let mut id = [0u8; ASSET_ID_LENGTH];
        id.copy_from_slice(reader.take(ASSET_ID_LENGTH, "asset id")?);
        let quantity = reader.u64("quantity")?;
        add(AssetId::from_bytes(id), quantity).map_err(|e| TxError::malformed(e.to_string()))?;
    }
    Ok(())
}

/// Rebuilds a `delete_assets` builder from its canonical bytes. Limits are
/// handled as in [`decode_add_assets`].
pub fn decode_delete_assets(bytes: &[u8]) -> TxResult<DeleteAssetsBuilder> {
    decode_delete_assets_with_limits(bytes, admitting(bytes.len()))
}

/// Like [`decode_delete_assets`], enforcing `limits`.
pub fn decode_delete_assets_with_limits(
    bytes: &[u8],
    limits: EncoderLimits,
) -> TxResult<DeleteAssetsBuilder> {
    let mut reader = Reader::new(bytes);
    let header = read_header(
        &mut reader,
        TransactionKind::DeleteAssets,
        DELETE_ASSETS_ENTRY_SIZE,
    )?;
    check_decode_limits(bytes.len(), header.count, &limits)?;
    let mut tx = DeleteAssetsBuilder::new(header.signer, header.seed).with_limits(limits);
    read_amounts(&mut reader, header.count, |id, quantity| tx.add_asset(id, quantity))?;
    reader.finish()?;
    Ok(tx)
}

/// Rebuilds a `transfer` builder from its canonical bytes. Limits are
/// handled as in [`decode_add_assets`]; a memo longer than
/// [`MAX_MEMO_LENGTH`] is malformed.
pub fn decode_transfer(bytes: &[u8]) -> TxResult<TransferBuilder> {
    decode_transfer_with_limits(bytes, admitting(bytes.len()))
}

/// Like [`decode_transfer`], enforcing `limits`.
pub fn decode_transfer_with_limits(
    bytes: &[u8],
    limits: EncoderLimits,
) -> TxResult<TransferBuilder> {
    let mut reader = Reader::new(bytes);
    let header = read_header(&mut reader, TransactionKind::Transfer, TRANSFER_ENTRY_SIZE)?;
    check_decode_limits(bytes.len(), header.count, &limits)?;
    let recipient = reader.public_key("recipient key")?;
    let amount = reader.u64("amount")?;
    let memo_len = reader.u32("memo length")? as usize;
    if memo_len > MAX_MEMO_LENGTH {
        return Err(TxError::malformed(format!(
            "memo is {} bytes, at most {} allowed",
            memo_len, MAX_MEMO_LENGTH
        )));
    }
    let memo = std::str::from_utf8(reader.take(memo_len, "memo")?)
        .map_err(|e| TxError::malformed(format!("memo is not UTF-8: {}", e)))?;

    let mut tx = TransferBuilder::new(header.signer, recipient, amount, header.seed)
        .with_limits(limits);
    tx.set_memo(memo)
        .map_err(|e| TxError::malformed(e.to_string()))?;
    read_amounts(&mut reader, header.count, |id, quantity| tx.add_asset(id, quantity))?;
    reader.finish()?;
    Ok(tx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
