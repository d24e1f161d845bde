//! Transaction builder handles and encoded byte buffers.
//!
//! `*_into_bytes` does not consume the builder: it can be encoded again,
//! extended, and must still be released with its `*_free` function. The
//! returned buffer is released separately with [`ac_bytes_free`].

use std::ffi::c_char;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::debug;

use assetchain_protocol::assets::AssetId;
use assetchain_protocol::error::{TxError, TxResult};
use assetchain_protocol::transaction::{
    parse_public_key_hex, AddAssetsBuilder, DeleteAssetsBuilder, EncodedBuffer, TransferBuilder,
};

use crate::boundary::{c_str, guard, release_status};
use crate::handles::HandleTable;
use crate::{buffers, fees};

type AddTable = Mutex<HandleTable<AddAssetsBuilder>>;
type DeleteTable = Mutex<HandleTable<DeleteAssetsBuilder>>;
type TransferTable = Mutex<HandleTable<TransferBuilder>>;

fn add_assets() -> &'static AddTable {
    static TABLE: OnceLock<AddTable> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HandleTable::new("add_assets transaction")))
}

fn delete_assets() -> &'static DeleteTable {
    static TABLE: OnceLock<DeleteTable> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HandleTable::new("delete_assets transaction")))
}

fn transfers() -> &'static TransferTable {
    static TABLE: OnceLock<TransferTable> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HandleTable::new("transfer transaction")))
}

/// Writes the encoded bytes out as a registered buffer.
///
/// # Safety
///
/// `out_len` must be null or valid for a `usize` write.
unsafe fn export(encoded: TxResult<EncodedBuffer>, out_len: *mut usize) -> TxResult<*mut u8> {
    if out_len.is_null() {
        return Err(TxError::InvalidArgument {
            name: "out_len",
            reason: "null pointer".to_string(),
        });
    }
    let encoded = encoded?;
    let (ptr, len) = buffers::export(encoded.as_bytes());
    *out_len = len;
    debug!(kind = %encoded.kind(), len, "encoded transaction exported");
    Ok(ptr)
}

// ---------------------------------------------------------------------------
// add_assets
// ---------------------------------------------------------------------------

/// Creates an empty `add_assets` builder for the hex-encoded signer key.
///
/// Returns 0 and fills `err` on failure.
///
/// # Safety
///
/// `public_key` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_add_assets_create(
    public_key: *const c_char,
    seed: u64,
    err: u64,
) -> u64 {
    guard("ac_tx_add_assets_create", err, 0, || {
        let signer = parse_public_key_hex(c_str(public_key, "public_key")?)?;
        Ok(add_assets().lock().insert(AddAssetsBuilder::new(signer, seed)))
    })
}

/// Appends an asset to an `add_assets` builder.
///
/// Returns `false` and fills `err` on failure; the builder is unchanged.
///
/// # Safety
///
/// `name` and `recipient` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_add_assets_add_asset(
    tx: u64,
    name: *const c_char,
    quantity: u64,
    fees: u64,
    recipient: *const c_char,
    err: u64,
) -> bool {
    guard("ac_tx_add_assets_add_asset", err, false, || {
        let name = c_str(name, "name")?;
        let recipient = c_str(recipient, "recipient")?;
        let schedule = fees::lookup(fees)?;
        add_assets()
            .lock()
            .get_mut(tx)?
            .add_asset_from_hex(name, quantity, &schedule, recipient)?;
        Ok(true)
    })
}

/// Encodes an `add_assets` builder.
///
/// On success writes the length to `out_len` and returns a buffer that must
/// be released with [`ac_bytes_free`]. Returns null and fills `err` on
/// failure.
///
/// # Safety
///
/// `out_len` must be null or valid for a `usize` write.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_add_assets_into_bytes(
    tx: u64,
    out_len: *mut usize,
    err: u64,
) -> *mut u8 {
    guard(
        "ac_tx_add_assets_into_bytes",
        err,
        std::ptr::null_mut(),
        || {
            let encoded = add_assets().lock().get(tx)?.encode();
            export(encoded, out_len)
        },
    )
}

/// Releases an `add_assets` builder. Fee schedules it references stay alive
/// as long as their own handles do. Returns 0, or the error kind code on
/// misuse.
#[no_mangle]
pub extern "C" fn ac_tx_add_assets_free(tx: u64) -> u32 {
    release_status("ac_tx_add_assets_free", || {
        add_assets().lock().remove(tx).map(drop)
    })
}

// ---------------------------------------------------------------------------
// delete_assets
// ---------------------------------------------------------------------------

/// Creates an empty `delete_assets` builder for the hex-encoded signer key.
///
/// # Safety
///
/// `public_key` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_delete_assets_create(
    public_key: *const c_char,
    seed: u64,
    err: u64,
) -> u64 {
    guard("ac_tx_delete_assets_create", err, 0, || {
        let signer = parse_public_key_hex(c_str(public_key, "public_key")?)?;
        Ok(delete_assets()
            .lock()
            .insert(DeleteAssetsBuilder::new(signer, seed)))
    })
}

/// Appends an asset, given by its 32-character hex id, to a
/// `delete_assets` builder.
///
/// # Safety
///
/// `asset_id` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_delete_assets_add_asset(
    tx: u64,
    asset_id: *const c_char,
    quantity: u64,
    err: u64,
) -> bool {
    guard("ac_tx_delete_assets_add_asset", err, false, || {
        let id = AssetId::from_hex(c_str(asset_id, "asset_id")?)?;
        delete_assets().lock().get_mut(tx)?.add_asset(id, quantity)?;
        Ok(true)
    })
}

/// Encodes a `delete_assets` builder. Same contract as
/// [`ac_tx_add_assets_into_bytes`].
///
/// # Safety
///
/// `out_len` must be null or valid for a `usize` write.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_delete_assets_into_bytes(
    tx: u64,
    out_len: *mut usize,
    err: u64,
) -> *mut u8 {
    guard(
        "ac_tx_delete_assets_into_bytes",
        err,
        std::ptr::null_mut(),
        || {
            let encoded = delete_assets().lock().get(tx)?.encode();
            export(encoded, out_len)
        },
    )
}

/// Releases a `delete_assets` builder.
#[no_mangle]
pub extern "C" fn ac_tx_delete_assets_free(tx: u64) -> u32 {
    release_status("ac_tx_delete_assets_free", || {
        delete_assets().lock().remove(tx).map(drop)
    })
}

// ---------------------------------------------------------------------------
// transfer
// ---------------------------------------------------------------------------

/// Creates an empty `transfer` builder moving `amount` coins and, once
/// assets are added, those assets from `from` to `to` (both hex keys).
/// `memo` may be null for no memo.
///
/// # Safety
///
/// `from`, `to` and `memo` must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_transfer_create(
    from: *const c_char,
    to: *const c_char,
    amount: u64,
    seed: u64,
    memo: *const c_char,
    err: u64,
) -> u64 {
    guard("ac_tx_transfer_create", err, 0, || {
        let sender = parse_public_key_hex(c_str(from, "from")?)?;
        let recipient = parse_public_key_hex(c_str(to, "to")?)?;
        let mut tx = TransferBuilder::new(sender, recipient, amount, seed);
        if !memo.is_null() {
            tx.set_memo(c_str(memo, "memo")?)?;
        }
        Ok(transfers().lock().insert(tx))
    })
}

/// Appends an asset, given by its hex id, to a `transfer` builder.
///
/// # Safety
///
/// `asset_id` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_transfer_add_asset(
    tx: u64,
    asset_id: *const c_char,
    quantity: u64,
    err: u64,
) -> bool {
    guard("ac_tx_transfer_add_asset", err, false, || {
        let id = AssetId::from_hex(c_str(asset_id, "asset_id")?)?;
        transfers().lock().get_mut(tx)?.add_asset(id, quantity)?;
        Ok(true)
    })
}

/// Encodes a `transfer` builder. Same contract as
/// [`ac_tx_add_assets_into_bytes`].
///
/// # Safety
///
/// `out_len` must be null or valid for a `usize` write.
#[no_mangle]
pub unsafe extern "C" fn ac_tx_transfer_into_bytes(
    tx: u64,
    out_len: *mut usize,
    err: u64,
) -> *mut u8 {
    guard(
        "ac_tx_transfer_into_bytes",
        err,
        std::ptr::null_mut(),
        || {
            let encoded = transfers().lock().get(tx)?.encode();
            export(encoded, out_len)
        },
    )
}

/// Releases a `transfer` builder.
#[no_mangle]
pub extern "C" fn ac_tx_transfer_free(tx: u64) -> u32 {
    release_status("ac_tx_transfer_free", || transfers().lock().remove(tx).map(drop))
}

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

/// Releases a buffer returned by an `*_into_bytes` function. `len` must be
/// the length reported with it. Returns 0, or the error kind code on
/// misuse: `DoubleRelease` for a pointer that is not live, `InvalidHandle`
/// for a length mismatch.
#[no_mangle]
pub extern "C" fn ac_bytes_free(buf: *mut u8, len: usize) -> u32 {
    release_status("ac_bytes_free", || buffers::release(buf, len))
}
