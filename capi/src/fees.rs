//! Fee schedule handles.
//!
//! A handle holds one reference to a shared schedule. Entries added with it
//! hold their own, so releasing the handle early does not affect
//! transactions that already use the schedule.

use std::ffi::c_char;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::debug;

use assetchain_protocol::assets::{FeeSchedule, SharedFees};
use assetchain_protocol::error::TxResult;

use crate::boundary::{c_str, guard, release_status};
use crate::handles::HandleTable;

type Schedules = Mutex<HandleTable<SharedFees>>;

fn schedules() -> &'static Schedules {
    static SCHEDULES: OnceLock<Schedules> = OnceLock::new();
    SCHEDULES.get_or_init(|| Mutex::new(HandleTable::new("fee schedule")))
}

/// Clones the schedule behind `handle`. The table lock is released before
/// this returns.
pub(crate) fn lookup(handle: u64) -> TxResult<SharedFees> {
    schedules().lock().get(handle).map(SharedFees::clone)
}

/// Creates a fee schedule from three (share, rate) pairs in the order
/// recipient, trade, exchange. Rates are decimal strings in `[0, 1]`.
///
/// Returns 0 and fills `err` on failure.
///
/// # Safety
///
/// Each rate pointer must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ac_fees_create(
    recipient_share: u64,
    recipient_rate: *const c_char,
    trade_share: u64,
    trade_rate: *const c_char,
    exchange_share: u64,
    exchange_rate: *const c_char,
    err: u64,
) -> u64 {
    guard("ac_fees_create", err, 0, || {
        let schedule = FeeSchedule::new(
            recipient_share,
            c_str(recipient_rate, "recipient_rate")?,
            trade_share,
            c_str(trade_rate, "trade_rate")?,
            exchange_share,
            c_str(exchange_rate, "exchange_rate")?,
        )?;
        let handle = schedules().lock().insert(schedule.shared());
        debug!(handle, "fee schedule created");
        Ok(handle)
    })
}

/// Releases a fee schedule handle. Returns 0, or the error kind code on
/// misuse.
#[no_mangle]
pub extern "C" fn ac_fees_free(fees: u64) -> u32 {
    release_status("ac_fees_free", || schedules().lock().remove(fees).map(drop))
}
