//! Plumbing shared by every exported function: panic containment, result
//! flattening, and C string arguments.

use std::any::Any;
use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

use assetchain_protocol::error::{TxError, TxResult};

use crate::error::record;

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

fn contain<T>(op: &'static str, f: impl FnOnce() -> TxResult<T>) -> TxResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload);
            error!(op, panic = %message, "panic caught at the C boundary");
            Err(TxError::Internal(message))
        }
    }
}

/// Runs `f`, recording any failure in the error context `err` and returning
/// `fallback` instead. Panics never unwind past this point.
pub(crate) fn guard<T>(
    op: &'static str,
    err: u64,
    fallback: T,
    f: impl FnOnce() -> TxResult<T>,
) -> T {
    match contain(op, f) {
        Ok(value) => value,
        Err(e) => {
            record(err, &e);
            fallback
        }
    }
}

/// Runs a release operation and flattens it to a status code: 0 on success,
/// otherwise the error kind code. Misuse is logged since there is no error
/// context to carry it.
pub(crate) fn release_status(op: &'static str, f: impl FnOnce() -> TxResult<()>) -> u32 {
    match contain(op, f) {
        Ok(()) => 0,
        Err(e) => {
            warn!(op, error = %e, "release failed");
            e.kind().code()
        }
    }
}

/// Borrows a C string argument as UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned reference.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char, name: &'static str) -> TxResult<&'a str> {
    if ptr.is_null() {
        return Err(TxError::InvalidArgument {
            name,
            reason: "null pointer".to_string(),
        });
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| TxError::InvalidArgument {
            name,
            reason: e.to_string(),
        })
}
