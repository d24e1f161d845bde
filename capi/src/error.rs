//! Error contexts for C callers.
//!
//! C has no `Result`, so every fallible `ac_*` function takes an error
//! context handle. On failure the function writes the error into the
//! context and returns its "no value" sentinel. A successful call leaves
//! the context untouched; callers check the return value, not the context.

use std::ffi::{c_char, CString};
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::warn;

use assetchain_protocol::error::{ErrorKind, TxError};

use crate::boundary::release_status;
use crate::handles::HandleTable;

/// The last error recorded against one context.
#[derive(Debug, Default)]
pub struct ErrorContext {
    kind: Option<ErrorKind>,
    message: CString,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the context with `err`.
    pub fn set(&mut self, err: &TxError) {
        self.kind = Some(err.kind());
        self.message = to_c_string(err.to_string());
    }

    /// Empty string if nothing was recorded.
    pub fn message(&self) -> &CString {
        &self.message
    }

    /// Code of the last error, 0 if none.
    pub fn kind_code(&self) -> u32 {
        self.kind.map_or(0, ErrorKind::code)
    }

    pub fn is_set(&self) -> bool {
        self.kind.is_some()
    }
}

/// Interior NULs would truncate the message on the C side anyway; cut there.
fn to_c_string(message: String) -> CString {
    match CString::new(message) {
        Ok(s) => s,
        Err(e) => {
            let nul = e.nul_position();
            let mut bytes = e.into_vec();
            bytes.truncate(nul);
            CString::new(bytes).unwrap_or_default()
        }
    }
}

type Contexts = Mutex<HandleTable<ErrorContext>>;

fn contexts() -> &'static Contexts {
    static CONTEXTS: OnceLock<Contexts> = OnceLock::new();
    CONTEXTS.get_or_init(|| Mutex::new(HandleTable::new("error context")))
}

/// Records `err` against the context `handle`. A zero handle means the
/// caller does not want details; a stale one is logged and otherwise
/// ignored.
pub(crate) fn record(handle: u64, err: &TxError) {
    if handle == 0 {
        return;
    }
    match contexts().lock().get_mut(handle) {
        Ok(ctx) => ctx.set(err),
        Err(lookup) => warn!(
            error = %err,
            context = %lookup,
            "could not record error in context"
        ),
    }
}

// ---------------------------------------------------------------------------
// Exported functions
// ---------------------------------------------------------------------------

/// Creates an empty error context. Release with [`ac_error_free`].
#[no_mangle]
pub extern "C" fn ac_error_new() -> u64 {
    contexts().lock().insert(ErrorContext::new())
}

/// Message of the last error recorded in `err`, or an empty string.
///
/// The pointer stays valid until the next failure recorded in the same
/// context or until the context is released. Returns null for a released
/// or unknown handle.
#[no_mangle]
pub extern "C" fn ac_error_message(err: u64) -> *const c_char {
    match contexts().lock().get(err) {
        Ok(ctx) => ctx.message().as_ptr(),
        Err(e) => {
            warn!(error = %e, "ac_error_message on a bad handle");
            std::ptr::null()
        }
    }
}

/// Stable numeric kind of the last error in `err`: 0 if none was recorded,
/// or the kind of the lookup failure if `err` itself is bad.
#[no_mangle]
pub extern "C" fn ac_error_kind(err: u64) -> u32 {
    match contexts().lock().get(err) {
        Ok(ctx) => ctx.kind_code(),
        Err(e) => e.kind().code(),
    }
}

/// Releases an error context. Returns 0, or the error kind code on misuse.
#[no_mangle]
pub extern "C" fn ac_error_free(err: u64) -> u32 {
    release_status("ac_error_free", || contexts().lock().remove(err).map(drop))
}
