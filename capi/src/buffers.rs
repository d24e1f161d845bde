//! Byte buffers handed out to C callers.
//!
//! Every buffer returned by an `*_into_bytes` call is kept in a registry
//! keyed by its address until the caller gives it back through
//! `ac_bytes_free`. The allocation itself never leaves Rust ownership, so a
//! bad free is reported instead of corrupting the heap.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

use assetchain_protocol::error::{TxError, TxResult};

type Registry = Mutex<HashMap<usize, Box<[u8]>>>;

fn registry() -> &'static Registry {
    static BUFFERS: OnceLock<Registry> = OnceLock::new();
    BUFFERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Copies `bytes` into a registered allocation and returns its address and
/// length.
pub fn export(bytes: &[u8]) -> (*mut u8, usize) {
    let mut boxed: Box<[u8]> = bytes.into();
    let ptr = boxed.as_mut_ptr();
    let len = boxed.len();
    registry().lock().insert(ptr as usize, boxed);
    (ptr, len)
}

/// Releases a buffer previously returned by [`export`].
///
/// An address that is not registered (never exported, or already released)
/// is a [`TxError::DoubleRelease`]. A registered address with the wrong
/// length is a [`TxError::InvalidHandle`] and the buffer stays registered.
pub fn release(ptr: *const u8, len: usize) -> TxResult<()> {
    let mut buffers = registry().lock();
    let key = ptr as usize;
    match buffers.get(&key) {
        None => Err(TxError::DoubleRelease {
            what: format!("buffer {:p}", ptr),
        }),
        Some(buf) if buf.len() != len => Err(TxError::InvalidHandle {
            what: format!(
                "buffer {:p}: released with length {}, allocated with {}",
                ptr,
                len,
                buf.len()
            ),
        }),
        Some(_) => {
            buffers.remove(&key);
            Ok(())
        }
    }
}

/// `true` if `ptr` is a live exported buffer.
pub fn is_live(ptr: *const u8) -> bool {
    registry().lock().contains_key(&(ptr as usize))
}
