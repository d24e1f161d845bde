// Copyright (c) 2026 Assetchain Contributors. MIT License.
// See LICENSE for details.

//! # Assetchain C API
//!
//! C bindings over `assetchain-protocol` for wallets and services that are
//! not written in Rust.
//!
//! ## Handles
//!
//! Builders, fee schedules and error contexts never leave Rust. Callers get
//! an opaque `u64` handle (0 is never a valid one) backed by a generational
//! table, so a stale handle is diagnosed instead of dereferenced:
//!
//! - releasing twice reports `DoubleRelease`;
//! - using after release reports `UseAfterRelease`;
//! - a value that was never a handle reports `InvalidHandle`.
//!
//! ## Errors
//!
//! Every fallible call takes an error context from [`ac_error_new`]. On
//! failure it records the error there and returns 0, null or `false`.
//! Release functions return a status code instead: 0 on success, otherwise
//! the numeric error kind.
//!
//! ## Memory Management
//!
//! Every `*_create` / `*_new` function has a matching `*_free` function.
//! Buffers from `*_into_bytes` are released with [`ac_bytes_free`] using
//! the length reported alongside them.

pub mod buffers;
pub mod error;
pub mod fees;
pub mod handles;
pub mod logging;
pub mod tx;

mod boundary;

pub use error::{ac_error_free, ac_error_kind, ac_error_message, ac_error_new, ErrorContext};
pub use fees::{ac_fees_create, ac_fees_free};
pub use logging::{ac_logging_init, init_logging, LogFormat};
pub use tx::{
    ac_bytes_free, ac_tx_add_assets_add_asset, ac_tx_add_assets_create, ac_tx_add_assets_free,
    ac_tx_add_assets_into_bytes, ac_tx_delete_assets_add_asset, ac_tx_delete_assets_create,
    ac_tx_delete_assets_free, ac_tx_delete_assets_into_bytes, ac_tx_transfer_add_asset,
    ac_tx_transfer_create, ac_tx_transfer_free, ac_tx_transfer_into_bytes,
};

/// Library version as a static NUL-terminated string.
#[no_mangle]
pub extern "C" fn ac_version() -> *const std::ffi::c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const std::ffi::c_char
}
