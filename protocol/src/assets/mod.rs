//! # Assets Module
//!
//! The value types that go inside an asset transaction.
//!
//! ```text
//! rate.rs  : Exact decimal rates in [0, 1]
//! fees.rs  : Fee and FeeSchedule (recipient / trade / exchange)
//! entry.rs : AssetEntry for add_assets, AssetId derivation
//! ```
//!
//! All amounts are `u64` in the smallest unit and all rates are exact
//! decimals. Nothing in here ever touches `f64`.

pub mod entry;
pub mod fees;
pub mod rate;

pub use entry::{AssetEntry, AssetId};
pub use fees::{Fee, FeeSchedule, SharedFees};
pub use rate::{Rate, RateError};
