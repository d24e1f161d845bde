//! Fee schedules attached to asset entries.
//!
//! A [`FeeSchedule`] says what the ledger charges when an asset changes
//! hands: a fixed share plus a fractional rate for each of the recipient,
//! trade and exchange paths. Schedules are immutable once created and are
//! shared between entries through an `Arc`, so one schedule can back every
//! asset in a batch without copying.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::rate::Rate;
use crate::error::{TxError, TxResult};

/// A fixed share plus a fractional rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fee {
    /// Fixed part, in the smallest unit.
    pub share: u64,
    /// Fractional part, applied to the amount being moved.
    pub rate: Rate,
}

impl Fee {
    pub fn new(share: u64, rate: Rate) -> Self {
        Self { share, rate }
    }

    /// Parses the rate string and builds the fee. `field` names the fee in
    /// the error message.
    pub fn parse(field: &'static str, share: u64, rate: &str) -> TxResult<Self> {
        let rate = rate.parse::<Rate>().map_err(|e| TxError::InvalidFeeRate {
            field,
            value: rate.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { share, rate })
    }

    /// Total fee for moving `amount` units: `share + floor(amount * rate)`,
    /// saturating at `u64::MAX`.
    pub fn compute(&self, amount: u64) -> u64 {
        self.share.saturating_add(self.rate.apply(amount))
    }
}

/// Immutable recipient/trade/exchange fee parameters.
///
/// The field order here is the wire order: recipient, trade, exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeSchedule {
    recipient: Fee,
    trade: Fee,
    exchange: Fee,
}

/// How fee schedules are shared between entries.
pub type SharedFees = Arc<FeeSchedule>;

impl FeeSchedule {
    /// Builds a schedule from shares and decimal rate strings.
    ///
    /// Fails with [`TxError::InvalidFeeRate`] on the first rate that is not an
    /// exact decimal in `[0, 1]`; the error names which one.
    pub fn new(
        recipient_share: u64,
        recipient_rate: &str,
        trade_share: u64,
        trade_rate: &str,
        exchange_share: u64,
        exchange_rate: &str,
    ) -> TxResult<Self> {
        Ok(Self {
            recipient: Fee::parse("recipient", recipient_share, recipient_rate)?,
            trade: Fee::parse("trade", trade_share, trade_rate)?,
            exchange: Fee::parse("exchange", exchange_share, exchange_rate)?,
        })
    }

    /// Builds a schedule from already-validated fees.
    pub fn from_fees(recipient: Fee, trade: Fee, exchange: Fee) -> Self {
        Self {
            recipient,
            trade,
            exchange,
        }
    }

    /// Wraps the schedule for sharing between entries.
    pub fn shared(self) -> SharedFees {
        Arc::new(self)
    }

    pub fn recipient(&self) -> &Fee {
        &self.recipient
    }

    pub fn trade(&self) -> &Fee {
        &self.trade
    }

    pub fn exchange(&self) -> &Fee {
        &self.exchange
    }

    /// The three fees in wire order.
    pub fn in_wire_order(&self) -> [&Fee; 3] {
        [&self.recipient, &self.trade, &self.exchange]
    }
}
