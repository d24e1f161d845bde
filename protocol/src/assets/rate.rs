//! Exact decimal fee rates.
//!
//! A [`Rate`] is a fraction in `[0, 1]` parsed from a decimal string and
//! stored as `mantissa / 10^scale`. No floating point: two implementations
//! that parse `"0.99999"` must agree on every fee they compute and on every
//! byte they sign.
//!
//! Rates are normalized on construction (trailing fractional zeros are
//! dropped), so `"0.1"`, `"0.10"` and `"00.100"` are the same value with the
//! same wire bytes.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::MAX_RATE_SCALE;

/// Why a rate string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    #[error("empty string")]
    Empty,

    #[error("unexpected character {0:?}")]
    InvalidCharacter(char),

    #[error("missing digits around the decimal point")]
    MissingDigits,

    #[error("more than {max} fractional digits")]
    TooPrecise { max: u8 },

    #[error("value is greater than 1")]
    OutOfRange,

    #[error("rate {mantissa}e-{scale} is not in normalized form")]
    NotNormalized { mantissa: u64, scale: u8 },
}

/// An exact decimal fraction in `[0, 1]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rate {
    mantissa: u64,
    scale: u8,
}

impl Rate {
    /// The zero rate.
    pub const ZERO: Rate = Rate {
        mantissa: 0,
        scale: 0,
    };

    /// The rate of exactly one.
    pub const ONE: Rate = Rate {
        mantissa: 1,
        scale: 0,
    };

    /// Rebuilds a rate from its wire parts, rejecting anything the parser
    /// would not have produced.
    pub fn from_parts(mantissa: u64, scale: u8) -> Result<Self, RateError> {
        if scale > MAX_RATE_SCALE {
            return Err(RateError::TooPrecise {
                max: MAX_RATE_SCALE,
            });
        }
        let normalized = if scale == 0 {
            mantissa <= 1
        } else {
            mantissa % 10 != 0 && mantissa < pow10(scale)
        };
        if !normalized {
            return Err(RateError::NotNormalized { mantissa, scale });
        }
        Ok(Self { mantissa, scale })
    }

    /// Digits after the decimal point, without the trailing zeros.
    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    /// Number of fractional digits.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Returns `floor(amount * self)`.
    ///
    /// Never exceeds `amount`, so it can't overflow.
    pub fn apply(&self, amount: u64) -> u64 {
        let product = amount as u128 * self.mantissa as u128;
        (product / pow10(self.scale) as u128) as u64
    }
}

fn pow10(scale: u8) -> u64 {
    10u64.pow(scale as u32)
}

impl FromStr for Rate {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(RateError::Empty);
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_digit() && *c != '.') {
            return Err(RateError::InvalidCharacter(c));
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((int_part, frac_part)) => {
                if frac_part.contains('.') {
                    return Err(RateError::InvalidCharacter('.'));
                }
                if int_part.is_empty() || frac_part.is_empty() {
                    return Err(RateError::MissingDigits);
                }
                (int_part, frac_part)
            }
            None => (s, ""),
        };

        let int_value = match int_part.trim_start_matches('0') {
            "" => 0,
            "1" => 1,
            _ => return Err(RateError::OutOfRange),
        };
        let frac_digits = frac_part.trim_end_matches('0');

        if int_value == 1 {
            return if frac_digits.is_empty() {
                Ok(Self::ONE)
            } else {
                Err(RateError::OutOfRange)
            };
        }
        if frac_digits.is_empty() {
            return Ok(Self::ZERO);
        }
        if frac_digits.len() > MAX_RATE_SCALE as usize {
            return Err(RateError::TooPrecise {
                max: MAX_RATE_SCALE,
            });
        }

        // At most 18 ASCII digits, always fits.
        let mantissa = frac_digits
            .bytes()
            .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));

        Ok(Self {
            mantissa,
            scale: frac_digits.len() as u8,
        })
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            write!(f, "{}", self.mantissa)
        } else {
            write!(
                f,
                "0.{:0>width$}",
                self.mantissa,
                width = self.scale as usize
            )
        }
    }
}

impl fmt::Debug for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rate({})", self)
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
